//! Callback-based request helper
//!
//! `ajax` prepares a request from a `RequestConfig`, hands it to the
//! optional `before_send` hook, dispatches it on the global executor and
//! returns immediately. Completion runs exactly one of the `success`/`fail`
//! callbacks: `success` for status 200 exactly, `fail` for everything else
//! including transport errors and timeouts.

use std::time::Duration;

use serde::Serialize;

use crate::client::HttpClient;

/// Request methods accepted by the helper; anything else falls back to GET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Case-insensitive parse with silent GET fallback
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "post" => Self::Post,
            "put" => Self::Put,
            "delete" => Self::Delete,
            _ => Self::Get,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Lifecycle of one request; the terminal state is reached exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Idle,
    Sent,
    Done,
}

type Callback = Box<dyn FnOnce(&str) + Send + 'static>;
type BeforeSend = Box<dyn FnOnce(&mut Request) + Send + 'static>;

/// The prepared request handed to `before_send` for last-moment mutation
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub timeout: Option<Duration>,
}

/// One-shot request description
///
/// Everything except `url` is optional. Consumed by [`ajax`] or [`perform`].
#[derive(Default)]
pub struct RequestConfig {
    url: String,
    method: Option<String>,
    data: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    before_send: Option<BeforeSend>,
    success: Option<Callback>,
    fail: Option<Callback>,
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Request method name, normalized case-insensitively
    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    /// JSON payload; without one the request still carries a `{}` body
    pub fn data<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => self.data = Some(json),
            Err(err) => tracing::warn!("unserializable request payload dropped: {err}"),
        }
        self
    }

    /// Append a header; headers are applied in insertion order
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Request timeout in milliseconds
    pub fn timeout(mut self, ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(ms));
        self
    }

    /// Hook invoked with the prepared request before dispatch
    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut Request) + Send + 'static,
    {
        self.before_send = Some(Box::new(hook));
        self
    }

    /// Callback for a 200 response; receives the body text
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&str) + Send + 'static,
    {
        self.success = Some(Box::new(callback));
        self
    }

    /// Callback for any other outcome; receives the body text
    pub fn on_fail<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&str) + Send + 'static,
    {
        self.fail = Some(Box::new(callback));
        self
    }
}

/// Dispatch a request and return immediately; completion is delivered
/// later through the config's callbacks. A config without a URL is
/// silently dropped.
pub fn ajax(config: RequestConfig) {
    let Some((request, before_send, success, fail)) = prepare(config) else {
        return;
    };
    smol::spawn(run(request, before_send, success, fail)).detach();
}

/// Run a request to completion; the async twin of [`ajax`] for callers
/// (and tests) that need to await the outcome deterministically.
pub async fn perform(config: RequestConfig) {
    let Some((request, before_send, success, fail)) = prepare(config) else {
        return;
    };
    run(request, before_send, success, fail).await;
}

#[allow(clippy::type_complexity)]
fn prepare(
    config: RequestConfig,
) -> Option<(Request, Option<BeforeSend>, Option<Callback>, Option<Callback>)> {
    if config.url.is_empty() {
        tracing::warn!("request without a url dropped");
        return None;
    }

    let method = Method::parse(config.method.as_deref().unwrap_or("get"));
    let body = match &config.data {
        Some(value) => serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string()),
        None => "{}".to_string(),
    };

    let request = Request {
        method,
        url: config.url,
        headers: config.headers,
        body,
        timeout: config.timeout,
    };
    Some((request, config.before_send, config.success, config.fail))
}

async fn run(
    mut request: Request,
    before_send: Option<BeforeSend>,
    success: Option<Callback>,
    fail: Option<Callback>,
) {
    let mut state = ReadyState::Idle;
    tracing::debug!(?state, url = %request.url, "request prepared");

    if let Some(hook) = before_send {
        hook(&mut request);
    }

    let client = HttpClient::new();
    state = ReadyState::Sent;
    tracing::debug!(?state, method = request.method.as_str(), url = %request.url, "request dispatched");

    let result = client
        .request(
            request.method.as_str(),
            &request.url,
            &request.headers,
            Some(request.body.as_bytes()),
            request.timeout,
        )
        .await;

    state = ReadyState::Done;
    match result {
        Ok(response) => {
            tracing::debug!(?state, status = response.status, "request completed");
            deliver(response.status, &response.text(), success, fail);
        }
        Err(err) => {
            tracing::debug!(?state, error = %err, "request failed");
            deliver(0, "", success, fail);
        }
    }
}

/// Route the completion to exactly one callback (missing callbacks are
/// no-ops)
fn deliver(status: u16, body: &str, success: Option<Callback>, fail: Option<Callback>) {
    if status == 200 {
        if let Some(callback) = success {
            callback(body);
        }
    } else if let Some(callback) = fail {
        callback(body);
    }
}
