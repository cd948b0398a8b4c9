//! HTTP client
//!
//! Small async HTTP/1.1 client over smol's TCP. Requests are one
//! connection each (`Connection: close`); bodies may be Content-Length
//! delimited, chunked, or close-delimited. Plain `http://` only.

use std::time::Duration;

use smol::io::{AsyncReadExt, AsyncWriteExt};
use smol::net::TcpStream;

use crate::{NetError, Response};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "sprig/0.1".into(),
            max_redirects: 5,
        }
    }
}

/// HTTP client
#[derive(Debug, Default)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    /// Create a client with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Make an HTTP request, optionally bounded by a timeout
    pub async fn request(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<Response, NetError> {
        let fut = self.request_inner(method, url, headers, body);
        match timeout {
            Some(duration) => {
                smol::future::or(fut, async {
                    smol::Timer::after(duration).await;
                    Err(NetError::Timeout)
                })
                .await
            }
            None => fut.await,
        }
    }

    async fn request_inner(
        &self,
        method: &str,
        url: &str,
        headers: &[(String, String)],
        body: Option<&[u8]>,
    ) -> Result<Response, NetError> {
        let mut method = method.to_string();
        let mut url = url.to_string();
        let mut body = body.map(|b| b.to_vec());
        // custom headers apply to the first hop only
        let mut extra = Some(headers);
        let mut redirects = 0;

        loop {
            let parsed = UrlParts::parse(&url)?;
            let response = self.execute(&parsed, &method, extra, body.as_deref()).await?;

            if (300..400).contains(&response.status) && redirects < self.config.max_redirects {
                if let Some(location) = response.header("location") {
                    let next = resolve_redirect(&url, location);
                    tracing::debug!(status = response.status, to = %next, "following redirect");
                    if response.status != 307 && response.status != 308 {
                        method = "GET".to_string();
                        body = None;
                    }
                    url = next;
                    extra = None;
                    redirects += 1;
                    continue;
                }
            }
            return Ok(response);
        }
    }

    async fn execute(
        &self,
        url: &UrlParts,
        method: &str,
        headers: Option<&[(String, String)]>,
        body: Option<&[u8]>,
    ) -> Result<Response, NetError> {
        tracing::debug!(method, host = %url.host, path = %url.path_and_query(), "HTTP request");

        let mut stream = TcpStream::connect((url.host.as_str(), url.port()))
            .await
            .map_err(|e| NetError::Network(format!("connect failed: {e}")))?;

        let request = build_request(method, url, headers, body, &self.config.user_agent);
        stream
            .write_all(&request)
            .await
            .map_err(|e| NetError::Network(format!("write failed: {e}")))?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .await
            .map_err(|e| NetError::Network(format!("read failed: {e}")))?;

        parse_response(&raw)
    }
}

fn build_request(
    method: &str,
    url: &UrlParts,
    headers: Option<&[(String, String)]>,
    body: Option<&[u8]>,
    user_agent: &str,
) -> Vec<u8> {
    let mut head = format!("{} {} HTTP/1.1\r\n", method, url.path_and_query());
    head.push_str(&format!("Host: {}\r\n", url.host_with_port()));
    head.push_str(&format!("User-Agent: {user_agent}\r\n"));
    head.push_str("Connection: close\r\n");
    if let Some(headers) = headers {
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
    }
    if let Some(body) = body {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");

    let mut out = head.into_bytes();
    if let Some(body) = body {
        out.extend_from_slice(body);
    }
    out
}

fn parse_response(raw: &[u8]) -> Result<Response, NetError> {
    let header_end = find_subslice(raw, b"\r\n\r\n")
        .ok_or_else(|| NetError::MalformedResponse("missing header terminator".into()))?;
    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| NetError::MalformedResponse(format!("bad status line: {status_line}")))?;

    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let mut body = raw[header_end + 4..].to_vec();
    let chunked = headers.iter().any(|(n, v)| {
        n.eq_ignore_ascii_case("transfer-encoding") && v.to_ascii_lowercase().contains("chunked")
    });
    if chunked {
        body = decode_chunked(&body)?;
    } else if let Some(length) = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
    {
        if body.len() > length {
            body.truncate(length);
        }
    }

    Ok(Response {
        status,
        headers,
        body,
    })
}

fn decode_chunked(input: &[u8]) -> Result<Vec<u8>, NetError> {
    let mut out = Vec::new();
    let mut rest = input;
    loop {
        let line_end = find_subslice(rest, b"\r\n")
            .ok_or_else(|| NetError::MalformedResponse("truncated chunk size".into()))?;
        let size_line = String::from_utf8_lossy(&rest[..line_end]).into_owned();
        let size_text = size_line.split(';').next().unwrap_or(&size_line).trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| NetError::MalformedResponse(format!("bad chunk size: {size_text}")))?;
        rest = &rest[line_end + 2..];
        if size == 0 {
            return Ok(out);
        }
        if rest.len() < size + 2 {
            return Err(NetError::MalformedResponse("truncated chunk".into()));
        }
        out.extend_from_slice(&rest[..size]);
        rest = &rest[size..];
        if !rest.starts_with(b"\r\n") {
            return Err(NetError::MalformedResponse("missing chunk terminator".into()));
        }
        rest = &rest[2..];
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn resolve_redirect(base_url: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else if location.starts_with('/') {
        // absolute path on the same host
        match UrlParts::parse(base_url) {
            Ok(parsed) => format!("http://{}{}", parsed.host_with_port(), location),
            Err(_) => location.to_string(),
        }
    } else {
        // relative path
        match base_url.rfind('/') {
            Some(last_slash) if last_slash > "http://".len() => {
                format!("{}/{}", &base_url[..last_slash], location)
            }
            _ => format!("{}/{}", base_url.trim_end_matches('/'), location),
        }
    }
}

/// Split URL for request building
#[derive(Debug)]
struct UrlParts {
    host: String,
    port: Option<u16>,
    path: String,
    query: Option<String>,
}

impl UrlParts {
    fn parse(url: &str) -> Result<Self, NetError> {
        if url.starts_with("https://") {
            return Err(NetError::InvalidUrl(format!("https is not supported: {url}")));
        }
        let Some(rest) = url.strip_prefix("http://") else {
            return Err(NetError::InvalidUrl(format!("invalid scheme: {url}")));
        };

        let (host_port, path_query) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        if host_port.is_empty() {
            return Err(NetError::InvalidUrl(format!("missing host: {url}")));
        }

        let (host, port) = match host_port.rfind(':') {
            Some(colon) => {
                let port = host_port[colon + 1..]
                    .parse::<u16>()
                    .map_err(|_| NetError::InvalidUrl(format!("invalid port: {url}")))?;
                (host_port[..colon].to_string(), Some(port))
            }
            None => (host_port.to_string(), None),
        };

        let (path, query) = match path_query.find('?') {
            Some(i) => (&path_query[..i], Some(path_query[i + 1..].to_string())),
            None => (path_query, None),
        };

        Ok(Self {
            host,
            port,
            path: path.to_string(),
            query,
        })
    }

    fn port(&self) -> u16 {
        self.port.unwrap_or(80)
    }

    fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    fn host_with_port(&self) -> String {
        match self.port {
            Some(p) => format!("{}:{}", self.host, p),
            None => self.host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_parse() {
        let url = UrlParts::parse("http://example.com/path?query=1").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port(), 80);
        assert_eq!(url.path, "/path");
        assert_eq!(url.query, Some("query=1".to_string()));
        assert_eq!(url.path_and_query(), "/path?query=1");
    }

    #[test]
    fn test_url_with_port() {
        let url = UrlParts::parse("http://localhost:8080/api").unwrap();
        assert_eq!(url.host, "localhost");
        assert_eq!(url.port(), 8080);
        assert_eq!(url.host_with_port(), "localhost:8080");
    }

    #[test]
    fn test_url_bare_host() {
        let url = UrlParts::parse("http://example.com").unwrap();
        assert_eq!(url.path, "/");
    }

    #[test]
    fn test_url_rejects_other_schemes() {
        assert!(UrlParts::parse("ftp://example.com").is_err());
        assert!(UrlParts::parse("https://example.com").is_err());
        assert!(UrlParts::parse("/relative").is_err());
    }

    #[test]
    fn test_build_request_lines() {
        let url = UrlParts::parse("http://example.com:81/x").unwrap();
        let headers = vec![("X-One".to_string(), "1".to_string())];
        let raw = build_request("POST", &url, Some(&headers), Some(b"{}"), "sprig/0.1");
        let text = String::from_utf8(raw).unwrap();

        assert!(text.starts_with("POST /x HTTP/1.1\r\n"));
        assert!(text.contains("Host: example.com:81\r\n"));
        assert!(text.contains("X-One: 1\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\n{}"));
    }

    #[test]
    fn test_parse_response_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
        let resp = parse_response(raw).unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.text(), "hello");
    }

    #[test]
    fn test_parse_response_chunked() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let resp = parse_response(raw).unwrap();

        assert_eq!(resp.text(), "hello world");
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(parse_response(b"not http at all").is_err());
        assert!(parse_response(b"HTTP/1.1 abc\r\n\r\n").is_err());
    }

    #[test]
    fn test_resolve_redirect() {
        assert_eq!(
            resolve_redirect("http://example.com/page", "http://other.com/new"),
            "http://other.com/new"
        );
        assert_eq!(
            resolve_redirect("http://example.com:8080/old/path", "/new"),
            "http://example.com:8080/new"
        );
        assert_eq!(
            resolve_redirect("http://example.com/a/b", "c"),
            "http://example.com/a/c"
        );
    }
}
