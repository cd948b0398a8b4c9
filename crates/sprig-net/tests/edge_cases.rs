//! End-to-end tests for the request helper against a local fixture server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use sprig_net::{ajax, perform, RequestConfig};

/// Serve the given canned responses one connection at a time, capturing
/// each raw request. Returns the base URL and the captured-request channel.
fn spawn_server(responses: Vec<&'static str>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
    let port = listener.local_addr().expect("local addr").port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else { return };
            let raw = read_request(&mut stream);
            let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://127.0.0.1:{port}"), rx)
}

/// Read one full request: headers plus a Content-Length body if present.
fn read_request(stream: &mut std::net::TcpStream) -> Vec<u8> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let Ok(n) = stream.read(&mut buf) else { break };
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);

        let Some(header_end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&raw[..header_end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if raw.len() >= header_end + 4 + body_len {
            break;
        }
    }
    raw
}

// ============================================================================
// COMPLETION ROUTING
// ============================================================================

#[test]
fn test_success_called_once_on_200() {
    let (base, requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello"]);
    let (tx, rx) = mpsc::channel();

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/data"))
            .on_success(move |body| tx.send(body.to_string()).expect("report success"))
            .on_fail(|_| panic!("fail must not run")),
    ));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "hello");
    assert!(rx.try_recv().is_err(), "success must fire exactly once");

    let captured = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(captured.starts_with("GET /data HTTP/1.1\r\n"), "{captured}");
}

#[test]
fn test_fail_called_on_non_200() {
    let (base, _requests) =
        spawn_server(vec!["HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\ngone"]);
    let (tx, rx) = mpsc::channel();

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/missing"))
            .on_success(|_| panic!("success must not run"))
            .on_fail(move |body| tx.send(body.to_string()).expect("report fail")),
    ));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "gone");
}

#[test]
fn test_missing_callbacks_do_not_panic() {
    let (base, _requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"]);
    smol::block_on(perform(RequestConfig::new(format!("{base}/quiet"))));
}

#[test]
fn test_transport_error_routes_to_fail_with_empty_body() {
    // nothing listens on this port for long; bind and drop to find a dead one
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (tx, rx) = mpsc::channel();

    smol::block_on(perform(
        RequestConfig::new(format!("http://127.0.0.1:{port}/x"))
            .on_success(|_| panic!("success must not run"))
            .on_fail(move |body| tx.send(body.to_string()).expect("report fail")),
    ));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "");
}

// ============================================================================
// REQUEST SHAPE ON THE WIRE
// ============================================================================

#[test]
fn test_post_sends_json_payload() {
    let (base, requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"]);

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/submit"))
            .method("POST")
            .data(&serde_json::json!({"a": 1})),
    ));

    let captured = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(captured.starts_with("POST /submit HTTP/1.1\r\n"), "{captured}");
    assert!(captured.ends_with(r#"{"a":1}"#), "{captured}");
}

#[test]
fn test_get_without_data_sends_placeholder_body() {
    let (base, requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"]);

    smol::block_on(perform(RequestConfig::new(format!("{base}/bare"))));

    let captured = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(captured.contains("Content-Length: 2\r\n"), "{captured}");
    assert!(captured.ends_with("{}"), "{captured}");
}

#[test]
fn test_headers_applied_in_order() {
    let (base, requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"]);

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/h"))
            .header("X-First", "1")
            .header("X-Second", "2"),
    ));

    let captured = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    let first = captured.find("X-First: 1").expect("first header present");
    let second = captured.find("X-Second: 2").expect("second header present");
    assert!(first < second, "headers out of order: {captured}");
}

#[test]
fn test_before_send_mutation_reaches_the_wire() {
    let (base, requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"]);

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/hooked")).before_send(|request| {
            request
                .headers
                .push(("X-Hook".to_string(), "ran".to_string()));
        }),
    ));

    let captured = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(captured.contains("X-Hook: ran\r\n"), "{captured}");
}

// ============================================================================
// REDIRECTS AND TIMEOUTS
// ============================================================================

#[test]
fn test_redirect_followed_to_success() {
    let (base, requests) = spawn_server(vec![
        "HTTP/1.1 302 Found\r\nLocation: /moved\r\nContent-Length: 0\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ndone",
    ]);
    let (tx, rx) = mpsc::channel();

    smol::block_on(perform(
        RequestConfig::new(format!("{base}/start"))
            .method("POST")
            .on_success(move |body| tx.send(body.to_string()).expect("report success"))
            .on_fail(|body| panic!("fail ran with {body:?}")),
    ));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "done");
    let first = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = requests.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(first.starts_with("POST /start"), "{first}");
    // 302 downgrades the replay to GET
    assert!(second.starts_with("GET /moved"), "{second}");
}

#[test]
fn test_timeout_routes_to_fail() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else { return };
        // hold the connection open without answering
        thread::sleep(Duration::from_millis(1500));
        drop(stream);
    });
    let (tx, rx) = mpsc::channel();

    smol::block_on(perform(
        RequestConfig::new(format!("http://127.0.0.1:{port}/slow"))
            .timeout(100)
            .on_success(|_| panic!("success must not run"))
            .on_fail(move |body| tx.send(body.to_string()).expect("report fail")),
    ));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), "");
}

// ============================================================================
// FIRE-AND-FORGET DISPATCH
// ============================================================================

#[test]
fn test_ajax_returns_immediately_and_completes() {
    let (base, _requests) = spawn_server(vec!["HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"]);
    let (tx, rx) = mpsc::channel();

    ajax(
        RequestConfig::new(format!("{base}/bg"))
            .on_success(move |body| tx.send(body.to_string()).expect("report success")),
    );

    // completion is delivered later on the executor, not on this thread
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "ok");
}

#[test]
fn test_ajax_without_url_is_a_silent_no_op() {
    ajax(
        RequestConfig::default()
            .on_success(|_| panic!("success must not run"))
            .on_fail(|_| panic!("fail must not run")),
    );
    // nothing to wait for: the config is dropped before dispatch
    thread::sleep(Duration::from_millis(100));
}
