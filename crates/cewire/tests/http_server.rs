//! Integration tests for the live event server.
//!
//! The server is started on an ephemeral port and driven over a real TCP
//! connection with hand-written HTTP/1.1 requests, so these tests see
//! exactly what a remote producer would see.

use std::collections::HashMap;
use std::net::SocketAddr;

use cewire::prelude::*;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// =========================================================================
// Minimal HTTP/1.1 client
// =========================================================================

struct HttpResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

async fn roundtrip(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> HttpResponse {
    let mut request = format!(
        "{method} {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\ncontent-length: {}\r\n",
        body.len()
    );
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write head");
    stream.write_all(body).await.expect("write body");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> HttpResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = std::str::from_utf8(&raw[..split]).expect("head is text");
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status code");

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(
                name.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            );
        }
    }
    HttpResponse {
        status,
        headers,
        body,
    }
}

async fn start_echo_server() -> ServerHandle {
    listen_and_serve_ce("127.0.0.1:0", DefaultConverter, |events: Vec<Event>| {
        Ok::<_, BoxError>(events)
    })
    .await
    .expect("server should start")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_empty_listen_addr_picks_free_port() {
    let server = listen_and_serve_ce("", DefaultConverter, |events: Vec<Event>| {
        Ok::<_, BoxError>(events)
    })
    .await
    .expect("server should start");
    assert_ne!(server.local_addr().port(), 0);
}

#[tokio::test]
async fn test_binary_echo_over_http() {
    let server = start_echo_server().await;
    let response = roundtrip(
        server.local_addr(),
        "PUT",
        "/",
        &[
            ("ce-id", "42"),
            ("ce-source", "/sensors/door"),
            ("ce-specversion", "1.0"),
            ("ce-type", "com.example.opened"),
            ("content-type", "text/plain"),
        ],
        b"ping",
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.headers["ce-id"], "42");
    assert_eq!(response.headers["ce-source"], "/sensors/door");
    assert_eq!(response.headers["content-type"], "text/plain");
    assert_eq!(response.body, b"ping");
}

#[tokio::test]
async fn test_structured_singleton_echo_over_http() {
    let server = start_echo_server().await;
    let envelope = json!({
        "id": "7",
        "source": "/svc",
        "specversion": "1.0",
        "type": "com.example.ping",
        "data": { "n": 1 }
    });
    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[("content-type", "application/cloudevents+json")],
        envelope.to_string().as_bytes(),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers["content-type"],
        "application/cloudevents+json"
    );
    let body: serde_json::Value =
        serde_json::from_slice(&response.body).expect("body json");
    assert_eq!(body["id"], "7");
    assert_eq!(body["data"], json!({ "n": 1 }));
}

#[tokio::test]
async fn test_structured_batch_echo_over_http() {
    let server = start_echo_server().await;
    let envelope = json!([
        { "id": "1", "source": "/a", "specversion": "1.0", "type": "t" },
        { "id": "2", "source": "/b", "specversion": "1.0", "type": "t" },
        { "id": "3", "source": "/c", "specversion": "1.0", "type": "t" }
    ]);
    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[("content-type", "application/cloudevents-batch+json")],
        envelope.to_string().as_bytes(),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers["content-type"],
        "application/cloudevents-batch+json"
    );
    let body: serde_json::Value =
        serde_json::from_slice(&response.body).expect("body json");
    assert_eq!(body.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_unrecognizable_request_is_client_error() {
    let server = start_echo_server().await;
    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[("content-type", "text/plain")],
        b"not an event",
    )
    .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_missing_required_attribute_is_client_error() {
    let server = start_echo_server().await;
    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[("ce-source", "/sensors/door")],
        b"",
    )
    .await;
    assert_eq!(response.status, 400);
    let body = String::from_utf8(response.body).expect("text body");
    assert!(body.contains("required attribute"));
}

#[tokio::test]
async fn test_handler_failure_is_server_error() {
    let server = listen_and_serve_ce(
        "127.0.0.1:0",
        DefaultConverter,
        |_: Vec<Event>| Err::<Vec<Event>, BoxError>("nothing to say".into()),
    )
    .await
    .expect("server should start");

    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[
            ("ce-id", "1"),
            ("ce-source", "/svc"),
            ("ce-specversion", "1.0"),
            ("ce-type", "t"),
        ],
        b"",
    )
    .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_reply_encode_failure_is_server_error() {
    // Echoing two events to a binary-mode request cannot be encoded.
    let server = listen_and_serve_ce(
        "127.0.0.1:0",
        DefaultConverter,
        |events: Vec<Event>| {
            let mut doubled = events.clone();
            doubled.extend(events);
            Ok::<_, BoxError>(doubled)
        },
    )
    .await
    .expect("server should start");

    let response = roundtrip(
        server.local_addr(),
        "POST",
        "/",
        &[
            ("ce-id", "1"),
            ("ce-source", "/svc"),
            ("ce-specversion", "1.0"),
            ("ce-type", "t"),
        ],
        b"",
    )
    .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_info_route() {
    let server = start_echo_server().await;
    let response =
        roundtrip(server.local_addr(), "GET", "/info", &[], b"").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"cewire event server");
}

#[tokio::test]
async fn test_shutdown_yields_graceful_result() {
    let mut server = start_echo_server().await;
    let addr = server.local_addr();

    // Serve at least one request before stopping.
    let response = roundtrip(addr, "GET", "/info", &[], b"").await;
    assert_eq!(response.status, 200);

    server.shutdown();
    server.join().await.expect("graceful stop");

    assert!(TcpStream::connect(addr).await.is_err());
}
