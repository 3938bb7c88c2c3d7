//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body, http::Request};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use chat_relay::api::public::chat::ChatRequest;
use chat_relay::api::{AppState, SharedState, app};
use chat_relay::core::AppConfig;

/// Config pointing at a fake provider with the proxy disabled so
/// requests reach it directly.
pub fn test_config(api_hostname: &str) -> AppConfig {
    AppConfig {
        openai_model: String::from("gpt-3.5-turbo"),
        openai_api_hostname: api_hostname.to_string(),
        openai_api_key: None,
        proxy_url: None,
    }
}

/// Creates a test application router and a handle to its state
pub fn test_app(api_hostname: &str) -> (Router, SharedState) {
    let state = Arc::new(RwLock::new(AppState::new(test_config(api_hostname))));
    (app(Arc::clone(&state)), state)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn chat_request(id: &str, content: &str) -> Request<Body> {
    let payload = ChatRequest {
        id: Some(id.to_string()),
        content: Some(content.to_string()),
        created_at: Some(1_700_000_000_000),
        created_by: Some(String::from("alice")),
    };
    json_request(
        "POST",
        "/chat",
        serde_json::to_value(payload).expect("Invalid chat request"),
    )
}

/// A streamed chat completion that emits each of `fragments` in a
/// separate event
pub fn completion_sse(fragments: &[&str]) -> String {
    let mut out = String::new();
    let first = json!({
        "id": "chatcmpl-123",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}, "finish_reason": null}]
    });
    out.push_str(&format!("data: {}\n\n", first));
    for fragment in fragments {
        let chunk = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": fragment}, "finish_reason": null}]
        });
        out.push_str(&format!("data: {}\n\n", chunk));
    }
    let last = json!({
        "id": "chatcmpl-123",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
    });
    out.push_str(&format!("data: {}\n\ndata: [DONE]\n\n", last));
    out
}

/// Fetches the display log through the API
pub async fn fetch_messages(app: &Router) -> Value {
    use tower::util::ServiceExt;

    let response = app.clone().oneshot(get_request("/messages")).await.unwrap();
    let body = body_to_string(response.into_body()).await;
    serde_json::from_str(&body).expect("Invalid JSON")
}

/// Sets the provider credential through the API
pub async fn set_api_key(app: &Router, api_key: &str) {
    use tower::util::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/apiKey", json!({"apiKey": api_key})))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

/// A provider that streams `fragments`, then waits for `release`
/// before ending the stream. Returns its base URL.
pub async fn paused_provider(fragments: &[&str], release: oneshot::Receiver<()>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut events = String::new();
    for fragment in fragments {
        let chunk = json!({"choices": [{"index": 0, "delta": {"content": fragment}}]});
        events.push_str(&format!("data: {}\n\n", chunk));
    }

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        socket.write_all(events.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        let _ = release.await;
        let _ = socket.write_all(b"data: [DONE]\n\n").await;
        let _ = socket.shutdown().await;
    });

    format!("http://{}", addr)
}

/// Reads one HTTP request (headers and body) off the socket
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        data.extend_from_slice(&buf[..n]);

        let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= header_end + 4 + content_length {
            return;
        }
    }
}
