//! Test servers shared by the integration tests.
//!
//! Each server runs on its own thread with a current-thread runtime, so both
//! `#[tokio::test]` and plain `#[test]` (blocking client) cases can use it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};

/// Serve `router` on a random local port and return its address.
pub fn spawn(router: Router) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, router).await
        })
        .unwrap();
    });

    addr
}

/// Start a fresh, freshly seeded mock API and return its base URL.
pub fn mock_api() -> String {
    format!("http://{}", spawn(mock_server::app()))
}

/// Start the edge-case server and return its base URL.
pub fn edge_server() -> String {
    format!("http://{}", spawn(edge_router()))
}

/// An address nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/posts/1")
}

/// Number of elements served by `/chunked`.
pub const CHUNKED_LEN: usize = 2000;

/// Routes for responses the mock API never produces.
fn edge_router() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/chunked", get(chunked))
        .route("/text", get(|| async { "not json" }))
        .route("/status/{code}", get(status_with_json))
        .route("/empty/{code}", get(empty_status))
        .route("/broken/{code}", get(broken))
        .route("/slow", get(slow))
}

/// Reports what the server received: method, raw body, content type and
/// user agent.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "body": body,
        "contentType": text(header::CONTENT_TYPE),
        "userAgent": text(header::USER_AGENT),
    }))
}

/// A JSON array of `0..CHUNKED_LEN` streamed in small pieces.
async fn chunked() -> Response {
    let text = serde_json::to_string(&(0..CHUNKED_LEN).collect::<Vec<_>>()).unwrap();
    let pieces: Vec<String> = text
        .as_bytes()
        .chunks(7)
        .map(|c| String::from_utf8(c.to_vec()).unwrap())
        .collect();
    let body = stream::iter(pieces.into_iter().map(Ok::<_, std::io::Error>));
    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}

async fn status_with_json(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    (status, Json(json!({ "code": code }))).into_response()
}

async fn empty_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

/// Sends part of a body, then aborts the stream.
async fn broken(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    let head = stream::iter([Ok::<_, std::io::Error>(r#"{"partial":"#)]);
    let abort = stream::once(async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "stream aborted"))
    });
    (status, Body::from_stream(head.chain(abort))).into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!({ "slow": true }))
}
