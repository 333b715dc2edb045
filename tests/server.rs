//! End-to-end over a loopback socket.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use pipeline_analyzer::api::AppState;
use pipeline_analyzer::server::{self, Limits};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn start(max_body: usize) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    start_with(Limits {
        max_body_bytes: max_body,
        ..Limits::default()
    })
    .await
}

async fn start_with(limits: Limits) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server::serve(listener, AppState::default(), limits, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    (url, tx, handle)
}

#[tokio::test]
async fn analyzes_over_http() {
    let (url, shutdown, handle) = start(1024 * 1024).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/pipelines/parse", url))
        .json(&payload_json(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "num_nodes": 3, "num_edges": 3, "is_dag": false }));

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn schema_failure_is_http_400() {
    let (url, shutdown, handle) = start(1024 * 1024).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/pipelines/parse", url))
        .json(&json!({ "nodes": [{}], "edges": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid pipeline data");
    // id, type, data and position are all missing
    assert_eq!(body["details"].as_array().unwrap().len(), 4);

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn oversized_body_is_413() {
    let (url, shutdown, handle) = start(64).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/pipelines/parse", url))
        .json(&payload_json(&["a", "b", "c", "d"], &[("a", "b")]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn silent_client_gets_408_and_is_closed() {
    let (url, shutdown, handle) = start_with(Limits {
        read_timeout: Duration::from_millis(200),
        ..Limits::default()
    })
    .await;

    let mut stream = TcpStream::connect(url.trim_start_matches("http://"))
        .await
        .unwrap();
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut received))
        .await
        .expect("server should close an idle connection")
        .unwrap();

    let text = String::from_utf8(received).unwrap();
    assert!(text.starts_with("HTTP/1.1 408 Request Timeout\r\n"), "{}", text);

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}
