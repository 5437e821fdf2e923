//! Webhook servers over real HTTP.

mod common;

use common::*;
use faucet_console::dispatch::issue;
use faucet_console::server::{dispatcher_app, router_app, WebhookServer, ACK};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Spin up a server on a free port and return its address.
async fn start(app: axum::Router) -> (SocketAddr, Arc<WebhookServer>) {
    // Bind temporarily to get a free port, then drop immediately
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = Arc::new(WebhookServer::new("test server", addr, app));
    let running = server.clone();
    tokio::spawn(async move {
        let _ = running.serve().await;
    });

    // Give the server a moment to bind
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, server)
}

async fn post(addr: SocketAddr, headers: &[(&str, &str)], body: Vec<u8>) -> (u16, String) {
    let mut request = reqwest::Client::new()
        .post(format!("http://{}/", addr))
        .header("content-type", "application/json")
        .body(body);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn test_router_webhook_runs_commands() {
    let h = Harness::new();
    let (addr, server) = start(router_app(h.router.clone(), None)).await;

    let body = serde_json::to_vec(&update("alice", "/start")).unwrap();
    let (status, text) = post(addr, &[], body).await;

    assert_eq!(status, 200);
    assert_eq!(text, ACK);
    assert_eq!(h.chat.last_text().unwrap(), "Superadmin `alice` has been set.");
    server.shutdown();
}

#[tokio::test]
async fn test_router_webhook_acknowledges_garbage() {
    let h = Harness::new();
    let (addr, server) = start(router_app(h.router.clone(), None)).await;

    let (status, text) = post(addr, &[], b"not json".to_vec()).await;
    assert_eq!((status, text.as_str()), (200, ACK));
    assert_eq!(h.chat.count(), 0);
    server.shutdown();
}

#[tokio::test]
async fn test_router_webhook_secret() {
    let h = Harness::new();
    let app = router_app(h.router.clone(), Some("s3cret".to_string()));
    let (addr, server) = start(app).await;
    let body = serde_json::to_vec(&update("alice", "/start")).unwrap();

    let (status, _) = post(addr, &[("X-Telegram-Bot-Api-Secret-Token", "wrong")], body.clone()).await;
    assert_eq!(status, 200);
    assert!(h.repo.super_admin().await.unwrap().is_none());

    post(addr, &[("X-Telegram-Bot-Api-Secret-Token", "s3cret")], body).await;
    assert!(h.repo.super_admin().await.unwrap().is_some());
    server.shutdown();
}

#[tokio::test]
async fn test_dispatcher_webhook_executes_signed_job() {
    let h = Harness::operational().await;
    let (addr, server) = start(dispatcher_app(h.dispatcher.clone())).await;

    let body = job_body(RECIPIENT, "1", "$eth");
    let signature = issue(SIGNING_KEY, DESTINATION, &body, h.now_secs()).unwrap();
    let (status, text) = post(addr, &[("Upstash-Signature", signature.as_str())], body).await;

    assert_eq!((status, text.as_str()), (200, ACK));
    assert_eq!(h.chain.transfers().len(), 1);
    assert!(h.chat.last_text().unwrap().starts_with("Sent `1` `$ETH`"));
    server.shutdown();
}

#[tokio::test]
async fn test_dispatcher_webhook_acknowledges_rejections() {
    let h = Harness::operational().await;
    let (addr, server) = start(dispatcher_app(h.dispatcher.clone())).await;

    let (status, text) = post(addr, &[], job_body(RECIPIENT, "1", "$eth")).await;
    assert_eq!((status, text.as_str()), (200, ACK));
    assert!(h.chain.transfers().is_empty());
    server.shutdown();
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new();
    let (addr, server) = start(router_app(h.router.clone(), None)).await;

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), ACK);
    server.shutdown();
}

#[tokio::test]
async fn test_shutdown_stops_serving() {
    let h = Harness::new();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let server = Arc::new(WebhookServer::new("test server", addr, router_app(h.router.clone(), None)));
    let running = server.clone();
    let task = tokio::spawn(async move { running.serve().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert!(result.is_ok());
}
