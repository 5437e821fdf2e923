//! HTTP surface of both services.
//!
//! Every endpoint answers `200 "OK."`; outcomes reach users through the chat.

use crate::dispatch::Dispatcher;
use crate::router::CommandRouter;
use crate::types::RequestId;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Body of every response.
pub const ACK: &str = "OK.";

const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";
const SIGNATURE_HEADERS: [&str; 2] = ["upstash-signature", "signature"];

async fn health() -> &'static str {
    ACK
}

// =============================================================================
// Router app
// =============================================================================

#[derive(Clone)]
struct RouterState {
    router: CommandRouter,
    secret: Option<Arc<str>>,
}

/// Chat webhook app. When `webhook_secret` is set, updates without the
/// matching secret header are dropped.
pub fn router_app(router: CommandRouter, webhook_secret: Option<String>) -> Router {
    let state = RouterState {
        router,
        secret: webhook_secret.filter(|s| !s.is_empty()).map(Arc::from),
    };
    Router::new()
        .route("/", post(chat_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn chat_webhook(State(state): State<RouterState>, headers: HeaderMap, body: Bytes) -> &'static str {
    let span = tracing::info_span!("chat_update", request_id = %RequestId::new());

    if let Some(expected) = &state.secret {
        let presented = headers
            .get(TELEGRAM_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_ref()) {
            span.in_scope(|| tracing::warn!("chat update with missing or wrong secret, ignoring"));
            return ACK;
        }
    }

    let update: Value = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            span.in_scope(|| tracing::debug!(error = %e, "chat update is not JSON, ignoring"));
            return ACK;
        }
    };
    state.router.handle_update(&update).instrument(span).await;
    ACK
}

// =============================================================================
// Dispatcher app
// =============================================================================

/// Queue delivery app.
pub fn dispatcher_app(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/", post(queue_delivery))
        .route("/health", get(health))
        .with_state(Arc::new(dispatcher))
}

async fn queue_delivery(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> &'static str {
    let span = tracing::info_span!("queue_delivery", request_id = %RequestId::new());
    let signature = SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok());
    let outcome = dispatcher
        .handle_delivery(signature, &body)
        .instrument(span.clone())
        .await;
    span.in_scope(|| tracing::debug!(?outcome, "delivery handled"));
    ACK
}

// =============================================================================
// Server
// =============================================================================

/// Serves one app until cancelled.
#[derive(Debug)]
pub struct WebhookServer {
    name: &'static str,
    addr: SocketAddr,
    app: Router,
    cancel: CancellationToken,
}

impl WebhookServer {
    pub fn new(name: &'static str, addr: SocketAddr, app: Router) -> Self {
        Self {
            name,
            addr,
            app,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the server when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the server until cancelled or a fatal error occurs.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("{} listening on {}", self.name, self.addr);

        let cancel = self.cancel.clone();
        axum::serve(listener, self.app.clone())
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("{} shut down", self.name);
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
