//! Configuration structures.
//!
//! Configuration is assembled by the binary from command-line flags and
//! environment variables; every section has a usable default for local runs.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Global faucet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Chat platform configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Shared key-value store configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Push queue configuration (both producer and consumer side).
    #[serde(default)]
    pub queue: QueueConfig,

    /// Chain JSON-RPC client configuration.
    #[serde(default)]
    pub rpc: RpcClientConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Command router (chat webhook) bind address.
    pub router_addr: SocketAddr,

    /// Job dispatcher (queue webhook) bind address.
    pub dispatcher_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            router_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            dispatcher_addr: SocketAddr::from(([127, 0, 0, 1], 8788)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Chat platform configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL (the bot token is appended).
    pub api_base: String,

    /// Bot API token.
    pub api_token: String,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` on inbound webhooks.
    pub webhook_secret: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            api_token: String::new(),
            webhook_secret: None,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("api_token", &"<redacted>")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Which key-value store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map. State is lost on restart and is not shared
    /// between the router and dispatcher processes.
    #[default]
    Memory,
    /// Upstash Redis over its REST protocol.
    Upstash,
}

/// Key-value store configuration.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// REST endpoint for the Upstash backend.
    pub rest_url: Option<String>,

    /// REST bearer token for the Upstash backend.
    pub rest_token: Option<String>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("rest_url", &self.rest_url)
            .field("rest_token", &self.rest_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Push queue configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue service base URL.
    pub base_url: String,

    /// Queue name jobs are enqueued on.
    pub queue_name: String,

    /// Bearer token for enqueue requests.
    pub token: String,

    /// Public URL of the dispatcher webhook. Jobs are addressed to it and
    /// signed tokens must name it as their subject.
    pub dispatcher_url: String,

    /// Signing key currently used by the queue.
    pub current_signing_key: String,

    /// Signing key from before the last rotation.
    pub previous_signing_key: Option<String>,

    /// Allowed clock skew when checking signature expiry.
    #[serde(with = "humantime_serde")]
    pub clock_tolerance: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_url: "https://qstash.upstash.io".to_string(),
            queue_name: "faucet".to_string(),
            token: String::new(),
            dispatcher_url: String::new(),
            current_signing_key: String::new(),
            previous_signing_key: None,
            clock_tolerance: Duration::from_secs(5),
        }
    }
}

impl std::fmt::Debug for QueueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueConfig")
            .field("base_url", &self.base_url)
            .field("queue_name", &self.queue_name)
            .field("dispatcher_url", &self.dispatcher_url)
            .field("clock_tolerance", &self.clock_tolerance)
            .finish_non_exhaustive()
    }
}

/// Chain JSON-RPC client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcClientConfig {
    /// Timeout for a single HTTP request (not for the receipt wait as a whole).
    #[serde(with = "humantime_serde")]
    pub http_timeout: Duration,

    /// Delay between receipt polls while waiting for finality.
    #[serde(with = "humantime_serde")]
    pub receipt_poll_interval: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            receipt_poll_interval: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.router_addr.to_string(), "127.0.0.1:8787");
        assert_eq!(config.server.dispatcher_addr.port(), 8788);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.rpc.receipt_poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_server_addresses_deserialize() {
        let server: ServerConfig =
            serde_json::from_str(r#"{"router_addr": "0.0.0.0:80", "dispatcher_addr": "[::1]:81"}"#)
                .unwrap();
        assert_eq!(server.router_addr.port(), 80);
        assert!(server.dispatcher_addr.is_ipv6());
        assert!(serde_json::from_str::<ServerConfig>(
            r#"{"router_addr": "nope", "dispatcher_addr": "[::1]:81"}"#
        )
        .is_err());
    }

    #[test]
    fn test_humantime_durations() {
        let rpc: RpcClientConfig =
            serde_json::from_str(r#"{"http_timeout": "10s", "receipt_poll_interval": "500ms"}"#)
                .unwrap();
        assert_eq!(rpc.http_timeout, Duration::from_secs(10));
        assert_eq!(rpc.receipt_poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut queue = QueueConfig::default();
        queue.token = "super-secret".to_string();
        queue.current_signing_key = "sig_current".to_string();
        let rendered = format!("{:?}", queue);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("sig_current"));
    }
}
