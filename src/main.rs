//! Faucet console entry point.
//!
//! Subcommands:
//! - `router`: chat webhook server (command router)
//! - `dispatcher`: queue webhook server (job dispatcher)
//! - `register-commands`: publish the bot command list
//! - `set-webhook`: point the bot at a router URL

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use faucet_console::chain::JsonRpcConnector;
use faucet_console::chat::TelegramClient;
use faucet_console::clock::SystemClock;
use faucet_console::dispatch::{Dispatcher, SignatureVerifier};
use faucet_console::queue::QStashQueue;
use faucet_console::router::CommandRouter;
use faucet_console::server::{dispatcher_app, router_app, WebhookServer};
use faucet_console::state::Repository;
use faucet_console::store::{KvStore, MemoryStore, UpstashStore};
use faucet_console::types::StoreBackend;
use faucet_console::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "faucet-console")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: FaucetCommand,
}

#[derive(Subcommand, Debug)]
enum FaucetCommand {
    /// Serve the chat webhook
    Router,
    /// Serve the queue webhook
    Dispatcher,
    /// Publish the bot command list to the chat platform
    RegisterCommands,
    /// Point the bot's webhook at the router
    SetWebhook {
        /// Public URL of the router
        #[arg(long)]
        url: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Command router bind address
    #[arg(long, default_value = "127.0.0.1:8787", env = "FAUCET_ROUTER_ADDR", global = true)]
    router_addr: SocketAddr,

    /// Job dispatcher bind address
    #[arg(long, default_value = "127.0.0.1:8788", env = "FAUCET_DISPATCHER_ADDR", global = true)]
    dispatcher_addr: SocketAddr,

    /// Bot API token
    #[arg(long, env = "TELEGRAM_API_TOKEN", default_value = "", hide_env_values = true)]
    telegram_token: String,

    /// Expected secret header on chat webhooks
    #[arg(long, env = "TELEGRAM_WEBHOOK_SECRET", hide_env_values = true)]
    telegram_webhook_secret: Option<String>,

    /// Key-value store backend
    #[arg(long, value_enum, default_value = "memory", env = "FAUCET_STORE")]
    store: StoreArg,

    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    upstash_url: Option<String>,

    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    upstash_token: Option<String>,

    #[arg(long, default_value = "https://qstash.upstash.io", env = "QSTASH_URL")]
    qstash_url: String,

    #[arg(long, default_value = "faucet", env = "QSTASH_QUEUE")]
    qstash_queue: String,

    #[arg(long, env = "QSTASH_TOKEN", default_value = "", hide_env_values = true)]
    qstash_token: String,

    /// Public URL of the dispatcher webhook
    #[arg(long, env = "FAUCET_DISPATCHER_URL", default_value = "")]
    dispatcher_url: String,

    #[arg(long, env = "QSTASH_CURRENT_SIGNING_KEY", default_value = "", hide_env_values = true)]
    current_signing_key: String,

    #[arg(long, env = "QSTASH_PREVIOUS_SIGNING_KEY", hide_env_values = true)]
    previous_signing_key: Option<String>,

    /// Timeout of a single outbound HTTP request
    #[arg(long, default_value = "30s", env = "FAUCET_HTTP_TIMEOUT", value_parser = parse_duration)]
    http_timeout: Duration,

    /// Delay between transaction receipt polls
    #[arg(long, default_value = "2s", env = "FAUCET_RECEIPT_POLL", value_parser = parse_duration)]
    receipt_poll: Duration,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "FAUCET_LOG_LEVEL")]
    log_level: String,

    /// Log format
    #[arg(long, value_enum, default_value = "text", env = "FAUCET_LOG_FORMAT")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreArg {
    Memory,
    Upstash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Parse `30s`, `500ms`, `2m` with the same rules as config files.
fn parse_duration(value: &str) -> Result<Duration, String> {
    #[derive(serde::Deserialize)]
    struct Humantime(#[serde(with = "humantime_serde")] Duration);

    serde_json::from_value::<Humantime>(serde_json::Value::String(value.to_string()))
        .map(|parsed| parsed.0)
        .map_err(|e| e.to_string())
}

impl CommonArgs {
    fn into_config(self) -> Config {
        let mut config = Config::default();

        config.server.router_addr = self.router_addr;
        config.server.dispatcher_addr = self.dispatcher_addr;

        config.observability.log_level = self.log_level;
        config.observability.json_logs = self.log_format == LogFormat::Json;

        config.telegram.api_token = self.telegram_token;
        config.telegram.webhook_secret = self.telegram_webhook_secret.filter(|s| !s.is_empty());

        config.store.backend = match self.store {
            StoreArg::Memory => StoreBackend::Memory,
            StoreArg::Upstash => StoreBackend::Upstash,
        };
        config.store.rest_url = self.upstash_url;
        config.store.rest_token = self.upstash_token;

        config.queue.base_url = self.qstash_url;
        config.queue.queue_name = self.qstash_queue;
        config.queue.token = self.qstash_token;
        config.queue.dispatcher_url = self.dispatcher_url;
        config.queue.current_signing_key = self.current_signing_key;
        config.queue.previous_signing_key = self.previous_signing_key.filter(|s| !s.is_empty());

        config.rpc.http_timeout = self.http_timeout;
        config.rpc.receipt_poll_interval = self.receipt_poll;
        config
    }
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn KvStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; state is not shared between services");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Upstash => {
            let url = config
                .store
                .rest_url
                .clone()
                .context("UPSTASH_REDIS_REST_URL is required for the upstash store")?;
            let token = config
                .store
                .rest_token
                .clone()
                .context("UPSTASH_REDIS_REST_TOKEN is required for the upstash store")?;
            Ok(Arc::new(UpstashStore::new(url, token, config.rpc.http_timeout)?))
        }
    }
}

async fn serve_until_ctrl_c(server: WebhookServer) -> anyhow::Result<()> {
    let cancel = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, shutting down");
        }
        cancel.cancel();
    });
    server.serve().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.common.into_config();

    faucet_console::observability::init_tracing(&config.observability);

    let timeout = config.rpc.http_timeout;

    match cli.command {
        FaucetCommand::Router => {
            let repo = Repository::new(build_store(&config)?);
            let connector = Arc::new(JsonRpcConnector::new(timeout, config.rpc.receipt_poll_interval)?);
            let chat = Arc::new(TelegramClient::new(&config.telegram, timeout)?);
            let queue = Arc::new(QStashQueue::new(&config.queue, timeout)?);
            let router = CommandRouter::new(repo, connector, chat, queue, Arc::new(SystemClock));

            let app = router_app(router, config.telegram.webhook_secret.clone());
            let server = WebhookServer::new("command router", config.server.router_addr, app);
            serve_until_ctrl_c(server).await
        }
        FaucetCommand::Dispatcher => {
            let repo = Repository::new(build_store(&config)?);
            let connector = Arc::new(JsonRpcConnector::new(timeout, config.rpc.receipt_poll_interval)?);
            let chat = Arc::new(TelegramClient::new(&config.telegram, timeout)?);
            let verifier = SignatureVerifier::from_config(&config.queue)?;
            let dispatcher = Dispatcher::new(repo, connector, chat, verifier, Arc::new(SystemClock));

            let app = dispatcher_app(dispatcher);
            let server = WebhookServer::new("job dispatcher", config.server.dispatcher_addr, app);
            serve_until_ctrl_c(server).await
        }
        FaucetCommand::RegisterCommands => {
            let client = TelegramClient::new(&config.telegram, timeout)?;
            client.set_my_commands().await?;
            tracing::info!("bot commands registered");
            Ok(())
        }
        FaucetCommand::SetWebhook { url } => {
            let client = TelegramClient::new(&config.telegram, timeout)?;
            client
                .set_webhook(&url, config.telegram.webhook_secret.as_deref())
                .await?;
            let info = client.webhook_info().await?;
            tracing::info!(%info, "webhook set");
            Ok(())
        }
    }
}
