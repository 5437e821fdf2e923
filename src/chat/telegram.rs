//! Telegram Bot API client.

use super::ChatSender;
use crate::types::{Error, Result, TelegramConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Entry in the bot's command menu.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BotCommand {
    pub command: &'static str,
    pub description: &'static str,
}

/// Commands registered with `setMyCommands`.
pub const BOT_COMMANDS: &[BotCommand] = &[
    BotCommand { command: "start", description: "Initialize superadmin first time" },
    BotCommand { command: "rpc", description: "Retrieve and manage RPC settings" },
    BotCommand { command: "admin", description: "Manage user admin roles" },
    BotCommand { command: "status", description: "Retrieve token balances" },
    BotCommand { command: "tokens", description: "Manage token settings" },
    BotCommand { command: "send", description: "Send tokens to a user" },
    BotCommand { command: "drip", description: "Request or configure token drips" },
    BotCommand { command: "help", description: "See a full list of commands and examples" },
    BotCommand { command: "superadmin", description: "Manage superadmin settings" },
];

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(Error::config("telegram api token is not set"));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call(&self, method: &str, body: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::chat(format!("{} request failed: {}", method, e.without_url())))?;
        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::chat(format!("{} bad response (status {}): {}", method, status, e.without_url())))?;
        if !body.ok {
            return Err(Error::chat(format!(
                "{} rejected: {}",
                method,
                body.description.unwrap_or_else(|| status.to_string())
            )));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    /// Publish [`BOT_COMMANDS`] as the bot's command menu.
    pub async fn set_my_commands(&self) -> Result<()> {
        self.call(
            "setMyCommands",
            json!({ "commands": BOT_COMMANDS, "language_code": "en" }),
        )
        .await?;
        Ok(())
    }

    /// Point the bot's webhook at `url`.
    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> Result<()> {
        let mut body = json!({ "url": url });
        if let Some(secret) = secret {
            body["secret_token"] = json!(secret);
        }
        self.call("setWebhook", body).await?;
        Ok(())
    }

    pub async fn webhook_info(&self) -> Result<Value> {
        self.call("getWebhookInfo", json!({})).await
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TelegramConfig {
        TelegramConfig {
            api_base: "https://api.telegram.org/".to_string(),
            api_token: "123:abc".to_string(),
            webhook_secret: None,
        }
    }

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new(&config(), Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert!(!format!("{:?}", client).contains("123:abc"));
    }

    #[test]
    fn test_requires_token() {
        let mut config = config();
        config.api_token.clear();
        assert!(matches!(
            TelegramClient::new(&config, Duration::from_secs(1)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_command_menu_serializes() {
        let value = serde_json::to_value(BOT_COMMANDS).unwrap();
        assert_eq!(value[0], json!({"command": "start", "description": "Initialize superadmin first time"}));
        assert!(BOT_COMMANDS.iter().any(|c| c.command == "drip"));
        assert!(BOT_COMMANDS.iter().all(|c| !c.command.starts_with('/')));
    }
}
