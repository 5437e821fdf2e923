//! Chat reply capability.

mod telegram;

pub use telegram::{BotCommand, TelegramClient, BOT_COMMANDS};

use crate::types::Result;
use async_trait::async_trait;

/// Sends a text message to a chat.
///
/// Texts use Markdown: code spans in backticks and fenced blocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}
