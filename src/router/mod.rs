//! Command router: the chat-facing half of the faucet.
//!
//! One inbound chat update is handled as:
//!
//! 1. extract chat id, username and text (anything missing: ignore)
//! 2. tokenize into a [`Command`] and arguments (unknown: ignore)
//! 3. resolve the caller's [`Authorization`](crate::state::Authorization)
//! 4. apply the access [`policy`]
//! 5. run the command handler, which returns an [`Outcome`]
//! 6. deliver the outcome: a chat reply or a queued job
//!
//! Handlers never talk to the chat or the queue directly, so every command
//! produces at most one reply.

pub mod command;
mod handlers;
pub mod messages;
pub mod policy;

pub use command::Command;
pub use policy::Access;

use crate::chain::ChainConnector;
use crate::chat::ChatSender;
use crate::clock::Clock;
use crate::queue::{Job, JobQueue};
use crate::state::{Caller, ChainConfig, DripMarks, Repository};
use crate::types::{Error, Result, Username};
use serde_json::Value;
use std::sync::Arc;

/// What a command handler decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Reply with this text.
    Reply(String),
    /// Queue a transfer. `marks` are written only if queuing succeeds.
    Enqueue { job: Job, marks: Option<DripMarks> },
    /// Do nothing.
    Silent,
}

/// Everything a handler may use.
pub struct CommandContext<'a> {
    pub repo: &'a Repository,
    pub connector: &'a dyn ChainConnector,
    pub clock: &'a dyn Clock,
    pub caller: &'a Caller,
    pub chat_id: i64,
}

impl std::fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("caller", &self.caller)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl CommandContext<'_> {
    /// Chain config of an operational system.
    pub fn chain(&self) -> Result<&ChainConfig> {
        self.caller
            .chain
            .as_ref()
            .ok_or_else(|| Error::internal("chain config missing for an operational command"))
    }
}

/// Chat id, username and text of one inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub chat_id: i64,
    pub username: Option<Username>,
    pub text: Option<String>,
}

impl Incoming {
    /// Pull the message out of a plain or callback-wrapped update.
    pub fn from_update(update: &Value) -> Option<Self> {
        let callback = update.get("callback_query");
        let message = update
            .get("message")
            .or_else(|| callback.and_then(|cb| cb.get("message")))?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;

        // A callback's message was sent by the bot; the caller is the one
        // who pressed the button.
        let from = match (update.get("message"), callback) {
            (None, Some(cb)) => cb.get("from"),
            _ => message.get("from"),
        };
        let username = from
            .and_then(|from| from.get("username"))
            .and_then(Value::as_str)
            .and_then(|name| Username::from_handle(name).ok());
        let text = message
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            chat_id,
            username,
            text,
        })
    }
}

#[derive(Clone)]
pub struct CommandRouter {
    repo: Repository,
    connector: Arc<dyn ChainConnector>,
    chat: Arc<dyn ChatSender>,
    queue: Arc<dyn JobQueue>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

impl CommandRouter {
    pub fn new(
        repo: Repository,
        connector: Arc<dyn ChainConnector>,
        chat: Arc<dyn ChatSender>,
        queue: Arc<dyn JobQueue>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            connector,
            chat,
            queue,
            clock,
        }
    }

    /// Handle one chat update and return what was done.
    pub async fn handle_update(&self, update: &Value) -> Outcome {
        let Some(incoming) = Incoming::from_update(update) else {
            tracing::debug!("update carries no message, ignoring");
            return Outcome::Silent;
        };
        let (Some(username), Some(text)) = (incoming.username, incoming.text) else {
            tracing::debug!(chat_id = incoming.chat_id, "message without username or text, ignoring");
            return Outcome::Silent;
        };
        let Some((command, args)) = command::parse(&text) else {
            return Outcome::Silent;
        };

        let outcome = match self.run(command, &args, username, incoming.chat_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(command = command.name(), error = %e, code = e.code(), "command failed");
                Outcome::Reply(messages::GENERIC_FAILURE.to_string())
            }
        };
        self.deliver(incoming.chat_id, &outcome).await;
        outcome
    }

    async fn run(
        &self,
        command: Command,
        args: &[String],
        username: Username,
        chat_id: i64,
    ) -> Result<Outcome> {
        let caller = self.repo.resolve_caller(username).await?;
        match policy::access(command, args, &caller.auth) {
            Access::Allow => {}
            Access::DenyVisible(text) => return Ok(Outcome::Reply(text)),
            Access::DenySilent => {
                tracing::debug!(command = command.name(), caller = %caller.username, "access denied");
                return Ok(Outcome::Silent);
            }
        }

        tracing::info!(command = command.name(), caller = %caller.username, "running command");
        let ctx = CommandContext {
            repo: &self.repo,
            connector: self.connector.as_ref(),
            clock: self.clock.as_ref(),
            caller: &caller,
            chat_id,
        };
        handlers::dispatch(command, &ctx, args).await
    }

    async fn deliver(&self, chat_id: i64, outcome: &Outcome) {
        match outcome {
            Outcome::Silent => {}
            Outcome::Reply(text) => self.reply(chat_id, text).await,
            Outcome::Enqueue { job, marks } => {
                if let Err(e) = self.queue.enqueue(job).await {
                    tracing::error!(chat_id, error = %e, "failed to enqueue job");
                    self.reply(chat_id, messages::QUEUE_FAILURE).await;
                    return;
                }
                if let Some(marks) = marks {
                    if let Err(e) = self.repo.record_drip(marks).await {
                        tracing::error!(chat_id, error = %e, "failed to record drip marks");
                    }
                }
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.chat.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "failed to deliver chat message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incoming_plain_message() {
        let update = json!({
            "message": {"chat": {"id": 42}, "from": {"username": "alice"}, "text": "/help"}
        });
        let incoming = Incoming::from_update(&update).unwrap();
        assert_eq!(incoming.chat_id, 42);
        assert_eq!(incoming.username.unwrap().as_str(), "alice");
        assert_eq!(incoming.text.as_deref(), Some("/help"));
    }

    #[test]
    fn test_incoming_callback_uses_presser() {
        let update = json!({
            "callback_query": {
                "from": {"username": "bob"},
                "message": {"chat": {"id": -7}, "from": {"username": "faucet_bot"}, "text": "/status"}
            }
        });
        let incoming = Incoming::from_update(&update).unwrap();
        assert_eq!(incoming.chat_id, -7);
        assert_eq!(incoming.username.unwrap().as_str(), "bob");
    }

    #[test]
    fn test_incoming_requires_chat_id() {
        assert!(Incoming::from_update(&json!({})).is_none());
        assert!(Incoming::from_update(&json!({"message": {"text": "/start"}})).is_none());
        assert!(Incoming::from_update(&json!({"edited_message": {"chat": {"id": 1}}})).is_none());
    }

    #[test]
    fn test_incoming_without_username() {
        let update = json!({"message": {"chat": {"id": 1}, "from": {}, "text": "/start"}});
        assert!(Incoming::from_update(&update).unwrap().username.is_none());
    }
}
