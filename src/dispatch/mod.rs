//! Job dispatcher: the consumer half of the job protocol.
//!
//! ```text
//! raw body + signature ──► verify ──► RawJob ──► Job ──► chain ──► chat
//!                             │                   │        │
//!                             └─── failure notice with payload echo ───┘
//! ```
//!
//! Nothing here is retried. Every delivery ends with at most one chat
//! message, and the HTTP response never reflects the outcome.

mod signature;

pub use signature::{issue, SignatureVerifier};

use crate::chain::{parse_address, parse_units, ChainConnector, Signer, TxHash};
use crate::chat::ChatSender;
use crate::clock::Clock;
use crate::queue::{Job, RawJob};
use crate::state::Repository;
use crate::types::{Error, Result};
use std::sync::Arc;

/// How a delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Transfer confirmed.
    Sent(TxHash),
    /// Signature did not verify; nothing was executed.
    Rejected,
    /// Verified but the payload or the transfer failed.
    Failed,
}

#[derive(Clone)]
pub struct Dispatcher {
    repo: Repository,
    connector: Arc<dyn ChainConnector>,
    chat: Arc<dyn ChatSender>,
    verifier: SignatureVerifier,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("repo", &self.repo)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        repo: Repository,
        connector: Arc<dyn ChainConnector>,
        chat: Arc<dyn ChatSender>,
        verifier: SignatureVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            connector,
            chat,
            verifier,
            clock,
        }
    }

    /// Process one queue delivery.
    pub async fn handle_delivery(&self, signature: Option<&str>, body: &[u8]) -> DispatchOutcome {
        let raw = RawJob::from_bytes(body);

        if let Err(e) = self.verifier.verify(signature, body, self.clock.now_secs()) {
            tracing::warn!(error = %e, "rejecting job with invalid signature");
            self.notify_failure(&raw, "Invalid signature, please check settings.")
                .await;
            return DispatchOutcome::Rejected;
        }

        let job = match Job::try_from(&raw) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting malformed job");
                self.notify_failure(&raw, "Invalid transaction details.")
                    .await;
                return DispatchOutcome::Failed;
            }
        };

        match self.execute(&job).await {
            Ok((hash, explorer_url)) => {
                tracing::info!(chat_id = job.chat_id, tx_hash = %hash, "transfer confirmed");
                let text = format!(
                    "Sent `{}` `{}` to `{}`.\n\nTransaction hash:\n```\n{}\n```",
                    job.amount,
                    job.token.display(),
                    job.address,
                    explorer_url
                );
                self.notify(job.chat_id, &text).await;
                DispatchOutcome::Sent(hash)
            }
            Err(e) => {
                tracing::error!(chat_id = job.chat_id, error = %e, code = e.code(), "transfer failed");
                self.notify_failure(&raw, failure_reason(&e)).await;
                DispatchOutcome::Failed
            }
        }
    }

    /// Run the transfer against the current chain config and token registry.
    /// Returns the hash and its explorer link.
    async fn execute(&self, job: &Job) -> Result<(TxHash, String)> {
        let chain = self
            .repo
            .chain_config()
            .await?
            .ok_or_else(|| Error::not_found("chain is not configured"))?;
        let signer = Signer::from_hex(&chain.signing_key)?;
        let client = self.connector.connect(&chain.rpc_url)?;

        let hash = if chain.is_native(&job.token) {
            let value = parse_units(&job.amount, chain.decimals)?;
            client.send_native(&signer, job.address, value).await?
        } else {
            let tokens = self.repo.tokens().await?;
            let entry = tokens.get(&job.token).ok_or_else(|| {
                Error::not_found(format!("{} is not a registered token", job.token.display()))
            })?;
            let token_address = parse_address(&entry.address)?;
            let value = parse_units(&job.amount, entry.decimals)?;
            client
                .send_token(&signer, token_address, job.address, value)
                .await?
        };

        client.wait_for_receipt(&hash).await?;
        let url = chain.tx_url(hash.as_str());
        Ok((hash, url))
    }

    async fn notify_failure(&self, raw: &RawJob, reason: &str) {
        let Some(chat_id) = raw.chat_id() else {
            tracing::warn!("failed job names no chat, nothing to notify");
            return;
        };
        let text = format!(
            "Transaction Failed. {}\n\nFailed transaction:\n{}",
            reason,
            raw.echo()
        );
        self.notify(chat_id, &text).await;
    }

    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.chat.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "failed to deliver chat message");
        }
    }
}

fn failure_reason(error: &Error) -> &'static str {
    match error {
        Error::NotFound(_) => "Token or chain is not configured.",
        Error::Validation(_) => "Invalid transaction details.",
        _ => "RPC Error.",
    }
}
