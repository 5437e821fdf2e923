//! Job queue capability and the QStash producer.
//!
//! Jobs are pushed to the dispatcher's public URL through QStash with
//! retries disabled; a job is delivered at most once and the dispatcher
//! reports every outcome to the chat itself.

mod job;

pub use job::{Job, RawJob};

use crate::types::{Error, QueueConfig, Result};
use async_trait::async_trait;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Hand a job to the queue for delivery to the dispatcher.
    async fn enqueue(&self, job: &Job) -> Result<()>;
}

#[derive(Clone)]
pub struct QStashQueue {
    http: reqwest::Client,
    enqueue_url: String,
    token: String,
}

impl std::fmt::Debug for QStashQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QStashQueue")
            .field("enqueue_url", &self.enqueue_url)
            .finish_non_exhaustive()
    }
}

impl QStashQueue {
    pub fn new(config: &QueueConfig, timeout: Duration) -> Result<Self> {
        if config.dispatcher_url.is_empty() {
            return Err(Error::config("dispatcher url is not set"));
        }
        if config.token.is_empty() {
            return Err(Error::config("queue token is not set"));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            enqueue_url: enqueue_url(config),
            token: config.token.clone(),
        })
    }
}

fn enqueue_url(config: &QueueConfig) -> String {
    format!(
        "{}/v2/enqueue/{}/{}",
        config.base_url.trim_end_matches('/'),
        config.queue_name,
        config.dispatcher_url
    )
}

#[async_trait]
impl JobQueue for QStashQueue {
    async fn enqueue(&self, job: &Job) -> Result<()> {
        let response = self
            .http
            .post(&self.enqueue_url)
            .bearer_auth(&self.token)
            .header("Upstash-Retries", "0")
            .json(job)
            .send()
            .await
            .map_err(|e| Error::queue(format!("enqueue request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::queue(format!("enqueue rejected ({}): {}", status, body)));
        }
        tracing::info!(chat_id = job.chat_id, token = %job.token, "job enqueued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> QueueConfig {
        QueueConfig {
            base_url: "https://qstash.upstash.io/".to_string(),
            queue_name: "faucet".to_string(),
            token: "qstash-token".to_string(),
            dispatcher_url: "https://dispatcher.example/".to_string(),
            ..QueueConfig::default()
        }
    }

    #[test]
    fn test_enqueue_url() {
        assert_eq!(
            enqueue_url(&config()),
            "https://qstash.upstash.io/v2/enqueue/faucet/https://dispatcher.example/"
        );
    }

    #[test]
    fn test_requires_dispatcher_url_and_token() {
        let mut missing_url = config();
        missing_url.dispatcher_url.clear();
        assert!(QStashQueue::new(&missing_url, Duration::from_secs(1)).is_err());

        let mut missing_token = config();
        missing_token.token.clear();
        assert!(QStashQueue::new(&missing_token, Duration::from_secs(1)).is_err());

        let queue = QStashQueue::new(&config(), Duration::from_secs(1)).unwrap();
        assert!(!format!("{:?}", queue).contains("qstash-token"));
    }
}
