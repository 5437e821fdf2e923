//! Upstash Redis REST backend.
//!
//! Each operation is one `POST` of a JSON command array (`["GET", key]`)
//! answered with `{"result": ...}` or `{"error": "..."}`. Values are written
//! as JSON text and parsed back on read; a value that is not valid JSON is
//! returned as a plain string.

use super::KvStore;
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct UpstashStore {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl std::fmt::Debug for UpstashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstashStore")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl UpstashStore {
    pub fn new(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            token: token.into(),
        })
    }

    async fn command(&self, args: Value) -> Result<Option<Value>> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        let body: RestResponse = response.json().await.map_err(|e| {
            Error::store(format!("unreadable store response (status {}): {}", status, e))
        })?;

        if let Some(error) = body.error {
            return Err(Error::store(error));
        }
        if !status.is_success() {
            return Err(Error::store(format!("store returned status {}", status)));
        }
        Ok(body.result)
    }
}

/// Decode a stored value: JSON text is parsed, anything else is kept as text.
fn decode(result: Option<Value>) -> Option<Value> {
    match result {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        }
        Some(other) => Some(other),
    }
}

#[async_trait]
impl KvStore for UpstashStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let result = self.command(json!(["GET", key])).await?;
        Ok(decode(result))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let text = serde_json::to_string(&value)?;
        self.command(json!(["SET", key, text])).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }
}
