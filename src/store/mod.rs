//! Shared key-value store capability.
//!
//! Both services read and write all cross-request state through this trait.
//! Values are opaque JSON records; there are no multi-key transactions, so
//! read-modify-write sequences are last-write-wins.

mod memory;
mod upstash;

pub use memory::MemoryStore;
pub use upstash::UpstashStore;

use crate::types::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Get/set/delete by key.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Read a record; `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a record, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete a record. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
