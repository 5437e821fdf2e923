//! Core types for the faucet console.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (RequestId, Username)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for servers, store, queue and RPC

mod config;
mod errors;
mod ids;

pub use config::{
    Config, ObservabilityConfig, QueueConfig, RpcClientConfig, ServerConfig, StoreBackend,
    StoreConfig, TelegramConfig,
};
pub use errors::{Error, Result};
pub use ids::{RequestId, Username};
