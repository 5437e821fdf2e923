//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. None of
//! them are ever shown verbatim in chat; the router and dispatcher translate
//! them into fixed user-facing messages.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the faucet console.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed command arguments or job payload fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record (token, drip setting, config) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Chain capability failures: unreachable RPC, JSON-RPC error, revert.
    #[error("chain error: {0}")]
    Chain(String),

    /// Key-value store failures.
    #[error("store error: {0}")]
    Store(String),

    /// Queue enqueue failures.
    #[error("queue error: {0}")]
    Queue(String),

    /// Chat API failures.
    #[error("chat error: {0}")]
    Chat(String),

    /// Job signature verification failures.
    #[error("signature error: {0}")]
    Signature(String),

    /// Missing or invalid process configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "INVALID_ARGUMENT",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Chain(_) => "CHAIN",
            Error::Store(_) => "STORE",
            Error::Queue(_) => "QUEUE",
            Error::Chat(_) => "CHAT",
            Error::Signature(_) => "UNAUTHENTICATED",
            Error::Config(_) => "CONFIG",
            Error::Internal(_) => "INTERNAL",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Http(_) => "HTTP",
            Error::Io(_) => "IO",
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn chain(msg: impl Into<String>) -> Self {
        Self::Chain(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    pub fn chat(msg: impl Into<String>) -> Self {
        Self::Chat(msg.into())
    }

    pub fn signature(msg: impl Into<String>) -> Self {
        Self::Signature(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
