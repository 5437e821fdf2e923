//! # Faucet Console - chat-operated token faucet
//!
//! Two services share one key-value store:
//! - the **command router** receives chat updates, checks who is asking,
//!   runs admin and user commands, and queues transfer jobs
//! - the **job dispatcher** receives queued jobs, verifies their signature,
//!   signs and submits the transfer, and reports the result to the chat
//!
//! ## Architecture
//!
//! ```text
//!   chat webhook            push queue              queue webhook
//!        │                      ▲   │                     │
//!        ▼                      │   └────────────────────►│
//!  ┌───────────────┐   enqueue  │               ┌─────────▼──────┐
//!  │ CommandRouter │────────────┘               │   Dispatcher   │
//!  │ policy        │                            │ verify + sign  │
//!  │ handlers      │                            │ submit + wait  │
//!  └──────┬────────┘                            └───────┬────────┘
//!         │            ┌────────────────────┐           │
//!         └───────────►│ Repository/KvStore │◄──────────┘
//!                      └────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod chain;
pub mod chat;
pub mod clock;
pub mod dispatch;
pub mod queue;
pub mod router;
pub mod server;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
