//! Shared faucet state.
//!
//! [`Repository`] maps every stored entity to its key in the [`KvStore`]:
//!
//! | Key | Record |
//! |---|---|
//! | `superadmin` | username string |
//! | `admin/{username}` | `true` |
//! | `rpc` | [`ChainConfig`] |
//! | `tokens` | [`TokenRegistry`] |
//! | `drip` | [`DripSettings`] |
//! | `lastdrip/{subject}/{symbol}` | epoch millis |
//!
//! Usernames are stored without the leading `@`.

mod auth;
mod rate_limiter;
mod records;
mod registry;

pub use auth::{Authorization, Caller};
pub use rate_limiter::{evaluate, DripDecision, DripMarks};
pub use records::{
    ChainConfig, DripSetting, DripSettings, Interval, IntervalUnit, Symbol, SymbolMap,
    TokenEntry, TokenRegistry, DEFAULT_TOKEN_DECIMALS, MAX_DECIMALS,
};
pub use registry::{TokenListing, NATIVE_TOKEN_ADDRESS};

use crate::store::KvStore;
use crate::types::{Result, Username};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const SUPER_ADMIN_KEY: &str = "superadmin";
const CHAIN_CONFIG_KEY: &str = "rpc";
const TOKENS_KEY: &str = "tokens";
const DRIP_KEY: &str = "drip";

fn admin_key(username: &Username) -> String {
    format!("admin/{}", username)
}

fn drip_mark_key(subject: &str, symbol: &Symbol) -> String {
    format!("lastdrip/{}/{}", subject, symbol)
}

/// Typed access to the shared store.
#[derive(Debug, Clone)]
pub struct Repository {
    store: Arc<dyn KvStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, record: &T) -> Result<()> {
        self.store.set(key, serde_json::to_value(record)?).await
    }

    // =========================================================================
    // Privileges
    // =========================================================================

    pub async fn super_admin(&self) -> Result<Option<Username>> {
        match self.store.get(SUPER_ADMIN_KEY).await? {
            Some(Value::String(name)) => Ok(Username::from_handle(&name).ok()),
            Some(other) => {
                tracing::warn!(value = %other, "ignoring malformed superadmin record");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn set_super_admin(&self, username: &Username) -> Result<()> {
        self.store
            .set(SUPER_ADMIN_KEY, Value::String(username.as_str().to_string()))
            .await
    }

    pub async fn is_admin_flag(&self, username: &Username) -> Result<bool> {
        let flag = self.store.get(&admin_key(username)).await?;
        Ok(match flag {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(text)) => text != "false",
            Some(_) => true,
        })
    }

    pub async fn set_admin_flag(&self, username: &Username) -> Result<()> {
        self.store.set(&admin_key(username), Value::Bool(true)).await
    }

    pub async fn remove_admin_flag(&self, username: &Username) -> Result<()> {
        self.store.delete(&admin_key(username)).await
    }

    /// Load the records that decide what `username` may do.
    pub async fn resolve_caller(&self, username: Username) -> Result<Caller> {
        let super_admin = self.super_admin().await?;
        let admin_flag = self.is_admin_flag(&username).await?;
        let chain = self.chain_config().await?;
        let auth = Authorization::resolve(
            &username,
            super_admin.as_ref(),
            admin_flag,
            chain.as_ref(),
        );
        Ok(Caller {
            username,
            auth,
            super_admin,
            chain,
        })
    }

    // =========================================================================
    // Chain config
    // =========================================================================

    /// The stored chain config, or `None` when absent or incomplete.
    pub async fn chain_config(&self) -> Result<Option<ChainConfig>> {
        let Some(value) = self.store.get(CHAIN_CONFIG_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                tracing::warn!(error = %e, "stored chain config is incomplete, treating as unset");
                Ok(None)
            }
        }
    }

    pub async fn set_chain_config(&self, config: &ChainConfig) -> Result<()> {
        self.write(CHAIN_CONFIG_KEY, config).await
    }

    // =========================================================================
    // Tokens and drips
    // =========================================================================

    pub async fn tokens(&self) -> Result<TokenRegistry> {
        Ok(self.read(TOKENS_KEY).await?.unwrap_or_default())
    }

    pub async fn set_tokens(&self, tokens: &TokenRegistry) -> Result<()> {
        self.write(TOKENS_KEY, tokens).await
    }

    pub async fn drip_settings(&self) -> Result<DripSettings> {
        Ok(self.read(DRIP_KEY).await?.unwrap_or_default())
    }

    pub async fn set_drip_settings(&self, settings: &DripSettings) -> Result<()> {
        self.write(DRIP_KEY, settings).await
    }

    pub async fn drip_mark(&self, subject: &str, symbol: &Symbol) -> Result<Option<u64>> {
        self.read(&drip_mark_key(subject, symbol)).await
    }

    pub async fn set_drip_mark(&self, subject: &str, symbol: &Symbol, at_millis: u64) -> Result<()> {
        self.write(&drip_mark_key(subject, symbol), &at_millis).await
    }

    /// Write every mark of an approved drip.
    pub async fn record_drip(&self, marks: &DripMarks) -> Result<()> {
        for subject in &marks.subjects {
            self.set_drip_mark(subject, &marks.symbol, marks.at_millis)
                .await?;
        }
        Ok(())
    }
}
