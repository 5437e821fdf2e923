//! Token registry and drip settings management.

use super::records::{ChainConfig, DripSetting, Interval, Symbol, TokenEntry};
use super::Repository;
use crate::types::{Error, Result};

/// Address shown for the native token in listings.
pub const NATIVE_TOKEN_ADDRESS: &str = "Native gas token.";

/// One row of the token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenListing {
    pub symbol: Symbol,
    pub address: String,
    pub decimals: u8,
}

impl Repository {
    /// Register or replace a token. The native token cannot be registered.
    pub async fn add_token(
        &self,
        chain: &ChainConfig,
        symbol: Symbol,
        entry: TokenEntry,
    ) -> Result<()> {
        if chain.is_native(&symbol) {
            return Err(Error::validation(format!(
                "{} is the native token",
                symbol.display()
            )));
        }
        let mut tokens = self.tokens().await?;
        tokens.upsert(symbol, entry);
        self.set_tokens(&tokens).await
    }

    /// Remove a token; `false` when it was not registered.
    ///
    /// Drip settings and marks for the token are left in place.
    pub async fn remove_token(&self, symbol: &Symbol) -> Result<bool> {
        let mut tokens = self.tokens().await?;
        if tokens.remove(symbol).is_none() {
            return Ok(false);
        }
        self.set_tokens(&tokens).await?;
        Ok(true)
    }

    /// Configure the drip for the native token or a registered token.
    pub async fn set_drip(
        &self,
        chain: &ChainConfig,
        symbol: Symbol,
        quantity: String,
        interval: Interval,
    ) -> Result<()> {
        if !chain.is_native(&symbol) && !self.tokens().await?.contains(&symbol) {
            return Err(Error::not_found(format!(
                "{} is not a registered token",
                symbol.display()
            )));
        }
        let mut settings = self.drip_settings().await?;
        settings.upsert(symbol, DripSetting { quantity, interval });
        self.set_drip_settings(&settings).await
    }

    /// Native token first, then registered tokens in storage order.
    pub async fn list_tokens(&self, chain: &ChainConfig) -> Result<Vec<TokenListing>> {
        let tokens = self.tokens().await?;
        let mut listing = Vec::with_capacity(tokens.len() + 1);
        listing.push(TokenListing {
            symbol: chain.native_token.clone(),
            address: NATIVE_TOKEN_ADDRESS.to_string(),
            decimals: chain.decimals,
        });
        listing.extend(tokens.iter().map(|(symbol, entry)| TokenListing {
            symbol: symbol.clone(),
            address: entry.address.clone(),
            decimals: entry.decimals,
        }));
        Ok(listing)
    }
}
