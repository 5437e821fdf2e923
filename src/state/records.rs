//! Stored record types.
//!
//! Every record is a JSON object with camelCase field names. Reading a
//! record and writing it back yields the same JSON.

use crate::types::{Error, Result};
use crate::validation::{self, Field};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

// =============================================================================
// Symbol
// =============================================================================

/// Token symbol including the `$` prefix, always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Parse chat input (`$ABC`, `$abc`).
    pub fn parse(text: &str) -> Result<Self> {
        if !validation::matches(Field::Token, text) {
            return Err(Error::validation(format!("invalid token symbol: {}", text)));
        }
        Ok(Self(text.to_lowercase()))
    }

    /// Wrap a symbol read back from storage without re-validating it.
    pub fn from_stored(text: &str) -> Self {
        Self(text.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form used in chat replies.
    pub fn display(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_stored(&text))
    }
}

// =============================================================================
// SymbolMap
// =============================================================================

/// Insertion-ordered map keyed by symbol, stored as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap<V> {
    entries: Vec<(Symbol, V)>,
}

impl<V> Default for SymbolMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> SymbolMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == symbol)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.get(symbol).is_some()
    }

    /// Replace in place if present, otherwise append.
    pub fn upsert(&mut self, symbol: Symbol, value: V) {
        match self.entries.iter_mut().find(|(key, _)| *key == symbol) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((symbol, value)),
        }
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<V> {
        let position = self.entries.iter().position(|(key, _)| key == symbol)?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for SymbolMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct SymbolMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for SymbolMapVisitor<V> {
    type Value = SymbolMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map keyed by token symbol")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut map = SymbolMap::new();
        while let Some((key, value)) = access.next_entry::<Symbol, V>()? {
            map.upsert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SymbolMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SymbolMapVisitor(PhantomData))
    }
}

// =============================================================================
// ChainConfig
// =============================================================================

/// Active chain description and the faucet's signing key.
///
/// All seven fields are required; a stored record missing any of them
/// does not deserialize and the system is treated as not configured.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    #[serde(alias = "token")]
    pub native_token: Symbol,
    pub decimals: u8,
    pub block_explorer_url: String,
    #[serde(alias = "privateKey")]
    pub signing_key: String,
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("chain_id", &self.chain_id)
            .field("chain_name", &self.chain_name)
            .field("rpc_url", &self.rpc_url)
            .field("native_token", &self.native_token)
            .field("decimals", &self.decimals)
            .field("block_explorer_url", &self.block_explorer_url)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl ChainConfig {
    pub fn is_native(&self, symbol: &Symbol) -> bool {
        &self.native_token == symbol
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.block_explorer_url, hash)
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Default decimals for tokens registered without an explicit value.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Highest decimals value accepted; `10^77` is the largest power of ten
/// below `2^256`.
pub const MAX_DECIMALS: u8 = 77;

/// Registered ERC-20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredToken")]
pub struct TokenEntry {
    pub address: String,
    pub decimals: u8,
}

/// Accepts both the object form and a bare address string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredToken {
    Full {
        address: String,
        #[serde(default = "default_decimals")]
        decimals: u8,
    },
    Address(String),
}

fn default_decimals() -> u8 {
    DEFAULT_TOKEN_DECIMALS
}

impl From<StoredToken> for TokenEntry {
    fn from(stored: StoredToken) -> Self {
        match stored {
            StoredToken::Full { address, decimals } => Self { address, decimals },
            StoredToken::Address(address) => Self {
                address,
                decimals: DEFAULT_TOKEN_DECIMALS,
            },
        }
    }
}

/// `tokens` record.
pub type TokenRegistry = SymbolMap<TokenEntry>;

// =============================================================================
// Drip
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Minutes,
    Hours,
}

/// Drip interval such as `30m` or `1h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    count: u64,
    unit: IntervalUnit,
}

impl Interval {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::validation(format!("invalid interval: {}", text));
        if !validation::matches(Field::Duration, text) {
            return Err(invalid());
        }
        let (digits, unit) = text.split_at(text.len() - 1);
        let unit = match unit {
            "m" => IntervalUnit::Minutes,
            "h" => IntervalUnit::Hours,
            _ => return Err(invalid()),
        };
        let count = digits.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { count, unit })
    }

    pub fn minutes(&self) -> u64 {
        match self.unit {
            IntervalUnit::Minutes => self.count,
            IntervalUnit::Hours => self.count.saturating_mul(60),
        }
    }

    pub fn millis(&self) -> u64 {
        self.minutes().saturating_mul(60_000)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
        };
        write!(f, "{}{}", self.count, unit)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Interval::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Preset drip for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripSetting {
    pub quantity: String,
    pub interval: Interval,
}

/// `drip` record.
pub type DripSettings = SymbolMap<DripSetting>;
