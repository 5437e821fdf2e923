//! Blockchain capability.
//!
//! The router only needs `chain_id` (liveness check) and balance reads; the
//! dispatcher submits transfers and waits for their receipts. Both talk to a
//! chain through [`ChainClient`], obtained per RPC URL from a
//! [`ChainConnector`] because the URL lives in the store, not in process
//! configuration.

mod rlp;
mod rpc;
mod signer;
mod units;

pub use rpc::{JsonRpcClient, JsonRpcConnector};
pub use signer::{LegacyTransaction, Signer};
pub use alloy_primitives::{Address, U256};
pub use units::{format_units, parse_units};

use crate::types::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Parse `0x` followed by 40 hex digits (any case, checksum not enforced).
pub fn parse_address(text: &str) -> Result<Address> {
    let invalid = || Error::validation(format!("invalid address: {}", text));
    let digits = text
        .strip_prefix("0x")
        .filter(|d| d.len() == 40 && d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(invalid)?;
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
    Ok(Address::from(bytes))
}

/// Lowercase `0x` rendering, used where addresses are keys rather than display.
pub fn lowercase_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Left-padded 32-byte ABI word.
fn abi_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// Transaction hash as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ERC-20 `balanceOf(address)` call data.
pub fn erc20_balance_of(owner: &Address) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&[0x70, 0xa0, 0x82, 0x31]);
    data.extend_from_slice(&abi_word(owner));
    data
}

/// ERC-20 `transfer(address,uint256)` call data.
pub fn erc20_transfer(to: &Address, value: &U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(68);
    data.extend_from_slice(&[0xa9, 0x05, 0x9c, 0xbb]);
    data.extend_from_slice(&abi_word(to));
    data.extend_from_slice(&value.to_be_bytes::<32>());
    data
}

/// Read and write access to one chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id the node reports.
    async fn chain_id(&self) -> Result<u64>;

    /// Native balance in base units.
    async fn native_balance(&self, owner: Address) -> Result<U256>;

    /// ERC-20 balance in base units.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Submit a native-value transfer.
    async fn send_native(&self, signer: &Signer, to: Address, value: U256) -> Result<TxHash>;

    /// Submit an ERC-20 `transfer`.
    async fn send_token(
        &self,
        signer: &Signer,
        token: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash>;

    /// Block until the transaction has a receipt. A reverted receipt is an error.
    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<()>;
}

/// Builds a [`ChainClient`] for an RPC URL.
#[cfg_attr(test, mockall::automock)]
pub trait ChainConnector: Send + Sync {
    fn connect(&self, rpc_url: &str) -> Result<Arc<dyn ChainClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let address = parse_address("0x1111111111111111111111111111111111111111").unwrap();
        assert_eq!(address.to_string(), "0x1111111111111111111111111111111111111111");

        let mixed = parse_address("0xABCDEFabcdef0000000000000000000000000000").unwrap();
        assert_eq!(lowercase_address(&mixed), "0xabcdefabcdef0000000000000000000000000000");

        assert!(parse_address("1111111111111111111111111111111111111111").is_err());
        assert!(parse_address("0x11").is_err());
        assert!(parse_address("0xzz11111111111111111111111111111111111111").is_err());
    }

    #[test]
    fn test_address_displays_checksummed() {
        let address = parse_address("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap();
        assert_eq!(address.to_string(), "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert_eq!(
            lowercase_address(&address),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_erc20_call_data() {
        let to = parse_address("0x2222222222222222222222222222222222222222").unwrap();
        let data = erc20_transfer(&to, &U256::from(5u64));
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], to.as_slice());
        assert_eq!(data[67], 5);

        let balance = erc20_balance_of(&to);
        assert_eq!(hex::encode(&balance[..4]), "70a08231");
        assert_eq!(balance.len(), 36);
    }
}
