//! EVM JSON-RPC client over HTTP.

use super::signer::{LegacyTransaction, Signer};
use super::units::{from_hex_quantity, to_hex_quantity};
use super::{erc20_balance_of, erc20_transfer, Address, ChainClient, ChainConnector, TxHash, U256};
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

impl RpcResponse {
    fn into_result<T: DeserializeOwned>(self, method: &str) -> Result<T> {
        if let Some(error) = self.error {
            return Err(Error::chain(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }
        let value = self.result.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| Error::chain(format!("{} returned an unexpected result: {}", method, e)))
    }
}

#[derive(Debug, Deserialize)]
struct Receipt {
    #[serde(default)]
    status: Option<String>,
}

/// JSON-RPC client bound to one node URL.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            http,
            url: url.into(),
            poll_interval,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, id, "json-rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::chain(format!("{} unreachable: {}", method, e)))?;
        let status = response.status();
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| Error::chain(format!("{} bad response (status {}): {}", method, status, e)))?;
        body.into_result(method)
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<U256> {
        let hex: String = self.call(method, params).await?;
        from_hex_quantity(&hex)
    }

    /// Fill nonce, gas price and gas limit, sign, and broadcast.
    async fn submit(&self, signer: &Signer, to: Address, value: U256, data: Vec<u8>) -> Result<TxHash> {
        let from = signer.address().to_string();
        let chain_id = self.chain_id().await?;
        let nonce = self
            .quantity("eth_getTransactionCount", json!([from, "pending"]))
            .await?;
        let nonce = u64::try_from(nonce).map_err(|_| Error::chain("nonce does not fit in 64 bits"))?;
        let gas_price = self.quantity("eth_gasPrice", json!([])).await?;
        let gas_limit = self
            .quantity(
                "eth_estimateGas",
                json!([{
                    "from": from,
                    "to": to.to_string(),
                    "value": to_hex_quantity(&value),
                    "data": format!("0x{}", hex::encode(&data)),
                }]),
            )
            .await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
        };
        let raw = signer.sign_transaction(&tx)?;
        let hash: String = self
            .call(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw))]),
            )
            .await?;
        tracing::info!(tx_hash = %hash, nonce, "transaction submitted");
        Ok(TxHash::new(hash))
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.call("eth_chainId", json!([])).await?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|_| Error::chain(format!("invalid chain id: {}", hex)))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.quantity("eth_getBalance", json!([owner.to_string(), "latest"]))
            .await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let data = format!("0x{}", hex::encode(erc20_balance_of(&owner)));
        self.quantity(
            "eth_call",
            json!([{ "to": token.to_string(), "data": data }, "latest"]),
        )
        .await
    }

    async fn send_native(&self, signer: &Signer, to: Address, value: U256) -> Result<TxHash> {
        self.submit(signer, to, value, Vec::new()).await
    }

    async fn send_token(
        &self,
        signer: &Signer,
        token: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash> {
        self.submit(signer, token, U256::ZERO, erc20_transfer(&to, &value))
            .await
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<()> {
        loop {
            let receipt: Option<Receipt> = self
                .call("eth_getTransactionReceipt", json!([tx.as_str()]))
                .await?;
            match receipt {
                Some(Receipt { status: Some(status) }) if status == "0x0" => {
                    return Err(Error::chain(format!("transaction {} reverted", tx)));
                }
                Some(_) => return Ok(()),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

/// Connects [`JsonRpcClient`]s sharing one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct JsonRpcConnector {
    http: reqwest::Client,
    poll_interval: Duration,
}

impl JsonRpcConnector {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            poll_interval,
        })
    }
}

impl ChainConnector for JsonRpcConnector {
    fn connect(&self, rpc_url: &str) -> Result<Arc<dyn ChainClient>> {
        reqwest::Url::parse(rpc_url)
            .map_err(|e| Error::validation(format!("invalid rpc url {}: {}", rpc_url, e)))?;
        Ok(Arc::new(JsonRpcClient::new(
            self.http.clone(),
            rpc_url,
            self.poll_interval,
        )))
    }
}
