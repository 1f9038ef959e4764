//! # JSON-RPC Chain Client
//!
//! Production client for the receipt contract. Talks to a Starknet-style
//! JSON-RPC endpoint whose account layer handles nonce management and
//! transaction signing; this process never holds keys.
//!
//! ## Methods used
//!
//! - `starknet_addInvokeTransaction` with a pre-built call object; the
//!   endpoint signs with its managed account.
//! - `starknet_getTransactionStatus` returning `finality_status` and
//!   `execution_status` fields.
//! - `starknet_call` against the latest block for read-only entry points.

use std::time::Duration;

use tracing::info;

use snet_core::{BoxFuture, Felt};

use crate::client::{ChainClient, ChainError, FinalityStatus, TxHash};

/// Configuration for the JSON-RPC chain client.
#[derive(Debug, Clone)]
pub struct RpcChainConfig {
    /// JSON-RPC endpoint URL (HTTPS in production).
    pub rpc_url: String,
    /// Address of the deployed receipt contract (0x-prefixed felt).
    pub contract_address: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RpcChainConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            timeout_secs: 30,
        }
    }
}

/// JSON-RPC implementation of [`ChainClient`].
#[derive(Debug)]
pub struct JsonRpcChainClient {
    client: reqwest::Client,
    config: RpcChainConfig,
}

impl JsonRpcChainClient {
    pub fn new(config: RpcChainConfig) -> Result<Self, ChainError> {
        if !is_valid_contract_address(&config.contract_address) {
            return Err(ChainError::Protocol(format!(
                "invalid contract address: {}",
                config.contract_address
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChainError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Unavailable("request timed out".to_string())
                } else {
                    ChainError::Unavailable(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(ChainError::Unavailable(format!("HTTP {}", resp.status())));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ChainError::Protocol(format!("invalid JSON response: {e}")))?;

        if let Some(error) = json.get("error") {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error");
            return Err(ChainError::TransactionFailed(msg.to_string()));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| ChainError::Protocol("response missing 'result' field".to_string()))
    }

    fn calldata_json(calldata: &[Felt]) -> serde_json::Value {
        serde_json::Value::Array(
            calldata
                .iter()
                .map(|f| serde_json::Value::String(f.to_hex()))
                .collect(),
        )
    }
}

impl ChainClient for JsonRpcChainClient {
    fn invoke<'a>(
        &'a self,
        entry_point: &'a str,
        calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<TxHash, ChainError>> {
        Box::pin(async move {
            let params = serde_json::json!([{
                "contract_address": self.config.contract_address,
                "entry_point": entry_point,
                "calldata": Self::calldata_json(calldata),
            }]);

            let result = self.rpc_call("starknet_addInvokeTransaction", params).await?;
            let hash = result
                .get("transaction_hash")
                .and_then(|h| h.as_str())
                .ok_or_else(|| {
                    ChainError::Protocol("invoke result missing transaction_hash".to_string())
                })?;
            let tx_hash = TxHash::parse(hash)?;
            info!(%tx_hash, entry_point, "submitted invoke transaction");
            Ok(tx_hash)
        })
    }

    fn transaction_status<'a>(
        &'a self,
        tx_hash: &'a TxHash,
    ) -> BoxFuture<'a, Result<FinalityStatus, ChainError>> {
        Box::pin(async move {
            let result = self
                .rpc_call(
                    "starknet_getTransactionStatus",
                    serde_json::json!([tx_hash.as_str()]),
                )
                .await?;

            // A reverted execution can surface under any finality label.
            if result.get("execution_status").and_then(|s| s.as_str()) == Some("REVERTED") {
                return Ok(FinalityStatus::Reverted);
            }

            let finality = result
                .get("finality_status")
                .and_then(|s| s.as_str())
                .ok_or_else(|| {
                    ChainError::Protocol("status result missing finality_status".to_string())
                })?;

            match finality {
                "RECEIVED" | "PENDING" => Ok(FinalityStatus::Received),
                "ACCEPTED_ON_L2" => Ok(FinalityStatus::AcceptedOnL2),
                "ACCEPTED_ON_L1" => Ok(FinalityStatus::AcceptedOnL1),
                "REJECTED" => Ok(FinalityStatus::Rejected),
                other => Err(ChainError::Protocol(format!(
                    "unknown finality status {other:?}"
                ))),
            }
        })
    }

    fn call<'a>(
        &'a self,
        entry_point: &'a str,
        calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<Vec<Felt>, ChainError>> {
        Box::pin(async move {
            let params = serde_json::json!([
                {
                    "contract_address": self.config.contract_address,
                    "entry_point": entry_point,
                    "calldata": Self::calldata_json(calldata),
                },
                "latest"
            ]);

            let result = self.rpc_call("starknet_call", params).await?;
            let values = result
                .as_array()
                .ok_or_else(|| ChainError::Protocol("call result is not an array".to_string()))?;

            values
                .iter()
                .map(|v| {
                    let s = v.as_str().ok_or_else(|| {
                        ChainError::Protocol("call result element is not a string".to_string())
                    })?;
                    Felt::from_hex(s)
                        .map_err(|e| ChainError::Protocol(format!("bad felt in call result: {e}")))
                })
                .collect()
        })
    }
}

/// A contract address is a 0x-prefixed felt: 1 to 64 hex digits.
fn is_valid_contract_address(addr: &str) -> bool {
    match addr.strip_prefix("0x") {
        Some(body) => {
            !body.is_empty() && body.len() <= 64 && body.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_address_validation() {
        assert!(is_valid_contract_address("0x049d3657"));
        assert!(is_valid_contract_address(&format!("0x{}", "a".repeat(64))));
        assert!(!is_valid_contract_address("049d3657"));
        assert!(!is_valid_contract_address("0x"));
        assert!(!is_valid_contract_address(&format!("0x{}", "a".repeat(65))));
        assert!(!is_valid_contract_address("0xnothex"));
    }

    #[test]
    fn builds_with_valid_config() {
        let config = RpcChainConfig::new("https://rpc.example.com", "0x049d3657");
        assert!(JsonRpcChainClient::new(config).is_ok());
    }

    #[test]
    fn rejects_invalid_contract_address() {
        let config = RpcChainConfig::new("https://rpc.example.com", "not-an-address");
        assert!(JsonRpcChainClient::new(config).is_err());
    }

    #[test]
    fn calldata_renders_as_hex_strings() {
        let calldata = vec![Felt::from_u64(1), Felt::from_u64(255)];
        let json = JsonRpcChainClient::calldata_json(&calldata);
        assert_eq!(json, serde_json::json!(["0x1", "0xff"]));
    }
}
