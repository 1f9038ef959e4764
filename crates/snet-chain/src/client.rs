//! Chain client trait, transaction hashes, and finality states.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use snet_core::{BoxFuture, Felt};

/// Errors from the settlement chain boundary.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The endpoint could not be reached or timed out.
    #[error("chain unavailable: {0}")]
    Unavailable(String),

    /// The chain accepted the request but reported an execution failure.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// The response violated the expected JSON-RPC shape.
    #[error("chain protocol error: {0}")]
    Protocol(String),

    /// A transaction did not reach finality before the deadline.
    #[error("finality deadline exceeded for {tx_hash} after {waited_secs}s")]
    FinalityTimeout {
        /// Hash of the stalled transaction.
        tx_hash: String,
        /// Seconds waited before giving up.
        waited_secs: u64,
    },
}

/// A transaction hash on the settlement chain (0x-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub(crate) String);

impl TxHash {
    /// Validate and wrap a hash string.
    pub fn parse(raw: &str) -> Result<Self, ChainError> {
        let body = raw
            .strip_prefix("0x")
            .ok_or_else(|| ChainError::Protocol(format!("tx hash missing 0x prefix: {raw:?}")))?;
        if body.is_empty() || body.len() > 64 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ChainError::Protocol(format!("malformed tx hash: {raw:?}")));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finality state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalityStatus {
    /// Accepted into the mempool, not yet executed.
    Received,
    /// Executed and included in an L2 block.
    AcceptedOnL2,
    /// The L2 block was proven to L1.
    AcceptedOnL1,
    /// The sequencer refused the transaction.
    Rejected,
    /// Execution ran and reverted.
    Reverted,
}

impl FinalityStatus {
    /// Whether the transaction is durably accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1
        )
    }

    /// Whether the transaction can never be accepted.
    pub fn is_rejected(&self) -> bool {
        matches!(self, FinalityStatus::Rejected | FinalityStatus::Reverted)
    }

    /// Accepted or rejected; `Received` is the only non-terminal state.
    pub fn is_terminal(&self) -> bool {
        self.is_accepted() || self.is_rejected()
    }
}

impl std::fmt::Display for FinalityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FinalityStatus::Received => "RECEIVED",
            FinalityStatus::AcceptedOnL2 => "ACCEPTED_ON_L2",
            FinalityStatus::AcceptedOnL1 => "ACCEPTED_ON_L1",
            FinalityStatus::Rejected => "REJECTED",
            FinalityStatus::Reverted => "REVERTED",
        };
        f.write_str(s)
    }
}

/// Client for the receipt contract's chain.
///
/// `invoke` submits a state-changing transaction and returns its hash
/// without waiting for execution. `transaction_status` reports the current
/// finality state. `call` runs a read-only entry point against the latest
/// state.
pub trait ChainClient: Send + Sync {
    fn invoke<'a>(
        &'a self,
        entry_point: &'a str,
        calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<TxHash, ChainError>>;

    fn transaction_status<'a>(
        &'a self,
        tx_hash: &'a TxHash,
    ) -> BoxFuture<'a, Result<FinalityStatus, ChainError>>;

    fn call<'a>(
        &'a self,
        entry_point: &'a str,
        calldata: &'a [Felt],
    ) -> BoxFuture<'a, Result<Vec<Felt>, ChainError>>;
}

/// How long and how often to poll for finality.
#[derive(Debug, Clone, Copy)]
pub struct FinalityPolicy {
    /// Delay between status queries.
    pub poll_interval: Duration,
    /// Total time to wait before reporting a timeout.
    pub deadline: Duration,
}

impl Default for FinalityPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            deadline: Duration::from_secs(120),
        }
    }
}

/// Poll `transaction_status` until the transaction reaches a terminal
/// state. Transient `Unavailable` errors are tolerated until the deadline;
/// protocol errors abort immediately.
pub async fn await_finality(
    client: &dyn ChainClient,
    tx_hash: &TxHash,
    policy: FinalityPolicy,
) -> Result<FinalityStatus, ChainError> {
    let started = tokio::time::Instant::now();
    loop {
        match client.transaction_status(tx_hash).await {
            Ok(status) if status.is_terminal() => {
                debug!(%tx_hash, %status, "transaction reached terminal finality");
                return Ok(status);
            }
            Ok(status) => {
                debug!(%tx_hash, %status, "transaction still pending");
            }
            Err(ChainError::Unavailable(reason)) => {
                debug!(%tx_hash, %reason, "status query failed, will retry");
            }
            Err(other) => return Err(other),
        }
        if started.elapsed() + policy.poll_interval > policy.deadline {
            return Err(ChainError::FinalityTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: started.elapsed().as_secs(),
            });
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}
