//! Write-once verification results.

use serde::{Deserialize, Serialize};

use snet_core::{SnetError, Timestamp, VerificationId};

/// What the caller is asking to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationKind {
    /// A minted receipt, checked against the contract.
    ReceiptOnChain,
    /// A bare proof identifier, checked against the proof registry.
    ProofOnly,
    /// The underlying rail payment, checked against the rail.
    UnderlyingTransaction,
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerificationKind::ReceiptOnChain => "RECEIPT_ON_CHAIN",
            VerificationKind::ProofOnly => "PROOF_ONLY",
            VerificationKind::UnderlyingTransaction => "UNDERLYING_TRANSACTION",
        };
        f.write_str(s)
    }
}

/// Outcome of a verification request. `Pending` is the only non-terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Valid,
    Invalid,
    Error,
}

impl VerificationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

/// One verification attempt. Created `Pending`, finalized exactly once;
/// re-verification creates a new record rather than reopening this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub id: VerificationId,
    pub kind: VerificationKind,
    /// The receipt, proof, or transaction reference the caller supplied.
    pub input_reference: String,
    pub status: VerificationStatus,
    /// Structured outcome detail, present only once terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    pub requested_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl VerificationResult {
    pub fn pending(kind: VerificationKind, input_reference: &str, now: Timestamp) -> Self {
        Self {
            id: VerificationId::new(),
            kind,
            input_reference: input_reference.to_string(),
            status: VerificationStatus::Pending,
            detail: None,
            requested_at: now,
            completed_at: None,
        }
    }

    /// The single terminal write: status and detail land together.
    pub fn finalize(
        &mut self,
        status: VerificationStatus,
        detail: serde_json::Value,
        now: Timestamp,
    ) -> Result<(), SnetError> {
        if self.status.is_terminal() {
            return Err(SnetError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{status:?}"),
                reason: "verification result is write-once".to_string(),
            });
        }
        if !status.is_terminal() {
            return Err(SnetError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{status:?}"),
                reason: "finalize requires a terminal status".to_string(),
            });
        }
        self.status = status;
        self.detail = Some(detail);
        self.completed_at = Some(now);
        Ok(())
    }
}
