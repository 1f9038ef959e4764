//! Receipt records and the mint state machine.
//!
//! ## Phases
//!
//! ```text
//! PENDING_CONFIRM -> PROOF_REQUESTED -> PROOF_READY -> CHAIN_SUBMITTED
//!     -> AWAITING_FINALITY -> MINTED
//! ```
//!
//! `FAILED` is reachable from every non-terminal phase. Phases advance
//! strictly in order, one step at a time, and every transition is recorded
//! in the receipt's history.
//!
//! Two invariants hold at every observation point:
//! - `chain_anchor` is present iff the phase is `MINTED`.
//! - `proof` is set before any chain submission.

use serde::{Deserialize, Serialize};

use snet_core::{Felt, InvoiceId, ReceiptId, Sats, SnetError, Timestamp};
use snet_chain::TxHash;
use snet_proof::ProofBundle;

/// Mint pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MintPhase {
    PendingConfirm,
    ProofRequested,
    ProofReady,
    ChainSubmitted,
    AwaitingFinality,
    Minted,
    Failed,
}

impl MintPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MintPhase::Minted | MintPhase::Failed)
    }

    /// The single phase this one may advance to, `Failed` aside.
    fn successor(&self) -> Option<MintPhase> {
        match self {
            MintPhase::PendingConfirm => Some(MintPhase::ProofRequested),
            MintPhase::ProofRequested => Some(MintPhase::ProofReady),
            MintPhase::ProofReady => Some(MintPhase::ChainSubmitted),
            MintPhase::ChainSubmitted => Some(MintPhase::AwaitingFinality),
            MintPhase::AwaitingFinality => Some(MintPhase::Minted),
            MintPhase::Minted | MintPhase::Failed => None,
        }
    }
}

impl std::fmt::Display for MintPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MintPhase::PendingConfirm => "PENDING_CONFIRM",
            MintPhase::ProofRequested => "PROOF_REQUESTED",
            MintPhase::ProofReady => "PROOF_READY",
            MintPhase::ChainSubmitted => "CHAIN_SUBMITTED",
            MintPhase::AwaitingFinality => "AWAITING_FINALITY",
            MintPhase::Minted => "MINTED",
            MintPhase::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Coarse mint status derived from the phase, for callers that do not
/// care about intermediate steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MintStatus {
    Minting,
    Minted,
    Failed,
}

/// Where the receipt landed on the settlement chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAnchor {
    /// Hash of the accepted mint transaction.
    pub tx_hash: TxHash,
    /// Contract-side receipt token.
    pub receipt_token: Felt,
}

/// One recorded phase transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: MintPhase,
    pub to: MintPhase,
    pub at: Timestamp,
    /// Operator-facing context, e.g. the finality status or an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An on-chain-anchored payment receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    /// The invoice this receipt settles. An invoice holds at most one
    /// receipt that reaches `MINTED`.
    pub invoice_id: InvoiceId,
    /// Amount captured from the invoice at mint start, immutable.
    pub amount: Sats,
    /// Rail-level settlement reference captured at mint start, immutable.
    pub payment_reference: String,
    pub proof: Option<ProofBundle>,
    pub chain_anchor: Option<ChainAnchor>,
    pub phase: MintPhase,
    pub history: Vec<TransitionRecord>,
    pub created_at: Timestamp,
}

impl Receipt {
    /// Open a receipt in `PENDING_CONFIRM`.
    pub fn open(
        invoice_id: InvoiceId,
        amount: Sats,
        payment_reference: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id: ReceiptId::new(),
            invoice_id,
            amount,
            payment_reference,
            proof: None,
            chain_anchor: None,
            phase: MintPhase::PendingConfirm,
            history: Vec::new(),
            created_at: now,
        }
    }

    pub fn mint_status(&self) -> MintStatus {
        match self.phase {
            MintPhase::Minted => MintStatus::Minted,
            MintPhase::Failed => MintStatus::Failed,
            _ => MintStatus::Minting,
        }
    }

    /// Advance one phase forward. Only the immediate successor is legal.
    pub fn advance(&mut self, to: MintPhase, now: Timestamp) -> Result<(), SnetError> {
        if self.phase.successor() != Some(to) {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
                reason: "phases advance strictly in order".to_string(),
            });
        }
        if to == MintPhase::ChainSubmitted && self.proof.is_none() {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
                reason: "chain submission requires a proof".to_string(),
            });
        }
        if to == MintPhase::Minted && self.chain_anchor.is_none() {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
                reason: "minted requires a chain anchor".to_string(),
            });
        }
        self.record(to, now, None);
        Ok(())
    }

    /// Fail the receipt from any non-terminal phase.
    pub fn fail(&mut self, reason: &str, now: Timestamp) -> Result<(), SnetError> {
        if self.phase.is_terminal() {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: MintPhase::Failed.to_string(),
                reason: "receipt already terminal".to_string(),
            });
        }
        self.record(MintPhase::Failed, now, Some(reason.to_string()));
        Ok(())
    }

    /// Store the proof bundle. Set exactly once, before chain submission.
    pub fn set_proof(&mut self, proof: ProofBundle) -> Result<(), SnetError> {
        if self.proof.is_some() {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: self.phase.to_string(),
                reason: "proof already set".to_string(),
            });
        }
        if !matches!(
            self.phase,
            MintPhase::PendingConfirm | MintPhase::ProofRequested
        ) {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: self.phase.to_string(),
                reason: "proof must be set before chain submission".to_string(),
            });
        }
        self.proof = Some(proof);
        Ok(())
    }

    /// Set the chain anchor and advance to `MINTED` in one step, so the
    /// anchor-iff-minted invariant holds at every observation point.
    pub fn anchor_and_mint(
        &mut self,
        anchor: ChainAnchor,
        note: &str,
        now: Timestamp,
    ) -> Result<(), SnetError> {
        if self.phase != MintPhase::AwaitingFinality {
            return Err(SnetError::InvalidTransition {
                from: self.phase.to_string(),
                to: MintPhase::Minted.to_string(),
                reason: "minted is only reachable from awaiting-finality".to_string(),
            });
        }
        self.chain_anchor = Some(anchor);
        self.record(MintPhase::Minted, now, Some(note.to_string()));
        Ok(())
    }

    fn record(&mut self, to: MintPhase, now: Timestamp, note: Option<String>) {
        self.history.push(TransitionRecord {
            from: self.phase,
            to,
            at: now,
            note,
        });
        self.phase = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snet_core::proof_hash_for_reference;

    fn receipt() -> Receipt {
        Receipt::open(
            InvoiceId::new(),
            Sats::new(100_000_000).unwrap(),
            "0xdeadbeef".to_string(),
            Timestamp::now(),
        )
    }

    fn proof() -> ProofBundle {
        ProofBundle {
            proof_id: "p-1".to_string(),
            proof_hash: proof_hash_for_reference("0xdeadbeef").unwrap(),
            fallback: false,
        }
    }

    fn anchor() -> ChainAnchor {
        ChainAnchor {
            tx_hash: TxHash::parse("0xabc").unwrap(),
            receipt_token: Felt::from_u64(1),
        }
    }

    #[test]
    fn happy_path_walks_all_phases() {
        let now = Timestamp::now();
        let mut r = receipt();
        r.advance(MintPhase::ProofRequested, now).unwrap();
        r.set_proof(proof()).unwrap();
        r.advance(MintPhase::ProofReady, now).unwrap();
        r.advance(MintPhase::ChainSubmitted, now).unwrap();
        r.advance(MintPhase::AwaitingFinality, now).unwrap();
        r.anchor_and_mint(anchor(), "ACCEPTED_ON_L2", now).unwrap();

        assert_eq!(r.phase, MintPhase::Minted);
        assert_eq!(r.mint_status(), MintStatus::Minted);
        assert!(r.chain_anchor.is_some());
        assert_eq!(r.history.len(), 5);
    }

    #[test]
    fn phases_cannot_skip() {
        let now = Timestamp::now();
        let mut r = receipt();
        assert!(r.advance(MintPhase::ChainSubmitted, now).is_err());
        assert!(r.advance(MintPhase::Minted, now).is_err());
    }

    #[test]
    fn fail_is_reachable_from_any_nonterminal_phase() {
        let now = Timestamp::now();
        let mut r = receipt();
        r.advance(MintPhase::ProofRequested, now).unwrap();
        r.fail("prover exploded", now).unwrap();
        assert_eq!(r.mint_status(), MintStatus::Failed);
        assert!(r.chain_anchor.is_none());
        // Terminal means terminal.
        assert!(r.fail("again", now).is_err());
        assert!(r.advance(MintPhase::ProofReady, now).is_err());
    }

    #[test]
    fn proof_is_write_once_and_pre_submission() {
        let now = Timestamp::now();
        let mut r = receipt();
        r.advance(MintPhase::ProofRequested, now).unwrap();
        r.set_proof(proof()).unwrap();
        assert!(r.set_proof(proof()).is_err());

        let mut late = receipt();
        late.advance(MintPhase::ProofRequested, now).unwrap();
        late.set_proof(proof()).unwrap();
        late.advance(MintPhase::ProofReady, now).unwrap();
        late.advance(MintPhase::ChainSubmitted, now).unwrap();
        // A proofless receipt never reaches chain submission.
        let mut unproven = receipt();
        unproven.advance(MintPhase::ProofRequested, now).unwrap();
        unproven.advance(MintPhase::ProofReady, now).unwrap();
        assert!(unproven.advance(MintPhase::ChainSubmitted, now).is_err());
        assert_eq!(unproven.phase, MintPhase::ProofReady);
    }

    #[test]
    fn anchor_only_lands_with_minted() {
        let now = Timestamp::now();
        let mut r = receipt();
        assert!(r.anchor_and_mint(anchor(), "x", now).is_err());
        assert!(r.chain_anchor.is_none());
    }

    #[test]
    fn history_records_failure_note() {
        let now = Timestamp::now();
        let mut r = receipt();
        r.fail("REJECTED", now).unwrap();
        assert_eq!(r.history.len(), 1);
        assert_eq!(r.history[0].note.as_deref(), Some("REJECTED"));
    }
}
