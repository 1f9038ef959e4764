//! # Receipt Minting Orchestrator
//!
//! Drives a receipt from `PENDING_CONFIRM` to `MINTED` or `FAILED`. The
//! phases run strictly in order per receipt; across receipts nothing is
//! shared but the stores.
//!
//! ## Failure policy
//!
//! - Prover failure is non-fatal: the prover is wrapped in the fallback
//!   decorator, so minting proceeds with a marked provisional bundle.
//! - Chain submission failure, a rejected or reverted finality status,
//!   and a finality timeout are all fatal: the receipt goes `FAILED` and
//!   is never retried automatically. A fresh `start_minting` call opens a
//!   new receipt; failed attempts stay on record.

use std::sync::Arc;

use tracing::{info, warn};

use snet_chain::{await_finality, ChainClient, FinalityPolicy, TxHash};
use snet_core::{Felt, InvoiceId, PartyCommitment, ReceiptId, Timestamp};
use snet_proof::{FallbackProofService, ProofRequest, ProofService};

use crate::invoice::{Invoice, PaymentStatus};
use crate::receipt::{ChainAnchor, MintPhase, Receipt};
use crate::store::{InvoiceStore, ReceiptStore};
use crate::PipelineError;

/// Contract entry point that mints a receipt.
const MINT_ENTRY_POINT: &str = "mint_receipt";
/// Read-only entry point returning the receipt token counter.
const COUNT_ENTRY_POINT: &str = "get_receipt_count";

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct MintingConfig {
    /// Merchant identity committed as the payee on every receipt.
    pub merchant: String,
    /// Finality polling policy for mint transactions.
    pub finality: FinalityPolicy,
}

/// Drives the mint state machine.
pub struct MintingOrchestrator {
    invoices: Arc<InvoiceStore>,
    receipts: Arc<ReceiptStore>,
    prover: FallbackProofService<Arc<dyn ProofService>>,
    chain: Arc<dyn ChainClient>,
    config: MintingConfig,
}

impl MintingOrchestrator {
    pub fn new(
        invoices: Arc<InvoiceStore>,
        receipts: Arc<ReceiptStore>,
        prover: Arc<dyn ProofService>,
        chain: Arc<dyn ChainClient>,
        config: MintingConfig,
    ) -> Self {
        Self {
            invoices,
            receipts,
            prover: FallbackProofService::new(prover),
            chain,
            config,
        }
    }

    /// Open a receipt for a settled invoice and drive it to a terminal
    /// phase. Returns the receipt id; the outcome (`MINTED` or `FAILED`)
    /// is a state on the receipt, not an error.
    ///
    /// Rejected up front when the invoice is not settled, already has a
    /// minted receipt, or has one still in flight.
    pub async fn start_minting(&self, invoice_id: InvoiceId) -> Result<ReceiptId, PipelineError> {
        let invoice = self
            .invoices
            .get(invoice_id)
            .ok_or_else(|| PipelineError::NotFound(format!("invoice {invoice_id}")))?;

        if invoice.payment_status != PaymentStatus::Settled {
            return Err(PipelineError::Conflict(format!(
                "invoice {invoice_id} is {} and cannot be minted",
                invoice.payment_status
            )));
        }
        if self.receipts.has_minted_receipt(invoice_id) {
            return Err(PipelineError::Conflict(format!(
                "invoice {invoice_id} already has a minted receipt"
            )));
        }
        if self.receipts.has_open_receipt(invoice_id) {
            return Err(PipelineError::Conflict(format!(
                "invoice {invoice_id} has a receipt already in flight"
            )));
        }

        let receipt = Receipt::open(
            invoice_id,
            invoice.amount,
            invoice.settlement_reference(),
            Timestamp::now(),
        );
        let receipt_id = self.receipts.insert(receipt);
        info!(%invoice_id, %receipt_id, "minting started");

        self.drive(receipt_id, &invoice).await?;
        Ok(receipt_id)
    }

    /// Run the phases. Pipeline failures land as the `FAILED` phase;
    /// only store inconsistencies surface as `Err`.
    async fn drive(&self, receipt_id: ReceiptId, invoice: &Invoice) -> Result<(), PipelineError> {
        // Proof generation.
        self.advance(receipt_id, MintPhase::ProofRequested)?;
        let request = ProofRequest {
            invoice_id: invoice.id,
            settlement_reference: invoice.settlement_reference(),
            amount: invoice.amount,
        };
        let bundle = match self.prover.generate(&request).await {
            Ok(bundle) => bundle,
            Err(e) => {
                // Even the fallback path refused; nothing to anchor.
                return self.fail(receipt_id, &format!("proof generation failed: {e}"));
            }
        };
        if bundle.fallback {
            warn!(%receipt_id, proof_id = %bundle.proof_id, "minting with fallback proof");
        }
        let proof_hash = bundle.proof_hash;
        if let Err(e) = self
            .receipts
            .update(receipt_id, |r| r.set_proof(bundle))?
        {
            return Err(PipelineError::Core(e));
        }
        self.advance(receipt_id, MintPhase::ProofReady)?;

        // Chain submission.
        let now = Timestamp::now();
        let calldata = match self.mint_calldata(invoice, proof_hash, now) {
            Ok(calldata) => calldata,
            Err(e) => return self.fail(receipt_id, &format!("calldata encoding failed: {e}")),
        };
        let tx_hash = match self.chain.invoke(MINT_ENTRY_POINT, &calldata).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return self.fail(receipt_id, &format!("chain submission failed: {e}")),
        };
        self.advance(receipt_id, MintPhase::ChainSubmitted)?;

        // Finality.
        self.advance(receipt_id, MintPhase::AwaitingFinality)?;
        match await_finality(self.chain.as_ref(), &tx_hash, self.config.finality).await {
            Ok(status) if status.is_accepted() => {
                self.complete(receipt_id, invoice.id, tx_hash, &status.to_string())
                    .await
            }
            Ok(status) => self.fail(
                receipt_id,
                &format!("finality rejected: {status}"),
            ),
            Err(e) => self.fail(receipt_id, &format!("finality wait failed: {e}")),
        }
    }

    /// Anchor the receipt, flip it to `MINTED`, and propagate the back
    /// reference onto the invoice.
    async fn complete(
        &self,
        receipt_id: ReceiptId,
        invoice_id: InvoiceId,
        tx_hash: TxHash,
        finality_note: &str,
    ) -> Result<(), PipelineError> {
        // The token counter read is best-effort; a zero token still
        // anchors against the transaction hash.
        let receipt_token = match self.chain.call(COUNT_ENTRY_POINT, &[]).await {
            Ok(values) => values.first().copied().unwrap_or(Felt::ZERO),
            Err(e) => {
                warn!(%receipt_id, error = %e, "receipt token read failed");
                Felt::ZERO
            }
        };
        let anchor = ChainAnchor {
            tx_hash,
            receipt_token,
        };
        let now = Timestamp::now();
        self.receipts
            .update(receipt_id, |r| r.anchor_and_mint(anchor, finality_note, now))?
            .map_err(PipelineError::Core)?;

        self.invoices.update(invoice_id, |inv| {
            inv.receipt_ref = Some(receipt_id);
            if inv.payment_status == PaymentStatus::Pending {
                // Minting only starts on settled invoices, but a manual
                // start may race the detector; completion settles it.
                let _ = inv.mark_settled();
            }
        })?;
        info!(%receipt_id, %invoice_id, "receipt minted");
        Ok(())
    }

    fn mint_calldata(
        &self,
        invoice: &Invoice,
        proof_hash: Felt,
        now: Timestamp,
    ) -> Result<Vec<Felt>, snet_core::FeltError> {
        let payer = PartyCommitment::of(&invoice.counterparty);
        let payee = PartyCommitment::of(&self.config.merchant);
        Ok(vec![
            payer.as_felt(),
            payee.as_felt(),
            Felt::from_u64(invoice.amount.as_u64()),
            Felt::from_u64(now.epoch_secs().max(0) as u64),
            proof_hash,
        ])
    }

    fn advance(&self, receipt_id: ReceiptId, to: MintPhase) -> Result<(), PipelineError> {
        let now = Timestamp::now();
        self.receipts
            .update(receipt_id, |r| r.advance(to, now))?
            .map_err(PipelineError::Core)
    }

    fn fail(&self, receipt_id: ReceiptId, reason: &str) -> Result<(), PipelineError> {
        warn!(%receipt_id, %reason, "minting failed");
        let now = Timestamp::now();
        self.receipts
            .update(receipt_id, |r| r.fail(reason, now))?
            .map_err(PipelineError::Core)
    }
}
