//! # Verification Orchestrator
//!
//! Answers "is this receipt / proof / payment real?" for third parties.
//! Every request creates a `Pending` [`VerificationResult`] immediately,
//! then resolves it with exactly one terminal write.
//!
//! Malformed input fails fast: an empty or unencodable reference goes
//! straight to `Error` without touching the chain client.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use snet_chain::{await_finality, ChainClient, FinalityPolicy};
use snet_core::{BoxFuture, Felt, Timestamp, VerificationId};

use crate::store::{ReceiptStore, VerificationStore};
use crate::verification::{VerificationKind, VerificationResult, VerificationStatus};
use crate::PipelineError;

/// Contract entry point that checks a receipt.
const VERIFY_ENTRY_POINT: &str = "verify_receipt";

/// Answers proof-registry and payment-rail lookups for the non-chain
/// verification kinds.
pub trait SettlementLookup: Send + Sync {
    /// Whether a proof with this identifier is known.
    fn proof_exists<'a>(&'a self, proof_id: &'a str) -> BoxFuture<'a, Result<bool, String>>;

    /// Whether a rail payment with this reference settled.
    fn transaction_settled<'a>(&'a self, reference: &'a str)
        -> BoxFuture<'a, Result<bool, String>>;
}

/// Lookup backed by the local receipt store: a proof is known when some
/// receipt carries it, a payment settled when a minted receipt references
/// it.
pub struct StoreBackedLookup {
    receipts: Arc<ReceiptStore>,
}

impl StoreBackedLookup {
    pub fn new(receipts: Arc<ReceiptStore>) -> Self {
        Self { receipts }
    }
}

impl SettlementLookup for StoreBackedLookup {
    fn proof_exists<'a>(&'a self, proof_id: &'a str) -> BoxFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            let found = self.receipts.any(|r| {
                r.proof
                    .as_ref()
                    .is_some_and(|p| p.proof_id == proof_id && !p.fallback)
            });
            Ok(found)
        })
    }

    fn transaction_settled<'a>(
        &'a self,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<bool, String>> {
        Box::pin(async move {
            let found = self.receipts.any(|r| {
                r.payment_reference == reference
                    && r.phase == crate::receipt::MintPhase::Minted
            });
            Ok(found)
        })
    }
}

/// Drives verification requests to a terminal status.
pub struct VerificationOrchestrator {
    results: Arc<VerificationStore>,
    chain: Arc<dyn ChainClient>,
    lookup: Arc<dyn SettlementLookup>,
    finality: FinalityPolicy,
}

impl VerificationOrchestrator {
    pub fn new(
        results: Arc<VerificationStore>,
        chain: Arc<dyn ChainClient>,
        lookup: Arc<dyn SettlementLookup>,
        finality: FinalityPolicy,
    ) -> Self {
        Self {
            results,
            chain,
            lookup,
            finality,
        }
    }

    /// Record a `Pending` result for the request. The caller observes
    /// progress by polling the store.
    pub fn submit(&self, kind: VerificationKind, input_reference: &str) -> VerificationResult {
        let result = VerificationResult::pending(kind, input_reference, Timestamp::now());
        self.results.insert(result.clone());
        info!(id = %result.id, %kind, "verification requested");
        result
    }

    /// Resolve a pending result to its terminal status.
    pub async fn run(&self, id: VerificationId) -> Result<(), PipelineError> {
        let pending = self
            .results
            .get(id)
            .ok_or_else(|| PipelineError::NotFound(format!("verification {id}")))?;
        if pending.status.is_terminal() {
            return Err(PipelineError::Conflict(format!(
                "verification {id} already resolved"
            )));
        }

        let reference = pending.input_reference.trim().to_string();
        if reference.is_empty() {
            return self.finalize(
                id,
                VerificationStatus::Error,
                json!({"error": "empty input reference"}),
            );
        }

        let (status, detail) = match pending.kind {
            VerificationKind::ReceiptOnChain => self.verify_on_chain(&reference).await,
            VerificationKind::ProofOnly => {
                match self.lookup.proof_exists(&reference).await {
                    Ok(true) => (VerificationStatus::Valid, json!({"proof_id": reference})),
                    Ok(false) => (
                        VerificationStatus::Invalid,
                        json!({"proof_id": reference, "reason": "unknown proof"}),
                    ),
                    Err(e) => (VerificationStatus::Error, json!({"error": e})),
                }
            }
            VerificationKind::UnderlyingTransaction => {
                match self.lookup.transaction_settled(&reference).await {
                    Ok(true) => (VerificationStatus::Valid, json!({"reference": reference})),
                    Ok(false) => (
                        VerificationStatus::Invalid,
                        json!({"reference": reference, "reason": "no settled payment"}),
                    ),
                    Err(e) => (VerificationStatus::Error, json!({"error": e})),
                }
            }
        };
        self.finalize(id, status, detail)
    }

    /// Submit and resolve in a spawned task; the returned record is the
    /// immediate `Pending` snapshot.
    pub fn verify(
        self: &Arc<Self>,
        kind: VerificationKind,
        input_reference: &str,
    ) -> VerificationResult {
        let pending = self.submit(kind, input_reference);
        let this = Arc::clone(self);
        let id = pending.id;
        tokio::spawn(async move {
            if let Err(e) = this.run(id).await {
                warn!(%id, error = %e, "verification run failed");
            }
        });
        pending
    }

    /// Chain-side check: invoke `verify_receipt` with the encoded
    /// reference and map the finality outcome. The raw status string is
    /// retained in the detail either way.
    async fn verify_on_chain(
        &self,
        reference: &str,
    ) -> (VerificationStatus, serde_json::Value) {
        let encoded = match Felt::encode_reference(reference) {
            Ok(felt) => felt,
            // Fail fast, no chain contact for unencodable input.
            Err(e) => {
                return (
                    VerificationStatus::Error,
                    json!({"error": format!("unencodable reference: {e}")}),
                )
            }
        };

        let tx_hash = match self.chain.invoke(VERIFY_ENTRY_POINT, &[encoded]).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                return (
                    VerificationStatus::Error,
                    json!({"error": format!("chain invoke failed: {e}")}),
                )
            }
        };

        match await_finality(self.chain.as_ref(), &tx_hash, self.finality).await {
            Ok(status) if status.is_accepted() => (
                VerificationStatus::Valid,
                json!({"finality": status.to_string(), "tx_hash": tx_hash.to_string()}),
            ),
            Ok(status) => (
                VerificationStatus::Invalid,
                json!({"finality": status.to_string(), "tx_hash": tx_hash.to_string()}),
            ),
            Err(e) => (
                VerificationStatus::Error,
                json!({"error": format!("finality wait failed: {e}")}),
            ),
        }
    }

    fn finalize(
        &self,
        id: VerificationId,
        status: VerificationStatus,
        detail: serde_json::Value,
    ) -> Result<(), PipelineError> {
        let now = Timestamp::now();
        self.results
            .update(id, |r| r.finalize(status, detail, now))?
            .map_err(PipelineError::Core)?;
        info!(%id, ?status, "verification resolved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ChainAnchor, MintPhase, Receipt};
    use snet_chain::{FinalityStatus, MockChainClient, TxHash};
    use snet_core::{InvoiceId, Sats};
    use snet_proof::ProofBundle;
    use std::time::Duration;

    fn orchestrator(
        chain: Arc<MockChainClient>,
        receipts: Arc<ReceiptStore>,
    ) -> (Arc<VerificationOrchestrator>, Arc<VerificationStore>) {
        let results = Arc::new(VerificationStore::new());
        let lookup = Arc::new(StoreBackedLookup::new(receipts));
        let orchestrator = Arc::new(VerificationOrchestrator::new(
            results.clone(),
            chain,
            lookup,
            FinalityPolicy {
                poll_interval: Duration::from_millis(5),
                deadline: Duration::from_secs(2),
            },
        ));
        (orchestrator, results)
    }

    fn minted_receipt(reference: &str, proof_id: &str) -> Receipt {
        let now = Timestamp::now();
        let mut r = Receipt::open(
            InvoiceId::new(),
            Sats::new(1_000).unwrap(),
            reference.to_string(),
            now,
        );
        r.advance(MintPhase::ProofRequested, now).unwrap();
        r.set_proof(ProofBundle {
            proof_id: proof_id.to_string(),
            proof_hash: snet_core::proof_hash_for_reference(reference).unwrap(),
            fallback: false,
        })
        .unwrap();
        r.advance(MintPhase::ProofReady, now).unwrap();
        r.advance(MintPhase::ChainSubmitted, now).unwrap();
        r.advance(MintPhase::AwaitingFinality, now).unwrap();
        r.anchor_and_mint(
            ChainAnchor {
                tx_hash: TxHash::parse("0x1").unwrap(),
                receipt_token: Felt::from_u64(1),
            },
            "ACCEPTED_ON_L2",
            now,
        )
        .unwrap();
        r
    }

    #[tokio::test]
    async fn on_chain_accepted_is_valid() {
        let chain = Arc::new(MockChainClient::new());
        chain.push_status(FinalityStatus::AcceptedOnL2);
        let (orchestrator, results) = orchestrator(chain, Arc::new(ReceiptStore::new()));

        let pending = orchestrator.submit(VerificationKind::ReceiptOnChain, "0xabc");
        assert_eq!(pending.status, VerificationStatus::Pending);
        orchestrator.run(pending.id).await.unwrap();

        let resolved = results.get(pending.id).unwrap();
        assert_eq!(resolved.status, VerificationStatus::Valid);
        assert_eq!(resolved.detail.unwrap()["finality"], "ACCEPTED_ON_L2");
    }

    #[tokio::test]
    async fn reverted_finality_is_invalid_with_raw_status() {
        let chain = Arc::new(MockChainClient::new());
        chain.push_status(FinalityStatus::Reverted);
        let (orchestrator, results) = orchestrator(chain, Arc::new(ReceiptStore::new()));

        let pending = orchestrator.submit(VerificationKind::ReceiptOnChain, "0xabc");
        orchestrator.run(pending.id).await.unwrap();

        let resolved = results.get(pending.id).unwrap();
        assert_eq!(resolved.status, VerificationStatus::Invalid);
        assert_eq!(resolved.detail.unwrap()["finality"], "REVERTED");
    }

    #[tokio::test]
    async fn empty_reference_errors_without_chain_contact() {
        let chain = Arc::new(MockChainClient::new());
        let (orchestrator, results) = orchestrator(chain.clone(), Arc::new(ReceiptStore::new()));

        let pending = orchestrator.submit(VerificationKind::ReceiptOnChain, "   ");
        orchestrator.run(pending.id).await.unwrap();

        let resolved = results.get(pending.id).unwrap();
        assert_eq!(resolved.status, VerificationStatus::Error);
        assert!(chain.invocations().is_empty());
    }

    #[tokio::test]
    async fn proof_lookup_valid_and_invalid() {
        let receipts = Arc::new(ReceiptStore::new());
        receipts.insert(minted_receipt("0xaaa", "proof-real"));
        let chain = Arc::new(MockChainClient::new());
        let (orchestrator, results) = orchestrator(chain, receipts);

        let hit = orchestrator.submit(VerificationKind::ProofOnly, "proof-real");
        orchestrator.run(hit.id).await.unwrap();
        assert_eq!(results.get(hit.id).unwrap().status, VerificationStatus::Valid);

        let miss = orchestrator.submit(VerificationKind::ProofOnly, "proof-unknown");
        orchestrator.run(miss.id).await.unwrap();
        assert_eq!(
            results.get(miss.id).unwrap().status,
            VerificationStatus::Invalid
        );
    }

    #[tokio::test]
    async fn underlying_transaction_lookup() {
        let receipts = Arc::new(ReceiptStore::new());
        receipts.insert(minted_receipt("0xbbb", "proof-x"));
        let chain = Arc::new(MockChainClient::new());
        let (orchestrator, results) = orchestrator(chain, receipts);

        let hit = orchestrator.submit(VerificationKind::UnderlyingTransaction, "0xbbb");
        orchestrator.run(hit.id).await.unwrap();
        assert_eq!(results.get(hit.id).unwrap().status, VerificationStatus::Valid);
    }

    #[tokio::test]
    async fn rerun_of_resolved_result_is_rejected() {
        let chain = Arc::new(MockChainClient::new());
        chain.push_status(FinalityStatus::AcceptedOnL2);
        let (orchestrator, _results) = orchestrator(chain, Arc::new(ReceiptStore::new()));

        let pending = orchestrator.submit(VerificationKind::ReceiptOnChain, "0xabc");
        orchestrator.run(pending.id).await.unwrap();
        assert!(matches!(
            orchestrator.run(pending.id).await,
            Err(PipelineError::Conflict(_))
        ));
    }
}
