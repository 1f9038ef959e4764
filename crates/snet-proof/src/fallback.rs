//! Fallback proof synthesis.
//!
//! When the prover is unreachable or rejects a request, minting still has
//! to proceed: the settlement already happened on the rail, and a stalled
//! receipt is worse than a provisional one. The fallback decorator
//! synthesizes a bundle locally and marks it `fallback: true` so that the
//! provisional state is visible everywhere the bundle travels.

use rand::Rng;
use tracing::warn;

use snet_core::{proof_hash_for_reference, BoxFuture};

use crate::{ProofBundle, ProofError, ProofRequest, ProofService};

/// Wraps an inner [`ProofService`] with local fallback synthesis.
pub struct FallbackProofService<S> {
    inner: S,
}

impl<S: ProofService> FallbackProofService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Build a provisional bundle from the settlement reference alone.
    fn synthesize(request: &ProofRequest) -> Result<ProofBundle, ProofError> {
        let proof_hash = proof_hash_for_reference(&request.settlement_reference)
            .map_err(|e| ProofError::Rejected(format!("unusable settlement reference: {e}")))?;
        let mut rng = rand::thread_rng();
        let nonce: u64 = rng.gen();
        Ok(ProofBundle {
            proof_id: format!("proof_{nonce:016x}"),
            proof_hash,
            fallback: true,
        })
    }
}

impl<S: ProofService> ProofService for FallbackProofService<S> {
    fn generate<'a>(
        &'a self,
        request: &'a ProofRequest,
    ) -> BoxFuture<'a, Result<ProofBundle, ProofError>> {
        Box::pin(async move {
            match self.inner.generate(request).await {
                Ok(bundle) => Ok(bundle),
                Err(err) => {
                    warn!(
                        invoice_id = %request.invoice_id,
                        error = %err,
                        "prover failed, synthesizing fallback proof"
                    );
                    Self::synthesize(request)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProofService;
    use snet_core::{InvoiceId, Sats};

    fn request() -> ProofRequest {
        ProofRequest {
            invoice_id: InvoiceId::new(),
            settlement_reference: "0x9f86d081884c7d659a2feaa0c55ad015".to_string(),
            amount: Sats::new(42_000).unwrap(),
        }
    }

    #[tokio::test]
    async fn passes_through_on_success() {
        let service = FallbackProofService::new(MockProofService::new());
        let bundle = service.generate(&request()).await.unwrap();
        assert!(!bundle.fallback);
    }

    #[tokio::test]
    async fn synthesizes_on_prover_failure() {
        let inner = MockProofService::new();
        inner.fail_next("prover offline");
        let service = FallbackProofService::new(inner);
        let bundle = service.generate(&request()).await.unwrap();
        assert!(bundle.fallback);
        assert!(bundle.proof_id.starts_with("proof_"));
        assert!(!bundle.proof_hash.is_zero());
    }

    #[tokio::test]
    async fn fallback_hash_is_reference_deterministic() {
        let req = request();
        let a = FallbackProofService::<MockProofService>::synthesize(&req).unwrap();
        let b = FallbackProofService::<MockProofService>::synthesize(&req).unwrap();
        // Proof ids are random, the hash binding is not.
        assert_eq!(a.proof_hash, b.proof_hash);
        assert_ne!(a.proof_id, b.proof_id);
    }

    #[tokio::test]
    async fn empty_reference_cannot_be_synthesized() {
        let inner = MockProofService::new();
        inner.fail_next("prover offline");
        let service = FallbackProofService::new(inner);
        let mut req = request();
        req.settlement_reference = String::new();
        assert!(service.generate(&req).await.is_err());
    }
}
