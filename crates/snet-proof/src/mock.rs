//! In-memory prover for tests.

use parking_lot::Mutex;

use snet_core::{proof_hash_for_reference, BoxFuture};

use crate::{ProofBundle, ProofError, ProofRequest, ProofService};

/// Deterministic mock prover. Derives the proof hash from the settlement
/// reference and counts issued proofs; failures are scripted per call.
#[derive(Debug, Default)]
pub struct MockProofService {
    issued: Mutex<u64>,
    failures: Mutex<Vec<String>>,
}

impl MockProofService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `generate` call fail with this reason.
    pub fn fail_next(&self, reason: &str) {
        self.failures.lock().push(reason.to_string());
    }

    /// Number of bundles issued so far.
    pub fn issued_count(&self) -> u64 {
        *self.issued.lock()
    }
}

impl ProofService for MockProofService {
    fn generate<'a>(
        &'a self,
        request: &'a ProofRequest,
    ) -> BoxFuture<'a, Result<ProofBundle, ProofError>> {
        Box::pin(async move {
            if let Some(reason) = self.failures.lock().pop() {
                return Err(ProofError::Unavailable(reason));
            }
            let proof_hash = proof_hash_for_reference(&request.settlement_reference)
                .map_err(|e| ProofError::Rejected(format!("unusable settlement reference: {e}")))?;
            let mut issued = self.issued.lock();
            *issued += 1;
            Ok(ProofBundle {
                proof_id: format!("mockproof-{:04}", *issued),
                proof_hash,
                fallback: false,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snet_core::{InvoiceId, Sats};

    fn request(reference: &str) -> ProofRequest {
        ProofRequest {
            invoice_id: InvoiceId::new(),
            settlement_reference: reference.to_string(),
            amount: Sats::new(1_000).unwrap(),
        }
    }

    #[tokio::test]
    async fn issues_sequential_proof_ids() {
        let prover = MockProofService::new();
        let a = prover.generate(&request("0xaa")).await.unwrap();
        let b = prover.generate(&request("0xbb")).await.unwrap();
        assert_eq!(a.proof_id, "mockproof-0001");
        assert_eq!(b.proof_id, "mockproof-0002");
        assert_eq!(prover.issued_count(), 2);
    }

    #[tokio::test]
    async fn hash_binds_to_reference() {
        let prover = MockProofService::new();
        let a = prover.generate(&request("0xaa")).await.unwrap();
        let b = prover.generate(&request("0xaa")).await.unwrap();
        let c = prover.generate(&request("0xbb")).await.unwrap();
        assert_eq!(a.proof_hash, b.proof_hash);
        assert_ne!(a.proof_hash, c.proof_hash);
    }

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let prover = MockProofService::new();
        prover.fail_next("down");
        assert!(prover.generate(&request("0xaa")).await.is_err());
        assert!(prover.generate(&request("0xaa")).await.is_ok());
    }
}
