//! # snet-proof — Settlement Proof Adapters
//!
//! A receipt is only minted against a *proof bundle*: an opaque proof
//! identifier plus a field-domain proof hash derived from the settlement
//! reference. Proof generation runs on an external service; this crate
//! wraps it behind the [`ProofService`] trait and keeps the bundle opaque.
//! Nothing in the stack inspects proof internals.
//!
//! The [`fallback::FallbackProofService`] decorator keeps the pipeline
//! moving when the prover is down: it synthesizes a locally derived bundle
//! and marks it `fallback: true`, so verifiers and operators can tell
//! proved receipts from provisional ones.

pub mod fallback;
pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use snet_core::{BoxFuture, Felt, InvoiceId, Sats};

pub use fallback::FallbackProofService;
pub use http::{HttpProofService, ProofServiceConfig};
pub use mock::MockProofService;

/// Errors from proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The prover could not be reached or timed out.
    #[error("proof service unavailable: {0}")]
    Unavailable(String),

    /// The prover answered but refused the request.
    #[error("proof generation rejected: {0}")]
    Rejected(String),

    /// The prover's response violated the expected shape.
    #[error("proof protocol error: {0}")]
    Protocol(String),
}

/// What the prover is asked to attest: a settled payment for an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    /// The invoice whose settlement is being proved.
    pub invoice_id: InvoiceId,
    /// Rail-level settlement reference (payment hash or txid).
    pub settlement_reference: String,
    /// Settled amount.
    pub amount: Sats,
}

/// An opaque proof bundle, as returned by the prover or synthesized by
/// the fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Prover-assigned opaque identifier.
    pub proof_id: String,
    /// Field-domain hash binding the proof to the settlement reference.
    pub proof_hash: Felt,
    /// True when the bundle was synthesized locally because the prover
    /// was unavailable.
    pub fallback: bool,
}

/// Generates proof bundles for settled payments.
pub trait ProofService: Send + Sync {
    fn generate<'a>(
        &'a self,
        request: &'a ProofRequest,
    ) -> BoxFuture<'a, Result<ProofBundle, ProofError>>;
}

impl<T: ProofService + ?Sized> ProofService for std::sync::Arc<T> {
    fn generate<'a>(
        &'a self,
        request: &'a ProofRequest,
    ) -> BoxFuture<'a, Result<ProofBundle, ProofError>> {
        (**self).generate(request)
    }
}
