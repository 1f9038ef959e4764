//! # snet-pipeline — Receipt Settlement Pipeline
//!
//! The stateful heart of the stack. An invoice moves through this crate
//! from creation to an on-chain receipt:
//!
//! 1. [`invoice`]: the invoice record, its payment status lifecycle, and
//!    the optional Lightning settlement channel.
//! 2. [`detector`]: the settlement detector, polling the payment oracle on
//!    a fixed cadence and signalling the minting orchestrator when an
//!    invoice settles.
//! 3. [`receipt`]: the receipt record and its six-phase mint state
//!    machine, with a full transition history.
//! 4. [`minting`]: the orchestrator that drives a receipt from
//!    `PENDING_CONFIRM` to `MINTED` (or `FAILED`), calling the prover and
//!    the chain client.
//! 5. [`verification`] and [`verify`]: write-once verification results and
//!    the orchestrator that produces them.
//! 6. [`store`]: the in-memory stores that own all of the above. All
//!    mutation flows through the detector and the orchestrators.
//!
//! ## Ordering
//!
//! Per invoice, the pipeline is totally ordered: settlement detection
//! happens before proof generation, proof generation before chain
//! submission, submission before finality. Across invoices nothing is
//! ordered; one invoice's failure never delays another.

pub mod detector;
pub mod invoice;
pub mod minting;
pub mod receipt;
pub mod store;
pub mod verification;
pub mod verify;

use thiserror::Error;

pub use detector::{DetectorConfig, PollOutcome, SettlementDetector};
pub use invoice::{Invoice, PaymentStatus, SettlementChannel};
pub use minting::{MintingConfig, MintingOrchestrator};
pub use receipt::{ChainAnchor, MintPhase, MintStatus, Receipt, TransitionRecord};
pub use store::{InvoiceStore, ReceiptStore, VerificationStore};
pub use verification::{VerificationKind, VerificationResult, VerificationStatus};
pub use verify::{SettlementLookup, StoreBackedLookup, VerificationOrchestrator};

/// Errors surfaced at the pipeline boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A request failed validation before any state was created.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation conflicts with the current lifecycle state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A state machine rejected the attempted transition.
    #[error(transparent)]
    Core(#[from] snet_core::SnetError),
}
