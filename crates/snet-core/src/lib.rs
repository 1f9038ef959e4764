//! # snet-core — Foundational Types for the ShadowNet Receipt Stack
//!
//! This crate is the bedrock of the stack. It defines the type-system
//! primitives shared by every other crate: identifier newtypes, the satoshi
//! amount type, UTC-only timestamps, and the field-element encoding used for
//! every settlement-chain call argument.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `InvoiceId`, `ReceiptId`,
//!    `VerificationId`, `Sats` — all newtypes with validated constructors.
//!    No bare strings or bare integers for identifiers and amounts.
//!
//! 2. **One felt encoding.** ALL string→field-element mapping flows through
//!    [`Felt::encode_reference`]. The mapping is deterministic and
//!    reversible for short strings, so on-chain identity matching is stable
//!    across processes and languages.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Invoice due dates, channel expiries, and
//!    receipt timestamps all compare in the same domain.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `snet-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

/// Boxed future alias used by the adapter traits across the stack. Keeps
/// those traits object-safe while still suspending at I/O points.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

pub mod amount;
pub mod commitment;
pub mod error;
pub mod felt;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::Sats;
pub use commitment::PartyCommitment;
pub use error::SnetError;
pub use felt::{proof_hash_for_reference, Felt, FeltError};
pub use identity::{InvoiceId, ReceiptId, VerificationId};
pub use temporal::Timestamp;
