//! # Error Types — Structured Error Hierarchy
//!
//! Top-level error types shared across the receipt stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Component-specific errors (oracle, chain, proof, store) live next to
//! their components; this module holds only the errors produced by the
//! foundational types themselves.

use thiserror::Error;

/// Top-level error type for the foundational crate.
#[derive(Error, Debug)]
pub enum SnetError {
    /// A caller-supplied value failed validation before any state was
    /// created. Rejected synchronously at the API boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Field-element encoding or decoding failed.
    #[error("felt error: {0}")]
    Felt(#[from] crate::felt::FeltError),

    /// A record was asked to perform a transition its state machine
    /// does not allow.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
        /// Reason the transition was rejected.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
