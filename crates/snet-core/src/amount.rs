//! # Satoshi Amounts
//!
//! `Sats` is the single amount type of the stack: an integer count of the
//! smallest currency unit. Invoices, receipts, and chain call arguments all
//! carry `Sats`; BTC-denominated rendering happens only at display edges.
//!
//! ## Invariant
//!
//! A `Sats` constructed through [`Sats::new`] is always strictly positive.
//! Zero or negative amounts are rejected at the boundary and never enter
//! the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::SnetError;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// A strictly positive amount in satoshis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sats(u64);

impl Sats {
    /// Construct a validated amount. Rejects zero.
    pub fn new(sats: u64) -> Result<Self, SnetError> {
        if sats == 0 {
            return Err(SnetError::Validation(
                "amount must be a positive number of satoshis".to_string(),
            ));
        }
        Ok(Self(sats))
    }

    /// The raw satoshi count.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Convert to millisatoshis for Lightning invoices.
    ///
    /// Saturates at `u64::MAX`; amounts anywhere near that bound exceed the
    /// total bitcoin supply by orders of magnitude.
    pub fn as_msat(&self) -> u64 {
        self.0.saturating_mul(1000)
    }

    /// Render as a fixed 8-decimal BTC string (e.g. `1.00000000`).
    pub fn format_btc(&self) -> String {
        format!("{}.{:08}", self.0 / SATS_PER_BTC, self.0 % SATS_PER_BTC)
    }
}

impl std::fmt::Display for Sats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sat", self.0)
    }
}
