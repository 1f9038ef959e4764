//! # snet-rails — Payment Rail Adapters
//!
//! Adapters for the Bitcoin payment rails the stack settles over:
//!
//! - **Lightning** ([`lightning`], [`oracle`]): BOLT11 invoices and the
//!   settlement oracle that reports whether an invoice's channel state is
//!   unpaid, settled, or expired.
//! - **Cashu** ([`cashu`]): ecash mint swaps between Lightning liquidity
//!   and bearer tokens.
//! - **Wallets** ([`wallet`]): outbound dispatch to a canonical
//!   [`WalletAddress`], which tags the rail explicitly instead of guessing
//!   from string shape.
//!
//! Every external rail is reached through an object-safe trait with both an
//! HTTP implementation and a scriptable mock, so the pipeline crates test
//! against in-memory rails.

pub mod cashu;
pub mod lightning;
pub mod oracle;
pub mod wallet;

use thiserror::Error;

pub use snet_core::BoxFuture;

pub use cashu::{CashuMint, EcashToken, MockCashuMint};
pub use lightning::{synthesize_onchain_address, ChannelStatus, LightningInvoice};
pub use oracle::{HttpPaymentOracle, MockPaymentOracle, PaymentOracle};
pub use wallet::{MockWalletProvider, PaymentDispatch, WalletAddress, WalletProvider};

/// Errors surfaced by payment rail adapters.
#[derive(Error, Debug)]
pub enum RailError {
    /// The rail endpoint could not be reached or timed out.
    #[error("payment rail unavailable: {0}")]
    Unavailable(String),

    /// The rail answered but the payload violated the expected protocol.
    #[error("rail protocol error: {0}")]
    Protocol(String),

    /// A BOLT11 invoice or address failed structural validation.
    #[error("invalid payment target: {0}")]
    InvalidTarget(String),

    /// The mint refused an ecash swap.
    #[error("ecash swap rejected: {0}")]
    SwapRejected(String),
}
