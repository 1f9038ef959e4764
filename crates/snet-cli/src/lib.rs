//! # snet-cli — CLI for the ShadowNet receipt stack
//!
//! Provides the `snet` command-line interface.
//!
//! ## Subcommands
//!
//! - `snet serve` — Run the REST API with the settlement detector and
//!   minting pipeline. Mock adapters by default, HTTP adapters via flags.
//! - `snet invoice` — Create, list, show, and mint invoices over HTTP.
//! - `snet receipt` — Inspect receipts and the contract receipt counter.
//! - `snet verify` — Submit a verification request, optionally waiting
//!   for the terminal result.
//! - `snet felt` — Field element encoding helpers for debugging chain
//!   calldata.
//!
//! ```bash
//! snet serve --bind 0.0.0.0:8080 --merchant ops@example.com
//! snet invoice create --amount-sats 250000 --description consulting \
//!     --counterparty alice@example.com --due-at 2026-10-01T00:00:00Z
//! snet verify --kind receipt-on-chain 0x1a2b --wait
//! snet felt encode 2100000000000000
//! snet felt decode 0x68656c6c6f
//! ```

pub mod felt;
pub mod invoice;
pub mod receipt;
pub mod serve;
pub mod verify;

/// Where `snet serve` listens by default.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
