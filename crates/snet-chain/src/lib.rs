//! # snet-chain — Settlement Chain Client
//!
//! The receipt contract lives on a Starknet-style chain whose calldata is
//! field elements. This crate is the only place that talks to it:
//!
//! - [`client`]: the [`ChainClient`] trait, transaction hashes, and the
//!   finality state model.
//! - [`rpc`]: the production JSON-RPC implementation. The RPC endpoint's
//!   account layer signs transactions; this crate holds no keys.
//! - [`mock`]: a scriptable in-memory chain for the pipeline tests.
//!
//! Finality is polled, not pushed: [`client::await_finality`] drives the
//! status query on a fixed cadence until the transaction reaches a
//! terminal state or the deadline passes.

pub mod client;
pub mod mock;
pub mod rpc;

pub use client::{
    await_finality, ChainClient, ChainError, FinalityPolicy, FinalityStatus, TxHash,
};
pub use mock::MockChainClient;
pub use rpc::{JsonRpcChainClient, RpcChainConfig};
