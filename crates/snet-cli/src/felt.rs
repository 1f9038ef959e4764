//! # Felt Subcommand
//!
//! Encoding helpers for inspecting chain calldata by hand. Mirrors the
//! encoding the minting and verification orchestrators apply, so an
//! operator can reproduce any field element that went on chain.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use snet_core::{proof_hash_for_reference, Felt};

/// Arguments for the `snet felt` subcommand.
#[derive(Args, Debug)]
pub struct FeltArgs {
    #[command(subcommand)]
    pub command: FeltCommand,
}

#[derive(Subcommand, Debug)]
pub enum FeltCommand {
    /// Encode a reference (decimal, 0x hex, or short string) as a felt.
    Encode {
        /// The reference to encode.
        reference: String,
    },

    /// Decode a felt back to its short-string form.
    Decode {
        /// 0x-prefixed felt.
        felt: String,
    },

    /// Compute the proof hash for a settlement reference.
    ProofHash {
        /// The settlement reference (payment hash or invoice id).
        reference: String,
    },
}

pub fn run_felt(args: &FeltArgs) -> Result<u8> {
    match &args.command {
        FeltCommand::Encode { reference } => {
            let felt = Felt::encode_reference(reference).context("encoding failed")?;
            println!("{}", felt.to_hex());
        }
        FeltCommand::Decode { felt } => {
            let felt = Felt::from_hex(felt).context("not a valid felt")?;
            let text = felt.decode_short_string().context("decoding failed")?;
            println!("{text}");
        }
        FeltCommand::ProofHash { reference } => {
            let hash = proof_hash_for_reference(reference).context("hashing failed")?;
            println!("{}", hash.to_hex());
        }
    }
    Ok(0)
}
