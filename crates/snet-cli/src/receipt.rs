//! # Receipt Subcommand
//!
//! Read-only views over a running `snet serve` instance.
//!
//! ```bash
//! snet receipt show 3f0c8a2e-...
//! snet receipt for-invoice 9b1d44f0-...
//! snet receipt count
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::invoice::print_api_response;
use crate::DEFAULT_API_URL;

/// Arguments for the `snet receipt` subcommand.
#[derive(Args, Debug)]
pub struct ReceiptArgs {
    /// Base URL of a running `snet serve` instance.
    #[arg(long, default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: ReceiptCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReceiptCommand {
    /// Show one receipt with its phase history.
    Show {
        /// Receipt id (uuid).
        id: String,
    },

    /// List every mint attempt for an invoice, failed ones included.
    ForInvoice {
        /// Invoice id (uuid).
        id: String,
    },

    /// Read the contract-side receipt counter.
    Count,
}

pub async fn run_receipt(args: &ReceiptArgs) -> Result<u8> {
    let client = reqwest::Client::new();
    let base = args.api_url.trim_end_matches('/');
    let response = match &args.command {
        ReceiptCommand::Show { id } => {
            client.get(format!("{base}/v1/receipts/{id}")).send().await
        }
        ReceiptCommand::ForInvoice { id } => {
            client
                .get(format!("{base}/v1/invoices/{id}/receipts"))
                .send()
                .await
        }
        ReceiptCommand::Count => client.get(format!("{base}/v1/receipts/count")).send().await,
    };
    print_api_response(response.context("API unreachable")?).await
}
