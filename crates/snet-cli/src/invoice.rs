//! # Invoice Subcommand
//!
//! Thin HTTP client over a running `snet serve` instance.
//!
//! ```bash
//! snet invoice create --amount-sats 250000 --description consulting \
//!     --counterparty alice@example.com --due-at 2026-10-01T00:00:00Z
//! snet invoice list
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::DEFAULT_API_URL;

/// Arguments for the `snet invoice` subcommand.
#[derive(Args, Debug)]
pub struct InvoiceArgs {
    /// Base URL of a running `snet serve` instance.
    #[arg(long, default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: InvoiceCommand,
}

#[derive(Subcommand, Debug)]
pub enum InvoiceCommand {
    /// Raise a new invoice.
    Create {
        /// Amount in satoshis.
        #[arg(long)]
        amount_sats: u64,
        /// What the payment is for.
        #[arg(long)]
        description: String,
        /// Contact handle of the paying party.
        #[arg(long)]
        counterparty: String,
        /// RFC 3339 due date.
        #[arg(long)]
        due_at: String,
        /// Skip the Lightning settlement channel.
        #[arg(long)]
        no_lightning: bool,
    },

    /// List all invoices.
    List,

    /// Show one invoice.
    Show {
        /// Invoice id (uuid).
        id: String,
    },

    /// Start (or retry) minting for a settled invoice.
    Mint {
        /// Invoice id (uuid).
        id: String,
    },
}

pub async fn run_invoice(args: &InvoiceArgs) -> Result<u8> {
    let client = reqwest::Client::new();
    let base = args.api_url.trim_end_matches('/');
    let response = match &args.command {
        InvoiceCommand::Create {
            amount_sats,
            description,
            counterparty,
            due_at,
            no_lightning,
        } => {
            client
                .post(format!("{base}/v1/invoices"))
                .json(&json!({
                    "amount_sats": amount_sats,
                    "description": description,
                    "counterparty": counterparty,
                    "due_at": due_at,
                    "lightning": !no_lightning,
                }))
                .send()
                .await
        }
        InvoiceCommand::List => client.get(format!("{base}/v1/invoices")).send().await,
        InvoiceCommand::Show { id } => {
            client.get(format!("{base}/v1/invoices/{id}")).send().await
        }
        InvoiceCommand::Mint { id } => {
            client
                .post(format!("{base}/v1/invoices/{id}/mint"))
                .send()
                .await
        }
    };
    print_api_response(response.context("API unreachable")?).await
}

/// Pretty-print the JSON body; non-success statuses exit nonzero with
/// the server's error body on stderr.
pub(crate) async fn print_api_response(response: reqwest::Response) -> Result<u8> {
    let status = response.status();
    let body: serde_json::Value = response.json().await.context("malformed API response")?;
    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(0)
    } else {
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        bail!("API returned {status}");
    }
}
