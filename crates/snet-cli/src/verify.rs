//! # Verify Subcommand
//!
//! Submits a verification request to a running `snet serve` instance and
//! optionally polls until the result is terminal.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::json;

use crate::invoice::print_api_response;
use crate::DEFAULT_API_URL;

/// How long `--wait` polls before giving up.
const WAIT_DEADLINE: Duration = Duration::from_secs(150);
const WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Arguments for the `snet verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// What the reference points at.
    #[arg(long, value_enum)]
    pub kind: VerifyKind,

    /// Receipt reference, proof id, or rail transaction reference.
    pub reference: String,

    /// Base URL of a running `snet serve` instance.
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Poll until the result is terminal instead of printing the
    /// pending record.
    #[arg(long)]
    pub wait: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum VerifyKind {
    ReceiptOnChain,
    ProofOnly,
    UnderlyingTransaction,
}

impl VerifyKind {
    fn wire_name(self) -> &'static str {
        match self {
            VerifyKind::ReceiptOnChain => "RECEIPT_ON_CHAIN",
            VerifyKind::ProofOnly => "PROOF_ONLY",
            VerifyKind::UnderlyingTransaction => "UNDERLYING_TRANSACTION",
        }
    }
}

pub async fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let client = reqwest::Client::new();
    let base = args.api_url.trim_end_matches('/');
    let response = client
        .post(format!("{base}/v1/verify"))
        .json(&json!({
            "kind": args.kind.wire_name(),
            "reference": args.reference,
        }))
        .send()
        .await
        .context("API unreachable")?;

    if !args.wait {
        return print_api_response(response).await;
    }

    let pending: serde_json::Value = response.json().await.context("malformed API response")?;
    let id = pending["id"]
        .as_str()
        .context("verification response carried no id")?
        .to_string();

    let started = std::time::Instant::now();
    loop {
        tokio::time::sleep(WAIT_INTERVAL).await;
        let response = client
            .get(format!("{base}/v1/verify/{id}"))
            .send()
            .await
            .context("API unreachable")?;
        let body: serde_json::Value = response.json().await.context("malformed API response")?;
        if body["status"] != "PENDING" {
            println!("{}", serde_json::to_string_pretty(&body)?);
            return Ok(0);
        }
        if started.elapsed() > WAIT_DEADLINE {
            println!("{}", serde_json::to_string_pretty(&body)?);
            anyhow::bail!("verification still pending after {}s", WAIT_DEADLINE.as_secs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names_are_screaming_snake() {
        assert_eq!(VerifyKind::ReceiptOnChain.wire_name(), "RECEIPT_ON_CHAIN");
        assert_eq!(VerifyKind::ProofOnly.wire_name(), "PROOF_ONLY");
        assert_eq!(
            VerifyKind::UnderlyingTransaction.wire_name(),
            "UNDERLYING_TRANSACTION"
        );
    }
}
