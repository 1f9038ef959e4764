//! # snet CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snet_cli::felt::{run_felt, FeltArgs};
use snet_cli::invoice::{run_invoice, InvoiceArgs};
use snet_cli::receipt::{run_receipt, ReceiptArgs};
use snet_cli::serve::{run_serve, ServeArgs};
use snet_cli::verify::{run_verify, VerifyArgs};

/// ShadowNet receipt stack CLI.
///
/// Runs the settlement pipeline as a REST service and provides felt
/// encoding helpers for chain calldata debugging.
#[derive(Parser, Debug)]
#[command(name = "snet", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the REST API with the settlement detector and minting pipeline.
    Serve(ServeArgs),

    /// Create, list, show, and mint invoices against a running server.
    Invoice(InvoiceArgs),

    /// Inspect receipts against a running server.
    Receipt(ReceiptArgs),

    /// Submit a verification request against a running server.
    Verify(VerifyArgs),

    /// Field element encoding helpers.
    Felt(FeltArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => run_serve(&args).await,
        Commands::Invoice(args) => run_invoice(&args).await,
        Commands::Receipt(args) => run_receipt(&args).await,
        Commands::Verify(args) => run_verify(&args).await,
        Commands::Felt(args) => run_felt(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
