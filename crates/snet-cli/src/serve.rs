//! # Serve Subcommand
//!
//! Wires the full pipeline and runs the REST API: invoice stores, the
//! settlement detector on its poll cadence, the minting orchestrator fed
//! by the detector's signal channel, and the verification orchestrator.
//!
//! Every external adapter defaults to its in-process mock so the stack
//! runs standalone; the `--oracle-url`, `--prover-url`, and
//! `--rpc-url`/`--contract-address` flags swap in the HTTP adapters.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use snet_api::state::AppState;
use snet_chain::{ChainClient, FinalityPolicy, JsonRpcChainClient, MockChainClient, RpcChainConfig};
use snet_pipeline::{
    DetectorConfig, InvoiceStore, MintingConfig, MintingOrchestrator, ReceiptStore,
    SettlementDetector, StoreBackedLookup, VerificationOrchestrator, VerificationStore,
};
use snet_proof::{HttpProofService, MockProofService, ProofService, ProofServiceConfig};
use snet_rails::{HttpPaymentOracle, MockPaymentOracle, MockWalletProvider, PaymentOracle, WalletProvider};

/// How many settlement signals may queue between detector and minter.
const MINT_QUEUE_DEPTH: usize = 64;

/// Arguments for the `snet serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the REST API on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Merchant identity committed as the payee on every receipt.
    #[arg(long, default_value = "merchant@shadownet.local")]
    pub merchant: String,

    /// Payment oracle base URL. Mock oracle when absent.
    #[arg(long)]
    pub oracle_url: Option<url::Url>,

    /// Proof service base URL. Mock prover when absent.
    #[arg(long)]
    pub prover_url: Option<url::Url>,

    /// Chain JSON-RPC endpoint. Mock chain when absent.
    #[arg(long, requires = "contract_address")]
    pub rpc_url: Option<String>,

    /// Receipt contract address (0x-prefixed felt).
    #[arg(long, requires = "rpc_url")]
    pub contract_address: Option<String>,

    /// Seconds between settlement poll cycles.
    #[arg(long, default_value_t = 4)]
    pub poll_interval_secs: u64,

    /// Seconds to wait for chain finality before giving up.
    #[arg(long, default_value_t = 120)]
    pub finality_deadline_secs: u64,
}

pub async fn run_serve(args: &ServeArgs) -> Result<u8> {
    let invoices = Arc::new(InvoiceStore::new());
    let receipts = Arc::new(ReceiptStore::new());
    let verifications = Arc::new(VerificationStore::new());

    let oracle: Arc<dyn PaymentOracle> = match &args.oracle_url {
        Some(url) => {
            info!(%url, "using HTTP payment oracle");
            Arc::new(HttpPaymentOracle::new(url.clone(), 30).context("oracle client")?)
        }
        None => {
            info!("using mock payment oracle");
            Arc::new(MockPaymentOracle::new())
        }
    };

    let chain: Arc<dyn ChainClient> = match (&args.rpc_url, &args.contract_address) {
        (Some(rpc_url), Some(contract)) => {
            info!(%rpc_url, %contract, "using JSON-RPC chain client");
            let config = RpcChainConfig::new(rpc_url.clone(), contract.clone());
            Arc::new(JsonRpcChainClient::new(config).context("chain client")?)
        }
        (None, None) => {
            info!("using mock chain client");
            Arc::new(MockChainClient::new())
        }
        _ => bail!("--rpc-url and --contract-address must be given together"),
    };

    let prover: Arc<dyn ProofService> = match &args.prover_url {
        Some(url) => {
            info!(%url, "using HTTP proof service");
            let config = ProofServiceConfig::new(url.clone());
            Arc::new(HttpProofService::new(config).context("proof client")?)
        }
        None => {
            info!("using mock proof service");
            Arc::new(MockProofService::new())
        }
    };

    let finality = FinalityPolicy {
        poll_interval: Duration::from_secs(2),
        deadline: Duration::from_secs(args.finality_deadline_secs),
    };
    let minter = Arc::new(MintingOrchestrator::new(
        Arc::clone(&invoices),
        Arc::clone(&receipts),
        prover,
        Arc::clone(&chain),
        MintingConfig {
            merchant: args.merchant.clone(),
            finality,
        },
    ));
    let verifier = Arc::new(VerificationOrchestrator::new(
        Arc::clone(&verifications),
        Arc::clone(&chain),
        Arc::new(StoreBackedLookup::new(Arc::clone(&receipts))),
        finality,
    ));

    let (mint_tx, mut mint_rx) = mpsc::channel(MINT_QUEUE_DEPTH);
    let detector = Arc::new(SettlementDetector::new(
        Arc::clone(&invoices),
        Arc::clone(&receipts),
        oracle,
        mint_tx,
        DetectorConfig {
            poll_interval: Duration::from_secs(args.poll_interval_secs),
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let detector_task = tokio::spawn({
        let detector = Arc::clone(&detector);
        async move { detector.run(shutdown_rx).await }
    });

    // Consume settlement signals until the detector drops its sender.
    let mint_task = tokio::spawn({
        let minter = Arc::clone(&minter);
        async move {
            while let Some(invoice_id) = mint_rx.recv().await {
                if let Err(e) = minter.start_minting(invoice_id).await {
                    error!(%invoice_id, error = %e, "minting failed to start");
                }
            }
        }
    });

    // No HTTP wallet exists yet; outbound payments always go through
    // the recording mock.
    let wallet: Arc<dyn WalletProvider> = Arc::new(MockWalletProvider::new());

    let state = AppState {
        invoices,
        receipts,
        verifications,
        minter,
        verifier,
        chain,
        wallet,
    };

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(bind = %args.bind, "REST API listening");

    axum::serve(listener, snet_api::app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    drop(detector);
    let _ = detector_task.await;
    let _ = mint_task.await;
    Ok(0)
}
