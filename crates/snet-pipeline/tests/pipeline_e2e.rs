//! End-to-end pipeline scenarios: invoice creation through settlement
//! detection, minting, and verification, wired over the mock rails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use snet_chain::{FinalityPolicy, FinalityStatus, MockChainClient};
use snet_core::{Sats, Timestamp};
use snet_pipeline::{
    DetectorConfig, Invoice, InvoiceStore, MintStatus, MintingConfig, MintingOrchestrator,
    PaymentStatus, ReceiptStore, SettlementDetector, StoreBackedLookup, VerificationKind,
    VerificationOrchestrator, VerificationStatus, VerificationStore,
};
use snet_proof::MockProofService;
use snet_rails::{ChannelStatus, MockPaymentOracle};

struct Harness {
    invoices: Arc<InvoiceStore>,
    receipts: Arc<ReceiptStore>,
    oracle: Arc<MockPaymentOracle>,
    chain: Arc<MockChainClient>,
    prover: Arc<MockProofService>,
    detector: SettlementDetector,
    minter: MintingOrchestrator,
    mint_rx: mpsc::Receiver<snet_core::InvoiceId>,
}

fn harness() -> Harness {
    let invoices = Arc::new(InvoiceStore::new());
    let receipts = Arc::new(ReceiptStore::new());
    let oracle = Arc::new(MockPaymentOracle::new());
    let chain = Arc::new(MockChainClient::new());
    let prover = Arc::new(MockProofService::new());
    let (mint_tx, mint_rx) = mpsc::channel(16);

    let detector = SettlementDetector::new(
        invoices.clone(),
        receipts.clone(),
        oracle.clone(),
        mint_tx,
        DetectorConfig::default(),
    );
    let minter = MintingOrchestrator::new(
        invoices.clone(),
        receipts.clone(),
        prover.clone(),
        chain.clone(),
        MintingConfig {
            merchant: "merchant.example".to_string(),
            finality: FinalityPolicy {
                poll_interval: Duration::from_millis(5),
                deadline: Duration::from_secs(2),
            },
        },
    );

    Harness {
        invoices,
        receipts,
        oracle,
        chain,
        prover,
        detector,
        minter,
        mint_rx,
    }
}

fn open_invoice(h: &Harness, sats: u64, due_in_secs: i64) -> Invoice {
    let now = Timestamp::now();
    let inv = Invoice::new(
        Sats::new(sats).unwrap(),
        "pipeline test",
        "payer@example",
        now.plus_secs(due_in_secs),
        now,
    )
    .unwrap()
    .with_lightning_channel(now);
    h.invoices.insert(inv.clone());
    inv
}

// Scenario: a 1 BTC invoice settles, the detector signals, minting
// reaches MINTED, and the receipt carries the invoice amount.
#[tokio::test]
async fn settle_then_mint_one_btc() {
    let mut h = harness();
    let inv = open_invoice(&h, 100_000_000, 3600);
    h.oracle.settle(&inv.settlement_reference());

    let outcome = h.detector.poll_once().await;
    assert_eq!(outcome.settled, vec![inv.id]);

    let signalled = h.mint_rx.recv().await.unwrap();
    assert_eq!(signalled, inv.id);
    let receipt_id = h.minter.start_minting(signalled).await.unwrap();

    let receipt = h.receipts.get(receipt_id).unwrap();
    assert_eq!(receipt.mint_status(), MintStatus::Minted);
    assert_eq!(receipt.amount.as_u64(), 100_000_000);
    assert!(receipt.chain_anchor.is_some());

    let stored = h.invoices.get(inv.id).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Settled);
    assert_eq!(stored.receipt_ref, Some(receipt_id));
    assert_eq!(
        stored.settlement_channel.unwrap().status,
        ChannelStatus::Settled
    );
}

// Scenario: the channel expires while the due date is still ahead. The
// channel goes EXPIRED, the invoice stays PENDING.
#[tokio::test]
async fn channel_expiry_is_not_invoice_failure() {
    let h = harness();
    let inv = open_invoice(&h, 5_000, 7200);
    h.oracle
        .set_status(&inv.settlement_reference(), ChannelStatus::Expired);

    let outcome = h.detector.poll_once().await;
    assert_eq!(outcome.expired, vec![inv.id]);
    assert!(outcome.overdue.is_empty());

    let stored = h.invoices.get(inv.id).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert_eq!(
        stored.settlement_channel.unwrap().status,
        ChannelStatus::Expired
    );
}

// Scenario: chain invoke fails, the receipt ends FAILED, and a retry
// opens a fresh receipt while preserving the failed one.
#[tokio::test]
async fn failed_mint_preserves_history_and_allows_retry() {
    let h = harness();
    let inv = open_invoice(&h, 25_000, 3600);
    h.oracle.settle(&inv.settlement_reference());
    h.detector.poll_once().await;

    h.chain.fail_next_invoke("gateway exploded");
    let first = h.minter.start_minting(inv.id).await.unwrap();
    assert_eq!(
        h.receipts.get(first).unwrap().mint_status(),
        MintStatus::Failed
    );

    let second = h.minter.start_minting(inv.id).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(
        h.receipts.get(second).unwrap().mint_status(),
        MintStatus::Minted
    );
    assert_eq!(
        h.receipts.get(first).unwrap().mint_status(),
        MintStatus::Failed
    );

    // At most one minted receipt per invoice, ever.
    let minted = h
        .receipts
        .for_invoice(inv.id)
        .into_iter()
        .filter(|r| r.mint_status() == MintStatus::Minted)
        .count();
    assert_eq!(minted, 1);
}

// Scenario: on-chain verification against a chain reporting REVERTED
// resolves Invalid with the raw status string in the detail.
#[tokio::test]
async fn reverted_verification_is_invalid() {
    let h = harness();
    h.chain.push_status(FinalityStatus::Reverted);

    let results = Arc::new(VerificationStore::new());
    let verifier = VerificationOrchestrator::new(
        results.clone(),
        h.chain.clone(),
        Arc::new(StoreBackedLookup::new(h.receipts.clone())),
        FinalityPolicy {
            poll_interval: Duration::from_millis(5),
            deadline: Duration::from_secs(2),
        },
    );

    let pending = verifier.submit(VerificationKind::ReceiptOnChain, "0x4d5");
    verifier.run(pending.id).await.unwrap();

    let resolved = results.get(pending.id).unwrap();
    assert_eq!(resolved.status, VerificationStatus::Invalid);
    assert_eq!(resolved.detail.unwrap()["finality"], "REVERTED");
}

// Property: polling twice over an already settled invoice changes
// nothing and never re-signals minting.
#[tokio::test]
async fn double_poll_is_idempotent() {
    let mut h = harness();
    let inv = open_invoice(&h, 1_000, 3600);
    h.oracle.settle(&inv.settlement_reference());

    h.detector.poll_once().await;
    let snapshot = h.invoices.get(inv.id).unwrap();
    let second = h.detector.poll_once().await;

    assert!(second.settled.is_empty());
    assert_eq!(h.invoices.get(inv.id).unwrap(), snapshot);
    // Exactly one signal from the first cycle.
    assert_eq!(h.mint_rx.recv().await.unwrap(), inv.id);
    assert!(h.mint_rx.try_recv().is_err());
}

// Property: a fallback proof is visible on the minted receipt, and the
// proof registry refuses to validate it.
#[tokio::test]
async fn fallback_proof_is_marked_and_not_registry_valid() {
    let h = harness();
    let inv = open_invoice(&h, 42_000, 3600);
    h.oracle.settle(&inv.settlement_reference());
    h.detector.poll_once().await;

    h.prover.fail_next("prover offline");
    let receipt_id = h.minter.start_minting(inv.id).await.unwrap();
    let receipt = h.receipts.get(receipt_id).unwrap();
    assert_eq!(receipt.mint_status(), MintStatus::Minted);
    let proof = receipt.proof.unwrap();
    assert!(proof.fallback);

    let results = Arc::new(VerificationStore::new());
    let verifier = VerificationOrchestrator::new(
        results.clone(),
        h.chain.clone(),
        Arc::new(StoreBackedLookup::new(h.receipts.clone())),
        FinalityPolicy::default(),
    );
    let pending = verifier.submit(VerificationKind::ProofOnly, &proof.proof_id);
    verifier.run(pending.id).await.unwrap();
    assert_eq!(
        results.get(pending.id).unwrap().status,
        VerificationStatus::Invalid
    );
}

// Property: one invoice's oracle failure never blocks another invoice's
// full pipeline in the same cycle.
#[tokio::test]
async fn pipelines_interleave_independently() {
    let mut h = harness();
    let healthy = open_invoice(&h, 10_000, 3600);
    let stuck = open_invoice(&h, 20_000, 3600);
    // The stuck invoice simply never settles; the healthy one does.
    h.oracle.settle(&healthy.settlement_reference());
    let _ = stuck;

    h.detector.poll_once().await;
    let signalled = h.mint_rx.recv().await.unwrap();
    assert_eq!(signalled, healthy.id);

    let receipt_id = h.minter.start_minting(healthy.id).await.unwrap();
    assert_eq!(
        h.receipts.get(receipt_id).unwrap().mint_status(),
        MintStatus::Minted
    );
    assert_eq!(
        h.invoices.get(stuck.id).unwrap().payment_status,
        PaymentStatus::Pending
    );
}
