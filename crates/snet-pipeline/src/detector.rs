//! # Settlement Detector
//!
//! Polls the payment oracle on a fixed cadence and decides when an
//! invoice's underlying payment has settled. On settlement it signals the
//! minting orchestrator over a channel, exactly once per invoice.
//!
//! One poll cycle walks every pending invoice that carries a settlement
//! channel. Each invoice is handled independently: an oracle failure for
//! one is recorded and retried next cycle, it never aborts the rest of
//! the cycle. An in-flight guard keeps at most one settlement check
//! outstanding per invoice, so overlapping cycles cannot double-observe.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use snet_core::{InvoiceId, Timestamp};
use snet_rails::{ChannelStatus, PaymentOracle};

use crate::invoice::PaymentStatus;
use crate::store::{InvoiceStore, ReceiptStore};

/// Detector scheduling knobs.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Delay between poll cycles.
    pub poll_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(4),
        }
    }
}

/// Summary of one poll cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Invoices that settled this cycle.
    pub settled: Vec<InvoiceId>,
    /// Invoices whose settlement channel expired this cycle.
    pub expired: Vec<InvoiceId>,
    /// Invoices that went overdue this cycle.
    pub overdue: Vec<InvoiceId>,
    /// Per-invoice oracle failures, retried next cycle.
    pub errors: Vec<(InvoiceId, String)>,
}

/// Watches pending invoices for settlement.
pub struct SettlementDetector {
    invoices: Arc<InvoiceStore>,
    receipts: Arc<ReceiptStore>,
    oracle: Arc<dyn PaymentOracle>,
    mint_signal: mpsc::Sender<InvoiceId>,
    in_flight: Mutex<HashSet<InvoiceId>>,
    config: DetectorConfig,
}

impl SettlementDetector {
    pub fn new(
        invoices: Arc<InvoiceStore>,
        receipts: Arc<ReceiptStore>,
        oracle: Arc<dyn PaymentOracle>,
        mint_signal: mpsc::Sender<InvoiceId>,
        config: DetectorConfig,
    ) -> Self {
        Self {
            invoices,
            receipts,
            oracle,
            mint_signal,
            in_flight: Mutex::new(HashSet::new()),
            config,
        }
    }

    /// Poll until `shutdown` flips true. Stopping the loop does not touch
    /// receipt pipelines already in flight.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = self.config.poll_interval.as_secs_f64(), "settlement detector started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.poll_once().await;
                    if !outcome.errors.is_empty() {
                        debug!(errors = outcome.errors.len(), "poll cycle had oracle failures");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("settlement detector stopping");
                        return;
                    }
                }
            }
        }
    }

    /// One poll cycle over every pollable invoice.
    pub async fn poll_once(&self) -> PollOutcome {
        let now = Timestamp::now();
        let mut outcome = PollOutcome::default();

        for invoice in self.invoices.pollable() {
            let id = invoice.id;
            // At most one in-flight settlement check per invoice.
            if !self.in_flight.lock().insert(id) {
                continue;
            }
            let result = self.check_invoice(id, now).await;
            self.in_flight.lock().remove(&id);

            match result {
                Ok(CheckResult::Settled) => outcome.settled.push(id),
                Ok(CheckResult::ChannelExpired) => outcome.expired.push(id),
                Ok(CheckResult::Overdue) => outcome.overdue.push(id),
                Ok(CheckResult::Unchanged) => {}
                Err(reason) => {
                    warn!(invoice_id = %id, %reason, "settlement check failed, will retry");
                    outcome.errors.push((id, reason));
                }
            }
        }
        outcome
    }

    async fn check_invoice(&self, id: InvoiceId, now: Timestamp) -> Result<CheckResult, String> {
        // Re-read under the current cycle; the snapshot from `pollable`
        // may be stale by the time this invoice's turn comes.
        let invoice = match self.invoices.get(id) {
            Some(inv) if inv.needs_polling() => inv,
            _ => return Ok(CheckResult::Unchanged),
        };
        let channel = match &invoice.settlement_channel {
            Some(c) => c.clone(),
            None => return Ok(CheckResult::Unchanged),
        };

        let status = self
            .oracle
            .invoice_status(&channel.invoice)
            .await
            .map_err(|e| e.to_string())?;

        match status {
            ChannelStatus::Settled => {
                let changed = self
                    .invoices
                    .update(id, |inv| inv.mark_settled())
                    .map_err(|e| e.to_string())?
                    .map_err(|e| e.to_string())?;
                if changed {
                    info!(invoice_id = %id, "payment settled");
                    self.signal_mint(id).await;
                    Ok(CheckResult::Settled)
                } else {
                    // Re-observing a settled invoice is a no-op.
                    Ok(CheckResult::Unchanged)
                }
            }
            ChannelStatus::Expired | ChannelStatus::Unpaid => {
                let mut expired = false;
                if status == ChannelStatus::Expired || channel.invoice.is_expired(now) {
                    expired = matches!(self.expire(id)?, CheckResult::ChannelExpired);
                }
                // An unsettled invoice past its due date goes overdue
                // regardless of what happened to its channel.
                if invoice.due_at.has_passed(now) {
                    let changed = self
                        .invoices
                        .update(id, |inv| inv.mark_overdue())
                        .map_err(|e| e.to_string())?
                        .map_err(|e| e.to_string())?;
                    if changed {
                        info!(invoice_id = %id, "invoice went overdue");
                        return Ok(CheckResult::Overdue);
                    }
                }
                if expired {
                    Ok(CheckResult::ChannelExpired)
                } else {
                    Ok(CheckResult::Unchanged)
                }
            }
        }
    }

    fn expire(&self, id: InvoiceId) -> Result<CheckResult, String> {
        let changed = self
            .invoices
            .update(id, |inv| inv.expire_channel())
            .map_err(|e| e.to_string())?;
        if changed {
            info!(invoice_id = %id, "settlement channel expired, invoice stays pending");
            Ok(CheckResult::ChannelExpired)
        } else {
            Ok(CheckResult::Unchanged)
        }
    }

    /// Signal minting exactly once per invoice. An invoice that already
    /// carries a receipt reference or has a receipt in flight is never
    /// re-signalled.
    async fn signal_mint(&self, id: InvoiceId) {
        let already_handled = match self.invoices.get(id) {
            Some(inv) => inv.receipt_ref.is_some(),
            None => true,
        };
        if already_handled
            || self.receipts.has_open_receipt(id)
            || self.receipts.has_minted_receipt(id)
        {
            debug!(invoice_id = %id, "minting already underway, not re-signalling");
            return;
        }
        if let Err(e) = self.mint_signal.send(id).await {
            error!(invoice_id = %id, error = %e, "mint signal receiver dropped");
        }
    }
}

enum CheckResult {
    Settled,
    ChannelExpired,
    Overdue,
    Unchanged,
}
