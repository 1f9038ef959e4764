//! In-memory stores for invoices, receipts, and verification results.
//!
//! Each store singly owns its records; the detector and the orchestrators
//! are the only writers. Mutation goes through `update`, which holds the
//! shard lock across the closure so a lookup-then-mutate is one atomic
//! step.

use dashmap::DashMap;

use snet_core::{InvoiceId, ReceiptId, VerificationId};

use crate::invoice::Invoice;
use crate::receipt::Receipt;
use crate::verification::VerificationResult;
use crate::PipelineError;

/// Owns every invoice in the process.
#[derive(Debug, Default)]
pub struct InvoiceStore {
    records: DashMap<InvoiceId, Invoice>,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, invoice: Invoice) -> InvoiceId {
        let id = invoice.id;
        self.records.insert(id, invoice);
        id
    }

    pub fn get(&self, id: InvoiceId) -> Option<Invoice> {
        self.records.get(&id).map(|r| r.clone())
    }

    /// Snapshot of every invoice, creation order not guaranteed.
    pub fn list(&self) -> Vec<Invoice> {
        self.records.iter().map(|r| r.clone()).collect()
    }

    /// Invoices the settlement detector should poll.
    pub fn pollable(&self) -> Vec<Invoice> {
        self.records
            .iter()
            .filter(|r| r.needs_polling())
            .map(|r| r.clone())
            .collect()
    }

    /// Mutate one invoice under its shard lock.
    pub fn update<F, R>(&self, id: InvoiceId, f: F) -> Result<R, PipelineError>
    where
        F: FnOnce(&mut Invoice) -> R,
    {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| PipelineError::NotFound(format!("invoice {id}")))?;
        Ok(f(&mut entry))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Owns every receipt in the process.
#[derive(Debug, Default)]
pub struct ReceiptStore {
    records: DashMap<ReceiptId, Receipt>,
}

impl ReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, receipt: Receipt) -> ReceiptId {
        let id = receipt.id;
        self.records.insert(id, receipt);
        id
    }

    pub fn get(&self, id: ReceiptId) -> Option<Receipt> {
        self.records.get(&id).map(|r| r.clone())
    }

    /// All receipts ever opened for an invoice, failed attempts included.
    pub fn for_invoice(&self, invoice_id: InvoiceId) -> Vec<Receipt> {
        self.records
            .iter()
            .filter(|r| r.invoice_id == invoice_id)
            .map(|r| r.clone())
            .collect()
    }

    /// Whether the invoice has a receipt still in flight.
    pub fn has_open_receipt(&self, invoice_id: InvoiceId) -> bool {
        self.records
            .iter()
            .any(|r| r.invoice_id == invoice_id && !r.phase.is_terminal())
    }

    /// Whether the invoice already has a successfully minted receipt.
    pub fn has_minted_receipt(&self, invoice_id: InvoiceId) -> bool {
        self.records
            .iter()
            .any(|r| r.invoice_id == invoice_id && r.phase == crate::receipt::MintPhase::Minted)
    }

    /// Whether any receipt matches the predicate.
    pub fn any<F>(&self, f: F) -> bool
    where
        F: Fn(&Receipt) -> bool,
    {
        self.records.iter().any(|r| f(&r))
    }

    pub fn update<F, R>(&self, id: ReceiptId, f: F) -> Result<R, PipelineError>
    where
        F: FnOnce(&mut Receipt) -> R,
    {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| PipelineError::NotFound(format!("receipt {id}")))?;
        Ok(f(&mut entry))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Owns every verification result in the process.
#[derive(Debug, Default)]
pub struct VerificationStore {
    records: DashMap<VerificationId, VerificationResult>,
}

impl VerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, result: VerificationResult) -> VerificationId {
        let id = result.id;
        self.records.insert(id, result);
        id
    }

    pub fn get(&self, id: VerificationId) -> Option<VerificationResult> {
        self.records.get(&id).map(|r| r.clone())
    }

    pub fn update<F, R>(&self, id: VerificationId, f: F) -> Result<R, PipelineError>
    where
        F: FnOnce(&mut VerificationResult) -> R,
    {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| PipelineError::NotFound(format!("verification {id}")))?;
        Ok(f(&mut entry))
    }
}
