//! Invoice records and their payment lifecycle.
//!
//! The payment status moves `PENDING -> SETTLED` or `PENDING -> OVERDUE`
//! and nowhere else; both destinations are terminal. A Lightning
//! settlement channel carries its own expiry: channel expiry blocks that
//! channel only, the invoice itself stays `PENDING` and a later direct
//! payment can still settle it.

use serde::{Deserialize, Serialize};

use snet_core::{InvoiceId, ReceiptId, Sats, SnetError, Timestamp};
use snet_rails::{ChannelStatus, LightningInvoice};

use crate::PipelineError;

/// Overall payment status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Settled,
    Overdue,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Settled | PaymentStatus::Overdue)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Settled => "SETTLED",
            PaymentStatus::Overdue => "OVERDUE",
        };
        f.write_str(s)
    }
}

/// A Lightning settlement path attached to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementChannel {
    /// The BOLT11 payment request backing this channel.
    pub invoice: LightningInvoice,
    /// Channel-level settlement state.
    pub status: ChannelStatus,
}

impl SettlementChannel {
    pub fn new(invoice: LightningInvoice) -> Self {
        Self {
            invoice,
            status: ChannelStatus::Unpaid,
        }
    }
}

/// A payment intent raised by the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub amount: Sats,
    pub description: String,
    /// Contact handle for the paying party.
    pub counterparty: String,
    /// Informational due date. Once past it an unsettled invoice goes
    /// `OVERDUE`.
    pub due_at: Timestamp,
    pub created_at: Timestamp,
    pub payment_status: PaymentStatus,
    pub settlement_channel: Option<SettlementChannel>,
    /// On-chain fallback receive address, generated at creation.
    pub btc_address: Option<String>,
    /// Back-reference to the minted receipt, set once minting completes.
    pub receipt_ref: Option<ReceiptId>,
}

impl Invoice {
    /// Create a pending invoice. Description and counterparty must be
    /// non-empty; the amount type already rejects zero.
    pub fn new(
        amount: Sats,
        description: &str,
        counterparty: &str,
        due_at: Timestamp,
        now: Timestamp,
    ) -> Result<Self, PipelineError> {
        if description.trim().is_empty() {
            return Err(PipelineError::Validation(
                "description must be non-empty".to_string(),
            ));
        }
        if counterparty.trim().is_empty() {
            return Err(PipelineError::Validation(
                "counterparty must be non-empty".to_string(),
            ));
        }
        Ok(Self {
            id: InvoiceId::new(),
            amount,
            description: description.trim().to_string(),
            counterparty: counterparty.trim().to_string(),
            due_at,
            created_at: now,
            payment_status: PaymentStatus::Pending,
            settlement_channel: None,
            btc_address: None,
            receipt_ref: None,
        })
    }

    /// Attach a freshly synthesized Lightning channel.
    pub fn with_lightning_channel(mut self, now: Timestamp) -> Self {
        let invoice = LightningInvoice::synthesize(self.amount, now);
        self.settlement_channel = Some(SettlementChannel::new(invoice));
        self
    }

    /// Attach a generated on-chain receive address.
    pub fn with_onchain_address(mut self) -> Self {
        self.btc_address = Some(snet_rails::synthesize_onchain_address());
        self
    }

    /// The rail-level reference the detector polls on and the receipt
    /// records: the channel payment hash when a channel exists, the
    /// invoice id otherwise.
    pub fn settlement_reference(&self) -> String {
        match &self.settlement_channel {
            Some(channel) => channel.invoice.payment_hash.clone(),
            None => self.id.to_string(),
        }
    }

    /// Settle the invoice. Idempotent: settling an already settled
    /// invoice is a no-op. Settling an overdue invoice is rejected.
    pub fn mark_settled(&mut self) -> Result<bool, SnetError> {
        match self.payment_status {
            PaymentStatus::Settled => Ok(false),
            PaymentStatus::Overdue => Err(SnetError::InvalidTransition {
                from: "OVERDUE".to_string(),
                to: "SETTLED".to_string(),
                reason: "overdue is terminal".to_string(),
            }),
            PaymentStatus::Pending => {
                self.payment_status = PaymentStatus::Settled;
                if let Some(channel) = &mut self.settlement_channel {
                    channel.status = ChannelStatus::Settled;
                }
                Ok(true)
            }
        }
    }

    /// Mark the invoice overdue. Only a pending invoice can go overdue.
    pub fn mark_overdue(&mut self) -> Result<bool, SnetError> {
        match self.payment_status {
            PaymentStatus::Overdue => Ok(false),
            PaymentStatus::Settled => Err(SnetError::InvalidTransition {
                from: "SETTLED".to_string(),
                to: "OVERDUE".to_string(),
                reason: "settled is terminal".to_string(),
            }),
            PaymentStatus::Pending => {
                self.payment_status = PaymentStatus::Overdue;
                Ok(true)
            }
        }
    }

    /// Expire the settlement channel. Leaves `payment_status` untouched.
    /// No-op when the channel is already terminal or absent.
    pub fn expire_channel(&mut self) -> bool {
        match &mut self.settlement_channel {
            Some(channel) if channel.status == ChannelStatus::Unpaid => {
                channel.status = ChannelStatus::Expired;
                true
            }
            _ => false,
        }
    }

    /// Whether the detector should still poll this invoice.
    pub fn needs_polling(&self) -> bool {
        self.payment_status == PaymentStatus::Pending && self.settlement_channel.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> Invoice {
        let now = Timestamp::now();
        Invoice::new(
            Sats::new(50_000).unwrap(),
            "consulting",
            "alice@ln.example",
            now.plus_secs(3600),
            now,
        )
        .unwrap()
    }

    #[test]
    fn new_invoice_is_pending() {
        let inv = invoice();
        assert_eq!(inv.payment_status, PaymentStatus::Pending);
        assert!(inv.settlement_channel.is_none());
        assert!(inv.btc_address.is_none());
        assert!(inv.receipt_ref.is_none());
    }

    #[test]
    fn onchain_address_is_bech32() {
        let inv = invoice().with_onchain_address();
        assert!(inv.btc_address.unwrap().starts_with("bc1q"));
    }

    #[test]
    fn rejects_empty_fields() {
        let now = Timestamp::now();
        assert!(Invoice::new(Sats::new(1).unwrap(), "", "bob", now, now).is_err());
        assert!(Invoice::new(Sats::new(1).unwrap(), "work", "  ", now, now).is_err());
    }

    #[test]
    fn settle_is_idempotent() {
        let mut inv = invoice().with_lightning_channel(Timestamp::now());
        assert!(inv.mark_settled().unwrap());
        assert!(!inv.mark_settled().unwrap());
        assert_eq!(inv.payment_status, PaymentStatus::Settled);
        assert_eq!(
            inv.settlement_channel.as_ref().unwrap().status,
            ChannelStatus::Settled
        );
    }

    #[test]
    fn settled_cannot_go_overdue() {
        let mut inv = invoice();
        inv.mark_settled().unwrap();
        assert!(inv.mark_overdue().is_err());
    }

    #[test]
    fn overdue_cannot_settle() {
        let mut inv = invoice();
        inv.mark_overdue().unwrap();
        assert!(inv.mark_settled().is_err());
    }

    #[test]
    fn channel_expiry_leaves_payment_pending() {
        let mut inv = invoice().with_lightning_channel(Timestamp::now());
        assert!(inv.expire_channel());
        assert_eq!(inv.payment_status, PaymentStatus::Pending);
        assert_eq!(
            inv.settlement_channel.as_ref().unwrap().status,
            ChannelStatus::Expired
        );
        // Second expiry is a no-op.
        assert!(!inv.expire_channel());
    }

    #[test]
    fn settlement_reference_prefers_channel() {
        let inv = invoice();
        assert_eq!(inv.settlement_reference(), inv.id.to_string());
        let inv = invoice().with_lightning_channel(Timestamp::now());
        let hash = inv.settlement_channel.as_ref().unwrap().invoice.payment_hash.clone();
        assert_eq!(inv.settlement_reference(), hash);
    }
}
