//! BOLT11 invoice model and channel settlement states.

use rand::Rng;
use serde::{Deserialize, Serialize};

use snet_core::{Sats, Timestamp};

use crate::RailError;

/// Default invoice lifetime: 15 minutes.
pub const DEFAULT_INVOICE_EXPIRY_SECS: i64 = 15 * 60;

/// Settlement state of a Lightning invoice as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelStatus {
    /// Invoice is open and unpaid.
    Unpaid,
    /// The HTLC settled; funds are committed.
    Settled,
    /// The invoice expired or was cancelled before settlement.
    Expired,
}

impl ChannelStatus {
    /// Whether this state can never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelStatus::Settled | ChannelStatus::Expired)
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChannelStatus::Unpaid => "UNPAID",
            ChannelStatus::Settled => "SETTLED",
            ChannelStatus::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// A Lightning invoice bound to a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightningInvoice {
    /// The BOLT11 payment request string.
    pub bolt11: String,
    /// Hex-encoded payment hash (32 bytes).
    pub payment_hash: String,
    /// Requested amount in millisatoshis.
    pub amount_msat: u64,
    /// Absolute expiry of the payment request.
    pub expires_at: Timestamp,
}

impl LightningInvoice {
    /// Synthesize an invoice for the given amount with a random payment
    /// hash. Used by the built-in node stub; a production deployment asks
    /// the Lightning node for a real payment request instead.
    pub fn synthesize(amount: Sats, now: Timestamp) -> Self {
        let mut rng = rand::thread_rng();
        let hash_bytes: [u8; 32] = rng.gen();
        let payment_hash: String = hash_bytes.iter().map(|b| format!("{b:02x}")).collect();
        // Shape follows real BOLT11 prefixes closely enough for parsers
        // that only look at the hrp: lnbc<amount>n1p<data>.
        let bolt11 = format!("lnbc{}n1p{}", amount.as_u64(), &payment_hash[..24]);
        Self {
            bolt11,
            payment_hash,
            amount_msat: amount.as_msat(),
            expires_at: now.plus_secs(DEFAULT_INVOICE_EXPIRY_SECS),
        }
    }

    /// Whether the invoice has expired at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.has_passed(now)
    }

    /// Structural validation of an externally supplied BOLT11 string.
    /// Checks the human-readable prefix only; full bech32 decoding is the
    /// node's job.
    pub fn validate_bolt11(bolt11: &str) -> Result<(), RailError> {
        let lower = bolt11.to_ascii_lowercase();
        if !(lower.starts_with("lnbc") || lower.starts_with("lntb") || lower.starts_with("lnbcrt"))
        {
            return Err(RailError::InvalidTarget(format!(
                "not a BOLT11 payment request: {bolt11:?}"
            )));
        }
        if lower.len() < 15 {
            return Err(RailError::InvalidTarget(
                "BOLT11 payment request too short".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate a plausible bech32 on-chain receive address. Stub-only, like
/// [`LightningInvoice::synthesize`].
pub fn synthesize_onchain_address() -> String {
    const CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
    let mut rng = rand::thread_rng();
    let body: String = (0..38)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("bc1q{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_invoice_shape() {
        let now = Timestamp::now();
        let inv = LightningInvoice::synthesize(Sats::new(2_500).unwrap(), now);
        assert!(inv.bolt11.starts_with("lnbc2500n1p"));
        assert_eq!(inv.payment_hash.len(), 64);
        assert_eq!(inv.amount_msat, 2_500_000);
        assert!(!inv.is_expired(now));
        assert!(inv.is_expired(now.plus_secs(DEFAULT_INVOICE_EXPIRY_SECS + 1)));
    }

    #[test]
    fn bolt11_validation() {
        assert!(LightningInvoice::validate_bolt11("lnbc2500n1pabcdefgh").is_ok());
        assert!(LightningInvoice::validate_bolt11("lntb100n1pabcdefgh").is_ok());
        assert!(LightningInvoice::validate_bolt11("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7k").is_err());
        assert!(LightningInvoice::validate_bolt11("lnbc").is_err());
    }

    #[test]
    fn onchain_address_shape() {
        let addr = synthesize_onchain_address();
        assert!(addr.starts_with("bc1q"));
        assert_eq!(addr.len(), 42);
    }

    #[test]
    fn channel_status_serde_is_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ChannelStatus::Settled).unwrap(),
            "\"SETTLED\""
        );
        let parsed: ChannelStatus = serde_json::from_str("\"EXPIRED\"").unwrap();
        assert_eq!(parsed, ChannelStatus::Expired);
    }

    #[test]
    fn terminal_states() {
        assert!(!ChannelStatus::Unpaid.is_terminal());
        assert!(ChannelStatus::Settled.is_terminal());
        assert!(ChannelStatus::Expired.is_terminal());
    }
}
