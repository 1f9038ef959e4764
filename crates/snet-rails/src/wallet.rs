//! Outbound wallet dispatch.
//!
//! A [`WalletAddress`] tags its rail explicitly. Callers that receive a
//! bare string classify it once at the boundary with
//! [`WalletAddress::classify`]; everything downstream matches on the tag
//! instead of re-inspecting string shape.

use serde::{Deserialize, Serialize};

use snet_core::Sats;

use crate::cashu::EcashToken;
use crate::lightning::LightningInvoice;
use crate::{BoxFuture, RailError};

/// A payment destination, tagged by rail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletAddress {
    /// A BOLT11 payment request.
    Lightning { bolt11: String },
    /// A Bitcoin address (bech32 or legacy).
    OnChain { address: String },
    /// A Cashu bearer token to redeem.
    Ecash { token: EcashToken },
}

impl WalletAddress {
    /// Classify a raw destination string by its rail.
    pub fn classify(raw: &str) -> Result<Self, RailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RailError::InvalidTarget("empty destination".to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("lnbc") || lower.starts_with("lntb") {
            LightningInvoice::validate_bolt11(trimmed)?;
            return Ok(WalletAddress::Lightning {
                bolt11: trimmed.to_string(),
            });
        }
        if lower.starts_with("cashu") {
            return Ok(WalletAddress::Ecash {
                token: EcashToken::parse(trimmed)?,
            });
        }
        if lower.starts_with("bc1") || lower.starts_with("tb1") {
            if trimmed.len() < 14 {
                return Err(RailError::InvalidTarget(format!(
                    "bech32 address too short: {trimmed:?}"
                )));
            }
            return Ok(WalletAddress::OnChain {
                address: trimmed.to_string(),
            });
        }
        if trimmed.starts_with('1') || trimmed.starts_with('3') {
            return Ok(WalletAddress::OnChain {
                address: trimmed.to_string(),
            });
        }
        Err(RailError::InvalidTarget(format!(
            "unrecognized destination: {trimmed:?}"
        )))
    }

    /// Rail name for logs.
    pub fn rail(&self) -> &'static str {
        match self {
            WalletAddress::Lightning { .. } => "lightning",
            WalletAddress::OnChain { .. } => "onchain",
            WalletAddress::Ecash { .. } => "ecash",
        }
    }
}

/// Record of an outbound payment handed to a rail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDispatch {
    /// Rail-specific settlement reference: preimage hash for Lightning,
    /// txid for on-chain, mint quote id for ecash.
    pub reference: String,
    /// Amount dispatched.
    pub amount: Sats,
}

/// Sends payments out of the stack's wallet.
pub trait WalletProvider: Send + Sync {
    fn send_payment<'a>(
        &'a self,
        destination: &'a WalletAddress,
        amount: Sats,
    ) -> BoxFuture<'a, Result<PaymentDispatch, RailError>>;
}

/// In-memory wallet that records every dispatch.
#[derive(Debug, Default)]
pub struct MockWalletProvider {
    sent: parking_lot::Mutex<Vec<PaymentDispatch>>,
}

impl MockWalletProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dispatch made so far.
    pub fn dispatches(&self) -> Vec<PaymentDispatch> {
        self.sent.lock().clone()
    }
}

impl WalletProvider for MockWalletProvider {
    fn send_payment<'a>(
        &'a self,
        destination: &'a WalletAddress,
        amount: Sats,
    ) -> BoxFuture<'a, Result<PaymentDispatch, RailError>> {
        Box::pin(async move {
            let reference = match destination {
                WalletAddress::Lightning { bolt11 } => format!("preimage:{bolt11}"),
                WalletAddress::OnChain { address } => format!("txid:{address}"),
                WalletAddress::Ecash { token } => format!("quote:{}", token.as_str()),
            };
            let dispatch = PaymentDispatch { reference, amount };
            self.sent.lock().push(dispatch.clone());
            Ok(dispatch)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lightning() {
        let addr = WalletAddress::classify("lnbc2500n1pabcdefgh").unwrap();
        assert_eq!(addr.rail(), "lightning");
    }

    #[test]
    fn classify_onchain_bech32_and_legacy() {
        let addr =
            WalletAddress::classify("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4").unwrap();
        assert_eq!(addr.rail(), "onchain");

        let legacy = WalletAddress::classify("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2").unwrap();
        assert_eq!(legacy.rail(), "onchain");
    }

    #[test]
    fn classify_ecash() {
        let addr = WalletAddress::classify("cashuAeyJ0b2tlbiI6W3si").unwrap();
        assert_eq!(addr.rail(), "ecash");
    }

    #[test]
    fn classify_rejects_garbage() {
        assert!(WalletAddress::classify("").is_err());
        assert!(WalletAddress::classify("   ").is_err());
        assert!(WalletAddress::classify("not-an-address").is_err());
        assert!(WalletAddress::classify("bc1").is_err());
    }

    #[test]
    fn serde_tags_the_rail() {
        let addr = WalletAddress::OnChain {
            address: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
        };
        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(json["rail"], "ON_CHAIN");
    }

    #[tokio::test]
    async fn mock_wallet_records_dispatches() {
        let wallet = MockWalletProvider::new();
        let addr = WalletAddress::classify("lnbc100n1pabcdefgh").unwrap();
        let amount = Sats::new(100).unwrap();
        let dispatch = wallet.send_payment(&addr, amount).await.unwrap();
        assert!(dispatch.reference.starts_with("preimage:"));
        assert_eq!(wallet.dispatches().len(), 1);
    }
}
