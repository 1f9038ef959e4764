//! Cashu mint adapter.
//!
//! The mint swaps between Lightning liquidity and bearer ecash tokens.
//! Two swaps matter to the pipeline: paying a Lightning invoice in
//! exchange for a token (`lightning_to_ecash`) and redeeming a token to
//! pay an invoice out (`ecash_to_lightning`).

use rand::Rng;
use serde::{Deserialize, Serialize};

use snet_core::Sats;

use crate::lightning::LightningInvoice;
use crate::{BoxFuture, RailError};

/// A bearer ecash token issued by a mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcashToken(String);

impl EcashToken {
    /// Wrap an externally supplied token after a shape check. Cashu
    /// tokens carry the `cashuA` serialization prefix.
    pub fn parse(raw: &str) -> Result<Self, RailError> {
        if !raw.starts_with("cashu") || raw.len() < 16 {
            return Err(RailError::InvalidTarget(format!(
                "not a cashu token: {raw:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Mint-side swaps between Lightning and ecash.
pub trait CashuMint: Send + Sync {
    /// Pay the invoice through the mint and receive a token for the
    /// amount, minus mint fees.
    fn lightning_to_ecash<'a>(
        &'a self,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<EcashToken, RailError>>;

    /// Redeem a token to pay an outbound invoice.
    fn ecash_to_lightning<'a>(
        &'a self,
        token: &'a EcashToken,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<(), RailError>>;
}

/// In-memory mint. Issues random tokens and accepts only tokens it has
/// issued, tracking the amount each token carries.
#[derive(Debug, Default)]
pub struct MockCashuMint {
    issued: dashmap::DashMap<String, u64>,
}

impl MockCashuMint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding issued tokens.
    pub fn outstanding(&self) -> usize {
        self.issued.len()
    }
}

impl CashuMint for MockCashuMint {
    fn lightning_to_ecash<'a>(
        &'a self,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<EcashToken, RailError>> {
        Box::pin(async move {
            let mut rng = rand::thread_rng();
            let body: String = (0..32)
                .map(|_| {
                    const CHARSET: &[u8] =
                        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
                    CHARSET[rng.gen_range(0..CHARSET.len())] as char
                })
                .collect();
            let raw = format!("cashuA{body}");
            self.issued.insert(raw.clone(), invoice.amount_msat);
            Ok(EcashToken(raw))
        })
    }

    fn ecash_to_lightning<'a>(
        &'a self,
        token: &'a EcashToken,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<(), RailError>> {
        Box::pin(async move {
            let (_, amount_msat) = self
                .issued
                .remove(token.as_str())
                .ok_or_else(|| RailError::SwapRejected("unknown or spent token".to_string()))?;
            if amount_msat < invoice.amount_msat {
                // Double-spend protection already consumed the token.
                return Err(RailError::SwapRejected(format!(
                    "token covers {amount_msat} msat, invoice asks {}",
                    invoice.amount_msat
                )));
            }
            Ok(())
        })
    }
}

/// Mint fee reserve applied when quoting a Lightning-to-ecash swap, in
/// parts per thousand.
pub const MINT_FEE_RESERVE_PPK: u64 = 10;

/// Amount the mint will actually deliver for a requested swap amount.
pub fn net_of_mint_fee(amount: Sats) -> u64 {
    let msat = amount.as_msat();
    msat - msat * MINT_FEE_RESERVE_PPK / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use snet_core::Timestamp;

    fn invoice(sats: u64) -> LightningInvoice {
        LightningInvoice::synthesize(Sats::new(sats).unwrap(), Timestamp::now())
    }

    #[test]
    fn token_parse_shape() {
        assert!(EcashToken::parse("cashuAeyJ0b2tlbiI6W3si").is_ok());
        assert!(EcashToken::parse("lnbc10n1p...").is_err());
        assert!(EcashToken::parse("cashu").is_err());
    }

    #[tokio::test]
    async fn swap_roundtrip() {
        let mint = MockCashuMint::new();
        let inv = invoice(5_000);
        let token = mint.lightning_to_ecash(&inv).await.unwrap();
        assert!(token.as_str().starts_with("cashuA"));
        assert_eq!(mint.outstanding(), 1);

        let out = invoice(5_000);
        mint.ecash_to_lightning(&token, &out).await.unwrap();
        assert_eq!(mint.outstanding(), 0);
    }

    #[tokio::test]
    async fn double_spend_is_rejected() {
        let mint = MockCashuMint::new();
        let inv = invoice(1_000);
        let token = mint.lightning_to_ecash(&inv).await.unwrap();
        mint.ecash_to_lightning(&token, &inv).await.unwrap();
        assert!(matches!(
            mint.ecash_to_lightning(&token, &inv).await,
            Err(RailError::SwapRejected(_))
        ));
    }

    #[tokio::test]
    async fn undervalued_token_is_rejected() {
        let mint = MockCashuMint::new();
        let small = invoice(100);
        let token = mint.lightning_to_ecash(&small).await.unwrap();
        let big = invoice(10_000);
        assert!(matches!(
            mint.ecash_to_lightning(&token, &big).await,
            Err(RailError::SwapRejected(_))
        ));
    }

    #[test]
    fn fee_reserve_math() {
        let net = net_of_mint_fee(Sats::new(1_000).unwrap());
        assert_eq!(net, 990_000);
    }
}
