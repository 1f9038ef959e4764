//! # Payment Settlement Oracle
//!
//! The oracle answers one question: has this invoice's payment settled on
//! its rail? The settlement detector polls it on a fixed cadence, so the
//! trait is deliberately narrow and both implementations are cheap to call
//! repeatedly.
//!
//! ## Implementations
//!
//! - [`HttpPaymentOracle`]: queries a Lightning node's REST surface
//!   (`GET /v1/invoice/{payment_hash}`) with bounded retry on transport
//!   failures.
//! - [`MockPaymentOracle`]: an in-memory map scripted by tests and the
//!   local stub node.

use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::lightning::{ChannelStatus, LightningInvoice};
use crate::{BoxFuture, RailError};

/// Reports the settlement state of Lightning invoices.
pub trait PaymentOracle: Send + Sync {
    /// Current channel state for the invoice, by payment hash.
    fn invoice_status<'a>(
        &'a self,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<ChannelStatus, RailError>>;
}

/// In-memory oracle. Every invoice is `Unpaid` until a test or the stub
/// node scripts a terminal state for its payment hash.
#[derive(Debug, Default)]
pub struct MockPaymentOracle {
    states: DashMap<String, ChannelStatus>,
}

impl MockPaymentOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the state the oracle will report for this payment hash.
    pub fn set_status(&self, payment_hash: &str, status: ChannelStatus) {
        self.states.insert(payment_hash.to_string(), status);
    }

    /// Convenience for the common test path.
    pub fn settle(&self, payment_hash: &str) {
        self.set_status(payment_hash, ChannelStatus::Settled);
    }
}

impl PaymentOracle for MockPaymentOracle {
    fn invoice_status<'a>(
        &'a self,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<ChannelStatus, RailError>> {
        Box::pin(async move {
            let status = self
                .states
                .get(&invoice.payment_hash)
                .map(|s| *s)
                .unwrap_or(ChannelStatus::Unpaid);
            Ok(status)
        })
    }
}

/// Wire shape of the node's invoice lookup response.
#[derive(Debug, Deserialize)]
struct InvoiceLookupResponse {
    state: String,
}

/// REST-backed oracle for a Lightning node.
#[derive(Debug)]
pub struct HttpPaymentOracle {
    client: reqwest::Client,
    base_url: url::Url,
}

/// Transport retry schedule: three attempts with exponential backoff.
const RETRY_DELAYS_MS: [u64; 2] = [200, 400];

impl HttpPaymentOracle {
    /// Build an oracle against the node's REST base URL.
    pub fn new(base_url: url::Url, timeout_secs: u64) -> Result<Self, RailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RailError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// GET with retry on transport errors only. HTTP error statuses are
    /// protocol answers and are not retried.
    async fn get_with_retry(&self, url: url::Url) -> Result<reqwest::Response, RailError> {
        let mut last_err = None;
        for (attempt, delay_ms) in RETRY_DELAYS_MS
            .iter()
            .copied()
            .map(Some)
            .chain(std::iter::once(None))
            .enumerate()
        {
            match self.client.get(url.clone()).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!(attempt, error = %e, "oracle request failed");
                    last_err = Some(e);
                    if let Some(ms) = delay_ms {
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                    }
                }
            }
        }
        // Unreachable without a stored error: the loop only exits with one.
        Err(RailError::Unavailable(match last_err {
            Some(e) => format!("oracle unreachable after retries: {e}"),
            None => "oracle unreachable after retries".to_string(),
        }))
    }
}

impl PaymentOracle for HttpPaymentOracle {
    fn invoice_status<'a>(
        &'a self,
        invoice: &'a LightningInvoice,
    ) -> BoxFuture<'a, Result<ChannelStatus, RailError>> {
        Box::pin(async move {
            let url = self
                .base_url
                .join(&format!("v1/invoice/{}", invoice.payment_hash))
                .map_err(|e| RailError::Protocol(format!("malformed lookup URL: {e}")))?;

            let resp = self.get_with_retry(url).await?;
            if !resp.status().is_success() {
                return Err(RailError::Protocol(format!(
                    "invoice lookup returned HTTP {}",
                    resp.status()
                )));
            }

            let body: InvoiceLookupResponse = resp
                .json()
                .await
                .map_err(|e| RailError::Protocol(format!("invalid lookup response: {e}")))?;

            let status = match body.state.as_str() {
                "SETTLED" => ChannelStatus::Settled,
                "CANCELED" | "EXPIRED" => ChannelStatus::Expired,
                "OPEN" | "ACCEPTED" => ChannelStatus::Unpaid,
                other => {
                    return Err(RailError::Protocol(format!(
                        "unknown invoice state {other:?}"
                    )))
                }
            };
            debug!(payment_hash = %invoice.payment_hash, %status, "oracle lookup");
            Ok(status)
        })
    }
}
