//! HTTP prover client.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use snet_core::{BoxFuture, Felt};

use crate::{ProofBundle, ProofError, ProofRequest, ProofService};

/// Configuration for the prover endpoint.
#[derive(Debug, Clone)]
pub struct ProofServiceConfig {
    /// Base URL of the prover.
    pub base_url: url::Url,
    /// Request timeout in seconds. Proof generation is slow; the default
    /// is 120.
    pub timeout_secs: u64,
}

impl ProofServiceConfig {
    pub fn new(base_url: url::Url) -> Self {
        Self {
            base_url,
            timeout_secs: 120,
        }
    }
}

/// Wire shape of the prover's response.
#[derive(Debug, Deserialize)]
struct ProveResponse {
    proof_id: String,
    proof_hash: String,
}

/// HTTP implementation of [`ProofService`]. POSTs the request to
/// `{base_url}/prove` and expects a JSON `{proof_id, proof_hash}` body.
#[derive(Debug)]
pub struct HttpProofService {
    client: reqwest::Client,
    config: ProofServiceConfig,
}

impl HttpProofService {
    pub fn new(config: ProofServiceConfig) -> Result<Self, ProofError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProofError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

impl ProofService for HttpProofService {
    fn generate<'a>(
        &'a self,
        request: &'a ProofRequest,
    ) -> BoxFuture<'a, Result<ProofBundle, ProofError>> {
        Box::pin(async move {
            let url = self
                .config
                .base_url
                .join("prove")
                .map_err(|e| ProofError::Protocol(format!("malformed prover URL: {e}")))?;

            let resp = self
                .client
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        ProofError::Unavailable("prover request timed out".to_string())
                    } else {
                        ProofError::Unavailable(e.to_string())
                    }
                })?;

            let status = resp.status();
            if status.is_client_error() {
                let detail = resp.text().await.unwrap_or_default();
                return Err(ProofError::Rejected(format!("HTTP {status}: {detail}")));
            }
            if !status.is_success() {
                return Err(ProofError::Unavailable(format!("HTTP {status}")));
            }

            let body: ProveResponse = resp
                .json()
                .await
                .map_err(|e| ProofError::Protocol(format!("invalid prover response: {e}")))?;

            if body.proof_id.is_empty() {
                return Err(ProofError::Protocol("prover returned empty proof_id".to_string()));
            }
            let proof_hash = Felt::from_hex(&body.proof_hash)
                .map_err(|e| ProofError::Protocol(format!("bad proof_hash: {e}")))?;

            info!(
                invoice_id = %request.invoice_id,
                proof_id = %body.proof_id,
                "proof generated"
            );
            Ok(ProofBundle {
                proof_id: body.proof_id,
                proof_hash,
                fallback: false,
            })
        })
    }
}
