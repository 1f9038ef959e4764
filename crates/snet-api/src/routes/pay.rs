//! # Outbound Payment Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/pay` | `send_payment` |
//!
//! Classifies the destination string once at the boundary and hands the
//! dispatch to the configured wallet provider.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use snet_core::Sats;
use snet_rails::{PaymentDispatch, WalletAddress};

use crate::error::AppError;
use crate::state::AppState;

/// Request to send a payment out of the stack's wallet.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PayRequest {
    /// BOLT11 invoice, Bitcoin address, or Cashu token.
    pub destination: String,
    /// Amount in satoshis, must be positive.
    pub amount_sats: u64,
}

/// Outcome of a dispatched payment.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayResponse {
    /// Rail the destination classified to.
    pub rail: &'static str,
    /// Rail-specific settlement reference.
    #[schema(value_type = Object)]
    pub dispatch: PaymentDispatch,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/pay", post(send_payment))
}

/// POST /v1/pay — Dispatch an outbound payment.
#[utoipa::path(
    post,
    path = "/v1/pay",
    request_body = PayRequest,
    responses(
        (status = 200, description = "Payment dispatched", body = PayResponse),
        (status = 422, description = "Unrecognized destination or bad amount", body = crate::error::ErrorBody),
        (status = 502, description = "Rail unreachable", body = crate::error::ErrorBody),
    ),
    tag = "pay"
)]
pub async fn send_payment(
    State(state): State<AppState>,
    Json(req): Json<PayRequest>,
) -> Result<impl IntoResponse, AppError> {
    let amount = Sats::new(req.amount_sats).map_err(|e| AppError::Validation(e.to_string()))?;
    let destination = WalletAddress::classify(&req.destination)?;
    let dispatch = state.wallet.send_payment(&destination, amount).await?;
    Ok((
        StatusCode::OK,
        Json(PayResponse {
            rail: destination.rail(),
            dispatch,
        }),
    ))
}
