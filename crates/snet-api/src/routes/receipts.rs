//! # Receipt Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/v1/receipts/count` | `receipt_count` |
//! | `GET` | `/v1/receipts/{receipt_id}` | `get_receipt` |
//! | `GET` | `/v1/invoices/{invoice_id}/receipts` | `receipts_for_invoice` |

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use snet_core::{InvoiceId, ReceiptId};

use crate::error::AppError;
use crate::state::AppState;

/// On-chain receipt counter, read from the contract.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptCountResponse {
    /// Hex-rendered counter value.
    pub count: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/receipts/count", get(receipt_count))
        .route("/v1/receipts/{receipt_id}", get(get_receipt))
        .route("/v1/invoices/{invoice_id}/receipts", get(receipts_for_invoice))
}

/// GET /v1/receipts/{receipt_id} — Fetch a receipt with its phase
/// history.
#[utoipa::path(
    get,
    path = "/v1/receipts/{receipt_id}",
    params(("receipt_id" = Uuid, Path, description = "Receipt id")),
    responses(
        (status = 200, description = "The receipt"),
        (status = 404, description = "Unknown receipt", body = crate::error::ErrorBody),
    ),
    tag = "receipts"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let id = ReceiptId(receipt_id);
    let receipt = state
        .receipts
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("receipt {id}")))?;
    Ok(Json(receipt))
}

/// GET /v1/invoices/{invoice_id}/receipts — Every mint attempt for an
/// invoice, failed ones included.
#[utoipa::path(
    get,
    path = "/v1/invoices/{invoice_id}/receipts",
    params(("invoice_id" = Uuid, Path, description = "Invoice id")),
    responses((status = 200, description = "Receipts for the invoice")),
    tag = "receipts"
)]
pub async fn receipts_for_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    Json(state.receipts.for_invoice(InvoiceId(invoice_id)))
}

/// GET /v1/receipts/count — The contract's receipt counter.
#[utoipa::path(
    get,
    path = "/v1/receipts/count",
    responses(
        (status = 200, description = "On-chain receipt count", body = ReceiptCountResponse),
        (status = 502, description = "Chain unreachable", body = crate::error::ErrorBody),
    ),
    tag = "receipts"
)]
pub async fn receipt_count(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let values = state
        .chain
        .call("get_receipt_count", &[])
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    let count = values
        .first()
        .map(|f| f.to_hex())
        .unwrap_or_else(|| "0x0".to_string());
    Ok(Json(ReceiptCountResponse { count }))
}
