//! # Invoice Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/invoices` | `create_invoice` |
//! | `GET` | `/v1/invoices` | `list_invoices` |
//! | `GET` | `/v1/invoices/{invoice_id}` | `get_invoice` |
//! | `POST` | `/v1/invoices/{invoice_id}/mint` | `mint_invoice` |

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use snet_core::{InvoiceId, Sats, Timestamp};
use snet_pipeline::Invoice;

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to raise a new invoice.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    /// Amount in satoshis, must be positive.
    pub amount_sats: u64,
    /// What the payment is for.
    pub description: String,
    /// Contact handle of the paying party.
    pub counterparty: String,
    /// RFC 3339 due date.
    pub due_at: String,
    /// Attach a Lightning settlement channel (default true).
    #[serde(default = "default_true")]
    pub lightning: bool,
}

fn default_true() -> bool {
    true
}

impl CreateInvoiceRequest {
    fn validate(&self) -> Result<(Sats, Timestamp), AppError> {
        let amount = Sats::new(self.amount_sats)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let due_at = Timestamp::parse(&self.due_at)
            .map_err(|e| AppError::Validation(format!("due_at: {e}")))?;
        Ok((amount, due_at))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/invoices", post(create_invoice).get(list_invoices))
        .route("/v1/invoices/{invoice_id}", get(get_invoice))
        .route("/v1/invoices/{invoice_id}/mint", post(mint_invoice))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/invoices — Raise an invoice.
#[utoipa::path(
    post,
    path = "/v1/invoices",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created"),
        (status = 422, description = "Validation failure", body = crate::error::ErrorBody),
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (amount, due_at) = req.validate()?;
    let now = Timestamp::now();
    let mut invoice = Invoice::new(amount, &req.description, &req.counterparty, due_at, now)?
        .with_onchain_address();
    if req.lightning {
        invoice = invoice.with_lightning_channel(now);
    }
    let id = state.invoices.insert(invoice);
    // Re-read rather than clone: the store owns the record.
    let stored = state
        .invoices
        .get(id)
        .ok_or_else(|| AppError::Internal("invoice vanished after insert".to_string()))?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /v1/invoices — List all invoices.
#[utoipa::path(
    get,
    path = "/v1/invoices",
    responses((status = 200, description = "All invoices")),
    tag = "invoices"
)]
pub async fn list_invoices(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.invoices.list())
}

/// GET /v1/invoices/{invoice_id} — Fetch one invoice.
#[utoipa::path(
    get,
    path = "/v1/invoices/{invoice_id}",
    params(("invoice_id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "The invoice"),
        (status = 404, description = "Unknown invoice", body = crate::error::ErrorBody),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let id = InvoiceId(invoice_id);
    let invoice = state
        .invoices
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;
    Ok(Json(invoice))
}

/// POST /v1/invoices/{invoice_id}/mint — Manually start (or retry)
/// minting for a settled invoice. The detector normally does this
/// automatically; the endpoint exists for retry after a failed attempt.
#[utoipa::path(
    post,
    path = "/v1/invoices/{invoice_id}/mint",
    params(("invoice_id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 201, description = "Receipt opened and driven to a terminal phase"),
        (status = 404, description = "Unknown invoice", body = crate::error::ErrorBody),
        (status = 409, description = "Invoice not settled or receipt already exists", body = crate::error::ErrorBody),
    ),
    tag = "invoices"
)]
pub async fn mint_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let receipt_id = state.minter.start_minting(InvoiceId(invoice_id)).await?;
    let receipt = state
        .receipts
        .get(receipt_id)
        .ok_or_else(|| AppError::Internal("receipt vanished after minting".to_string()))?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
