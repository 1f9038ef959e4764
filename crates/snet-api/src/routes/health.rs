//! Health probes, mounted outside any middleware.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Records currently held in the stores.
    pub invoices: usize,
    pub receipts: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health — Liveness probe with store counts.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        invoices: state.invoices.len(),
        receipts: state.receipts.len(),
    })
}
