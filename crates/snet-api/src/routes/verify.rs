//! # Verification Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/v1/verify` | `request_verification` |
//! | `GET` | `/v1/verify/{verification_id}` | `get_verification` |
//!
//! `POST /v1/verify` answers immediately with the `PENDING` record; the
//! chain work runs in a background task and the caller polls the result.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use snet_core::VerificationId;
use snet_pipeline::VerificationKind;

use crate::error::AppError;
use crate::state::AppState;

/// Request to verify a receipt, proof, or underlying payment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct VerifyRequest {
    /// One of RECEIPT_ON_CHAIN, PROOF_ONLY, UNDERLYING_TRANSACTION.
    #[schema(value_type = String)]
    pub kind: VerificationKind,
    /// Receipt reference, proof id, or rail transaction reference.
    pub reference: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/verify", post(request_verification))
        .route("/v1/verify/{verification_id}", get(get_verification))
}

/// POST /v1/verify — Start a verification.
#[utoipa::path(
    post,
    path = "/v1/verify",
    request_body = VerifyRequest,
    responses(
        (status = 202, description = "Verification accepted, result pending"),
        (status = 422, description = "Malformed request body", body = crate::error::ErrorBody),
    ),
    tag = "verify"
)]
pub async fn request_verification(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    // Empty references are accepted and resolve to a terminal ERROR, so
    // the caller gets a well-formed record either way.
    let pending = state.verifier.verify(req.kind, &req.reference);
    (StatusCode::ACCEPTED, Json(pending))
}

/// GET /v1/verify/{verification_id} — Poll a verification result.
#[utoipa::path(
    get,
    path = "/v1/verify/{verification_id}",
    params(("verification_id" = Uuid, Path, description = "Verification id")),
    responses(
        (status = 200, description = "Current verification state"),
        (status = 404, description = "Unknown verification", body = crate::error::ErrorBody),
    ),
    tag = "verify"
)]
pub async fn get_verification(
    State(state): State<AppState>,
    Path(verification_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let id = VerificationId(verification_id);
    let result = state
        .verifications
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("verification {id}")))?;
    Ok(Json(result))
}
