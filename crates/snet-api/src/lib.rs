//! # snet-api — Axum HTTP surface for the receipt settlement pipeline
//!
//! Thin JSON layer over `snet-pipeline`: handlers validate input, call into
//! the stores and orchestrators held by [`state::AppState`], and map domain
//! errors to HTTP status codes via [`error::AppError`].
//!
//! ## API Surface
//!
//! | Prefix                          | Module               | Domain                     |
//! |---------------------------------|----------------------|----------------------------|
//! | `/v1/invoices/*`                | [`routes::invoices`] | Payment intents + minting  |
//! | `/v1/pay`                       | [`routes::pay`]      | Outbound wallet dispatch   |
//! | `/v1/receipts/*`                | [`routes::receipts`] | Receipt lifecycle          |
//! | `/v1/verify/*`                  | [`routes::verify`]   | Verification requests      |
//! | `/health`                       | [`routes::health`]   | Liveness + store counts    |
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI spec via utoipa derive macros at `/openapi.json`.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// `/health` and `/openapi.json` are mounted alongside the API routes; the
/// surface carries no auth layer, deployments are expected to front it with
/// their own gateway.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::invoices::router())
        .merge(routes::pay::router())
        .merge(routes::receipts::router())
        .merge(routes::verify::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
