//! OpenAPI spec assembly, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShadowNet Receipt API",
        description = "Bitcoin receipt settlement pipeline: invoices, settlement detection, on-chain receipt minting, and third-party verification.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::invoices::create_invoice,
        crate::routes::invoices::list_invoices,
        crate::routes::invoices::get_invoice,
        crate::routes::invoices::mint_invoice,
        crate::routes::pay::send_payment,
        crate::routes::receipts::get_receipt,
        crate::routes::receipts::receipts_for_invoice,
        crate::routes::receipts::receipt_count,
        crate::routes::verify::request_verification,
        crate::routes::verify::get_verification,
        crate::routes::health::health,
    ),
    tags(
        (name = "invoices", description = "Invoice lifecycle"),
        (name = "pay", description = "Outbound payments"),
        (name = "receipts", description = "Minted receipts"),
        (name = "verify", description = "Third-party verification"),
        (name = "health", description = "Probes"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
