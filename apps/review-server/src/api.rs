//! API handlers for the review server

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use review_engine::ReviewRequest;
use review_types::{ComplianceReport, ReviewPayload};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "review-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /review
///
/// Reviews a base64-encoded PDF and mails the report to the sender. The
/// response carries the report regardless of whether the mail went out.
pub async fn handle_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<ComplianceReport>, ServerError> {
    if !state.allowed.contains(&payload.sender) {
        warn!(sender = %payload.sender, "rejected review from unlisted sender");
        return Err(ServerError::Forbidden(payload.sender));
    }

    // MIME tooling wraps base64 at 76 columns
    let encoded: String = payload
        .file
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let pdf = STANDARD
        .decode(encoded)
        .map_err(|e| ServerError::Decode(e.to_string()))?;
    info!(
        sender = %payload.sender,
        filename = %payload.filename,
        bytes = pdf.len(),
        "review requested"
    );

    let request = ReviewRequest::new(payload.sender).with_filename(payload.filename);
    let report = state.reviewer.review(&pdf, request).await?;

    Ok(Json(report))
}
