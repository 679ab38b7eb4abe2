//! HTTP surface and request orchestration.
//!
//! One query endpoint: try the live scrape, degrade to the synthetic
//! corpus when it comes back empty, and route either batch through the
//! aggregation engine. The caller only ever sees a 400 for missing input
//! or a populated payload.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::analytics::{aggregate, DashboardPayload};
use crate::crawler::{self, RawReview};
use crate::fallback::generate_fallback_reviews;

/// Fixed prefix marking the first review of a fallback payload. Kept in
/// addition to the structured `isFallback` flag so the sample itself reads
/// as simulated.
const DISCLOSURE_PREFIX: &str =
    "[Note: Real-time scraping was blocked. Showing simulated data for";

pub struct AppState {
    /// Bounds simultaneous Chrome sessions across requests.
    pub scrape_permits: tokio::sync::Semaphore,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyzeParams {
    /// Product name or search term.
    pub product: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Build the sentiment dashboard for a product query.
#[utoipa::path(
    get,
    path = "/api/analyze_product",
    params(AnalyzeParams),
    responses(
        (status = 200, description = "Dashboard payload, live or fallback data", body = DashboardPayload),
        (status = 400, description = "Missing product parameter", body = ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn analyze_product(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<DashboardPayload>, (StatusCode, Json<ErrorResponse>)> {
    let product = match params.product.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { message: "No product provided".to_string() }),
            ))
        }
    };

    // The permit covers only the live acquisition; aggregation and the
    // fallback path run without holding a Chrome slot.
    let raw = match state.scrape_permits.acquire().await {
        Ok(_permit) => crawler::acquire_reviews(&product).await,
        // The semaphore is never closed; if it somehow is, behave like a
        // blocked scrape rather than erroring out.
        Err(_) => Vec::new(),
    };

    Ok(Json(build_dashboard(&product, raw)))
}

/// Route acquisition output through the aggregation engine, substituting
/// the synthetic corpus when the live scrape came back empty.
pub fn build_dashboard(product: &str, raw: Vec<RawReview>) -> DashboardPayload {
    let mut payload = if raw.is_empty() {
        warn!("📉 No live reviews for '{}'. Switching to synthetic fallback.", product);
        let mut payload = aggregate(&generate_fallback_reviews(product));
        payload.is_fallback = true;
        // The note goes on after aggregation so classification always runs
        // on the clean template text.
        if let Some(first) = payload.reviews.first_mut() {
            first.text = format!("{} {}] {}", DISCLOSURE_PREFIX, product, first.text);
        }
        payload
    } else {
        info!("Aggregating {} live reviews for '{}'", raw.len(), product);
        aggregate(&raw)
    };

    payload.product_name = product.to_string();
    payload
}

/// Service liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "dashboard"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}
