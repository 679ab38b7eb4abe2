mod analytics;
mod api;
mod crawler;
mod fallback;
mod sentiment;

use axum::{routing::get, Router};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze_product, api::health),
    components(
        schemas(
            api::ErrorResponse,
            api::HealthResponse,
            crate::analytics::DashboardPayload,
            crate::analytics::ClassifiedReview,
            crate::analytics::SentimentCounts,
            crate::analytics::TrendPoint,
            crate::analytics::WordFrequency,
            crate::sentiment::Sentiment
        )
    ),
    tags(
        (name = "dashboard", description = "Review Sentiment Dashboard API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let scrape_concurrency: usize = env::var("SCRAPE_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let state = Arc::new(api::AppState {
        scrape_permits: tokio::sync::Semaphore::new(scrape_concurrency),
    });

    let app = Router::new()
        .merge(SwaggerUi::new("/review-pulse-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/analyze_product", get(api::analyze_product))
        .route("/health", get(api::health))
        // The dashboard front end runs on another origin
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
