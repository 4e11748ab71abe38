pub mod models;
pub mod review;

// Re-exports
pub use models::*;

use axum::{extract::State, routing::get, Json, Router};

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let total_reviews = state.review_service.count().await.unwrap_or(0);
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews,
    })
}

/// All routes of the service, bound to `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .with_state(state)
}
