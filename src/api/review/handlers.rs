use crate::api::models::*;
use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

pub async fn create_review_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    info!(chars = request.text.chars().count(), "Adding review");

    let review = state
        .review_service
        .create(request.text)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to save review: {}", e)))?;

    Ok(Json(review.into()))
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    let filter = query.filter();

    let reviews = state
        .review_service
        .query(filter.clone())
        .await
        .map_err(|e| AppError::Storage(format!("Failed to fetch reviews: {}", e)))?;

    info!(filter = ?filter, found = reviews.len(), "Listed reviews");

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}
