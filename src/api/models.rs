use crate::sentiment::Sentiment;
use crate::service::ReviewService;
use crate::storage::Review;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub review_service: ReviewService,
}

/// Request to add a new review
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub text: String,
}

/// Query string of the review listing
#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub sentiment: Option<String>,
}

impl ReviewQuery {
    /// `?sentiment=` with an empty value behaves like no filter at all
    pub fn filter(self) -> Option<String> {
        self.sentiment.filter(|s| !s.is_empty())
    }
}

/// A stored review as returned by the API
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ReviewResponse {
    pub id: i64,
    pub text: String,
    pub sentiment: Sentiment,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.text,
            sentiment: review.sentiment,
            created_at: review.created_at,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The review store failed to read or write
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Storage(msg) => {
                error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
