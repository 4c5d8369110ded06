//! HTTP API errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::schema::FieldIssue;
use crate::store::StoreError;
use crate::weather::WeatherError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client errors (4xx)
    // ==================
    /// Unknown restaurant id in the path
    #[error("Restaurant not found")]
    RestaurantNotFound,

    /// Restaurant record has no usable location
    #[error("Coordinates not found")]
    CoordinatesNotFound,

    /// Duplicate name+location pair reported by the bloom filter
    #[error("Restaurant already exists")]
    DuplicateRestaurant,

    /// Request body failed validation
    #[error("invalid request body")]
    Validation(Vec<FieldIssue>),

    // ==================
    // Server errors (5xx)
    // ==================
    /// Store command failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Upstream weather lookup failed
    #[error("Could not fetch weather info")]
    Weather(#[from] WeatherError),

    /// Stored or generated payload could not be (de)serialized
    #[error("Internal server error")]
    Serialization(#[from] serde_json::Error),
}

impl From<Vec<FieldIssue>> for ApiError {
    fn from(issues: Vec<FieldIssue>) -> Self {
        ApiError::Validation(issues)
    }
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RestaurantNotFound => StatusCode::NOT_FOUND,
            ApiError::CoordinatesNotFound => StatusCode::NOT_FOUND,
            ApiError::DuplicateRestaurant => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Weather(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = match &self {
            ApiError::Validation(issues) => json!({
                "success": false,
                "errors": issues,
            }),
            other => json!({
                "success": false,
                "error": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
