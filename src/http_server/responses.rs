//! Response envelope
//!
//! Every successful reply wraps its payload in
//! `{success: true, message, data}`; failures are rendered by `ApiError`.

use axum::Json;
use serde::Serialize;

/// Success envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

/// Wraps a payload with the default "success" message.
pub fn success<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    success_with("success", data)
}

/// Wraps a payload with a custom message.
pub fn success_with<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.to_string(),
        data,
    })
}
