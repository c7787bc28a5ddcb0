//! Response DTOs.

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use learnhub_core::error::FieldErrors;

/// Envelope wrapping every JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Per-field validation problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    /// Creates a failed response.
    pub fn failure(message: String, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors,
        }
    }
}

impl ApiResponse<()> {
    /// Creates a successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }
}

/// `201 Created` with the envelope.
pub type Created<T> = (StatusCode, Json<ApiResponse<T>>);

/// `200 OK` with `data`.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// `201 Created` with `data`.
pub fn created<T: Serialize>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(ApiResponse::ok(data)))
}

/// `200 OK` with a message and no data.
pub fn ok_message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message(message))
}
