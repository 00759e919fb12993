//! Uniform response envelope
//!
//! Every handler returns either an [`ApiResponse<T>`] or an [`ApiError`]; both
//! serialize into the same envelope shape:
//!
//! ```text
//! success: { "statusCode": 200, "data": ..., "message": "...", "success": true }
//! failure: { "statusCode": 404, "message": "...", "success": false, "errors": [] }
//! ```

use super::error::{ApiError, FieldError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Success envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.is_success(),
        }
    }

    /// 200 OK
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 Created
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Failure envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    pub errors: Vec<FieldError>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        Self {
            status_code: err.status_code().as_u16(),
            message: err.public_message(),
            success: false,
            errors: err.field_errors().to_vec(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream(source) = &self {
            tracing::error!(error = %source, "upstream failure");
        }

        let status = self.status_code();
        (status, Json(ErrorEnvelope::from(&self))).into_response()
    }
}

/// Result alias used by every handler
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
