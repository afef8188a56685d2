//! Error type mapping service failures onto `{success: false, error}` replies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::EqgenError;

#[derive(Debug)]
pub enum AppError {
    /// Bad caller input.
    Validation(String),
    NotFound(String),
    Internal(String),
}

impl From<EqgenError> for AppError {
    fn from(e: EqgenError) -> Self {
        match e {
            EqgenError::JobNotFound(_) => AppError::NotFound("Test not found".to_string()),
            e if e.is_validation() => AppError::Validation(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
