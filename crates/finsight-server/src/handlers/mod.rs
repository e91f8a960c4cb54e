//! HTTP request handlers

mod analyze;
mod config;

pub use analyze::{analyze, analyze_stream};
pub use config::{config_status, configure, list_models};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// API error with a sanitized, user-facing message
///
/// Parse failures and structurally invalid requests are client errors;
/// everything else degrades inside the core (fallback classification,
/// fallback suggestions), so internal errors here are rare.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<finsight_core::Error> for ApiError {
    fn from(err: finsight_core::Error) -> Self {
        match err {
            finsight_core::Error::Parse(_)
            | finsight_core::Error::Csv(_)
            | finsight_core::Error::Json(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
