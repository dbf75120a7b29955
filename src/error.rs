//! Common error types for the anime portrait service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure of a single generation attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The remote call succeeded but no candidate carried inline image data
    #[error("No image data returned from API")]
    NoImageReturned,

    /// Network, timeout or non-success API response
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an image file: {0}")]
    InvalidInputKind(String),

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    #[error("Action not allowed right now: {0}")]
    PhaseConflict(String),

    #[error("No generated image available")]
    NoResult,

    #[error("Session is no longer running")]
    SessionClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
            AppError::InvalidInputKind(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "invalid_request_error",
                Some("invalid_input_kind"),
            ),
            AppError::InvalidBase64(_) => (StatusCode::BAD_REQUEST, "invalid_request_error", Some("invalid_base64")),
            AppError::Generation(GenerationFailure::NoImageReturned) => {
                (StatusCode::BAD_GATEWAY, "generation_error", Some("no_image_returned"))
            }
            AppError::Generation(GenerationFailure::Transport(_)) => {
                (StatusCode::BAD_GATEWAY, "generation_error", Some("transport"))
            }
            AppError::PhaseConflict(_) => (StatusCode::CONFLICT, "invalid_request_error", Some("phase_conflict")),
            AppError::NoResult => (StatusCode::NOT_FOUND, "not_found_error", Some("no_result")),
            AppError::SessionClosed => (StatusCode::SERVICE_UNAVAILABLE, "server_error", Some("session_closed")),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = self.classify();

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: error_type.to_string(),
                code: code.map(|c| c.to_string()),
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
