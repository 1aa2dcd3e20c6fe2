//! Error types for the surveillance dashboard server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub use crate::detection::DetectionError;
use crate::detection::{FlowRejection, FrameRejection};
pub use crate::llm::LlmError;
pub use crate::security::auth::AuthError;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model loading or inference error
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Credential store error
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Session management error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Chat provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Session-specific error types
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session not found
    #[error("Session not found: {0}")]
    NotFound(String),

    /// `auth.session_ttl_secs` out of range
    #[error("Invalid session TTL: {0} seconds")]
    InvalidTtl(u64),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors surfaced to HTTP callers.
///
/// Client mistakes carry a specific message. Everything else renders a fixed,
/// non-specific message so that internal failure details never reach the
/// caller; the handler is expected to log the cause before converting.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation failure (400)
    #[error("{0}")]
    BadRequest(String),

    /// A model artifact failed to load at startup (500)
    #[error("{0}")]
    ModelUnavailable(&'static str),

    /// Preprocessing or inference failed (500)
    #[error("{0}")]
    AnalysisFailed(&'static str),

    /// Third-party API failed or returned a non-success status (500)
    #[error("{0}")]
    Upstream(&'static str),

    /// A dependent service is not configured (500)
    #[error("{0}")]
    Unavailable(&'static str),

    /// Static resource missing (404)
    #[error("Not found")]
    NotFound,

    /// Unexpected failure (500)
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ModelUnavailable(_)
            | AppError::AnalysisFailed(_)
            | AppError::Upstream(_)
            | AppError::Unavailable(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FrameRejection> for AppError {
    fn from(rejection: FrameRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

impl From<FlowRejection> for AppError {
    fn from(rejection: FlowRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
