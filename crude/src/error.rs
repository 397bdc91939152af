//! Error types for crude
//!
//! [`Error`] covers setup and plumbing failures (configuration loading,
//! invalid options, session access, view rendering). Per-request CRUD
//! failures are modelled separately by [`crate::handlers::CrudError`], which
//! carries the operation and HTTP classification.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Options failed validation when building or reconfiguring a dispatcher
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A view template could not be rendered
    #[error("Render error: {0}")]
    Render(String),

    /// Session error
    #[cfg(feature = "session")]
    #[error("Session error: {0}")]
    Session(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `true`, lets clients branch on the field alone
    pub error: bool,

    /// Human readable message
    pub message: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            code: None,
        }
    }

    /// Create error response with a code
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Error::InvalidOptions(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_OPTIONS"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Error::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR"),
            #[cfg(feature = "session")]
            Error::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        tracing::error!(code, "{}", self);

        (status, Json(ErrorResponse::with_code(code, self.to_string()))).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
