//! Per-request CRUD errors
//!
//! Every failure the dispatcher can hand to the response shaper is a tagged
//! [`CrudError`]. The tag decides the HTTP status; nothing downstream needs
//! to introspect an opaque error value.
//!
//! # Example
//!
//! ```rust
//! use crude::handlers::{CrudError, CrudErrorKind, CrudOperation, HttpCode};
//!
//! let error = CrudError::validation(CrudOperation::Update, "No \"id\" field passed");
//! assert!(matches!(error.kind, CrudErrorKind::Validation));
//! assert_eq!(error.http_code(HttpCode::BadRequest), HttpCode::BadRequest);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::operation::{CrudOperation, HttpCode};
use crate::repository::{DataAccessError, DataAccessErrorKind};

/// Fallback message for errors that carry none
pub const UNKNOWN_ERROR: &str = "Unknown Error";

/// Category of CRUD error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudErrorKind {
    /// Malformed or missing input, never reaches the data access layer
    Validation,
    /// Owner scoping failed, never reaches the data access layer
    Authentication,
    /// No record to report
    NotFound,
    /// Failure surfaced by the data access layer
    DataAccess(DataAccessErrorKind),
    /// Anything else
    Internal,
}

impl fmt::Display for CrudErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Authentication => write!(f, "authentication"),
            Self::NotFound => write!(f, "not_found"),
            Self::DataAccess(kind) => write!(f, "data_access:{kind}"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Structured CRUD error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudError {
    /// The operation being performed when the error occurred
    pub operation: CrudOperation,
    /// The category of error
    pub kind: CrudErrorKind,
    /// Client-facing message
    pub message: String,
}

impl CrudError {
    /// Create a new CRUD error
    pub fn new(operation: CrudOperation, kind: CrudErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: normalize_message(message.into()),
        }
    }

    /// Malformed or missing input
    pub fn validation(operation: CrudOperation, message: impl Into<String>) -> Self {
        Self::new(operation, CrudErrorKind::Validation, message)
    }

    /// Owner scoping failed
    pub fn authentication(operation: CrudOperation, message: impl Into<String>) -> Self {
        Self::new(operation, CrudErrorKind::Authentication, message)
    }

    /// No record to report
    pub fn not_found(operation: CrudOperation) -> Self {
        Self::new(operation, CrudErrorKind::NotFound, "Not Found")
    }

    /// Anything else
    pub fn internal(operation: CrudOperation, message: impl Into<String>) -> Self {
        Self::new(operation, CrudErrorKind::Internal, message)
    }

    /// Wrap a data access failure
    ///
    /// Messages of server faults are replaced with a generic text; the
    /// original is logged.
    pub fn from_data_access(operation: CrudOperation, err: DataAccessError) -> Self {
        let message = match err.kind {
            DataAccessErrorKind::ConnectionFailed | DataAccessErrorKind::Timeout => {
                tracing::error!(%operation, error = %err, "Data access unavailable");
                "Service temporarily unavailable".to_string()
            }
            DataAccessErrorKind::DatabaseError | DataAccessErrorKind::SerializationError => {
                tracing::error!(%operation, error = %err, "Data access failure");
                "An internal error occurred".to_string()
            }
            _ => err.message,
        };
        Self::new(operation, CrudErrorKind::DataAccess(err.kind), message)
    }

    /// Set the operation the error is reported for
    #[must_use]
    pub fn with_operation(mut self, operation: CrudOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Prefix the message with context
    #[must_use]
    pub fn context(mut self, context: &str) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Resolve the HTTP status code
    ///
    /// `client_fault_code` is used for data access failures caused by the
    /// request (duplicates, constraint and validation failures).
    #[must_use]
    pub fn http_code(&self, client_fault_code: HttpCode) -> HttpCode {
        match self.kind {
            CrudErrorKind::Validation => HttpCode::BadRequest,
            CrudErrorKind::Authentication => HttpCode::Unauthorized,
            CrudErrorKind::NotFound | CrudErrorKind::DataAccess(DataAccessErrorKind::NotFound) => {
                HttpCode::NotFound
            }
            CrudErrorKind::DataAccess(kind) if kind.is_server_fault() => HttpCode::InternalError,
            CrudErrorKind::DataAccess(_) => client_fault_code,
            CrudErrorKind::Internal => HttpCode::InternalError,
        }
    }

    /// The JSON body sent to clients
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: true,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRUD {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for CrudError {}

/// Normalized error payload: `{"error": true, "message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `true`
    pub error: bool,
    /// Error message
    pub message: String,
}

fn normalize_message(message: String) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else if trimmed.len() == message.len() {
        message
    } else {
        trimmed.to_string()
    }
}
