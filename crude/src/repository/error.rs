//! Data access error types
//!
//! Failures surfaced by a [`DataAccess`](super::DataAccess) implementation.
//! The dispatcher never inspects the backing store's native errors; stores
//! classify them into a [`DataAccessErrorKind`] once, here.
//!
//! # Example
//!
//! ```rust
//! use crude::repository::{DataAccessError, DataAccessErrorKind, DataAccessOperation};
//!
//! let error = DataAccessError::already_exists("email is taken");
//! assert!(matches!(error.kind, DataAccessErrorKind::AlreadyExists));
//! assert_eq!(error.operation, DataAccessOperation::Create);
//! ```

use std::fmt;

/// Data access call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataAccessOperation {
    /// `create`
    Create,
    /// `read`
    Read,
    /// `read_limit`
    ReadLimit,
    /// `read_one`
    ReadOne,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `count`
    Count,
}

impl fmt::Display for DataAccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::ReadLimit => write!(f, "read_limit"),
            Self::ReadOne => write!(f, "read_one"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// Category of data access error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataAccessErrorKind {
    /// No record matched
    NotFound,
    /// A record with the same identity already exists
    AlreadyExists,
    /// Store constraint violation (uniqueness, foreign key, ...)
    ConstraintViolation,
    /// The store rejected the record as invalid
    ValidationFailed,
    /// Could not reach the store
    ConnectionFailed,
    /// The store did not answer in time
    Timeout,
    /// Unclassified store failure
    DatabaseError,
    /// Record could not be encoded or decoded
    SerializationError,
    /// Anything else
    Other,
}

impl fmt::Display for DataAccessErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl DataAccessErrorKind {
    /// Whether the failure lies with the store rather than the request
    ///
    /// Server faults are reported as 500 and their messages are not shown to
    /// clients.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed | Self::Timeout | Self::DatabaseError | Self::SerializationError
        )
    }
}

/// Structured data access error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessError {
    /// The call that failed
    pub operation: DataAccessOperation,
    /// The category of error
    pub kind: DataAccessErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl DataAccessError {
    /// Create a new data access error
    pub fn new(
        operation: DataAccessOperation,
        kind: DataAccessErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// No record matched the query
    pub fn not_found(operation: DataAccessOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DataAccessErrorKind::NotFound, message)
    }

    /// Duplicate record on create
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(
            DataAccessOperation::Create,
            DataAccessErrorKind::AlreadyExists,
            message,
        )
    }

    /// The store rejected the record
    pub fn validation_failed(operation: DataAccessOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DataAccessErrorKind::ValidationFailed, message)
    }

    /// The store could not be reached
    pub fn connection_failed(operation: DataAccessOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DataAccessErrorKind::ConnectionFailed, message)
    }

    /// Set the failed call
    #[must_use]
    pub fn with_operation(mut self, operation: DataAccessOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for DataAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data access {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for DataAccessError {}
