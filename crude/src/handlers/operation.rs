//! Operation tags and the HTTP status codes the dispatcher emits

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// CRUD operation a success or error is reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrudOperation {
    /// Creating a record
    Create,
    /// Listing records without pagination
    Read,
    /// Reading a single record
    ReadOne,
    /// Listing a page of records
    Paginate,
    /// Updating a record
    Update,
    /// Deleting a record
    Delete,
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::ReadOne => write!(f, "readOne"),
            Self::Paginate => write!(f, "paginate"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl CrudOperation {
    /// Whether the operation resolves a single record that may be missing
    #[must_use]
    pub const fn yields_single_record(&self) -> bool {
        matches!(self, Self::ReadOne | Self::Update)
    }
}

/// HTTP status codes used by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum HttpCode {
    /// 200
    Ok,
    /// 201
    Created,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 404
    NotFound,
    /// 500
    InternalError,
}

impl HttpCode {
    /// Numeric status code
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    /// The matching axum status code
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the code signals success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Created)
    }
}

impl fmt::Display for HttpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl From<HttpCode> for u16 {
    fn from(code: HttpCode) -> Self {
        code.as_u16()
    }
}

impl TryFrom<u16> for HttpCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(Self::Ok),
            201 => Ok(Self::Created),
            400 => Ok(Self::BadRequest),
            401 => Ok(Self::Unauthorized),
            404 => Ok(Self::NotFound),
            500 => Ok(Self::InternalError),
            other => Err(format!("unsupported status code {other}")),
        }
    }
}
