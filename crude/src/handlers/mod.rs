//! CRUD operation dispatch and response shaping
//!
//! [`Dispatcher`] runs the five CRUD operations against a
//! [`DataAccess`](crate::repository::DataAccess) implementation. Every
//! operation ends in an [`Outcome`] produced by a [`ResponseShaper`]: JSON for
//! API clients, or a rendered view / redirect with a flash message for
//! browsers.
//!
//! Failures are tagged [`CrudError`] values whose kind decides the HTTP
//! status:
//!
//! | kind | status |
//! |---|---|
//! | `Validation` | 400 |
//! | `Authentication` | 401 |
//! | `NotFound` | 404 |
//! | `DataAccess` caused by the request | `data_access_error_code` (400) |
//! | `DataAccess` caused by the store | 500 |
//! | `Internal` | 500 |

mod dispatcher;
mod error;
mod operation;
mod response;

pub use dispatcher::{Dispatcher, MISSING_ID};
pub use error::{CrudError, CrudErrorKind, ErrorBody, UNKNOWN_ERROR};
pub use operation::{CrudOperation, HttpCode};
pub use response::{
    failure, success, DefaultShaper, OpResult, Outcome, ResponseShaper, ShapeContext,
    TOTAL_COUNT_HEADER,
};
