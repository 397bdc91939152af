//! # crude
//!
//! REST CRUD routes over a pluggable data access object.
//!
//! Give it something that can create, read, update, delete and count records
//! and a collection URL; crude binds the five CRUD routes, turns query strings
//! into filters, paginates list reads, hides attributes the schema does not
//! expose and answers either with JSON or with rendered views, redirects and
//! flash messages.
//!
//! ## Features
//!
//! - **Dispatcher**: create, read one, list, update and delete as independent async operations
//! - **Queries**: id mapping, `from`/`to` date ranges, owner scoping, custom list queries
//! - **Pagination**: concurrent page fetch and count, `Link` and `X-Total-Count` headers
//! - **Sanitization**: schema driven attribute visibility, replaceable by a callback
//! - **Response shaping**: JSON or views with redirects, replaceable by a custom strategy
//! - **Configuration**: TOML files and environment variables through Figment
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use crude::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let schema = SchemaMap::new()
//!         .with_field("id", FieldSchema::visible("Id"))
//!         .with_field("title", FieldSchema::visible("Title"))
//!         .with_field("draft_notes", FieldSchema::hidden("Notes"));
//!     let store = Arc::new(MemoryStore::new(schema));
//!
//!     let dispatcher = Dispatcher::new("/posts", store, config.crud.clone())?;
//!     let app: Router = CrudRoutes::new(dispatcher).router();
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod observability;
pub mod options;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod request;
pub mod routes;
pub mod sanitize;
pub mod schema;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::flash::{FlashKind, FlashMessage};
    pub use crate::handlers::{
        CrudError, CrudErrorKind, CrudOperation, DefaultShaper, Dispatcher, HttpCode, OpResult,
        Outcome, ResponseShaper, ShapeContext,
    };
    pub use crate::observability::init_tracing;
    pub use crate::options::{CrudOptions, CrudOptionsBuilder};
    pub use crate::pagination::{Page, PageParams, PaginationMeta};
    pub use crate::query::{Condition, DateRange, Query};
    pub use crate::repository::{
        DataAccess, DataAccessError, DataAccessErrorKind, DataAccessOperation, DataAccessResult,
        MemoryStore,
    };
    pub use crate::request::{CrudRequest, Identity, RequestUrl};
    pub use crate::routes::{CrudRoutes, ViewRenderer};
    pub use crate::schema::{FieldSchema, Record, SchemaMap};

    pub use axum::Router;
    pub use serde_json::{json, Value};
    pub use tracing::{debug, error, info, warn};
}
