//! Operation dispatcher
//!
//! [`Dispatcher`] binds one [`DataAccess`] implementation to a collection
//! URL. Each CRUD verb is an independent async method that takes a parsed
//! [`CrudRequest`] and always produces an [`Outcome`], so operations can be
//! driven directly from tests or from any HTTP layer.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use crude::handlers::Dispatcher;
//! use crude::options::CrudOptions;
//! use crude::repository::MemoryStore;
//! use crude::request::CrudRequest;
//! use crude::schema::{FieldSchema, SchemaMap};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::new(SchemaMap::new().with_field("name", FieldSchema::visible("Name")));
//! let dispatcher = Dispatcher::new("/posts", Arc::new(store), CrudOptions::default()).unwrap();
//!
//! let mut body = serde_json::Map::new();
//! body.insert("name".into(), json!("hello"));
//! let outcome = dispatcher.create(CrudRequest::new("/posts").with_body(body).json()).await;
//!
//! assert_eq!(outcome.status().as_u16(), 201);
//! assert_eq!(outcome.body(), Some(&json!({"name": "hello"})));
//! # });
//! ```

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::Instrument;

use super::error::CrudError;
use super::operation::{CrudOperation, HttpCode};
use super::response::{self, DefaultShaper, OpResult, Outcome, ResponseShaper, ShapeContext};
use crate::error::{Error, Result};
use crate::options::{CrudOptions, CrudOptionsBuilder};
use crate::pagination::{paginate, PageParams};
use crate::query::{normalize, pin_owner, process, Lookup};
use crate::repository::DataAccess;
use crate::request::CrudRequest;
use crate::sanitize::sanitize;
use crate::schema::SchemaMap;

/// Message of update requests without an id
pub const MISSING_ID: &str = "No \"id\" field passed";

/// CRUD operations over one data access object
pub struct Dispatcher<D, S = DefaultShaper> {
    base_url: String,
    data_access: Arc<D>,
    options: Arc<CrudOptions>,
    shaper: Arc<S>,
}

impl<D, S> Clone for Dispatcher<D, S> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            data_access: Arc::clone(&self.data_access),
            options: Arc::clone(&self.options),
            shaper: Arc::clone(&self.shaper),
        }
    }
}

impl<D: DataAccess> Dispatcher<D, DefaultShaper> {
    /// Create a dispatcher with the default response shaper
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidOptions`] if the options fail validation
    /// or a non-empty base URL does not start with `/`.
    pub fn new(base_url: impl Into<String>, data_access: Arc<D>, options: CrudOptions) -> Result<Self> {
        options.validate()?;
        let base_url = base_url.into();
        if !base_url.is_empty() && !base_url.starts_with('/') {
            return Err(Error::InvalidOptions(format!(
                "base URL must start with '/': {base_url}"
            )));
        }
        tracing::debug!(base_url = %base_url, "CRUD dispatcher created");
        Ok(Self {
            base_url,
            data_access,
            options: Arc::new(options),
            shaper: Arc::new(DefaultShaper),
        })
    }
}

impl<D: DataAccess, S: ResponseShaper> Dispatcher<D, S> {
    /// Replace the response shaper
    #[must_use]
    pub fn with_shaper<T: ResponseShaper>(self, shaper: T) -> Dispatcher<D, T> {
        Dispatcher {
            base_url: self.base_url,
            data_access: self.data_access,
            options: self.options,
            shaper: Arc::new(shaper),
        }
    }

    /// Current options
    #[must_use]
    pub fn options(&self) -> &CrudOptions {
        &self.options
    }

    /// Collection URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The data access object
    #[must_use]
    pub fn data_access(&self) -> &Arc<D> {
        &self.data_access
    }

    /// A dispatcher sharing this one's data access and shaper with changed
    /// options
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidOptions`] if the new options fail
    /// validation.
    pub fn reconfigure(&self, f: impl FnOnce(CrudOptionsBuilder) -> CrudOptionsBuilder) -> Result<Self> {
        let options = self.options.reconfigure(f)?;
        Ok(Self {
            options: Arc::new(options),
            ..self.clone()
        })
    }

    /// Create a record from the request body
    pub async fn create(&self, request: CrudRequest) -> Outcome {
        let operation = CrudOperation::Create;
        let result = self
            .try_create(&request)
            .instrument(tracing::debug_span!("crud", %operation, base_url = %self.base_url))
            .await;
        self.finish(&request, operation, HttpCode::Created, result)
    }

    /// Read the record addressed by the path id
    pub async fn read_one(&self, request: CrudRequest) -> Outcome {
        let operation = CrudOperation::ReadOne;
        let result = self
            .try_read_one(&request)
            .instrument(tracing::debug_span!("crud", %operation, base_url = %self.base_url))
            .await;
        self.finish(&request, operation, HttpCode::Ok, result)
    }

    /// List records, paginated unless pagination is turned off
    pub async fn read_list(&self, request: CrudRequest) -> Outcome {
        let operation = if self.options.pagination {
            CrudOperation::Paginate
        } else {
            CrudOperation::Read
        };
        let result = self
            .try_read_list(&request, operation)
            .instrument(tracing::debug_span!("crud", %operation, base_url = %self.base_url))
            .await;
        self.finish(&request, operation, HttpCode::Ok, result)
    }

    /// Update a record and return it as re-read from the store
    pub async fn update(&self, request: CrudRequest) -> Outcome {
        let operation = CrudOperation::Update;
        let result = self
            .try_update(&request)
            .instrument(tracing::debug_span!("crud", %operation, base_url = %self.base_url))
            .await;
        self.finish(&request, operation, HttpCode::Ok, result)
    }

    /// Delete the record addressed by the path id
    pub async fn delete(&self, request: CrudRequest) -> Outcome {
        let operation = CrudOperation::Delete;
        let result = self
            .try_delete(&request)
            .instrument(tracing::debug_span!("crud", %operation, base_url = %self.base_url))
            .await;
        self.finish(&request, operation, HttpCode::Ok, result)
    }

    /// Render the form for a new record
    #[must_use]
    pub fn create_view(&self, request: &CrudRequest) -> Outcome {
        let schema = self.data_access.schema();
        let ctx = self.shape_context(request, &schema);
        Outcome::Render {
            status: HttpCode::Ok,
            template: self.options.views.add.clone(),
            context: json!({
                "item": Value::Null,
                "labels": ctx.labels(),
            }),
        }
    }

    /// Render the form for the record addressed by the path id
    ///
    /// The record is looked up like [`Dispatcher::read_one`], including owner
    /// scoping, and sanitized before rendering.
    pub async fn update_view(&self, request: CrudRequest) -> Outcome {
        let operation = CrudOperation::ReadOne;
        let result = self
            .try_read_one(&request)
            .instrument(tracing::debug_span!(
                "crud",
                %operation,
                form = "edit",
                base_url = %self.base_url
            ))
            .await;

        let schema = self.data_access.schema();
        let ctx = self.shape_context(&request, &schema);
        match result {
            Ok(OpResult::Record(Some(record))) if !record.is_empty() => Outcome::Render {
                status: HttpCode::Ok,
                template: self.options.views.edit.clone(),
                context: json!({
                    "item": sanitize(&record, &schema, &self.options),
                    "labels": ctx.labels(),
                }),
            },
            Ok(_) => response::failure(&*self.shaper, &ctx, CrudError::not_found(operation)),
            Err(error) => response::failure(&*self.shaper, &ctx, error),
        }
    }

    async fn try_create(&self, request: &CrudRequest) -> std::result::Result<OpResult, CrudError> {
        let operation = CrudOperation::Create;
        let record = self
            .data_access
            .create(request.body.clone())
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;
        Ok(OpResult::Record(Some(record)))
    }

    async fn try_read_one(&self, request: &CrudRequest) -> std::result::Result<OpResult, CrudError> {
        let operation = CrudOperation::ReadOne;
        let id = request.id.as_deref().unwrap_or_default();
        let query = normalize(request, Lookup::ById(id), &self.options, operation)?;
        let record = self
            .data_access
            .read_one(&query)
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;
        Ok(OpResult::Record(record))
    }

    async fn try_read_list(
        &self,
        request: &CrudRequest,
        operation: CrudOperation,
    ) -> std::result::Result<OpResult, CrudError> {
        let query = normalize(request, Lookup::List, &self.options, operation)?;

        if operation == CrudOperation::Paginate {
            let params = PageParams::from_query(&request.query, self.options.paginate_limit);
            let page = paginate(&*self.data_access, &query, params, &request.url).await?;
            return Ok(OpResult::Page(page));
        }

        let records = self
            .data_access
            .read(&query)
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;
        Ok(OpResult::Records(records))
    }

    async fn try_update(&self, request: &CrudRequest) -> std::result::Result<OpResult, CrudError> {
        let operation = CrudOperation::Update;
        let id = request
            .body
            .get(&self.options.id_field)
            .and_then(id_text)
            .or_else(|| request.id.clone().filter(|id| !id.is_empty()))
            .ok_or_else(|| CrudError::validation(operation, MISSING_ID))?;

        let query = normalize(request, Lookup::ById(&id), &self.options, operation)?;
        let mut changes = process(&request.body);
        pin_owner(&mut changes, &query, &self.options);
        self.data_access
            .update(&query, changes)
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;

        let record = self
            .data_access
            .read_one(&query)
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;
        Ok(OpResult::Record(record))
    }

    async fn try_delete(&self, request: &CrudRequest) -> std::result::Result<OpResult, CrudError> {
        let operation = CrudOperation::Delete;
        let id = request.id.as_deref().unwrap_or_default();
        let query = normalize(request, Lookup::ById(id), &self.options, operation)?;
        self.data_access
            .delete(&query)
            .await
            .map_err(|e| CrudError::from_data_access(operation, e))?;
        Ok(OpResult::Empty)
    }

    fn finish(
        &self,
        request: &CrudRequest,
        operation: CrudOperation,
        code: HttpCode,
        result: std::result::Result<OpResult, CrudError>,
    ) -> Outcome {
        let schema = self.data_access.schema();
        let ctx = self.shape_context(request, &schema);
        match result {
            Ok(result) => {
                tracing::debug!(%operation, status = code.as_u16(), "CRUD operation succeeded");
                response::success(&*self.shaper, &ctx, operation, code, result)
            }
            Err(error) => response::failure(&*self.shaper, &ctx, error),
        }
    }

    fn shape_context<'a>(&'a self, request: &'a CrudRequest, schema: &'a SchemaMap) -> ShapeContext<'a> {
        ShapeContext {
            request,
            options: &self.options,
            schema,
            base_url: &self.base_url,
        }
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
