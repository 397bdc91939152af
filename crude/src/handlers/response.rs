//! Response shaping
//!
//! Dispatcher operations end in an [`Outcome`]: a JSON payload, a view to
//! render, or a redirect carrying a flash message. The translation from an
//! operation result to an outcome is a [`ResponseShaper`] strategy;
//! [`DefaultShaper`] is used unless the embedding application installs its
//! own.
//!
//! Strategies are always invoked through [`success`] and [`failure`], which
//! sanitize records, turn missing single records into 404s and resolve error
//! status codes first. A strategy therefore only sees sanitized data and a
//! final status code.

use axum::http::StatusCode;
use serde_json::{json, Map, Value};

use super::error::CrudError;
use super::operation::{CrudOperation, HttpCode};
use crate::flash::FlashMessage;
use crate::options::CrudOptions;
use crate::pagination::Page;
use crate::request::CrudRequest;
use crate::sanitize::{sanitize, sanitize_all};
use crate::schema::{Record, SchemaMap};

/// Header carrying the unpaginated total in JSON mode
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Result of a successful data access operation
#[derive(Debug, Clone, PartialEq)]
pub enum OpResult {
    /// A single record, possibly missing
    Record(Option<Record>),
    /// An unpaginated list
    Records(Vec<Record>),
    /// One page of a list
    Page(Page),
    /// Nothing to return
    Empty,
}

/// What the HTTP layer should do with a finished operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Send a JSON body; `Value::Null` means an empty body
    Json {
        /// Response status
        status: HttpCode,
        /// Response body
        body: Value,
        /// Extra response headers
        headers: Vec<(String, String)>,
    },
    /// Render a template
    Render {
        /// Response status
        status: HttpCode,
        /// Template name
        template: String,
        /// Template context
        context: Value,
    },
    /// Redirect (303 See Other) after queuing a flash message
    Redirect {
        /// Target URL
        to: String,
        /// Message for the next render
        flash: Option<FlashMessage>,
    },
}

impl Outcome {
    /// JSON outcome without extra headers
    #[must_use]
    pub fn json(status: HttpCode, body: Value) -> Self {
        Self::Json {
            status,
            body,
            headers: Vec::new(),
        }
    }

    /// HTTP status the outcome is sent with
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json { status, .. } | Self::Render { status, .. } => status.status_code(),
            Self::Redirect { .. } => StatusCode::SEE_OTHER,
        }
    }

    /// JSON body, if this is a JSON outcome
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Json { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Extra header value by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::Json { headers, .. } => headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Redirect target, if this is a redirect
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to.as_str()),
            _ => None,
        }
    }

    /// Flash message, if this is a redirect carrying one
    #[must_use]
    pub fn flash(&self) -> Option<&FlashMessage> {
        match self {
            Self::Redirect { flash, .. } => flash.as_ref(),
            _ => None,
        }
    }
}

/// Everything a shaper may consult about the current request
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    /// The request being answered
    pub request: &'a CrudRequest,
    /// Dispatcher options
    pub options: &'a CrudOptions,
    /// Schema of the data access layer
    pub schema: &'a SchemaMap,
    /// Collection URL, e.g. `/posts`
    pub base_url: &'a str,
}

impl ShapeContext<'_> {
    /// Whether the response is JSON rather than a view
    #[must_use]
    pub fn json(&self) -> bool {
        self.options.no_views || self.request.wants_json
    }

    /// Canonical URL of a record, `base/<url_field>`
    ///
    /// Falls back to the collection URL when the record has no usable value.
    #[must_use]
    pub fn item_url(&self, record: &Record) -> String {
        match record.get(&self.options.url_field).and_then(display_value) {
            Some(key) => format!("{}/{key}", self.base_url.trim_end_matches('/')),
            None => self.base_url.to_string(),
        }
    }

    /// Human readable name of a record for flash messages
    #[must_use]
    pub fn record_name(&self, record: &Record) -> String {
        record
            .get(&self.options.name_field)
            .and_then(display_value)
            .unwrap_or_else(|| "Record".to_string())
    }

    /// Labels of visible attributes, for view contexts
    #[must_use]
    pub fn labels(&self) -> Value {
        json!(self
            .schema
            .visible_labels(&self.options.labels, self.options.expand_paths))
    }
}

/// Strategy turning operation results into outcomes
pub trait ResponseShaper: Send + Sync {
    /// Shape a successful result
    ///
    /// `result` is already sanitized.
    fn on_success(
        &self,
        ctx: &ShapeContext<'_>,
        operation: CrudOperation,
        code: HttpCode,
        result: OpResult,
    ) -> Outcome;

    /// Shape a failure
    fn on_error(
        &self,
        ctx: &ShapeContext<'_>,
        operation: CrudOperation,
        code: HttpCode,
        error: &CrudError,
    ) -> Outcome;
}

/// Sanitize a successful result and hand it to the shaper
///
/// A `readOne` or `update` result that is missing or an empty object is
/// reported as a 404 failure instead.
pub fn success<S: ResponseShaper + ?Sized>(
    shaper: &S,
    ctx: &ShapeContext<'_>,
    operation: CrudOperation,
    code: HttpCode,
    result: OpResult,
) -> Outcome {
    if operation.yields_single_record() {
        if let OpResult::Record(record) = &result {
            if record.as_ref().map_or(true, Map::is_empty) {
                return failure(shaper, ctx, CrudError::not_found(operation));
            }
        }
    }

    let result = match result {
        OpResult::Record(record) => {
            OpResult::Record(record.map(|r| sanitize(&r, ctx.schema, ctx.options)))
        }
        OpResult::Records(records) => {
            OpResult::Records(sanitize_all(&records, ctx.schema, ctx.options))
        }
        OpResult::Page(page) => OpResult::Page(Page {
            items: sanitize_all(&page.items, ctx.schema, ctx.options),
            ..page
        }),
        OpResult::Empty => OpResult::Empty,
    };

    shaper.on_success(ctx, operation, code, result)
}

/// Resolve the status of a failure and hand it to the shaper
pub fn failure<S: ResponseShaper + ?Sized>(
    shaper: &S,
    ctx: &ShapeContext<'_>,
    error: CrudError,
) -> Outcome {
    let code = error.http_code(ctx.options.data_access_error_code);
    if code == HttpCode::InternalError {
        tracing::error!(
            operation = %error.operation,
            kind = %error.kind,
            status = code.as_u16(),
            message = %error.message,
            "CRUD operation failed"
        );
    } else {
        tracing::info!(
            operation = %error.operation,
            kind = %error.kind,
            status = code.as_u16(),
            message = %error.message,
            "CRUD operation rejected"
        );
    }
    shaper.on_error(ctx, error.operation, code, &error)
}

/// JSON bodies or views with redirects and flash messages
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShaper;

impl DefaultShaper {
    fn json_success(code: HttpCode, result: OpResult) -> Outcome {
        match result {
            OpResult::Record(record) => {
                Outcome::json(code, Value::Object(record.unwrap_or_default()))
            }
            OpResult::Records(records) => Outcome::json(code, records_value(records)),
            OpResult::Page(page) => {
                let mut headers = vec![(TOTAL_COUNT_HEADER.to_string(), page.meta.total.to_string())];
                if let Some(link) = page.link {
                    headers.push(("link".to_string(), link));
                }
                Outcome::Json {
                    status: code,
                    body: records_value(page.items),
                    headers,
                }
            }
            OpResult::Empty => Outcome::json(code, Value::Null),
        }
    }

    fn view_success(
        ctx: &ShapeContext<'_>,
        operation: CrudOperation,
        code: HttpCode,
        result: OpResult,
    ) -> Outcome {
        match (operation, result) {
            (CrudOperation::Create | CrudOperation::Update, OpResult::Record(record)) => {
                let record = record.unwrap_or_default();
                let verb = if operation == CrudOperation::Create {
                    "created"
                } else {
                    "updated"
                };
                Outcome::Redirect {
                    to: ctx.item_url(&record),
                    flash: Some(FlashMessage::success(format!(
                        "{} was {verb}",
                        ctx.record_name(&record)
                    ))),
                }
            }
            (CrudOperation::Delete, _) => Outcome::Redirect {
                to: ctx.base_url.to_string(),
                flash: Some(FlashMessage::success("Record was deleted")),
            },
            (_, OpResult::Record(record)) => Outcome::Render {
                status: code,
                template: ctx.options.views.item.clone(),
                context: json!({
                    "item": record,
                    "labels": ctx.labels(),
                }),
            },
            (_, OpResult::Records(records)) => Outcome::Render {
                status: code,
                template: ctx.options.views.list.clone(),
                context: json!({
                    "items": records,
                    "labels": ctx.labels(),
                    "pagination": Value::Null,
                }),
            },
            (_, OpResult::Page(page)) => Outcome::Render {
                status: code,
                template: ctx.options.views.list.clone(),
                context: json!({
                    "items": page.items,
                    "labels": ctx.labels(),
                    "pagination": page.meta,
                }),
            },
            (_, OpResult::Empty) => Outcome::Redirect {
                to: ctx.base_url.to_string(),
                flash: None,
            },
        }
    }
}

impl ResponseShaper for DefaultShaper {
    fn on_success(
        &self,
        ctx: &ShapeContext<'_>,
        operation: CrudOperation,
        code: HttpCode,
        result: OpResult,
    ) -> Outcome {
        if ctx.json() {
            Self::json_success(code, result)
        } else {
            Self::view_success(ctx, operation, code, result)
        }
    }

    fn on_error(
        &self,
        ctx: &ShapeContext<'_>,
        _operation: CrudOperation,
        code: HttpCode,
        error: &CrudError,
    ) -> Outcome {
        if ctx.json() {
            return Outcome::json(code, json!(error.body()));
        }
        let to = ctx
            .request
            .referer
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| ctx.base_url.to_string());
        Outcome::Redirect {
            to,
            flash: Some(FlashMessage::error(error.message.clone())),
        }
    }
}

fn records_value(records: Vec<Record>) -> Value {
    Value::Array(records.into_iter().map(Value::Object).collect())
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
