//! Request parameters to data access queries
//!
//! A [`Query`] maps record attributes to a [`Condition`]: either an equality
//! value or a date range. Its JSON form is what data access implementations
//! receive, e.g. `{"b": "2", "createdAt": {"between": ["X", "Y"]}}`.
//!
//! # Example
//!
//! ```rust
//! use crude::handlers::CrudOperation;
//! use crude::options::CrudOptions;
//! use crude::query::{normalize, Lookup};
//! use crude::request::CrudRequest;
//! use serde_json::json;
//!
//! let options = CrudOptions::default();
//! let request = CrudRequest::new("/posts")
//!     .with_query("b", "2")
//!     .with_query("from", "100")
//!     .with_query("page", "3");
//!
//! let query = normalize(&request, Lookup::List, &options, CrudOperation::Paginate).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&query).unwrap(),
//!     json!({"b": "2", "createdAt": {"gte": "100"}})
//! );
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::{CrudError, CrudOperation};
use crate::options::CrudOptions;
use crate::request::CrudRequest;
use crate::schema::Record;

/// Query-string keys that never become filters
pub const RESERVED_PARAMS: [&str; 4] = ["page", "show", "from", "to"];

/// Message of owner scoping failures
pub const NOT_ALLOWED: &str = "Not Allowed";

/// Date range filter on the configured date attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// On or after
    Gte(String),
    /// On or before
    Lte(String),
    /// Inclusive on both ends
    Between([String; 2]),
}

impl DateRange {
    /// Whether a value falls inside the range
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        let at_least = |bound: &str| compare(value, bound).is_some_and(Ordering::is_ge);
        let at_most = |bound: &str| compare(value, bound).is_some_and(Ordering::is_le);
        match self {
            Self::Gte(from) => at_least(from),
            Self::Lte(to) => at_most(to),
            Self::Between([from, to]) => at_least(from) && at_most(to),
        }
    }
}

/// Condition on a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Date range
    Range(DateRange),
    /// Equality
    Equals(Value),
}

impl Condition {
    /// Whether an attribute value satisfies the condition
    ///
    /// Equality is loose across strings and scalars: the query-string value
    /// `"2"` matches the stored number `2`.
    #[must_use]
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Range(range), Some(value)) => range.contains(value),
            (Self::Range(_), None) => false,
            (Self::Equals(expected), Some(actual)) => loosely_equal(expected, actual),
            (Self::Equals(expected), None) => expected.is_null(),
        }
    }
}

/// Normalized query handed to the data access layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    conditions: BTreeMap<String, Condition>,
}

impl Query {
    /// Create an empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality condition builder
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .insert(field.into(), Condition::Equals(value.into()));
        self
    }

    /// Set the condition for an attribute
    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) {
        self.conditions.insert(field.into(), condition);
    }

    /// Condition for an attribute
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    /// Add conditions, replacing existing ones on the same attribute
    pub fn extend(&mut self, other: Self) {
        self.conditions.extend(other.conditions);
    }

    /// Iterate over conditions in attribute order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    /// Number of conditions
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether the query matches every record
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether a record satisfies every condition
    ///
    /// Dotted attributes (`profile.city`) are resolved through nested
    /// objects when the record has no attribute by that literal name.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.matches(lookup_path(record, field)))
    }
}

/// Which records an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// A single record by its id
    ById(&'a str),
    /// A collection filtered by the query string
    List,
}

/// Build the data access query for a request
///
/// # Errors
///
/// Returns an authentication error when owner scoping is enabled and the
/// request identity has no usable owner value.
pub fn normalize(
    request: &CrudRequest,
    lookup: Lookup<'_>,
    options: &CrudOptions,
    operation: CrudOperation,
) -> Result<Query, CrudError> {
    let mut query = match lookup {
        Lookup::ById(id) => Query::new().eq(options.id_field.clone(), id),
        Lookup::List => {
            let mut base = match (&options.paginate_query, options.pagination) {
                (Some(hook), true) => hook.call(request),
                _ => Query::new(),
            };
            base.extend(parse_query_params(&request.query, &options.date_field));
            base
        }
    };

    scope_owner(&mut query, request, options, operation)?;
    Ok(query)
}

/// Turn query-string parameters into filters
///
/// Every key except [`RESERVED_PARAMS`] becomes an equality filter; `from`
/// and `to` become a range on `date_field`. Empty values count as absent.
#[must_use]
pub fn parse_query_params(params: &BTreeMap<String, String>, date_field: &str) -> Query {
    let mut query = Query::new();

    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        query.insert(key.clone(), Condition::Equals(Value::String(value.clone())));
    }

    let bound = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();
    let range = match (bound("from"), bound("to")) {
        (Some(from), Some(to)) => Some(DateRange::Between([from, to])),
        (Some(from), None) => Some(DateRange::Gte(from)),
        (None, Some(to)) => Some(DateRange::Lte(to)),
        (None, None) => None,
    };
    if let Some(range) = range {
        query.insert(date_field, Condition::Range(range));
    }

    query
}

/// Restrict a query to records owned by the caller
///
/// No-op unless `own_user` is enabled.
///
/// # Errors
///
/// Returns an authentication error when the identity property is missing or
/// falsy (`null`, `false`, `""`, `0`).
pub fn scope_owner(
    query: &mut Query,
    request: &CrudRequest,
    options: &CrudOptions,
    operation: CrudOperation,
) -> Result<(), CrudError> {
    if !options.own_user {
        return Ok(());
    }
    let (Some(request_property), Some(schema_property)) = (
        options.own_user_request_property.as_deref(),
        options.own_user_schema_property.as_deref(),
    ) else {
        return Err(CrudError::internal(
            operation,
            "Owner scoping is enabled without owner properties",
        ));
    };

    match request.identity.get(request_property) {
        Some(owner) if is_truthy(owner) => {
            query.insert(schema_property, Condition::Equals(owner.clone()));
            Ok(())
        }
        _ => {
            tracing::warn!(%operation, property = request_property, "Owner check failed");
            Err(CrudError::authentication(operation, NOT_ALLOWED))
        }
    }
}

/// Keep update changes from moving a record to another owner
///
/// With owner scoping enabled, the owner attribute of `changes` is set to the
/// caller's value from the scoped `query`. No-op otherwise.
pub fn pin_owner(changes: &mut Record, query: &Query, options: &CrudOptions) {
    if !options.own_user {
        return;
    }
    let Some(property) = options.own_user_schema_property.as_deref() else {
        return;
    };
    if let Some(Condition::Equals(owner)) = query.get(property) {
        if changes.get(property) != Some(owner) {
            tracing::debug!(property, "Owner attribute in update pinned to caller");
        }
        changes.insert(property.to_string(), owner.clone());
    }
}

/// Drop private attributes (leading `_`) from a request body
#[must_use]
pub fn process(body: &Record) -> Record {
    body.iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Whether a JSON value counts as present
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lookup_path<'r>(record: &'r Record, field: &str) -> Option<&'r Value> {
    if let Some(value) = record.get(field) {
        return Some(value);
    }
    let mut segments = field.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn loosely_equal(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (scalar_text(expected), scalar_text(actual)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn compare(value: &Value, bound: &str) -> Option<Ordering> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    if let (Some(value), Ok(bound)) = (number, bound.parse::<f64>()) {
        return value.partial_cmp(&bound);
    }
    value.as_str().map(|s| s.cmp(bound))
}
