//! Dispatcher options
//!
//! [`CrudOptions`] is built once with [`CrudOptions::builder`] (or loaded
//! through [`crate::config::Config`]) and shared read-only by a dispatcher.
//! The only way to change it afterwards is [`CrudOptions::reconfigure`],
//! which validates and returns a new value.
//!
//! # Example
//!
//! ```rust
//! use crude::options::CrudOptions;
//!
//! let options = CrudOptions::builder()
//!     .url_field("slug")
//!     .paginate_limit(20)
//!     .build()
//!     .unwrap();
//!
//! let json_only = options.reconfigure(|b| b.no_views(true)).unwrap();
//! assert!(json_only.no_views);
//! assert!(!options.no_views);
//! assert_eq!(json_only.url_field, "slug");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::handlers::HttpCode;
use crate::query::Query;
use crate::request::CrudRequest;
use crate::schema::{Record, SchemaMap};

/// Default page size
pub const DEFAULT_PAGINATE_LIMIT: u64 = 6;

/// Callback that replaces the built-in sanitizer
#[derive(Clone)]
pub struct SanitizeHook(Arc<dyn Fn(&Record, &SchemaMap) -> Record + Send + Sync>);

impl SanitizeHook {
    /// Wrap a closure
    pub fn new(f: impl Fn(&Record, &SchemaMap) -> Record + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the callback
    #[must_use]
    pub fn call(&self, record: &Record, schema: &SchemaMap) -> Record {
        (self.0)(record, schema)
    }
}

impl fmt::Debug for SanitizeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SanitizeHook")
    }
}

/// Callback producing the base query for paginated list reads
#[derive(Clone)]
pub struct PaginateQueryHook(Arc<dyn Fn(&CrudRequest) -> Query + Send + Sync>);

impl PaginateQueryHook {
    /// Wrap a closure
    pub fn new(f: impl Fn(&CrudRequest) -> Query + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the callback
    #[must_use]
    pub fn call(&self, request: &CrudRequest) -> Query {
        (self.0)(request)
    }
}

impl fmt::Debug for PaginateQueryHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaginateQueryHook")
    }
}

/// Template names rendered in view mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewNames {
    /// List view, rendered for `read` and `paginate`
    pub list: String,
    /// Single item view, rendered for `readOne`
    pub item: String,
    /// Form for a new record, served at `{base}/add`
    pub add: String,
    /// Form for an existing record, served at `{base}/{id}/edit`
    pub edit: String,
}

impl Default for ViewNames {
    fn default() -> Self {
        Self {
            list: "list".to_string(),
            item: "view".to_string(),
            add: "add".to_string(),
            edit: "edit".to_string(),
        }
    }
}

/// Options of a single dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudOptions {
    /// Storage attribute the `:id` path parameter maps to
    pub id_field: String,

    /// Attribute used to build canonical item URLs
    pub url_field: String,

    /// Attribute naming a record in flash messages
    pub name_field: String,

    /// Attribute the `from` / `to` query parameters filter on
    pub date_field: String,

    /// Always return `id_field`, whatever the schema says
    pub show_id: bool,

    /// Label nested attributes by their full path
    pub expand_paths: bool,

    /// Replaces the built-in sanitizer
    #[serde(skip)]
    pub sanitize_result: Option<SanitizeHook>,

    /// JSON responses only
    pub no_views: bool,

    /// Restrict every operation to records owned by the caller
    pub own_user: bool,

    /// Identity property holding the caller id
    pub own_user_request_property: Option<String>,

    /// Record attribute holding the owner id
    pub own_user_schema_property: Option<String>,

    /// Paginate list reads
    pub pagination: bool,

    /// Default page size
    pub paginate_limit: u64,

    /// Base query for paginated list reads
    #[serde(skip)]
    pub paginate_query: Option<PaginateQueryHook>,

    /// Attribute to label overrides
    pub labels: HashMap<String, String>,

    /// Templates used in view mode
    pub views: ViewNames,

    /// Status for data access failures caused by the request
    pub data_access_error_code: HttpCode,
}

impl Default for CrudOptions {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            url_field: "id".to_string(),
            name_field: "name".to_string(),
            date_field: "createdAt".to_string(),
            show_id: false,
            expand_paths: false,
            sanitize_result: None,
            no_views: false,
            own_user: false,
            own_user_request_property: None,
            own_user_schema_property: None,
            pagination: true,
            paginate_limit: DEFAULT_PAGINATE_LIMIT,
            paginate_query: None,
            labels: HashMap::new(),
            views: ViewNames::default(),
            data_access_error_code: HttpCode::BadRequest,
        }
    }
}

impl CrudOptions {
    /// Start from the defaults
    #[must_use]
    pub fn builder() -> CrudOptionsBuilder {
        CrudOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Derive a new, validated set of options from this one
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if the result fails validation.
    pub fn reconfigure(
        &self,
        f: impl FnOnce(CrudOptionsBuilder) -> CrudOptionsBuilder,
    ) -> Result<Self> {
        f(CrudOptionsBuilder {
            options: self.clone(),
        })
        .build()
    }

    /// Check option combinations
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when owner scoping is enabled without
    /// both owner properties, when the page size is zero, or when a field
    /// name is empty.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("id_field", &self.id_field),
            ("url_field", &self.url_field),
            ("date_field", &self.date_field),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidOptions(format!("{name} must not be empty")));
            }
        }

        if self.paginate_limit == 0 {
            return Err(Error::InvalidOptions(
                "paginate_limit must be greater than zero".to_string(),
            ));
        }

        if self.own_user {
            let missing = |p: &Option<String>| p.as_deref().map_or(true, str::is_empty);
            if missing(&self.own_user_request_property) {
                return Err(Error::InvalidOptions(
                    "own_user requires own_user_request_property".to_string(),
                ));
            }
            if missing(&self.own_user_schema_property) {
                return Err(Error::InvalidOptions(
                    "own_user requires own_user_schema_property".to_string(),
                ));
            }
        }

        if self.data_access_error_code.is_success() {
            return Err(Error::InvalidOptions(
                "data_access_error_code must be an error status".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`CrudOptions`]
#[derive(Debug, Clone)]
pub struct CrudOptionsBuilder {
    options: CrudOptions,
}

impl CrudOptionsBuilder {
    /// Storage attribute the `:id` path parameter maps to
    #[must_use]
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.options.id_field = field.into();
        self
    }

    /// Attribute used to build canonical item URLs
    #[must_use]
    pub fn url_field(mut self, field: impl Into<String>) -> Self {
        self.options.url_field = field.into();
        self
    }

    /// Attribute naming a record in flash messages
    #[must_use]
    pub fn name_field(mut self, field: impl Into<String>) -> Self {
        self.options.name_field = field.into();
        self
    }

    /// Attribute the `from` / `to` query parameters filter on
    #[must_use]
    pub fn date_field(mut self, field: impl Into<String>) -> Self {
        self.options.date_field = field.into();
        self
    }

    /// Always return `id_field`
    #[must_use]
    pub fn show_id(mut self, show: bool) -> Self {
        self.options.show_id = show;
        self
    }

    /// Label nested attributes by their full path
    #[must_use]
    pub fn expand_paths(mut self, expand: bool) -> Self {
        self.options.expand_paths = expand;
        self
    }

    /// Replace the built-in sanitizer
    #[must_use]
    pub fn sanitize_result(
        mut self,
        f: impl Fn(&Record, &SchemaMap) -> Record + Send + Sync + 'static,
    ) -> Self {
        self.options.sanitize_result = Some(SanitizeHook::new(f));
        self
    }

    /// JSON responses only
    #[must_use]
    pub fn no_views(mut self, no_views: bool) -> Self {
        self.options.no_views = no_views;
        self
    }

    /// Restrict operations to records whose `schema_property` equals the
    /// caller's `request_property`
    #[must_use]
    pub fn own_user(
        mut self,
        request_property: impl Into<String>,
        schema_property: impl Into<String>,
    ) -> Self {
        self.options.own_user = true;
        self.options.own_user_request_property = Some(request_property.into());
        self.options.own_user_schema_property = Some(schema_property.into());
        self
    }

    /// Turn owner scoping off
    #[must_use]
    pub fn without_own_user(mut self) -> Self {
        self.options.own_user = false;
        self
    }

    /// Paginate list reads
    #[must_use]
    pub fn pagination(mut self, enabled: bool) -> Self {
        self.options.pagination = enabled;
        self
    }

    /// Default page size
    #[must_use]
    pub fn paginate_limit(mut self, limit: u64) -> Self {
        self.options.paginate_limit = limit;
        self
    }

    /// Base query for paginated list reads
    #[must_use]
    pub fn paginate_query(mut self, f: impl Fn(&CrudRequest) -> Query + Send + Sync + 'static) -> Self {
        self.options.paginate_query = Some(PaginateQueryHook::new(f));
        self
    }

    /// Label an attribute
    #[must_use]
    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.labels.insert(field.into(), label.into());
        self
    }

    /// Templates used in view mode
    #[must_use]
    pub fn views(mut self, list: impl Into<String>, item: impl Into<String>) -> Self {
        self.options.views.list = list.into();
        self.options.views.item = item.into();
        self
    }

    /// Form templates used in view mode
    #[must_use]
    pub fn form_views(mut self, add: impl Into<String>, edit: impl Into<String>) -> Self {
        self.options.views.add = add.into();
        self.options.views.edit = edit.into();
        self
    }

    /// Status for data access failures caused by the request
    #[must_use]
    pub fn data_access_error_code(mut self, code: HttpCode) -> Self {
        self.options.data_access_error_code = code;
        self
    }

    /// Validate and finish
    ///
    /// # Errors
    ///
    /// See [`CrudOptions::validate`].
    pub fn build(self) -> Result<CrudOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CrudOptions::default();
        assert_eq!(options.id_field, "id");
        assert_eq!(options.date_field, "createdAt");
        assert_eq!(options.paginate_limit, 6);
        assert!(options.pagination);
        assert!(!options.own_user);
        assert_eq!(options.data_access_error_code, HttpCode::BadRequest);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_own_user_requires_properties() {
        let mut options = CrudOptions {
            own_user: true,
            ..CrudOptions::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));

        options.own_user_request_property = Some("userId".into());
        assert!(options.validate().is_err());

        options.own_user_schema_property = Some("owner".into());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(CrudOptions::builder().paginate_limit(0).build().is_err());
    }

    #[test]
    fn test_success_code_rejected_for_errors() {
        assert!(CrudOptions::builder()
            .data_access_error_code(HttpCode::Ok)
            .build()
            .is_err());
    }

    #[test]
    fn test_reconfigure_returns_new_value() {
        let original = CrudOptions::builder().url_field("slug").build().unwrap();
        let changed = original
            .reconfigure(|b| b.own_user("userId", "owner").pagination(false))
            .unwrap();

        assert!(changed.own_user);
        assert!(!changed.pagination);
        assert_eq!(changed.url_field, "slug");
        assert!(!original.own_user);
        assert!(original.pagination);
    }

    #[test]
    fn test_reconfigure_validates() {
        let original = CrudOptions::default();
        assert!(original.reconfigure(|b| b.id_field("")).is_err());
    }

    #[test]
    fn test_hooks_survive_clone() {
        let options = CrudOptions::builder()
            .sanitize_result(|_, _| Record::new())
            .build()
            .unwrap();
        let cloned = options.clone();
        let mut record = Record::new();
        record.insert("a".into(), serde_json::json!(1));
        let sanitized = cloned
            .sanitize_result
            .as_ref()
            .map(|hook| hook.call(&record, &SchemaMap::new()));
        assert_eq!(sanitized, Some(Record::new()));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: CrudOptions = serde_json::from_value(serde_json::json!({
            "url_field": "slug",
            "paginate_limit": 10,
            "data_access_error_code": 500,
            "views": {"list": "posts/list"}
        }))
        .unwrap();
        assert_eq!(options.url_field, "slug");
        assert_eq!(options.paginate_limit, 10);
        assert_eq!(options.data_access_error_code, HttpCode::InternalError);
        assert_eq!(options.views.list, "posts/list");
        assert_eq!(options.views.item, "view");
        assert_eq!(options.views.edit, "edit");
        assert_eq!(options.id_field, "id");
    }

    #[test]
    fn test_form_views() {
        let options = CrudOptions::builder()
            .views("posts/list", "posts/show")
            .form_views("posts/new", "posts/edit")
            .build()
            .unwrap();
        assert_eq!(options.views.list, "posts/list");
        assert_eq!(options.views.item, "posts/show");
        assert_eq!(options.views.add, "posts/new");
        assert_eq!(options.views.edit, "posts/edit");
    }
}
