//! Records and schema visibility metadata
//!
//! A [`Record`] is an opaque JSON object. The only structure the dispatcher
//! ever relies on comes from the [`SchemaMap`] supplied by the data access
//! layer, which says which attributes may reach a client and how to label
//! them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted item
pub type Record = Map<String, Value>;

/// Visibility and display metadata for a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Whether the attribute may be returned to clients
    pub can_show: bool,
    /// Human readable label
    #[serde(default)]
    pub label: String,
}

impl FieldSchema {
    /// A visible attribute
    #[must_use]
    pub fn visible(label: impl Into<String>) -> Self {
        Self {
            can_show: true,
            label: label.into(),
        }
    }

    /// A hidden attribute
    #[must_use]
    pub fn hidden(label: impl Into<String>) -> Self {
        Self {
            can_show: false,
            label: label.into(),
        }
    }
}

/// Attribute name to [`FieldSchema`] mapping
///
/// Attributes without an entry are hidden.
///
/// # Example
///
/// ```rust
/// use crude::schema::{FieldSchema, SchemaMap};
///
/// let schema = SchemaMap::new()
///     .with_field("name", FieldSchema::visible("Name"))
///     .with_field("password", FieldSchema::hidden("Password"));
///
/// assert!(schema.can_show("name"));
/// assert!(!schema.can_show("password"));
/// assert!(!schema.can_show("unknown"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMap {
    fields: BTreeMap<String, FieldSchema>,
}

impl SchemaMap {
    /// Create an empty schema map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute entry
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Insert an attribute entry in place
    pub fn insert(&mut self, name: impl Into<String>, field: FieldSchema) {
        self.fields.insert(name.into(), field);
    }

    /// Look up an attribute entry
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Whether an attribute is marked visible
    #[must_use]
    pub fn can_show(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|f| f.can_show)
    }

    /// Iterate over entries in attribute order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve the display label for an attribute path
    ///
    /// An explicit `labels` override wins, then the schema label. Otherwise
    /// the label is derived from the path: nested paths (`profile.name`) use
    /// their last segment unless `expand_paths` is set, and the first letter
    /// is upper-cased.
    #[must_use]
    pub fn label_for(
        &self,
        path: &str,
        labels: &HashMap<String, String>,
        expand_paths: bool,
    ) -> String {
        if let Some(label) = labels.get(path) {
            return label.clone();
        }
        if let Some(field) = self.fields.get(path) {
            if !field.label.is_empty() {
                return field.label.clone();
            }
        }

        let name = if expand_paths {
            path
        } else {
            path.rsplit('.').next().unwrap_or(path)
        };
        capitalize(name)
    }

    /// Labels for every visible attribute, for view contexts
    #[must_use]
    pub fn visible_labels(
        &self,
        labels: &HashMap<String, String>,
        expand_paths: bool,
    ) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, f)| f.can_show)
            .map(|(path, _)| (path.clone(), self.label_for(path, labels, expand_paths)))
            .collect()
    }
}

impl FromIterator<(String, FieldSchema)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldSchema)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
