//! Result sanitizer
//!
//! Strips every attribute the schema does not mark visible before a record
//! reaches a client.

use serde_json::Value;

use crate::options::CrudOptions;
use crate::schema::{Record, SchemaMap};

/// Keep only the visible attributes of a record
///
/// A configured `sanitize_result` callback replaces this logic entirely.
#[must_use]
pub fn sanitize(record: &Record, schema: &SchemaMap, options: &CrudOptions) -> Record {
    if let Some(hook) = &options.sanitize_result {
        return hook.call(record, schema);
    }

    record
        .iter()
        .filter(|(key, _)| {
            schema.can_show(key) || (options.show_id && key.as_str() == options.id_field)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// [`sanitize`] for any JSON value
///
/// Objects are sanitized, arrays element-wise in order, anything else
/// (including `null`) is returned unchanged.
#[must_use]
pub fn sanitize_value(value: &Value, schema: &SchemaMap, options: &CrudOptions) -> Value {
    match value {
        Value::Object(record) => Value::Object(sanitize(record, schema, options)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_value(item, schema, options))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Sanitize a list of records, preserving order
#[must_use]
pub fn sanitize_all(records: &[Record], schema: &SchemaMap, options: &CrudOptions) -> Vec<Record> {
    records
        .iter()
        .map(|record| sanitize(record, schema, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use serde_json::json;

    fn schema() -> SchemaMap {
        SchemaMap::new()
            .with_field("name", FieldSchema::visible("Name"))
            .with_field("password", FieldSchema::hidden("Password"))
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[test]
    fn test_hidden_and_unknown_fields_removed() {
        let input = record(json!({"id": "1", "name": "a", "password": "x", "extra": 1}));
        let output = sanitize(&input, &schema(), &CrudOptions::default());
        assert_eq!(Value::Object(output), json!({"name": "a"}));
    }

    #[test]
    fn test_idempotent() {
        let options = CrudOptions::default();
        let input = record(json!({"id": "1", "name": "a", "password": "x"}));
        let once = sanitize(&input, &schema(), &options);
        let twice = sanitize(&once, &schema(), &options);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_show_id_forces_id_field() {
        let options = CrudOptions::builder()
            .id_field("_id")
            .show_id(true)
            .build()
            .unwrap();
        let input = record(json!({"_id": "1", "id": "2", "name": "a"}));
        let output = sanitize(&input, &schema(), &options);
        assert_eq!(Value::Object(output), json!({"_id": "1", "name": "a"}));
    }

    #[test]
    fn test_hook_replaces_logic() {
        let options = CrudOptions::builder()
            .sanitize_result(|record, _| {
                record
                    .iter()
                    .filter(|(k, _)| k.as_str() == "password")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .build()
            .unwrap();
        let input = record(json!({"name": "a", "password": "x"}));
        let output = sanitize(&input, &schema(), &options);
        assert_eq!(Value::Object(output), json!({"password": "x"}));
    }

    #[test]
    fn test_value_variants() {
        let options = CrudOptions::default();
        assert_eq!(sanitize_value(&Value::Null, &schema(), &options), Value::Null);
        assert_eq!(sanitize_value(&json!(3), &schema(), &options), json!(3));
        assert_eq!(
            sanitize_value(
                &json!([{"name": "b", "password": 1}, {"name": "a"}]),
                &schema(),
                &options
            ),
            json!([{"name": "b"}, {"name": "a"}])
        );
    }
}
