//! In-memory data access
//!
//! [`MemoryStore`] keeps records in insertion order behind a
//! `tokio::sync::RwLock`. It understands every [`Query`] condition, which
//! makes it a drop-in store for tests, demos and prototypes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use super::error::{DataAccessError, DataAccessOperation};
use super::traits::{DataAccess, DataAccessResult};
use crate::query::Query;
use crate::schema::{Record, SchemaMap};

/// Records held in process memory
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
    schema: SchemaMap,
    id_field: String,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store keyed by `id`
    #[must_use]
    pub fn new(schema: SchemaMap) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            schema,
            id_field: "id".to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Key records by another attribute
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Seed the store
    #[must_use]
    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records = RwLock::new(records.into_iter().collect());
        self
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Copy of every stored record
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    fn id_query(&self, id: &Value) -> Query {
        Query::new().eq(self.id_field.clone(), id.clone())
    }
}

impl DataAccess for MemoryStore {
    async fn create(&self, mut record: Record) -> DataAccessResult<Record> {
        let mut records = self.records.write().await;

        let id = match record.get(&self.id_field) {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                // Skip ids taken by seeded or explicitly keyed records
                let id = loop {
                    let candidate =
                        Value::String(self.next_id.fetch_add(1, Ordering::Relaxed).to_string());
                    let taken = self.id_query(&candidate);
                    if !records.iter().any(|r| taken.matches(r)) {
                        break candidate;
                    }
                };
                record.insert(self.id_field.clone(), id.clone());
                id
            }
        };

        let existing = self.id_query(&id);
        if records.iter().any(|r| existing.matches(r)) {
            return Err(DataAccessError::already_exists(format!(
                "A record with {} {id} already exists",
                self.id_field
            )));
        }

        records.push(record.clone());
        tracing::debug!(id = %id, "Record created");
        Ok(record)
    }

    async fn read(&self, query: &Query) -> DataAccessResult<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| query.matches(r)).cloned().collect())
    }

    async fn read_limit(&self, query: &Query, skip: u64, limit: u64) -> DataAccessResult<Vec<Record>> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| query.matches(r))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn read_one(&self, query: &Query) -> DataAccessResult<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| query.matches(r)).cloned())
    }

    async fn update(&self, query: &Query, changes: Record) -> DataAccessResult<Record> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| query.matches(r))
            .ok_or_else(|| DataAccessError::not_found(DataAccessOperation::Update, "No record matched"))?;

        record.extend(changes);
        Ok(record.clone())
    }

    async fn delete(&self, query: &Query) -> DataAccessResult<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !query.matches(r));

        if records.len() == before {
            return Err(DataAccessError::not_found(
                DataAccessOperation::Delete,
                "No record matched",
            ));
        }
        tracing::debug!(removed = before - records.len(), "Records deleted");
        Ok(())
    }

    async fn count(&self, query: &Query) -> DataAccessResult<u64> {
        let records = self.records.read().await;
        let count = records.iter().filter(|r| query.matches(r)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn schema(&self) -> SchemaMap {
        self.schema.clone()
    }
}
