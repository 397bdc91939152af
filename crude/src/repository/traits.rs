//! Data access trait definition
//!
//! The dispatcher drives persistence exclusively through [`DataAccess`]. It
//! uses RPITIT (Return Position Impl Trait In Traits) so implementations can
//! be written with plain `async fn` and no `async_trait`.
//!
//! Stores whose native method names differ are adapted with a wrapper type
//! implementing this trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use crude::query::Query;
//! use crude::repository::{DataAccess, DataAccessResult};
//! use crude::schema::{Record, SchemaMap};
//!
//! struct PostStore { pool: PgPool, schema: SchemaMap }
//!
//! impl DataAccess for PostStore {
//!     async fn create(&self, record: Record) -> DataAccessResult<Record> {
//!         // INSERT ... RETURNING *
//!         todo!()
//!     }
//!
//!     async fn read_one(&self, query: &Query) -> DataAccessResult<Option<Record>> {
//!         // SELECT ... LIMIT 1
//!         todo!()
//!     }
//!
//!     fn schema(&self) -> SchemaMap {
//!         self.schema.clone()
//!     }
//!
//!     // ... read, read_limit, update, delete, count
//! }
//! ```

use std::future::Future;

use super::error::DataAccessError;
use crate::query::Query;
use crate::schema::{Record, SchemaMap};

/// Result type for data access operations
pub type DataAccessResult<T> = std::result::Result<T, DataAccessError>;

/// Capabilities the dispatcher needs from a persistence layer
///
/// Every method receives an already normalized [`Query`]; owner scoping and
/// id mapping have been applied by the time it is called.
pub trait DataAccess: Send + Sync {
    /// Persist a new record and return it as stored
    fn create(&self, record: Record) -> impl Future<Output = DataAccessResult<Record>> + Send;

    /// All records matching a query
    fn read(&self, query: &Query) -> impl Future<Output = DataAccessResult<Vec<Record>>> + Send;

    /// A window of the records matching a query
    fn read_limit(
        &self,
        query: &Query,
        skip: u64,
        limit: u64,
    ) -> impl Future<Output = DataAccessResult<Vec<Record>>> + Send;

    /// The first record matching a query
    ///
    /// Returns `Ok(None)` if nothing matched.
    fn read_one(
        &self,
        query: &Query,
    ) -> impl Future<Output = DataAccessResult<Option<Record>>> + Send;

    /// Apply changes to the record matching a query
    fn update(
        &self,
        query: &Query,
        changes: Record,
    ) -> impl Future<Output = DataAccessResult<Record>> + Send;

    /// Remove the records matching a query
    fn delete(&self, query: &Query) -> impl Future<Output = DataAccessResult<()>> + Send;

    /// Number of records matching a query
    fn count(&self, query: &Query) -> impl Future<Output = DataAccessResult<u64>> + Send;

    /// Attribute visibility and labels
    fn schema(&self) -> SchemaMap;
}
