//! Data access abstraction
//!
//! The dispatcher persists records through the [`DataAccess`] trait, with
//! failures classified as [`DataAccessError`]. [`MemoryStore`] is a complete
//! in-memory implementation.
//!
//! # Example
//!
//! ```rust
//! use crude::query::Query;
//! use crude::repository::{DataAccess, MemoryStore};
//! use crude::schema::{FieldSchema, SchemaMap};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::new(SchemaMap::new().with_field("name", FieldSchema::visible("Name")));
//! let mut record = serde_json::Map::new();
//! record.insert("name".into(), json!("first"));
//!
//! let created = store.create(record).await.unwrap();
//! let found = store.read_one(&Query::new().eq("id", created["id"].clone())).await.unwrap();
//! assert_eq!(found, Some(created));
//! # });
//! ```

mod error;
mod memory;
mod traits;

pub use error::{DataAccessError, DataAccessErrorKind, DataAccessOperation};
pub use memory::MemoryStore;
pub use traits::{DataAccess, DataAccessResult};
