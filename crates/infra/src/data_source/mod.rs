//! Document data sources keyed by collection name.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use catalog_core::{DomainError, FieldMap};

pub use in_memory::InMemoryDataSource;

/// A document as held by a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub body: FieldMap,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised while loading or storing documents.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DataSourceError {
    pub fn malformed(collection: &str, id: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Collection-scoped document storage.
pub trait DataSource: Send + Sync {
    fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DataSourceError>;

    /// Insert or replace the document stored under `id`.
    fn upsert(&self, collection: &str, id: &str, body: FieldMap) -> Result<(), DataSourceError>;

    /// Returns whether a document was removed.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, DataSourceError>;

    /// All documents of a collection, ordered by id.
    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, DataSourceError>;

    fn clear_collection(&self, collection: &str) -> Result<(), DataSourceError>;
}

impl<S> DataSource for Arc<S>
where
    S: DataSource + ?Sized,
{
    fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DataSourceError> {
        (**self).get(collection, id)
    }

    fn upsert(&self, collection: &str, id: &str, body: FieldMap) -> Result<(), DataSourceError> {
        (**self).upsert(collection, id, body)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, DataSourceError> {
        (**self).delete(collection, id)
    }

    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, DataSourceError> {
        (**self).list(collection)
    }

    fn clear_collection(&self, collection: &str) -> Result<(), DataSourceError> {
        (**self).clear_collection(collection)
    }
}
