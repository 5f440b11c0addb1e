use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use catalog_core::FieldMap;

use super::{DataSource, DataSourceError, StoredDocument};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DocumentKey {
    collection: String,
    id: String,
}

impl DocumentKey {
    fn new(collection: &str, id: &str) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    documents: RwLock<BTreeMap<DocumentKey, StoredDocument>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DataSourceError {
    DataSourceError::Unavailable("lock poisoned".to_string())
}

impl DataSource for InMemoryDataSource {
    fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, DataSourceError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents.get(&DocumentKey::new(collection, id)).cloned())
    }

    fn upsert(&self, collection: &str, id: &str, body: FieldMap) -> Result<(), DataSourceError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(
            DocumentKey::new(collection, id),
            StoredDocument {
                id: id.to_string(),
                body,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, DataSourceError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        Ok(documents.remove(&DocumentKey::new(collection, id)).is_some())
    }

    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, DataSourceError> {
        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents
            .iter()
            .filter(|(key, _)| key.collection == collection)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    fn clear_collection(&self, collection: &str) -> Result<(), DataSourceError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.retain(|key, _| key.collection != collection);
        Ok(())
    }
}
