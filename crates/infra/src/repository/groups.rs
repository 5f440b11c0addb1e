use catalog_core::{DomainError, Entity};
use catalog_products::{GroupRegistry, ProductGroup, ProductGroupId, ProductGroupRef};

use crate::data_source::{DataSource, DataSourceError, StoredDocument};

/// Repository of product groups.
#[derive(Debug)]
pub struct ProductGroups<S> {
    source: S,
    collection: String,
}

impl<S: DataSource> ProductGroups<S> {
    pub fn new(source: S) -> Self {
        Self::with_collection(source, ProductGroup::COLLECTION)
    }

    pub fn with_collection(source: S, collection: impl Into<String>) -> Self {
        Self {
            source,
            collection: collection.into(),
        }
    }

    pub fn find(&self, id: &ProductGroupId) -> Result<Option<ProductGroup>, DataSourceError> {
        self.source
            .get(&self.collection, id.0.as_str())?
            .map(|doc| self.decode(doc))
            .transpose()
    }

    pub fn get(&self, id: &ProductGroupId) -> Result<ProductGroup, DataSourceError> {
        self.find(id)?.ok_or(DataSourceError::Domain(DomainError::not_found()))
    }

    pub fn save(&self, group: &ProductGroup) -> Result<(), DataSourceError> {
        let id = group.id_typed().to_string();
        let body = match serde_json::to_value(group) {
            Ok(serde_json::Value::Object(body)) => body,
            Ok(_) => return Err(DataSourceError::malformed(&self.collection, &id, "not an object")),
            Err(e) => return Err(DataSourceError::malformed(&self.collection, &id, e)),
        };

        self.source.upsert(&self.collection, &id, body)?;
        tracing::info!(collection = %self.collection, group_id = %id, members = group.len(), "product group saved");
        Ok(())
    }

    pub fn delete(&self, id: &ProductGroupId) -> Result<bool, DataSourceError> {
        self.source.delete(&self.collection, id.0.as_str())
    }

    pub fn list(&self) -> Result<Vec<ProductGroup>, DataSourceError> {
        self.source
            .list(&self.collection)?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    fn decode(&self, doc: StoredDocument) -> Result<ProductGroup, DataSourceError> {
        serde_json::from_value(serde_json::Value::Object(doc.body))
            .map_err(|e| DataSourceError::malformed(&self.collection, &doc.id, e))
    }
}

impl<S: DataSource> GroupRegistry for ProductGroups<S> {
    fn find_group(&self, id: &ProductGroupId) -> Option<ProductGroupRef> {
        match self.find(id) {
            Ok(group) => group.map(|g| g.reference()),
            Err(e) => {
                tracing::warn!(group_id = %id, error = %e, "group lookup failed");
                None
            }
        }
    }
}
