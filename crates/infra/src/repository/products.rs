use serde_json::Value;

use catalog_core::{DomainError, Entity, FieldMap};
use catalog_products::{GroupRegistry, Product, ProductGroupId, ProductId};

use crate::data_source::{DataSource, DataSourceError, StoredDocument};

/// Repository (and factory) of products.
#[derive(Debug)]
pub struct Products<S> {
    source: S,
    collection: String,
}

impl<S: DataSource> Products<S> {
    pub fn new(source: S) -> Self {
        Self::with_collection(source, Product::COLLECTION)
    }

    pub fn with_collection(source: S, collection: impl Into<String>) -> Self {
        Self {
            source,
            collection: collection.into(),
        }
    }

    /// Create and store a product from raw field data.
    ///
    /// A missing `id` is generated. Creating over an existing id is a conflict.
    pub fn create<R>(&self, data: &FieldMap, registry: &R) -> Result<Product, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        let mut data = data.clone();
        if !data.contains_key("id") {
            data.insert("id".into(), Value::String(ProductId::generate().to_string()));
        }

        let product = Product::from_fields(&data, registry)?;
        let id = product.id_typed();
        if self.source.get(&self.collection, id.0.as_str())?.is_some() {
            return Err(DomainError::conflict(format!("product {id} already exists")).into());
        }

        self.save(&product)?;
        Ok(product)
    }

    pub fn find<R>(&self, id: &ProductId, registry: &R) -> Result<Option<Product>, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        self.source
            .get(&self.collection, id.0.as_str())?
            .map(|doc| self.decode(doc, registry))
            .transpose()
    }

    pub fn get<R>(&self, id: &ProductId, registry: &R) -> Result<Product, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        self.find(id, registry)?
            .ok_or(DataSourceError::Domain(DomainError::not_found()))
    }

    pub fn save(&self, product: &Product) -> Result<(), DataSourceError> {
        let id = product.id_typed().to_string();
        self.source.upsert(&self.collection, &id, product.to_fields())?;
        tracing::info!(collection = %self.collection, product_id = %id, "product saved");
        Ok(())
    }

    pub fn delete(&self, id: &ProductId) -> Result<bool, DataSourceError> {
        let removed = self.source.delete(&self.collection, id.0.as_str())?;
        if removed {
            tracing::info!(collection = %self.collection, product_id = %id, "product deleted");
        }
        Ok(removed)
    }

    pub fn list<R>(&self, registry: &R) -> Result<Vec<Product>, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        self.source
            .list(&self.collection)?
            .into_iter()
            .map(|doc| self.decode(doc, registry))
            .collect()
    }

    /// Enabled products marked as featured.
    pub fn featured<R>(&self, registry: &R) -> Result<Vec<Product>, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        Ok(self
            .list(registry)?
            .into_iter()
            .filter(|p| p.is_enabled() && p.is_featured())
            .collect())
    }

    /// Enabled products listed in `group_id`.
    pub fn in_group<R>(&self, group_id: &ProductGroupId, registry: &R) -> Result<Vec<Product>, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        Ok(self
            .list(registry)?
            .into_iter()
            .filter(|p| p.is_enabled() && p.belongs_to(group_id))
            .collect())
    }

    fn decode<R>(&self, doc: StoredDocument, registry: &R) -> Result<Product, DataSourceError>
    where
        R: GroupRegistry + ?Sized,
    {
        Product::from_fields(&doc.body, registry)
            .map_err(|e| DataSourceError::malformed(&self.collection, &doc.id, e))
    }
}
