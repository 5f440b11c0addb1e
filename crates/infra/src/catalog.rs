//! Catalog service: both repositories over one data source.

use std::sync::{Arc, Mutex, MutexGuard};

use catalog_core::FieldMap;
use catalog_products::{GroupInput, Product, ProductGroupId, ProductId};

use crate::config::CatalogConfig;
use crate::data_source::{DataSource, DataSourceError};
use crate::repository::{ProductGroups, Products};

/// Entry point used by the web layer.
///
/// Membership changes touch a product and a group; both documents are
/// written back before returning. Every load-modify-save sequence holds the
/// catalog's write lock, so concurrent callers sharing one `Catalog` do not
/// overwrite each other. Separate `Catalog` instances over the same source
/// are not coordinated.
#[derive(Debug)]
pub struct Catalog<S> {
    products: Products<Arc<S>>,
    groups: ProductGroups<Arc<S>>,
    writes: Mutex<()>,
}

impl<S: DataSource> Catalog<S> {
    pub fn new(source: Arc<S>, config: &CatalogConfig) -> Self {
        Self {
            products: Products::with_collection(source.clone(), config.products_collection.clone()),
            groups: ProductGroups::with_collection(source, config.groups_collection.clone()),
            writes: Mutex::new(()),
        }
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, DataSourceError> {
        self.writes
            .lock()
            .map_err(|_| DataSourceError::Unavailable("catalog write lock poisoned".to_string()))
    }

    pub fn products(&self) -> &Products<Arc<S>> {
        &self.products
    }

    pub fn groups(&self) -> &ProductGroups<Arc<S>> {
        &self.groups
    }

    pub fn create_product(&self, data: &FieldMap) -> Result<Product, DataSourceError> {
        let _guard = self.write_lock()?;
        self.products.create(data, &self.groups)
    }

    pub fn product(&self, id: &ProductId) -> Result<Product, DataSourceError> {
        self.products.get(id, &self.groups)
    }

    /// Apply a field update to a stored product.
    ///
    /// Atomic updates either store every change or none of them.
    pub fn update_product(&self, id: &ProductId, data: &FieldMap, atomic: bool) -> Result<Product, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(id)?;
        let outcome = product.update(data, atomic, &self.groups)?;
        if !outcome.is_complete() {
            tracing::warn!(product_id = %id, rejected = outcome.rejected.len(), "partial product update");
        }
        self.products.save(&product)?;
        Ok(product)
    }

    /// Replace a product's groups with existing groups only.
    pub fn set_product_groups(&self, id: &ProductId, group_ids: &[ProductGroupId]) -> Result<Product, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(id)?;
        let inputs = group_ids
            .iter()
            .map(|group_id| -> Result<GroupInput, DataSourceError> {
                Ok(match self.groups.find(group_id)? {
                    Some(group) => GroupInput::from(&group),
                    None => GroupInput::Raw(serde_json::Value::String(group_id.to_string())),
                })
            })
            .collect::<Result<Vec<_>, DataSourceError>>()?;

        product.set_groups(inputs)?;
        self.products.save(&product)?;
        Ok(product)
    }

    pub fn add_to_group(&self, product_id: &ProductId, group_id: &ProductGroupId) -> Result<bool, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(product_id)?;
        let mut group = self.groups.get(group_id)?;

        let added = product.add_to_group(&mut group);
        if added {
            self.products.save(&product)?;
            self.groups.save(&group)?;
        }
        Ok(added)
    }

    pub fn remove_from_group(&self, product_id: &ProductId, group_id: &ProductGroupId) -> Result<bool, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(product_id)?;
        let mut group = self.groups.get(group_id)?;

        let removed = product.remove_from_group(&mut group);
        self.products.save(&product)?;
        self.groups.save(&group)?;
        Ok(removed)
    }

    pub fn set_enabled(&self, id: &ProductId, enabled: bool) -> Result<Product, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(id)?;
        if enabled {
            product.enable();
        } else {
            product.disable();
        }
        self.products.save(&product)?;
        Ok(product)
    }

    pub fn set_featured(&self, id: &ProductId, featured: bool) -> Result<Product, DataSourceError> {
        let _guard = self.write_lock()?;
        let mut product = self.product(id)?;
        if featured {
            product.promote();
        } else {
            product.demote();
        }
        self.products.save(&product)?;
        Ok(product)
    }

    pub fn featured(&self) -> Result<Vec<Product>, DataSourceError> {
        self.products.featured(&self.groups)
    }

    pub fn group_listing(&self, group_id: &ProductGroupId) -> Result<Vec<Product>, DataSourceError> {
        self.products.in_group(group_id, &self.groups)
    }

    /// Delete a product and drop it from every group that lists it.
    pub fn delete_product(&self, id: &ProductId) -> Result<bool, DataSourceError> {
        let _guard = self.write_lock()?;
        for mut group in self.groups.list()? {
            if group.remove_product(id) {
                self.groups.save(&group)?;
            }
        }
        self.products.delete(id)
    }
}
