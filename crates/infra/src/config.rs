//! Configuration loading and representation.

use catalog_core::Entity;
use catalog_products::{Product, ProductGroup};

pub const PRODUCTS_COLLECTION_VAR: &str = "CATALOG_PRODUCTS_COLLECTION";
pub const GROUPS_COLLECTION_VAR: &str = "CATALOG_GROUPS_COLLECTION";

/// Where the catalog keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub products_collection: String,
    pub groups_collection: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_collection: Product::COLLECTION.to_string(),
            groups_collection: ProductGroup::COLLECTION.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup; unset or blank
    /// keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            products_collection: read(&lookup, PRODUCTS_COLLECTION_VAR, defaults.products_collection),
            groups_collection: read(&lookup, GROUPS_COLLECTION_VAR, defaults.groups_collection),
        }
    }
}

fn read<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value,
        None => {
            tracing::debug!(key, default = %default, "collection not configured; using default");
            default
        }
    }
}
