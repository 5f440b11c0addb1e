//! Infrastructure layer: document storage, repositories, config.

pub mod catalog;
pub mod config;
pub mod data_source;
pub mod repository;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use data_source::{DataSource, DataSourceError, InMemoryDataSource, StoredDocument};
pub use repository::{ProductGroups, Products};
