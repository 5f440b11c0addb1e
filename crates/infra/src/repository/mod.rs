//! Entity repositories over a [`crate::data_source::DataSource`].

pub mod groups;
pub mod products;

pub use groups::ProductGroups;
pub use products::Products;
