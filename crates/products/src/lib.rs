//! Products domain module.
//!
//! This crate contains the catalog's product and product-group entities,
//! implemented purely as domain logic (no IO, no HTTP, no storage). Group
//! lookups go through the [`GroupRegistry`] seam, supplied by the caller.

pub mod group;
pub mod price;
pub mod product;
pub mod registry;

pub use group::{GroupInput, ProductGroup, ProductGroupId, ProductGroupRef};
pub use price::PricePerKg;
pub use product::{Product, ProductId, IMAGE_SIZES};
pub use registry::GroupRegistry;
