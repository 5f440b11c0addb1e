//! `catalog-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the entity contract used by every persisted catalog type, declarative field
//! validators, identifiers and the shared error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod validator;
pub mod value_object;

pub use entity::{Entity, FieldMap, UpdateOutcome};
pub use error::{DomainError, DomainResult};
pub use id::EntityId;
pub use validator::{FieldValidator, FieldViolation};
pub use value_object::ValueObject;
