//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// the same value. They are immutable; to "change" one, build a new one.
///
/// - **Value Object**: `PricePerKg::Known(5.0)` equals any other `Known(5.0)`
/// - **Entity**: two products with the same name are still different products
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
