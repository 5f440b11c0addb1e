use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use catalog_core::validator::record_id;
use catalog_core::{DomainError, DomainResult, Entity, EntityId, FieldMap, FieldValidator};

use crate::product::ProductId;

/// Product group identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductGroupId(pub EntityId);

impl ProductGroupId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn parse(id: &str) -> DomainResult<Self> {
        Ok(Self(id.parse()?))
    }
}

impl core::fmt::Display for ProductGroupId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Lightweight reference to a group, as held by a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGroupRef {
    pub id: ProductGroupId,
    pub name: String,
}

impl ProductGroupRef {
    pub fn new(id: ProductGroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Build a reference from a raw `{ "id", "name" }` record.
    ///
    /// The name is optional; stubs built from incomplete records carry an
    /// empty one.
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = ProductGroupId::parse(&record_id(record)?).ok()?;
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self::new(id, name))
    }
}

/// An element handed to [`crate::Product::set_groups`].
///
/// Bulk assignment only accepts real group references; anything else is kept
/// as `Raw` so the whole assignment can be rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupInput {
    Group(ProductGroupRef),
    Raw(Value),
}

impl From<ProductGroupRef> for GroupInput {
    fn from(value: ProductGroupRef) -> Self {
        GroupInput::Group(value)
    }
}

impl From<&ProductGroup> for GroupInput {
    fn from(value: &ProductGroup) -> Self {
        GroupInput::Group(value.reference())
    }
}

impl From<Value> for GroupInput {
    fn from(value: Value) -> Self {
        GroupInput::Raw(value)
    }
}

/// A named collection of products.
///
/// Membership is kept by product id; the product side holds group ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGroup {
    id: ProductGroupId,
    name: String,
    #[serde(default)]
    products: BTreeSet<ProductId>,
}

impl ProductGroup {
    pub fn new(id: ProductGroupId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            products: BTreeSet::new(),
        })
    }

    /// Create a group from raw field data (`id`, `name`).
    pub fn from_fields(data: &FieldMap) -> DomainResult<Self> {
        Self::require_fields(data)?;
        let id = data
            .get("id")
            .and_then(record_id_value)
            .ok_or_else(|| DomainError::invalid_id("product group id"))?;

        let mut group = Self {
            id,
            name: String::new(),
            products: BTreeSet::new(),
        };
        group.apply_fields(data, true)?;
        Ok(group)
    }

    pub fn id_typed(&self) -> &ProductGroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductId> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.products.contains(product_id)
    }

    /// Reference the product from this group. Returns `false` if it already was.
    pub fn add_product(&mut self, product_id: ProductId) -> bool {
        self.products.insert(product_id)
    }

    /// Drop the product reference. Returns `false` if there was none.
    pub fn remove_product(&mut self, product_id: &ProductId) -> bool {
        self.products.remove(product_id)
    }

    pub fn reference(&self) -> ProductGroupRef {
        ProductGroupRef::new(self.id.clone(), self.name.clone())
    }
}

fn record_id_value(value: &Value) -> Option<ProductGroupId> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    ProductGroupId::parse(&raw).ok()
}

impl Entity for ProductGroup {
    type Id = ProductGroupId;

    const COLLECTION: &'static str = "product_groups";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn fields() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn field_validators() -> &'static [(&'static str, &'static [FieldValidator])] {
        &[
            ("id", &[FieldValidator::NonEmpty]),
            ("name", &[FieldValidator::NonEmpty]),
        ]
    }

    fn assign_field(&mut self, field: &str, value: &Value) {
        match field {
            "id" => {
                if let Some(id) = record_id_value(value) {
                    self.id = id;
                }
            }
            "name" => {
                self.name = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    fn product(id: &str) -> ProductId {
        ProductId::parse(id).unwrap()
    }

    #[test]
    fn from_fields_requires_id_and_name() {
        let group = ProductGroup::from_fields(&fields(json!({ "id": "teas", "name": "Teas" }))).unwrap();
        assert_eq!(group.id_typed().to_string(), "teas");
        assert_eq!(group.name(), "Teas");
        assert!(group.is_empty());

        let err = ProductGroup::from_fields(&fields(json!({ "id": "teas" }))).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn new_rejects_blank_name() {
        let id = ProductGroupId::parse("g").unwrap();
        assert!(ProductGroup::new(id, " ").is_err());
    }

    #[test]
    fn membership_is_idempotent() {
        let mut group = ProductGroup::new(ProductGroupId::parse("g").unwrap(), "Group").unwrap();

        assert!(group.add_product(product("p1")));
        assert!(!group.add_product(product("p1")));
        assert_eq!(group.len(), 1);

        assert!(group.remove_product(&product("p1")));
        assert!(!group.remove_product(&product("p1")));
        assert!(!group.contains(&product("p1")));
    }

    #[test]
    fn reference_from_record_tolerates_missing_name() {
        let r = ProductGroupRef::from_record(&json!({ "id": 12 })).unwrap();
        assert_eq!(r.id.to_string(), "12");
        assert_eq!(r.name, "");
        assert!(ProductGroupRef::from_record(&json!({ "name": "x" })).is_none());
    }

    #[test]
    fn group_serializes_member_ids() {
        let mut group = ProductGroup::new(ProductGroupId::parse("g").unwrap(), "Group").unwrap();
        group.add_product(product("p2"));
        group.add_product(product("p1"));

        let doc = serde_json::to_value(&group).unwrap();
        assert_eq!(doc, json!({ "id": "g", "name": "Group", "products": ["p1", "p2"] }));

        let back: ProductGroup = serde_json::from_value(doc).unwrap();
        assert_eq!(back, group);
    }
}
