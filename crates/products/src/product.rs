use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use catalog_core::validator::{as_number, records};
use catalog_core::{
    DomainError, DomainResult, Entity, EntityId, FieldMap, FieldValidator, UpdateOutcome,
};

use crate::group::{GroupInput, ProductGroup, ProductGroupId, ProductGroupRef};
use crate::price::PricePerKg;
use crate::registry::GroupRegistry;

/// Pixel sizes product images are rendered at, smallest first.
pub const IMAGE_SIZES: [u32; 3] = [32, 96, 140];

/// Product identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn parse(id: &str) -> DomainResult<Self> {
        Ok(Self(id.parse()?))
    }

    pub fn generate() -> Self {
        Self(EntityId::generate())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A sellable catalog item.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: f64,
    weight: f64,
    presentation: String,
    enabled: bool,
    featured: bool,
    groups: BTreeMap<ProductGroupId, ProductGroupRef>,
    // Cleared by every `update`.
    price_per_kg: OnceCell<PricePerKg>,
}

impl Product {
    /// Create a blank product (enabled, not featured, no groups).
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            price: 0.0,
            weight: 0.0,
            presentation: String::new(),
            enabled: true,
            featured: false,
            groups: BTreeMap::new(),
            price_per_kg: OnceCell::new(),
        }
    }

    /// Build a product from raw field data.
    ///
    /// Every validated field must be present and valid; group records are
    /// resolved through `registry`.
    pub fn from_fields<R>(data: &FieldMap, registry: &R) -> DomainResult<Self>
    where
        R: GroupRegistry + ?Sized,
    {
        Self::require_fields(data)?;
        let id = data
            .get("id")
            .map(text)
            .ok_or_else(|| DomainError::invalid_id("product id"))?;

        let mut product = Self::empty(ProductId::parse(&id)?);
        product.update(data, true, registry)?;
        Ok(product)
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn presentation(&self) -> &str {
        &self.presentation
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_featured(&self) -> bool {
        self.featured
    }

    pub fn groups(&self) -> impl Iterator<Item = &ProductGroupRef> {
        self.groups.values()
    }

    pub fn belongs_to(&self, group_id: &ProductGroupId) -> bool {
        self.groups.contains_key(group_id)
    }

    /// Validate and assign `data`, then refresh the group set.
    ///
    /// A non-empty `groups` entry replaces the current groups. Each record is
    /// looked up in `registry`; unknown groups become stub references built
    /// from the record's id and name. The cached price per kg is always
    /// dropped, even when nothing was assigned.
    ///
    /// The id cannot change: an `id` entry naming another product is a
    /// conflict and nothing is assigned.
    pub fn update<R>(&mut self, data: &FieldMap, atomic: bool, registry: &R) -> DomainResult<UpdateOutcome>
    where
        R: GroupRegistry + ?Sized,
    {
        let other_id = data
            .get("id")
            .map(text)
            .filter(|id| !id.trim().is_empty() && id != self.id.0.as_str());
        if let Some(id) = other_id {
            return Err(DomainError::conflict(format!(
                "product id cannot change ({} -> {id})",
                self.id
            )));
        }

        let outcome = self.apply_fields(data, atomic)?;

        let group_records = data
            .get("groups")
            .filter(|_| outcome.assigned.iter().any(|f| f == "groups"))
            .and_then(records)
            .unwrap_or_default();

        if !group_records.is_empty() {
            let mut groups = BTreeMap::new();
            for record in group_records {
                let Some(stub) = ProductGroupRef::from_record(record) else {
                    continue;
                };
                let group = match registry.find_group(&stub.id) {
                    Some(existing) => existing,
                    None => {
                        tracing::debug!(product_id = %self.id, group_id = %stub.id, "unknown group, keeping stub reference");
                        stub
                    }
                };
                groups.insert(group.id.clone(), group);
            }
            self.groups = groups;
        }

        self.price_per_kg.take();
        Ok(outcome)
    }

    /// Make this product part of `group`, linking both sides.
    ///
    /// Returns `false` (and touches nothing) if the product already is a member.
    pub fn add_to_group(&mut self, group: &mut ProductGroup) -> bool {
        if self.groups.contains_key(group.id_typed()) {
            return false;
        }

        self.groups.insert(group.id_typed().clone(), group.reference());
        group.add_product(self.id.clone());
        tracing::debug!(product_id = %self.id, group_id = %group.id_typed(), "product added to group");
        true
    }

    /// Remove this product from `group`.
    ///
    /// The group's reference to the product is always dropped, even when the
    /// product did not list the group. Returns whether the product side had it.
    pub fn remove_from_group(&mut self, group: &mut ProductGroup) -> bool {
        let removed = self.groups.remove(group.id_typed()).is_some();
        if !removed {
            tracing::debug!(product_id = %self.id, group_id = %group.id_typed(), "product did not list group");
        }
        group.remove_product(&self.id);
        removed
    }

    /// Replace the group set wholesale.
    ///
    /// An empty input leaves the current groups in place. A single element
    /// that is not a group reference rejects the whole assignment.
    pub fn set_groups<I>(&mut self, groups: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = GroupInput>,
    {
        let mut replacement = BTreeMap::new();
        for input in groups {
            match input {
                GroupInput::Group(group) => {
                    replacement.insert(group.id.clone(), group);
                }
                GroupInput::Raw(_) => {
                    return Err(DomainError::invalid_argument("the product group is not valid"));
                }
            }
        }

        if !replacement.is_empty() {
            self.groups = replacement;
        }
        Ok(())
    }

    /// Allow the product to be displayed and sold.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Hide the product from listings and sales.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Mark the product as featured.
    pub fn promote(&mut self) {
        self.featured = true;
    }

    pub fn demote(&mut self) {
        self.featured = false;
    }

    pub fn image_sizes() -> &'static [u32] {
        &IMAGE_SIZES
    }

    /// Price divided by weight, computed once per update.
    pub fn price_per_kg(&self) -> PricePerKg {
        *self
            .price_per_kg
            .get_or_init(|| PricePerKg::compute(self.price, self.weight))
    }

    /// Field data suitable for storage and for [`Product::from_fields`].
    pub fn to_fields(&self) -> FieldMap {
        let groups: Vec<Value> = self
            .groups
            .values()
            .map(|g| json!({ "id": g.id, "name": g.name }))
            .collect();

        let mut fields = FieldMap::new();
        fields.insert("id".into(), json!(self.id));
        fields.insert("name".into(), json!(self.name));
        fields.insert("description".into(), json!(self.description));
        fields.insert("enabled".into(), json!(self.enabled));
        fields.insert("featured".into(), json!(self.featured));
        fields.insert("price".into(), json!(self.price));
        fields.insert("weight".into(), json!(self.weight));
        fields.insert("presentation".into(), json!(self.presentation));
        fields.insert("groups".into(), Value::Array(groups));
        fields
    }
}

// The price-per-kg cache is not part of a product's identity.
impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.price == other.price
            && self.weight == other.weight
            && self.presentation == other.presentation
            && self.enabled == other.enabled
            && self.featured == other.featured
            && self.groups == other.groups
    }
}

impl Entity for Product {
    type Id = ProductId;

    const COLLECTION: &'static str = "products";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn fields() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "description",
            "enabled",
            "featured",
            "price",
            "weight",
            "presentation",
            "groups",
        ]
    }

    fn field_validators() -> &'static [(&'static str, &'static [FieldValidator])] {
        use FieldValidator::*;

        &[
            ("id", &[NonEmpty]),
            ("name", &[NonEmpty]),
            ("description", &[NonEmpty]),
            ("enabled", &[Boolean]),
            ("featured", &[Boolean]),
            ("price", &[NonEmpty, Number, NonNegative]),
            ("weight", &[NonEmpty, Number, NonNegative]),
            ("presentation", &[NonEmpty]),
            ("groups", &[Records]),
        ]
    }

    fn assign_field(&mut self, field: &str, value: &Value) {
        match field {
            // Fixed at construction; `update` rejects a different one.
            "id" => {}
            "name" => self.name = text(value),
            "description" => self.description = text(value),
            "enabled" => self.enabled = value.as_bool().unwrap_or(self.enabled),
            "featured" => self.featured = value.as_bool().unwrap_or(self.featured),
            "price" => self.price = as_number(value).unwrap_or_default(),
            "weight" => self.weight = as_number(value).unwrap_or_default(),
            "presentation" => self.presentation = text(value),
            // Needs a registry; resolved in `Product::update`.
            "groups" => {}
            _ => {}
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
