//! Black-box tests for the catalog over the in-memory data source.

use std::sync::Arc;

use serde_json::{Value, json};

use catalog_core::{DomainError, FieldMap};
use catalog_infra::{Catalog, CatalogConfig, DataSource, DataSourceError, InMemoryDataSource};
use catalog_products::{PricePerKg, ProductGroup, ProductGroupId, ProductId};

fn fields(value: Value) -> FieldMap {
    value.as_object().cloned().unwrap()
}

fn setup() -> (Arc<InMemoryDataSource>, Catalog<InMemoryDataSource>) {
    catalog_observability::init();
    let source = Arc::new(InMemoryDataSource::new());
    let catalog = Catalog::new(source.clone(), &CatalogConfig::default());
    (source, catalog)
}

fn group_id(id: &str) -> ProductGroupId {
    ProductGroupId::parse(id).unwrap()
}

fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}

fn seed(catalog: &Catalog<InMemoryDataSource>) {
    for (id, name) in [("teas", "Teas"), ("gifts", "Gifts")] {
        let group = ProductGroup::new(group_id(id), name).unwrap();
        catalog.groups().save(&group).unwrap();
    }

    catalog
        .create_product(&fields(json!({
            "id": "sencha",
            "name": "Sencha",
            "description": "Steamed green tea",
            "price": 10,
            "weight": 2,
            "presentation": "Tin",
        })))
        .unwrap();
}

#[test]
fn membership_is_stored_on_both_sides() {
    let (_source, catalog) = setup();
    seed(&catalog);

    assert!(catalog.add_to_group(&product_id("sencha"), &group_id("teas")).unwrap());
    assert!(!catalog.add_to_group(&product_id("sencha"), &group_id("teas")).unwrap());

    let product = catalog.product(&product_id("sencha")).unwrap();
    let teas = catalog.groups().get(&group_id("teas")).unwrap();
    assert!(product.belongs_to(&group_id("teas")));
    assert!(teas.contains(&product_id("sencha")));
    assert_eq!(catalog.group_listing(&group_id("teas")).unwrap().len(), 1);

    assert!(catalog.remove_from_group(&product_id("sencha"), &group_id("teas")).unwrap());
    let teas = catalog.groups().get(&group_id("teas")).unwrap();
    assert!(!teas.contains(&product_id("sencha")));
    assert!(catalog.group_listing(&group_id("teas")).unwrap().is_empty());
}

#[test]
fn stored_updates_refresh_price_per_kg() {
    let (_source, catalog) = setup();
    seed(&catalog);

    let product = catalog.product(&product_id("sencha")).unwrap();
    assert_eq!(product.price_per_kg(), PricePerKg::Known(5.0));

    let product = catalog
        .update_product(&product_id("sencha"), &fields(json!({ "weight": 0 })), true)
        .unwrap();
    assert_eq!(product.price_per_kg(), PricePerKg::Unknown);
}

#[test]
fn atomic_update_failure_leaves_stored_product_untouched() {
    let (_source, catalog) = setup();
    seed(&catalog);

    let err = catalog
        .update_product(
            &product_id("sencha"),
            &fields(json!({ "name": "Renamed", "description": "" })),
            true,
        )
        .unwrap_err();
    assert!(matches!(err, DataSourceError::Domain(DomainError::Validation(_))));
    assert_eq!(catalog.product(&product_id("sencha")).unwrap().name(), "Sencha");
}

#[test]
fn update_groups_resolve_through_the_group_store() {
    let (_source, catalog) = setup();
    seed(&catalog);

    let product = catalog
        .update_product(
            &product_id("sencha"),
            &fields(json!({ "groups": [{ "id": "gifts", "name": "old" }, { "id": "seasonal", "name": "Seasonal" }] })),
            true,
        )
        .unwrap();

    let groups: Vec<_> = product.groups().map(|g| g.name.clone()).collect();
    assert_eq!(groups, vec!["Gifts", "Seasonal"]);
}

#[test]
fn set_product_groups_rejects_unknown_groups() {
    let (_source, catalog) = setup();
    seed(&catalog);
    catalog.add_to_group(&product_id("sencha"), &group_id("teas")).unwrap();

    let err = catalog
        .set_product_groups(&product_id("sencha"), &[group_id("gifts"), group_id("missing")])
        .unwrap_err();
    assert!(matches!(err, DataSourceError::Domain(DomainError::InvalidArgument(_))));

    let product = catalog
        .set_product_groups(&product_id("sencha"), &[group_id("gifts")])
        .unwrap();
    assert!(product.belongs_to(&group_id("gifts")));
    assert!(!product.belongs_to(&group_id("teas")));
}

#[test]
fn featured_listing_follows_flags() {
    let (_source, catalog) = setup();
    seed(&catalog);

    assert!(catalog.featured().unwrap().is_empty());
    catalog.set_featured(&product_id("sencha"), true).unwrap();
    assert_eq!(catalog.featured().unwrap().len(), 1);

    catalog.set_enabled(&product_id("sencha"), false).unwrap();
    assert!(catalog.featured().unwrap().is_empty());
}

#[test]
fn deleting_a_product_unlinks_it_from_groups() {
    let (source, catalog) = setup();
    seed(&catalog);
    catalog.add_to_group(&product_id("sencha"), &group_id("teas")).unwrap();

    assert!(catalog.delete_product(&product_id("sencha")).unwrap());
    assert!(source.get("products", "sencha").unwrap().is_none());

    let teas = catalog.groups().get(&group_id("teas")).unwrap();
    assert!(teas.is_empty());
}

#[test]
fn configured_collections_are_used() {
    let source = Arc::new(InMemoryDataSource::new());
    let config = CatalogConfig {
        products_collection: "shop_products".to_string(),
        groups_collection: "shop_groups".to_string(),
    };
    let catalog = Catalog::new(source.clone(), &config);
    seed(&catalog);

    assert!(source.get("shop_products", "sencha").unwrap().is_some());
    assert_eq!(source.list("shop_groups").unwrap().len(), 2);
    assert!(source.list("products").unwrap().is_empty());
}

#[test]
fn stored_update_cannot_rename_a_product() {
    let (source, catalog) = setup();
    seed(&catalog);
    catalog.add_to_group(&product_id("sencha"), &group_id("teas")).unwrap();

    let err = catalog
        .update_product(&product_id("sencha"), &fields(json!({ "id": "matcha" })), true)
        .unwrap_err();
    assert!(matches!(err, DataSourceError::Domain(DomainError::Conflict(_))));

    assert!(source.get("products", "sencha").unwrap().is_some());
    assert!(source.get("products", "matcha").unwrap().is_none());
    assert_eq!(catalog.products().list(catalog.groups()).unwrap().len(), 1);

    let teas = catalog.groups().get(&group_id("teas")).unwrap();
    assert!(teas.contains(&product_id("sencha")));
    assert!(catalog.product(&product_id("sencha")).unwrap().belongs_to(&group_id("teas")));
}

#[test]
fn concurrent_membership_changes_keep_every_link() {
    let (_source, catalog) = setup();
    seed(&catalog);
    let catalog = Arc::new(catalog);

    let ids: Vec<String> = (0..8).map(|n| format!("tea-{n}")).collect();
    for id in &ids {
        catalog
            .create_product(&fields(json!({
                "id": id,
                "name": "Blend",
                "description": "House blend",
                "price": 4,
                "weight": 1,
                "presentation": "Bag",
            })))
            .unwrap();
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                catalog.add_to_group(&product_id(&id), &group_id("teas")).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    let teas = catalog.groups().get(&group_id("teas")).unwrap();
    assert_eq!(teas.len(), ids.len());
    for id in &ids {
        assert!(teas.contains(&product_id(id)));
    }
}
