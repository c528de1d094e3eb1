use serde_json::json;

use super::*;

fn product(value: serde_json::Value) -> Product {
    serde_json::from_value(value).expect("product fixture should parse")
}

#[test]
fn product_accepts_nested_refs() {
    let p = product(json!({
        "id": 10,
        "branch": {"id": 1},
        "subcategory": {"category": {"id": 5}},
        "price": 100
    }));
    assert_eq!(p.branch_id(), Some(1));
    assert_eq!(p.category_id(), Some(5));
    assert_eq!(p.subcategory_id(), None);
    assert!(p.is_listed_under(1, 5));
    assert!(!p.is_listed_under(2, 5));
    assert!(!p.is_listed_under(1, 6));
}

#[test]
fn product_accepts_bare_id_refs() {
    let p = product(json!({
        "id": 11,
        "name": "Маргарита",
        "branch": 2,
        "subcategory": {"id": 3, "name": "Пицца", "category": 7},
        "small_price": "350.00"
    }));
    assert_eq!(p.branch_id(), Some(2));
    assert_eq!(p.subcategory_id(), Some(3));
    assert_eq!(p.category_id(), Some(7));
}

#[test]
fn bare_subcategory_id_has_no_category() {
    let p = product(json!({"id": 1, "branch": 1, "subcategory": 4, "price": 50}));
    assert_eq!(p.category_id(), None);
    assert!(!p.is_listed_under(1, 4));
}

#[test]
fn flat_price_applies_to_every_size() {
    let p = product(json!({"id": 10, "branch": 1, "subcategory": 2, "price": 100}));
    assert!(!p.has_tier_pricing());
    for size in Size::ALL {
        assert_eq!(p.price_for(size), Some(&PriceValue::from(100)));
    }
}

#[test]
fn tier_prices_are_per_size_and_missing_tiers_unavailable() {
    let p = product(json!({
        "id": 12,
        "branch": 1,
        "subcategory": 2,
        "small_price": 300,
        "medium_price": null,
        "large_price": 600,
        "price": 999
    }));
    assert!(p.has_tier_pricing());
    assert_eq!(p.price_for(Size::Small), Some(&PriceValue::from(300)));
    assert_eq!(p.price_for(Size::Medium), None);
    assert_eq!(p.price_for(Size::Large), Some(&PriceValue::from(600)));
}

#[test]
fn tier_prices_fall_back_to_prices_object() {
    let p = product(json!({
        "id": 13,
        "branch": 1,
        "subcategory": 2,
        "prices": {"small": "400", "medium": "500", "large": "650"}
    }));
    assert_eq!(p.price_for(Size::Medium), Some(&PriceValue::from("500")));
}

#[test]
fn starting_price_prefers_small_then_flat_then_zero() {
    let tiered = product(json!({"id": 1, "branch": 1, "subcategory": 2, "small_price": 300, "price": 100}));
    assert_eq!(tiered.starting_price().display(), "300");

    let flat = product(json!({"id": 2, "branch": 1, "subcategory": 2, "price": 100}));
    assert_eq!(flat.starting_price().display(), "100");

    let none = product(json!({"id": 3, "branch": 1, "subcategory": 2}));
    assert_eq!(none.starting_price().display(), "0");
}

#[test]
fn size_parses_names_and_short_forms() {
    assert_eq!("small".parse::<Size>().unwrap(), Size::Small);
    assert_eq!("M".parse::<Size>().unwrap(), Size::Medium);
    assert_eq!(" Large ".parse::<Size>().unwrap(), Size::Large);
    assert!(matches!(
        "xl".parse::<Size>(),
        Err(CoreError::InvalidSize(ref s)) if s == "xl"
    ));
}

#[test]
fn pricing_model_parses() {
    assert_eq!("tiered".parse::<PricingModel>().unwrap(), PricingModel::Tiered);
    assert_eq!("Flat".parse::<PricingModel>().unwrap(), PricingModel::Flat);
    assert!("per-kilo".parse::<PricingModel>().is_err());
}

#[test]
fn list_envelope_accepts_bare_and_paged() {
    let bare: ListEnvelope<Category> =
        serde_json::from_value(json!([{"id": 1, "name": "Пицца", "emoji": "🍕"}])).unwrap();
    assert_eq!(bare.into_vec().len(), 1);

    let paged: ListEnvelope<Category> =
        serde_json::from_value(json!({"count": 1, "results": [{"id": 2, "name": "Супы"}]}))
            .unwrap();
    let items = paged.into_vec();
    assert_eq!(items[0].id, 2);
}

#[test]
fn orphaned_product_decodes_but_is_never_listed() {
    let products: ListEnvelope<Product> = serde_json::from_value(json!([
        {"id": 1, "branch": {"id": 1}, "subcategory": {"category": {"id": 5}}, "price": 100},
        {"id": 2, "branch": null, "subcategory": {"category": {"id": 5}}, "price": 100},
        {"id": 3, "branch": 1, "subcategory": null, "price": 100},
        {"id": 4, "price": 100}
    ]))
    .expect("products with null refs should still decode");
    let products = products.into_vec();
    assert_eq!(products.len(), 4);
    assert!(products[0].is_listed_under(1, 5));

    assert_eq!(products[1].branch_id(), None);
    assert!(!products[1].is_listed_under(1, 5));
    assert_eq!(products[2].category_id(), None);
    assert_eq!(products[2].subcategory_id(), None);
    assert!(!products[2].is_listed_under(1, 5));
    assert!(products[3].branch.is_none() && products[3].subcategory.is_none());
}

#[test]
fn list_envelope_rejects_object_without_results() {
    let result: Result<ListEnvelope<Category>, _> =
        serde_json::from_value(json!({"detail": "oops"}));
    assert!(result.is_err());
}

#[test]
fn branch_display_fallbacks() {
    let branch: Branch = serde_json::from_value(json!({"id": 1})).unwrap();
    assert_eq!(branch.display_name(), "Без названия");
    assert_eq!(branch.location(), "Адрес не указан");

    let branch: Branch =
        serde_json::from_value(json!({"id": 2, "name": "Центр", "city": "Бишкек"})).unwrap();
    assert_eq!(branch.display_name(), "Центр");
    assert_eq!(branch.location(), "Бишкек");
}

#[test]
fn category_label_includes_emoji() {
    let with: Category =
        serde_json::from_value(json!({"id": 1, "name": "Пицца", "emoji": "🍕"})).unwrap();
    assert_eq!(with.label(), "🍕 Пицца");
    let without: Category = serde_json::from_value(json!({"id": 2, "name": "Супы"})).unwrap();
    assert_eq!(without.label(), "Супы");
}
