//! Cart line items and totals.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Size};
use crate::price::PriceValue;

/// One line in the cart. The list of items is the whole checkout payload.
///
/// The price is captured when the item is added and never recomputed, so a
/// later price change on the server does not affect items already in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// `"<product id>-<size>"`; not unique, repeated adds append duplicates.
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub size: Size,
    #[serde(default)]
    pub price: PriceValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Build the line for `product` in `size` at `price`.
    #[must_use]
    pub fn new(product: &Product, size: Size, price: PriceValue) -> Self {
        Self {
            id: format!("{}-{}", product.id, size),
            name: product.name.clone(),
            size,
            price,
            image: product.image.clone(),
        }
    }
}

/// Item count and total shown on the checkout button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub count: usize,
    pub total: Decimal,
}

impl CartSummary {
    /// The total saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        let total = items
            .iter()
            .map(|item| item.price.amount())
            .try_fold(Decimal::ZERO, Decimal::checked_add)
            .unwrap_or(Decimal::MAX);
        Self {
            count: items.len(),
            total,
        }
    }
}

impl fmt::Display for CartSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {:.2} сом", self.count, self.total)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn item(price: serde_json::Value) -> CartItem {
        serde_json::from_value(json!({
            "id": "1-small",
            "name": "Лагман",
            "size": "small",
            "price": price,
        }))
        .unwrap()
    }

    #[test]
    fn new_builds_id_from_product_and_size() {
        let product: Product = serde_json::from_value(json!({
            "id": 10,
            "name": "Плов",
            "image": "/media/plov.jpg",
            "branch": 1,
            "subcategory": 2,
            "price": 100
        }))
        .unwrap();
        let item = CartItem::new(&product, Size::Medium, PriceValue::from(100));
        assert_eq!(item.id, "10-medium");
        assert_eq!(item.name, "Плов");
        assert_eq!(item.image.as_deref(), Some("/media/plov.jpg"));
    }

    #[test]
    fn summary_coerces_prices() {
        let items = vec![
            item(json!(100)),
            item(json!("250.50")),
            item(json!("n/a")),
            item(json!(null)),
        ];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, Decimal::from_str("350.50").unwrap());
    }

    #[test]
    fn summary_saturates_on_huge_prices() {
        let huge = json!("50000000000000000000000000000");
        let items = vec![item(huge.clone()), item(huge), item(json!(10))];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, Decimal::MAX);
        assert!(summary.to_string().starts_with("3 | "));
    }

    #[test]
    fn missing_price_counts_as_zero() {
        let item: CartItem =
            serde_json::from_value(json!({"id": "2-large", "size": "large"})).unwrap();
        assert_eq!(CartSummary::of(&[item]).total, Decimal::ZERO);
    }

    #[test]
    fn summary_display_matches_checkout_badge() {
        let summary = CartSummary::of(&[item(json!(100)), item(json!(50))]);
        assert_eq!(summary.to_string(), "2 | 150.00 сом");
    }

    #[test]
    fn empty_summary() {
        let summary = CartSummary::of(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total, Decimal::ZERO);
    }
}
