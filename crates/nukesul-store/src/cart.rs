//! The persisted shopping cart.
//!
//! Every mutation writes the whole item list back under [`keys::CART`]
//! before returning, so the persisted JSON always equals the in-memory cart.

use std::sync::Arc;

use nukesul_core::{CartItem, CartSummary};

use crate::error::StoreError;
use crate::persistence::{get_json, keys, set_json, KeyValueStore};

pub struct Cart {
    store: Arc<dyn KeyValueStore>,
    items: Vec<CartItem>,
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl Cart {
    /// Loads the persisted cart; an absent key is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] when the persisted value is not a
    /// valid item list. The stored value is left as is.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let items: Vec<CartItem> = get_json(store.as_ref(), keys::CART)?.unwrap_or_default();
        tracing::debug!(items = items.len(), "cart loaded");
        Ok(Self { store, items })
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.items)
    }

    /// Appends `item`. Adding the same product and size twice yields two lines.
    ///
    /// # Errors
    ///
    /// Returns a store error if the cart cannot be persisted; the in-memory
    /// cart is left unchanged in that case.
    pub fn add(&mut self, item: CartItem) -> Result<(), StoreError> {
        let mut next = self.items.clone();
        tracing::info!(item = %item.id, price = %item.price.display(), "added to cart");
        next.push(item);
        self.commit(next)
    }

    /// # Errors
    ///
    /// Returns a store error if the cart cannot be persisted.
    pub fn replace(&mut self, items: Vec<CartItem>) -> Result<(), StoreError> {
        self.commit(items)
    }

    /// Empties the cart and persists the empty list.
    ///
    /// # Errors
    ///
    /// Returns a store error if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new())
    }

    /// Empties the persisted cart without loading it. This is the way out of
    /// a malformed persisted cart.
    ///
    /// # Errors
    ///
    /// Returns a store error if the cart cannot be persisted.
    pub fn reset(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        set_json(store, keys::CART, &Vec::<CartItem>::new())?;
        tracing::info!("cart reset");
        Ok(())
    }

    /// Whether the customer has already placed an order this session.
    ///
    /// # Errors
    ///
    /// Returns a store error if the flag cannot be read.
    pub fn order_placed(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(keys::ORDER_PLACED)?.as_deref() == Some("true"))
    }

    /// # Errors
    ///
    /// Returns a store error if the flag cannot be written.
    pub fn set_order_placed(&self, placed: bool) -> Result<(), StoreError> {
        self.store
            .set(keys::ORDER_PLACED, if placed { "true" } else { "false" })
    }

    fn commit(&mut self, items: Vec<CartItem>) -> Result<(), StoreError> {
        set_json(self.store.as_ref(), keys::CART, &items)?;
        self.items = items;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nukesul_core::{PriceValue, Product, Size};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::persistence::MemoryStore;

    fn product(id: i64) -> Product {
        serde_json::from_value(json!({
            "id": id,
            "name": "Самса",
            "branch": 1,
            "subcategory": 2,
            "price": 80
        }))
        .unwrap()
    }

    fn persisted(store: &MemoryStore) -> Vec<CartItem> {
        serde_json::from_str(&store.get(keys::CART).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn absent_cart_loads_empty() {
        let cart = Cart::load(Arc::new(MemoryStore::new())).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.summary().count, 0);
    }

    #[test]
    fn every_add_is_persisted_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = Cart::load(store.clone()).unwrap();

        for (id, size) in [(1, Size::Small), (1, Size::Small), (2, Size::Large)] {
            cart.add(CartItem::new(&product(id), size, PriceValue::from(80)))
                .unwrap();
            assert_eq!(persisted(&store), cart.items());
        }

        assert_eq!(cart.items().len(), 3);
        assert_eq!(cart.items()[0].id, cart.items()[1].id);
        assert_eq!(cart.summary().total, Decimal::from(240));
    }

    #[test]
    fn persisted_cart_is_restored() {
        let store = Arc::new(MemoryStore::new().with_entry(
            keys::CART,
            r#"[{"id":"7-medium","name":"Плов","size":"medium","price":"150.5"}]"#,
        ));
        let cart = Cart::load(store).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.summary().to_string(), "1 | 150.50 сом");
    }

    #[test]
    fn malformed_cart_is_surfaced_and_left_alone() {
        let store = Arc::new(MemoryStore::new().with_entry(keys::CART, "[{broken"));
        let err = Cart::load(store.clone()).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[{broken"));

        Cart::reset(store.as_ref()).unwrap();
        assert!(Cart::load(store).unwrap().is_empty());
    }

    #[test]
    fn replace_and_clear_persist() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = Cart::load(store.clone()).unwrap();
        let item = CartItem::new(&product(3), Size::Medium, PriceValue::from(80));
        cart.replace(vec![item.clone(), item]).unwrap();
        assert_eq!(persisted(&store).len(), 2);
        cart.clear().unwrap();
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn order_placed_flag() {
        let store = Arc::new(MemoryStore::new());
        let cart = Cart::load(store.clone()).unwrap();
        assert!(!cart.order_placed().unwrap());
        cart.set_order_placed(true).unwrap();
        assert_eq!(store.get(keys::ORDER_PLACED).unwrap().as_deref(), Some("true"));
        assert!(cart.order_placed().unwrap());
        cart.set_order_placed(false).unwrap();
        assert!(!cart.order_placed().unwrap());
    }
}
