//! The storefront browser: branch selection, the per-branch menu, the size
//! modal and the checkout badge.
//!
//! Moves through three phases. `Branches` shows the branch list,
//! `Loading` covers the category and product fetch, and `Content` shows
//! the menu. Any load failure drops back to `Branches` with a message in
//! [`CatalogBrowser::error`]; nothing is retried.

use std::fmt;
use std::sync::Arc;

use nukesul_api::ApiClient;
use nukesul_core::{
    AppConfig, Branch, CartItem, CartSummary, Category, PriceValue, Product, Size,
};
use rust_decimal::Decimal;

use crate::cart::Cart;
use crate::error::StoreError;
use crate::persistence::KeyValueStore;
use crate::scroll_spy::{ScrollSpy, SectionBox};

pub const BRANCHES_UNAVAILABLE: &str = "Не удалось загрузить филиалы. Проверьте подключение.";
pub const NO_PRODUCTS: &str = "Продукты не найдены.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub checkout_route: String,
    pub block_branch_switch_after_order: bool,
}

impl BrowserOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            checkout_route: config.checkout_route.clone(),
            block_branch_switch_after_order: config.block_branch_switch_after_order,
        }
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            checkout_route: "/checkout".to_owned(),
            block_branch_switch_after_order: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Branches,
    Loading,
    Content,
}

/// One category's block on the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection<'a> {
    pub category: &'a Category,
    pub products: Vec<&'a Product>,
}

impl MenuSection<'_> {
    #[must_use]
    pub fn anchor(&self) -> String {
        anchor_for(self.category.id)
    }
}

/// A jump link in the category navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub category_id: i64,
    pub label: String,
    pub anchor: String,
    pub active: bool,
}

/// One size button in the product modal.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeOption {
    pub size: Size,
    pub label: &'static str,
    pub price: Option<PriceValue>,
}

impl SizeOption {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.price.is_some()
    }

    /// `"550 сом"`, or `"Нет"` for a disabled size.
    #[must_use]
    pub fn price_label(&self) -> String {
        match &self.price {
            Some(price) => format!("{} сом", price.display()),
            None => "Нет".to_owned(),
        }
    }
}

/// The floating checkout button shown while the cart is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutBadge {
    pub count: usize,
    pub total: Decimal,
    pub route: String,
}

impl CheckoutBadge {
    /// The badge for `cart`, or `None` when it is empty.
    #[must_use]
    pub fn for_cart(cart: &Cart, route: &str) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }
        let summary = cart.summary();
        Some(Self {
            count: summary.count,
            total: summary.total,
            route: route.to_owned(),
        })
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            count: self.count,
            total: self.total,
        }
    }
}

impl fmt::Display for CheckoutBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.summary(), f)
    }
}

/// `"от 100 сом"`.
#[must_use]
pub fn starting_price_label(product: &Product) -> String {
    format!("от {} сом", product.starting_price().display())
}

#[must_use]
pub fn anchor_for(category_id: i64) -> String {
    format!("category-{category_id}")
}

/// Size buttons for `product`.
///
/// Tier-priced products offer each tier they carry and disable the rest;
/// flat-priced products offer every size at the flat price.
#[must_use]
pub fn size_options(product: &Product) -> Vec<SizeOption> {
    Size::ALL
        .iter()
        .map(|&size| SizeOption {
            size,
            label: size.label(),
            price: product.price_for(size).cloned(),
        })
        .collect()
}

pub struct CatalogBrowser {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    options: BrowserOptions,
    phase: Phase,
    branches: Vec<Branch>,
    selected_branch: Option<Branch>,
    categories: Vec<Category>,
    products: Vec<Product>,
    cart: Option<Cart>,
    selected_product: Option<Product>,
    scroll_spy: Option<ScrollSpy>,
    error: Option<String>,
}

impl fmt::Debug for CatalogBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogBrowser")
            .field("phase", &self.phase)
            .field("selected_branch", &self.selected_branch.as_ref().map(|b| b.id))
            .field("products", &self.products.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl CatalogBrowser {
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, options: BrowserOptions) -> Self {
        Self {
            api,
            store,
            options,
            phase: Phase::Branches,
            branches: Vec::new(),
            selected_branch: None,
            categories: Vec::new(),
            products: Vec::new(),
            cart: None,
            selected_product: None,
            scroll_spy: None,
            error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The message to show, if the last operation failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[must_use]
    pub fn selected_branch(&self) -> Option<&Branch> {
        self.selected_branch.as_ref()
    }

    /// Products of the selected branch, in API order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    // -- branch selection ----------------------------------------------------

    /// Fetches the branch list.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording [`BRANCHES_UNAVAILABLE`] as the
    /// screen message.
    pub async fn load_branches(&mut self) -> Result<(), StoreError> {
        match self.api.list_branches().await {
            Ok(branches) => {
                tracing::info!(count = branches.len(), "branches loaded");
                self.branches = branches;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load branches");
                self.error = Some(BRANCHES_UNAVAILABLE.to_owned());
                Err(e.into())
            }
        }
    }

    /// Selects a branch and loads its menu.
    ///
    /// Categories and products are fetched concurrently, then the persisted
    /// cart is loaded. On success the browser enters [`Phase::Content`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownBranch`] if `branch_id` is not in the
    /// loaded list. Any load failure, including an empty product list or a
    /// malformed persisted cart, reverts to [`Phase::Branches`], records the
    /// message in [`CatalogBrowser::error`] and is returned.
    pub async fn select_branch(&mut self, branch_id: i64) -> Result<(), StoreError> {
        let branch = self
            .branches
            .iter()
            .find(|b| b.id == branch_id)
            .cloned()
            .ok_or(StoreError::UnknownBranch(branch_id))?;

        tracing::info!(branch_id, branch = %branch.display_name(), "branch selected");
        self.selected_branch = Some(branch);
        self.phase = Phase::Loading;
        self.error = None;

        match self.load_menu(branch_id).await {
            Ok((categories, products, cart)) => {
                tracing::info!(
                    branch_id,
                    categories = categories.len(),
                    products = products.len(),
                    cart_items = cart.items().len(),
                    "menu loaded"
                );
                self.categories = categories;
                self.products = products;
                self.cart = Some(cart);
                self.scroll_spy = Some(ScrollSpy::new(self.first_section_id()));
                self.phase = Phase::Content;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(branch_id, error = %e, "failed to load menu");
                self.error = Some(e.to_string());
                self.reset_to_branches();
                Err(e)
            }
        }
    }

    async fn load_menu(
        &self,
        branch_id: i64,
    ) -> Result<(Vec<Category>, Vec<Product>, Cart), StoreError> {
        let (categories, products) =
            tokio::try_join!(self.api.list_categories(), self.api.list_products())?;
        if products.is_empty() {
            return Err(StoreError::NotFound(NO_PRODUCTS.to_owned()));
        }
        let cart = Cart::load(Arc::clone(&self.store))?;
        let products = products
            .into_iter()
            .filter(|p| p.branch_id() == Some(branch_id))
            .collect();
        Ok((categories, products, cart))
    }

    /// Returns to branch selection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BranchLocked`] when switching is blocked after
    /// an order and an order has been placed.
    ///
    /// Nothing in this crate sets the `orderPlaced` flag; it is written by the
    /// checkout flow outside this client (or [`Cart::set_order_placed`]), so
    /// the lock only takes effect once that writer has run.
    pub fn change_branch(&mut self) -> Result<(), StoreError> {
        if self.options.block_branch_switch_after_order {
            if let Some(cart) = &self.cart {
                if cart.order_placed()? {
                    return Err(StoreError::BranchLocked);
                }
            }
        }
        self.reset_to_branches();
        Ok(())
    }

    fn reset_to_branches(&mut self) {
        self.phase = Phase::Branches;
        self.selected_branch = None;
        self.selected_product = None;
        self.scroll_spy = None;
        self.categories.clear();
        self.products.clear();
    }

    // -- menu ----------------------------------------------------------------

    /// Category sections with at least one product of the selected branch.
    #[must_use]
    pub fn sections(&self) -> Vec<MenuSection<'_>> {
        let Some(branch) = &self.selected_branch else {
            return Vec::new();
        };
        self.categories
            .iter()
            .filter_map(|category| {
                let products: Vec<&Product> = self
                    .products
                    .iter()
                    .filter(|p| p.is_listed_under(branch.id, category.id))
                    .collect();
                (!products.is_empty()).then_some(MenuSection { category, products })
            })
            .collect()
    }

    /// Navigation links, one per non-empty section.
    #[must_use]
    pub fn nav_entries(&self) -> Vec<NavEntry> {
        let active = self.active_category();
        self.sections()
            .iter()
            .map(|section| NavEntry {
                category_id: section.category.id,
                label: section.category.label(),
                anchor: section.anchor(),
                active: active == Some(section.category.id),
            })
            .collect()
    }

    fn first_section_id(&self) -> Option<i64> {
        self.sections().first().map(|s| s.category.id)
    }

    #[must_use]
    pub fn active_category(&self) -> Option<i64> {
        self.scroll_spy.as_ref().and_then(ScrollSpy::active)
    }

    /// Feeds the current section layout to the scroll-spy. Ignored outside
    /// [`Phase::Content`].
    pub fn on_scroll(&mut self, sections: &[SectionBox]) -> Option<i64> {
        if self.phase != Phase::Content {
            return None;
        }
        self.scroll_spy.as_mut().and_then(|spy| spy.update(sections))
    }

    /// Whether the scroll listener is currently registered.
    #[must_use]
    pub fn is_tracking_scroll(&self) -> bool {
        self.scroll_spy.is_some()
    }

    // -- product modal -------------------------------------------------------

    /// Opens the size modal for a product of the selected branch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownProduct`] if the product is not on the
    /// current menu.
    pub fn open_product(&mut self, product_id: i64) -> Result<&Product, StoreError> {
        let product = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or(StoreError::UnknownProduct(product_id))?;
        Ok(self.selected_product.insert(product))
    }

    pub fn close_product(&mut self) {
        self.selected_product = None;
    }

    #[must_use]
    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }

    /// Size buttons for the open product; empty when the modal is closed.
    #[must_use]
    pub fn size_options(&self) -> Vec<SizeOption> {
        self.selected_product
            .as_ref()
            .map(size_options)
            .unwrap_or_default()
    }

    /// Adds the open product in `size` to the cart and closes the modal.
    ///
    /// The price is fixed now and never recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoProductSelected`] when the modal is closed,
    /// [`StoreError::SizeUnavailable`] for a disabled size (the modal stays
    /// open), or a store error if the cart cannot be persisted.
    pub fn confirm_size(&mut self, size: Size) -> Result<CartItem, StoreError> {
        let product = self
            .selected_product
            .as_ref()
            .ok_or(StoreError::NoProductSelected)?;
        let price = product
            .price_for(size)
            .cloned()
            .ok_or(StoreError::SizeUnavailable {
                product_id: product.id,
                size,
            })?;
        let item = CartItem::new(product, size, price);

        let cart = match self.cart.take() {
            Some(cart) => cart,
            None => Cart::load(Arc::clone(&self.store))?,
        };
        self.cart.insert(cart).add(item.clone())?;
        self.selected_product = None;
        Ok(item)
    }

    // -- checkout ------------------------------------------------------------

    /// The checkout badge, present only while the cart has items.
    #[must_use]
    pub fn checkout(&self) -> Option<CheckoutBadge> {
        CheckoutBadge::for_cart(self.cart.as_ref()?, &self.options.checkout_route)
    }
}
