//! Storefront command handlers: browse branches and menus, fill the cart.

use std::sync::Arc;

use nukesul_api::ApiClient;
use nukesul_core::{AppConfig, Size};
use nukesul_store::catalog::starting_price_label;
use nukesul_store::{
    AuthSession, BrowserOptions, Cart, CatalogBrowser, CheckoutBadge, KeyValueStore,
};

/// Truncate `text` to `max` characters, appending `...` when cut.
pub(crate) fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_owned()
    }
}

async fn open_browser(
    config: &AppConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<CatalogBrowser> {
    let mut browser = CatalogBrowser::new(api, store, BrowserOptions::from_config(config));
    if let Err(e) = browser.load_branches().await {
        let message = browser.error().unwrap_or_default().to_owned();
        return Err(anyhow::Error::new(e).context(message));
    }
    Ok(browser)
}

async fn open_menu(
    config: &AppConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    branch_id: i64,
) -> anyhow::Result<CatalogBrowser> {
    let mut browser = open_browser(config, api, store).await?;
    browser.select_branch(branch_id).await?;
    Ok(browser)
}

/// List the branches a customer can order from.
///
/// # Errors
///
/// Returns an error if the branch list cannot be fetched.
pub(crate) async fn run_branches(
    config: &AppConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<()> {
    let browser = open_browser(config, api, store).await?;

    if browser.branches().is_empty() {
        println!("no branches available");
        return Ok(());
    }

    println!("{:<6}{:<28}LOCATION", "ID", "NAME");
    for branch in browser.branches() {
        println!(
            "{:<6}{:<28}{}",
            branch.id,
            clip(branch.display_name(), 24),
            branch.location()
        );
    }
    Ok(())
}

/// Print a branch's menu, one section per category.
///
/// # Errors
///
/// Returns an error if the branch is unknown or the menu fails to load.
pub(crate) async fn run_menu(
    config: &AppConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    branch_id: i64,
) -> anyhow::Result<()> {
    let browser = open_menu(config, api, store, branch_id).await?;
    let sections = browser.sections();

    if let Some(branch) = browser.selected_branch() {
        println!("{} ({})", branch.display_name(), branch.location());
    }
    if sections.is_empty() {
        println!("nothing on the menu for this branch");
        return Ok(());
    }

    for section in &sections {
        println!();
        println!("{}", section.category.label());
        println!("{:<6}{:<36}PRICE", "ID", "PRODUCT");
        for product in &section.products {
            println!(
                "{:<6}{:<36}{}",
                product.id,
                clip(product.display_name(), 32),
                starting_price_label(product)
            );
        }
    }

    if let Some(badge) = browser.checkout() {
        println!();
        println!("cart: {badge}");
    }
    Ok(())
}

/// Add one product in one size to the persisted cart.
///
/// # Errors
///
/// Returns an error if the menu fails to load, the product is not on it, or
/// the size has no price.
pub(crate) async fn run_add(
    config: &AppConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    branch_id: i64,
    product_id: i64,
    size: Size,
) -> anyhow::Result<()> {
    let mut browser = open_menu(config, api, store, branch_id).await?;

    let product = browser.open_product(product_id)?;
    println!("{}", product.display_name());
    for option in browser.size_options() {
        println!("  {:<12}{}", option.label, option.price_label());
    }

    let item = browser.confirm_size(size)?;
    println!(
        "added {} ({}) for {} сом",
        item.name,
        item.size.label(),
        item.price.display()
    );
    if let Some(badge) = browser.checkout() {
        println!("cart: {badge}");
    }
    Ok(())
}

/// Print the persisted cart.
///
/// # Errors
///
/// Returns an error if the stored cart cannot be read.
pub(crate) fn run_cart_show(store: Arc<dyn KeyValueStore>, json: bool) -> anyhow::Result<()> {
    let cart = Cart::load(store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(cart.items())?);
        return Ok(());
    }
    if cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    println!("{:<14}{:<32}{:<12}PRICE", "ID", "NAME", "SIZE");
    for item in cart.items() {
        println!(
            "{:<14}{:<32}{:<12}{}",
            item.id,
            clip(&item.name, 28),
            item.size.label(),
            item.price.display()
        );
    }
    println!("total: {}", cart.summary());
    Ok(())
}

/// Empty the cart. Also recovers a cart file that no longer parses.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub(crate) fn run_cart_clear(store: &dyn KeyValueStore) -> anyhow::Result<()> {
    Cart::reset(store)?;
    println!("cart cleared");
    Ok(())
}

/// Show what the checkout button would link to.
///
/// # Errors
///
/// Returns an error if the stored cart cannot be read.
pub(crate) fn run_checkout(
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> anyhow::Result<()> {
    let cart = Cart::load(store)?;
    match CheckoutBadge::for_cart(&cart, &config.checkout_route) {
        Some(badge) => println!("{badge} -> {}", badge.route),
        None => println!("cart is empty; nothing to check out"),
    }
    Ok(())
}

/// Exchange admin credentials for a token and store it.
///
/// # Errors
///
/// Returns an error if the login is rejected or the token cannot be saved.
pub(crate) async fn run_login(
    api: &ApiClient,
    store: Arc<dyn KeyValueStore>,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    AuthSession::new(store).login(api, username, password).await?;
    println!("logged in as {username}");
    Ok(())
}

/// Forget the stored admin token.
///
/// # Errors
///
/// Returns an error if the token cannot be removed.
pub(crate) fn run_logout(store: Arc<dyn KeyValueStore>) -> anyhow::Result<()> {
    AuthSession::new(store).logout()?;
    println!("logged out");
    Ok(())
}
