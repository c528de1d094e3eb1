//! Integration tests for `CatalogBrowser` against a wiremock API.

use std::sync::Arc;

use nukesul_api::ApiClient;
use nukesul_core::{CartItem, Size};
use nukesul_store::catalog::{starting_price_label, BRANCHES_UNAVAILABLE, NO_PRODUCTS};
use nukesul_store::{
    keys, BrowserOptions, CatalogBrowser, KeyValueStore, MemoryStore, Phase, SectionBox,
    StoreError,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::with_base_url(&server.uri(), 5, "nukesul-test/0.1")
        .expect("client construction should not fail")
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_catalog(server: &MockServer) {
    mount_json(
        server,
        "/api/public/branches/",
        json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]),
    )
    .await;
    mount_json(
        server,
        "/api/public/categories/",
        json!({"results": [
            {"id": 5, "name": "Пицца", "emoji": "🍕"},
            {"id": 6, "name": "Супы"},
            {"id": 7, "name": "Напитки"}
        ]}),
    )
    .await;
    mount_json(
        server,
        "/api/public/products/",
        json!([
            {"id": 10, "branch": {"id": 1}, "subcategory": {"category": {"id": 5}}, "price": 100},
            {
                "id": 11, "name": "Пепперони", "branch": {"id": 1},
                "subcategory": {"id": 3, "category": {"id": 5}},
                "small_price": 400, "medium_price": "550"
            },
            {"id": 12, "name": "Лагман", "branch": 1, "subcategory": {"category": 6}, "price": "250"},
            {"id": 20, "name": "Чай", "branch": {"id": 2}, "subcategory": {"category": {"id": 7}}, "price": 50}
        ]),
    )
    .await;
}

async fn browser_on_branch_one(
    server: &MockServer,
    store: Arc<MemoryStore>,
    options: BrowserOptions,
) -> CatalogBrowser {
    let mut browser = CatalogBrowser::new(api(server), store, options);
    browser.load_branches().await.expect("branches");
    browser.select_branch(1).await.expect("select branch");
    browser
}

#[tokio::test]
async fn flat_priced_product_scenario() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new());

    let mut browser = CatalogBrowser::new(api(&server), store.clone(), BrowserOptions::default());
    assert_eq!(browser.phase(), Phase::Branches);
    browser.load_branches().await.expect("branches");
    assert_eq!(browser.branches().len(), 2);

    browser.select_branch(1).await.expect("select branch");
    assert_eq!(browser.phase(), Phase::Content);
    assert!(browser.error().is_none());

    let sections = browser.sections();
    let pizza = sections
        .iter()
        .find(|s| s.category.id == 5)
        .expect("category 5 section");
    let product = pizza
        .products
        .iter()
        .find(|p| p.id == 10)
        .expect("product 10 listed");
    assert_eq!(starting_price_label(product), "от 100 сом");

    browser.open_product(10).expect("open product");
    let options = browser.size_options();
    assert_eq!(options.len(), 3);
    assert!(options.iter().all(|o| o.enabled() && o.price_label() == "100 сом"));

    let item = browser.confirm_size(Size::Medium).expect("add to cart");
    assert_eq!(item.id, "10-medium");
    assert_eq!(item.price.display(), "100");
    assert!(browser.selected_product().is_none());

    let persisted: Vec<CartItem> =
        serde_json::from_str(&store.get(keys::CART).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, browser.cart().unwrap().items());

    let badge = browser.checkout().expect("badge shown for non-empty cart");
    assert_eq!(badge.to_string(), "1 | 100.00 сом");
    assert_eq!(badge.route, "/checkout");
}

#[tokio::test]
async fn checkout_badge_reads_like_cart_summary() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new().with_entry(
        keys::CART,
        r#"[{"id":"12-small","name":"Лагман","size":"small","price":"250.5"},
            {"id":"10-large","name":"","size":"large","price":100}]"#,
    ));
    let browser = browser_on_branch_one(&server, store, BrowserOptions::default()).await;

    let badge = browser.checkout().expect("badge for persisted cart");
    let summary = browser.cart().expect("cart loaded").summary();
    assert_eq!(badge.summary(), summary);
    assert_eq!(badge.to_string(), summary.to_string());
    assert_eq!(badge.to_string(), "2 | 350.50 сом");
}

#[tokio::test]
async fn product_of_deleted_branch_is_dropped_from_menu() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/public/branches/", json!([{"id": 1, "name": "A"}])).await;
    mount_json(
        &server,
        "/api/public/categories/",
        json!([{"id": 5, "name": "Пицца"}]),
    )
    .await;
    mount_json(
        &server,
        "/api/public/products/",
        json!([
            {"id": 10, "branch": {"id": 1}, "subcategory": {"category": {"id": 5}}, "price": 100},
            {"id": 11, "branch": null, "subcategory": {"category": {"id": 5}}, "price": 90},
            {"id": 12, "branch": 1, "subcategory": null, "price": 80}
        ]),
    )
    .await;

    let browser =
        browser_on_branch_one(&server, Arc::new(MemoryStore::new()), BrowserOptions::default())
            .await;
    assert_eq!(browser.phase(), Phase::Content);
    assert!(browser.error().is_none());

    let sections = browser.sections();
    assert_eq!(sections.len(), 1);
    let ids: Vec<i64> = sections[0].products.iter().map(|p| p.id).collect();
    assert_eq!(ids, [10]);
}

#[tokio::test]
async fn sections_only_hold_selected_branch_products() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let browser =
        browser_on_branch_one(&server, Arc::new(MemoryStore::new()), BrowserOptions::default())
            .await;

    let sections = browser.sections();
    for section in &sections {
        for product in &section.products {
            assert_eq!(product.branch_id(), Some(1));
            assert_eq!(product.category_id(), Some(section.category.id));
        }
    }
    let ids: Vec<i64> = sections.iter().map(|s| s.category.id).collect();
    assert_eq!(ids, [5, 6]);

    let nav = browser.nav_entries();
    assert_eq!(nav.len(), 2);
    assert_eq!(nav[0].label, "🍕 Пицца");
    assert_eq!(nav[0].anchor, "category-5");
    assert!(nav[0].active);
    assert!(!nav[1].active);
}

#[tokio::test]
async fn tiered_product_disables_missing_tier() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let mut browser =
        browser_on_branch_one(&server, Arc::new(MemoryStore::new()), BrowserOptions::default())
            .await;

    browser.open_product(11).expect("open product");
    let options = browser.size_options();
    assert_eq!(options[0].price_label(), "400 сом");
    assert_eq!(options[1].price_label(), "550 сом");
    assert!(!options[2].enabled());
    assert_eq!(options[2].price_label(), "Нет");

    let err = browser.confirm_size(Size::Large).unwrap_err();
    assert!(matches!(
        err,
        StoreError::SizeUnavailable {
            product_id: 11,
            size: Size::Large
        }
    ));
    assert!(browser.selected_product().is_some());
    assert!(browser.checkout().is_none());

    browser.confirm_size(Size::Small).expect("small is available");
    browser.open_product(11).expect("reopen");
    browser.confirm_size(Size::Small).expect("duplicate add");
    let cart = browser.cart().unwrap();
    assert_eq!(cart.items().len(), 2);
    assert_eq!(cart.items()[0].id, cart.items()[1].id);
    assert_eq!(browser.checkout().unwrap().to_string(), "2 | 800.00 сом");
}

#[tokio::test]
async fn persisted_cart_is_merged_on_branch_select() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new().with_entry(
        keys::CART,
        r#"[{"id":"99-large","name":"Старое","size":"large","price":"n/a"}]"#,
    ));
    let browser = browser_on_branch_one(&server, store, BrowserOptions::default()).await;

    let badge = browser.checkout().expect("restored cart shows badge");
    assert_eq!(badge.count, 1);
    assert_eq!(badge.to_string(), "1 | 0.00 сом");
}

#[tokio::test]
async fn branch_load_failure_sets_connection_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/branches/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut browser =
        CatalogBrowser::new(api(&server), Arc::new(MemoryStore::new()), BrowserOptions::default());
    assert!(browser.load_branches().await.is_err());
    assert_eq!(browser.error(), Some(BRANCHES_UNAVAILABLE));
    assert_eq!(browser.phase(), Phase::Branches);
}

#[tokio::test]
async fn product_load_failure_reverts_to_branches() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/public/branches/", json!([{"id": 1, "name": "A"}])).await;
    mount_json(&server, "/api/public/categories/", json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/public/products/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Внутренняя ошибка"})),
        )
        .mount(&server)
        .await;

    let mut browser =
        CatalogBrowser::new(api(&server), Arc::new(MemoryStore::new()), BrowserOptions::default());
    browser.load_branches().await.expect("branches");
    assert!(browser.select_branch(1).await.is_err());

    assert_eq!(browser.phase(), Phase::Branches);
    assert!(browser.selected_branch().is_none());
    assert!(browser.error().unwrap().contains("Внутренняя ошибка"));
    assert!(!browser.is_tracking_scroll());
}

#[tokio::test]
async fn empty_product_list_is_reported() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/public/branches/", json!([{"id": 1, "name": "A"}])).await;
    mount_json(&server, "/api/public/categories/", json!([])).await;
    mount_json(&server, "/api/public/products/", json!({"results": []})).await;

    let mut browser =
        CatalogBrowser::new(api(&server), Arc::new(MemoryStore::new()), BrowserOptions::default());
    browser.load_branches().await.expect("branches");
    assert!(browser.select_branch(1).await.is_err());
    assert_eq!(browser.error(), Some(NO_PRODUCTS));
    assert_eq!(browser.phase(), Phase::Branches);
}

#[tokio::test]
async fn malformed_persisted_cart_reverts_and_is_kept() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new().with_entry(keys::CART, "not json"));

    let mut browser = CatalogBrowser::new(api(&server), store.clone(), BrowserOptions::default());
    browser.load_branches().await.expect("branches");
    let err = browser.select_branch(1).await.unwrap_err();

    assert!(matches!(err, StoreError::Malformed { .. }));
    assert_eq!(browser.phase(), Phase::Branches);
    assert!(browser.error().is_some());
    assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("not json"));
}

#[tokio::test]
async fn unknown_branch_is_rejected_without_fetching() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/public/branches/", json!([{"id": 1, "name": "A"}])).await;

    let mut browser =
        CatalogBrowser::new(api(&server), Arc::new(MemoryStore::new()), BrowserOptions::default());
    browser.load_branches().await.expect("branches");
    let err = browser.select_branch(42).await.unwrap_err();
    assert!(matches!(err, StoreError::UnknownBranch(42)));
    assert_eq!(browser.phase(), Phase::Branches);
}

#[tokio::test]
async fn scroll_spy_tracks_sections_and_is_torn_down() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let mut browser =
        browser_on_branch_one(&server, Arc::new(MemoryStore::new()), BrowserOptions::default())
            .await;

    assert_eq!(browser.active_category(), Some(5));
    let layout = [
        SectionBox::new(5, -400.0, 60.0),
        SectionBox::new(6, 60.0, 700.0),
    ];
    assert_eq!(browser.on_scroll(&layout), Some(6));
    assert!(browser.nav_entries()[1].active);

    browser.change_branch().expect("switch allowed by default");
    assert_eq!(browser.phase(), Phase::Branches);
    assert!(!browser.is_tracking_scroll());
    assert_eq!(browser.on_scroll(&layout), None);
    assert!(browser.sections().is_empty());
}

#[tokio::test]
async fn placed_order_locks_branch_when_configured() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new().with_entry(keys::ORDER_PLACED, "true"));
    let options = BrowserOptions {
        block_branch_switch_after_order: true,
        ..BrowserOptions::default()
    };
    let mut browser = browser_on_branch_one(&server, store.clone(), options).await;

    let err = browser.change_branch().unwrap_err();
    assert!(matches!(err, StoreError::BranchLocked));
    assert_eq!(browser.phase(), Phase::Content);

    store.set(keys::ORDER_PLACED, "false").unwrap();
    browser.change_branch().expect("unlocked");
    assert_eq!(browser.phase(), Phase::Branches);
}

#[tokio::test]
async fn order_flag_written_through_cart_locks_branch() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new());
    let options = BrowserOptions {
        block_branch_switch_after_order: true,
        ..BrowserOptions::default()
    };
    let mut browser = browser_on_branch_one(&server, store.clone(), options).await;

    browser.change_branch().expect("no order placed yet");
    browser.select_branch(1).await.expect("reselect branch");
    browser
        .cart()
        .expect("cart loaded")
        .set_order_placed(true)
        .expect("flag written");
    assert_eq!(store.get(keys::ORDER_PLACED).unwrap().as_deref(), Some("true"));

    let err = browser.change_branch().unwrap_err();
    assert!(matches!(err, StoreError::BranchLocked));
}

#[tokio::test]
async fn placed_order_does_not_lock_by_default() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    let store = Arc::new(MemoryStore::new().with_entry(keys::ORDER_PLACED, "true"));
    let mut browser = browser_on_branch_one(&server, store, BrowserOptions::default()).await;
    browser.change_branch().expect("switching allowed");
}
