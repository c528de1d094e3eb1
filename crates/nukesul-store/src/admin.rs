//! Back-office state: the auth gate, the tabbed collections, the entity forms
//! and the shared error/message banner.
//!
//! Collections are fetched once when the console opens. Switching tabs never
//! refetches; a successful create or update refetches the affected
//! collection, and a successful delete drops the entity locally.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use nukesul_api::{
    ApiClient, ApiError, BranchPayload, CategoryPayload, ImageUpload, ProductPayload,
    ProductPricing, SubcategoryPayload,
};
use nukesul_core::price::format_grouped;
use nukesul_core::{
    AppConfig, Branch, Category, PriceValue, PricingModel, Product, Size, Subcategory, User,
};

use crate::auth::AuthSession;
use crate::error::StoreError;
use crate::persistence::{get_json, keys, set_json, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOptions {
    pub login_route: String,
    /// Subcategories treated as tier-priced when the API does not say.
    pub tiered_subcategory_ids: Vec<i64>,
}

impl AdminOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            login_route: config.admin_login_route.clone(),
            tiered_subcategory_ids: config.tiered_subcategory_ids.clone(),
        }
    }
}

impl Default for AdminOptions {
    fn default() -> Self {
        Self {
            login_route: "/admin/login".to_owned(),
            tiered_subcategory_ids: Vec::new(),
        }
    }
}

/// Result of opening the console.
#[derive(Debug)]
pub enum AdminGate {
    /// No usable token; go to the login route.
    Redirect(String),
    Ready(Box<AdminConsole>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Users,
    Branch,
    ManageBranches,
    Category,
    Subcategory,
    ManageSubcategories,
}

impl AdminTab {
    pub const ALL: [AdminTab; 6] = [
        AdminTab::Users,
        AdminTab::Branch,
        AdminTab::ManageBranches,
        AdminTab::Category,
        AdminTab::Subcategory,
        AdminTab::ManageSubcategories,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Branch => "branch",
            Self::ManageBranches => "manageBranches",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::ManageSubcategories => "manageSubcategories",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Пользователи",
            Self::Branch => "Добавить филиал",
            Self::ManageBranches => "Управление филиалами",
            Self::Category => "Добавить категорию",
            Self::Subcategory => "Добавить подкатегорию",
            Self::ManageSubcategories => "Управление подкатегориями",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminTab {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::Validation(format!("unknown admin tab: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchForm {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubcategoryForm {
    pub name: String,
    pub category: Option<i64>,
}

/// Per-size price inputs, kept as typed text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierInputs {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub image: Option<PathBuf>,
    pub branch: Option<i64>,
    pub category: Option<i64>,
    pub subcategory: Option<i64>,
    pub price: String,
    pub prices: TierInputs,
}

impl ProductForm {
    /// Preloads the form from an existing product. The image is never
    /// preloaded; leaving it empty keeps the stored one.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let tier = |size| {
            product
                .tier_price(size)
                .map(PriceValue::display)
                .unwrap_or_default()
        };
        Self {
            name: product.name.clone(),
            image: None,
            branch: product.branch_id(),
            category: product.category_id(),
            subcategory: product.subcategory_id(),
            price: product
                .flat_price()
                .map(PriceValue::display)
                .unwrap_or_default(),
            prices: TierInputs {
                small: tier(Size::Small),
                medium: tier(Size::Medium),
                large: tier(Size::Large),
            },
        }
    }
}

fn required(value: &str, message: &str) -> Result<PriceValue, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(message.to_owned()));
    }
    Ok(PriceValue::from(trimmed))
}

/// `1250` → `"1 250"`; non-numeric values render as `0`.
#[must_use]
pub fn format_price(value: Option<&PriceValue>) -> String {
    format_grouped(value.map(PriceValue::amount).unwrap_or_default())
}

fn load_error(what: &str, error: &ApiError) -> String {
    match error {
        ApiError::Status { message, .. } | ApiError::Unauthorized { message, .. } => {
            format!("Ошибка при загрузке {what}: {message}")
        }
        _ => format!("Ошибка сервера при загрузке {what}"),
    }
}

fn settle<T>(
    slot: &mut Vec<T>,
    error: &mut Option<String>,
    what: &str,
    result: Result<Vec<T>, ApiError>,
) {
    match result {
        Ok(items) => {
            tracing::debug!(what, count = items.len(), "admin collection loaded");
            *slot = items;
        }
        Err(e) => {
            tracing::warn!(what, error = %e, "admin collection failed to load");
            *error = Some(load_error(what, &e));
        }
    }
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

pub struct AdminConsole {
    api: ApiClient,
    auth: AuthSession,
    store: Arc<dyn KeyValueStore>,
    options: AdminOptions,
    tab: AdminTab,
    users: Vec<User>,
    branches: Vec<Branch>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    products: Vec<Product>,
    pub branch_form: BranchForm,
    editing_branch: Option<i64>,
    pub category_form: CategoryForm,
    pub subcategory_form: SubcategoryForm,
    editing_subcategory: Option<i64>,
    pub product_form: ProductForm,
    editing_product: Option<Product>,
    error: Option<String>,
    message: Option<String>,
}

impl fmt::Debug for AdminConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConsole")
            .field("tab", &self.tab)
            .field("users", &self.users.len())
            .field("branches", &self.branches.len())
            .field("categories", &self.categories.len())
            .field("subcategories", &self.subcategories.len())
            .field("products", &self.products.len())
            .field("editing_product", &self.editing_product.as_ref().map(|p| p.id))
            .field("error", &self.error)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl AdminConsole {
    /// Checks the stored token and, if it is accepted, loads every collection.
    ///
    /// Without a token no request is made. A token the server rejects is
    /// removed before redirecting. Collection failures after a successful
    /// check only set the error banner.
    ///
    /// # Errors
    ///
    /// Returns a store error if the token cannot be read or removed.
    pub async fn open(
        api: &ApiClient,
        store: Arc<dyn KeyValueStore>,
        options: AdminOptions,
    ) -> Result<AdminGate, StoreError> {
        let auth = AuthSession::new(Arc::clone(&store));
        let Some(token) = auth.token()? else {
            tracing::info!("no admin token, redirecting to login");
            return Ok(AdminGate::Redirect(options.login_route));
        };

        let api = api.with_token(token);
        let users = match api.list_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(error = %e, "admin token rejected");
                auth.logout()?;
                return Ok(AdminGate::Redirect(options.login_route));
            }
        };

        let mut console = Self {
            api,
            auth,
            store,
            options,
            tab: AdminTab::default(),
            users,
            branches: Vec::new(),
            categories: Vec::new(),
            subcategories: Vec::new(),
            products: Vec::new(),
            branch_form: BranchForm::default(),
            editing_branch: None,
            category_form: CategoryForm::default(),
            subcategory_form: SubcategoryForm::default(),
            editing_subcategory: None,
            product_form: ProductForm::default(),
            editing_product: None,
            error: None,
            message: None,
        };

        let (branches, categories, subcategories, products) = tokio::join!(
            console.api.list_admin_branches(),
            console.api.list_admin_categories(),
            console.api.list_subcategories(),
            console.api.list_admin_products(),
        );
        settle(&mut console.branches, &mut console.error, "филиалов", branches);
        settle(&mut console.categories, &mut console.error, "категорий", categories);
        settle(
            &mut console.subcategories,
            &mut console.error,
            "подкатегорий",
            subcategories,
        );
        settle(&mut console.products, &mut console.error, "продуктов", products);

        console.restore_product_draft();
        tracing::info!(
            users = console.users.len(),
            branches = console.branches.len(),
            products = console.products.len(),
            "admin console ready"
        );
        Ok(AdminGate::Ready(Box::new(console)))
    }

    fn restore_product_draft(&mut self) {
        match get_json::<Product>(self.store.as_ref(), keys::EDITING_PRODUCT) {
            Ok(Some(product)) => {
                tracing::info!(product_id = product.id, "restored product draft");
                self.product_form = ProductForm::from_product(&product);
                self.editing_product = Some(product);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "product draft unreadable");
                self.error = Some(e.to_string());
            }
        }
    }

    // -- accessors -----------------------------------------------------------

    #[must_use]
    pub fn tab(&self) -> AdminTab {
        self.tab
    }

    /// Switches tabs. Nothing is refetched.
    pub fn set_tab(&mut self, tab: AdminTab) {
        self.tab = tab;
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn editing_branch(&self) -> Option<i64> {
        self.editing_branch
    }

    #[must_use]
    pub fn editing_subcategory(&self) -> Option<i64> {
        self.editing_subcategory
    }

    #[must_use]
    pub fn editing_product(&self) -> Option<&Product> {
        self.editing_product.as_ref()
    }

    // -- pricing helpers -----------------------------------------------------

    /// Subcategories belonging to the product form's selected category.
    #[must_use]
    pub fn filtered_subcategories(&self) -> Vec<&Subcategory> {
        let Some(category) = self.product_form.category else {
            return Vec::new();
        };
        self.subcategories
            .iter()
            .filter(|sub| sub.category.id() == category)
            .collect()
    }

    /// Whether products in `subcategory_id` carry small/medium/large prices.
    ///
    /// Uses the subcategory's own pricing model and falls back to the
    /// configured id list when the API does not send one.
    #[must_use]
    pub fn is_tiered(&self, subcategory_id: i64) -> bool {
        let model = self
            .subcategories
            .iter()
            .find(|sub| sub.id == subcategory_id)
            .and_then(|sub| sub.pricing_model);
        match model {
            Some(model) => model == PricingModel::Tiered,
            None => self.options.tiered_subcategory_ids.contains(&subcategory_id),
        }
    }

    fn product_is_tiered(&self, product: &Product) -> bool {
        match product.pricing_model() {
            Some(model) => model == PricingModel::Tiered,
            None => product.subcategory_id().is_some_and(|id| self.is_tiered(id)),
        }
    }

    /// The price line of the product grid.
    #[must_use]
    pub fn price_summary(&self, product: &Product) -> String {
        if self.product_is_tiered(product) {
            format!(
                "Цена: {} сом (S) | {} сом (M) | {} сом (L)",
                format_price(product.tier_price(Size::Small)),
                format_price(product.tier_price(Size::Medium)),
                format_price(product.tier_price(Size::Large)),
            )
        } else {
            format!("Цена: {} сом", format_price(product.flat_price()))
        }
    }

    // -- banner --------------------------------------------------------------

    fn succeed(&mut self, message: &str) {
        tracing::info!(message, "admin action succeeded");
        self.error = None;
        self.message = Some(message.to_owned());
    }

    fn fail(&mut self, action: &str, error: StoreError) -> StoreError {
        tracing::warn!(action, error = %error, "admin action failed");
        self.message = None;
        self.error = Some(match &error {
            StoreError::Validation(text) => text.clone(),
            other => format!("{action}: {other}"),
        });
        error
    }

    // -- users ---------------------------------------------------------------

    /// # Errors
    ///
    /// Returns the API error after setting the banner.
    pub async fn delete_user(&mut self, id: i64) -> Result<(), StoreError> {
        if let Err(e) = self.api.delete_user(id).await {
            return Err(self.fail("Ошибка при удалении пользователя", e.into()));
        }
        self.users.retain(|u| u.id != id);
        self.succeed("Пользователь удалён");
        Ok(())
    }

    // -- branches ------------------------------------------------------------

    /// Creates a branch, or updates the one being edited.
    ///
    /// # Errors
    ///
    /// Returns a validation or API error after setting the banner.
    pub async fn save_branch(&mut self) -> Result<(), StoreError> {
        const ACTION: &str = "Ошибка при сохранении филиала";
        if self.branch_form.name.trim().is_empty() {
            let invalid = StoreError::Validation("Введите название филиала".to_owned());
            return Err(self.fail(ACTION, invalid));
        }
        let payload = BranchPayload {
            name: self.branch_form.name.trim().to_owned(),
            city: self.branch_form.city.trim().to_owned(),
        };
        let result = match self.editing_branch {
            Some(id) => self.api.update_branch(id, &payload).await,
            None => self.api.create_branch(&payload).await,
        };
        if let Err(e) = result {
            return Err(self.fail(ACTION, e.into()));
        }

        let message = if self.editing_branch.is_some() {
            "Филиал обновлён"
        } else {
            "Филиал добавлен"
        };
        self.branch_form = BranchForm::default();
        self.editing_branch = None;
        self.succeed(message);
        let result = self.api.list_admin_branches().await;
        settle(&mut self.branches, &mut self.error, "филиалов", result);
        Ok(())
    }

    /// Preloads the branch form and switches to the branch tab.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown branch.
    pub fn edit_branch(&mut self, id: i64) -> Result<(), StoreError> {
        let branch = self
            .branches
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("филиал {id} не найден")))?;
        self.branch_form = BranchForm {
            name: branch.name.clone(),
            city: branch.city.clone().unwrap_or_default(),
        };
        self.editing_branch = Some(id);
        self.tab = AdminTab::Branch;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error after setting the banner.
    pub async fn delete_branch(&mut self, id: i64) -> Result<(), StoreError> {
        if let Err(e) = self.api.delete_branch(id).await {
            return Err(self.fail("Ошибка при удалении филиала", e.into()));
        }
        self.branches.retain(|b| b.id != id);
        if self.editing_branch == Some(id) {
            self.editing_branch = None;
            self.branch_form = BranchForm::default();
        }
        self.succeed("Филиал удалён");
        Ok(())
    }

    // -- categories ----------------------------------------------------------

    /// # Errors
    ///
    /// Returns a validation or API error after setting the banner.
    pub async fn save_category(&mut self) -> Result<(), StoreError> {
        const ACTION: &str = "Ошибка при добавлении категории";
        if self.category_form.name.trim().is_empty() {
            let invalid = StoreError::Validation("Введите название категории".to_owned());
            return Err(self.fail(ACTION, invalid));
        }
        let payload = CategoryPayload {
            name: self.category_form.name.trim().to_owned(),
            emoji: self.category_form.emoji.trim().to_owned(),
        };
        if let Err(e) = self.api.create_category(&payload).await {
            return Err(self.fail(ACTION, e.into()));
        }
        self.category_form = CategoryForm::default();
        self.succeed("Категория добавлена");
        let result = self.api.list_admin_categories().await;
        settle(&mut self.categories, &mut self.error, "категорий", result);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error after setting the banner.
    pub async fn delete_category(&mut self, id: i64) -> Result<(), StoreError> {
        if let Err(e) = self.api.delete_category(id).await {
            return Err(self.fail("Ошибка при удалении категории", e.into()));
        }
        self.categories.retain(|c| c.id != id);
        self.succeed("Категория удалена");
        Ok(())
    }

    // -- subcategories -------------------------------------------------------

    /// Creates a subcategory, or updates the one being edited.
    ///
    /// # Errors
    ///
    /// Returns a validation or API error after setting the banner.
    pub async fn save_subcategory(&mut self) -> Result<(), StoreError> {
        const ACTION: &str = "Ошибка при сохранении подкатегории";
        if self.subcategory_form.name.trim().is_empty() {
            let invalid = StoreError::Validation("Введите название подкатегории".to_owned());
            return Err(self.fail(ACTION, invalid));
        }
        let Some(category) = self.subcategory_form.category else {
            let invalid = StoreError::Validation("Выберите категорию".to_owned());
            return Err(self.fail(ACTION, invalid));
        };
        let payload = SubcategoryPayload {
            name: self.subcategory_form.name.trim().to_owned(),
            category,
        };
        let result = match self.editing_subcategory {
            Some(id) => self.api.update_subcategory(id, &payload).await,
            None => self.api.create_subcategory(&payload).await,
        };
        if let Err(e) = result {
            return Err(self.fail(ACTION, e.into()));
        }

        let message = if self.editing_subcategory.is_some() {
            "Подкатегория обновлена"
        } else {
            "Подкатегория добавлена"
        };
        self.subcategory_form = SubcategoryForm::default();
        self.editing_subcategory = None;
        self.succeed(message);
        let result = self.api.list_subcategories().await;
        settle(&mut self.subcategories, &mut self.error, "подкатегорий", result);
        Ok(())
    }

    /// Preloads the subcategory form and switches to the subcategory tab.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown subcategory.
    pub fn edit_subcategory(&mut self, id: i64) -> Result<(), StoreError> {
        let sub = self
            .subcategories
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("подкатегория {id} не найдена")))?;
        self.subcategory_form = SubcategoryForm {
            name: sub.name.clone(),
            category: Some(sub.category.id()),
        };
        self.editing_subcategory = Some(id);
        self.tab = AdminTab::Subcategory;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error after setting the banner.
    pub async fn delete_subcategory(&mut self, id: i64) -> Result<(), StoreError> {
        if let Err(e) = self.api.delete_subcategory(id).await {
            return Err(self.fail("Ошибка при удалении подкатегории", e.into()));
        }
        self.subcategories.retain(|s| s.id != id);
        self.succeed("Подкатегория удалена");
        Ok(())
    }

    // -- products ------------------------------------------------------------

    fn product_payload(&self) -> Result<ProductPayload, StoreError> {
        let form = &self.product_form;
        if form.name.trim().is_empty() {
            return Err(StoreError::Validation("Введите название продукта".to_owned()));
        }
        let branch = form
            .branch
            .ok_or_else(|| StoreError::Validation("Выберите филиал".to_owned()))?;
        let subcategory = form
            .subcategory
            .ok_or_else(|| StoreError::Validation("Выберите подкатегорию".to_owned()))?;
        let pricing = if self.is_tiered(subcategory) {
            ProductPricing::Tiered {
                small: required(&form.prices.small, "Укажите цену для маленького размера")?,
                medium: required(&form.prices.medium, "Укажите цену для среднего размера")?,
                large: required(&form.prices.large, "Укажите цену для большого размера")?,
            }
        } else {
            ProductPricing::Flat {
                price: required(&form.price, "Укажите цену")?,
            }
        };
        Ok(ProductPayload {
            name: form.name.trim().to_owned(),
            branch,
            subcategory,
            pricing,
            image: form.image.clone().map(ImageUpload::new),
        })
    }

    /// Creates a product, or updates the one being edited, then drops the
    /// persisted draft.
    ///
    /// # Errors
    ///
    /// Returns a validation, image or API error after setting the banner.
    pub async fn save_product(&mut self) -> Result<(), StoreError> {
        const ACTION: &str = "Ошибка при сохранении продукта";
        let payload = match self.product_payload() {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(ACTION, e)),
        };
        let editing = self.editing_product.as_ref().map(|p| p.id);
        let result = match editing {
            Some(id) => self.api.update_product(id, payload).await,
            None => self.api.create_product(payload).await,
        };
        if let Err(e) = result {
            return Err(self.fail(ACTION, e.into()));
        }

        self.clear_product_form()?;
        self.succeed(if editing.is_some() {
            "Продукт обновлён"
        } else {
            "Продукт добавлен"
        });
        let result = self.api.list_admin_products().await;
        settle(&mut self.products, &mut self.error, "продуктов", result);
        Ok(())
    }

    /// Preloads the product form and persists the draft so it survives a
    /// restart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown product, or a store
    /// error if the draft cannot be saved.
    pub fn edit_product(&mut self, id: i64) -> Result<(), StoreError> {
        let product = self
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("продукт {id} не найден")))?;
        set_json(self.store.as_ref(), keys::EDITING_PRODUCT, &product)?;
        self.product_form = ProductForm::from_product(&product);
        self.editing_product = Some(product);
        tracing::info!(product_id = id, "editing product");
        Ok(())
    }

    /// Abandons the current product edit and its persisted draft.
    ///
    /// # Errors
    ///
    /// Returns a store error if the draft cannot be removed.
    pub fn cancel_product_edit(&mut self) -> Result<(), StoreError> {
        self.clear_product_form()
    }

    fn clear_product_form(&mut self) -> Result<(), StoreError> {
        self.store.remove(keys::EDITING_PRODUCT)?;
        self.product_form = ProductForm::default();
        self.editing_product = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the API error after setting the banner.
    pub async fn delete_product(&mut self, id: i64) -> Result<(), StoreError> {
        if let Err(e) = self.api.delete_product(id).await {
            return Err(self.fail("Ошибка при удалении продукта", e.into()));
        }
        self.products.retain(|p| p.id != id);
        if self.editing_product.as_ref().is_some_and(|p| p.id == id) {
            self.clear_product_form()?;
        }
        self.succeed("Продукт удалён");
        Ok(())
    }

    // -- session -------------------------------------------------------------

    /// Removes the token and returns the login route.
    ///
    /// # Errors
    ///
    /// Returns a store error if the token cannot be removed.
    pub fn logout(self) -> Result<String, StoreError> {
        self.auth.logout()?;
        Ok(self.options.login_route)
    }
}
