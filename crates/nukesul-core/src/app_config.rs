use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the storefront client and admin tooling.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Origin of the REST API, without a trailing slash.
    pub api_base_url: String,
    pub log_level: String,
    /// Directory backing the local key-value store (cart, token, drafts).
    pub state_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub checkout_route: String,
    pub admin_login_route: String,
    /// Subcategories priced per size when the API does not say so itself.
    pub tiered_subcategory_ids: Vec<i64>,
    pub block_branch_switch_after_order: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_base_url", &self.api_base_url)
            .field("log_level", &self.log_level)
            .field("state_dir", &self.state_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("checkout_route", &self.checkout_route)
            .field("admin_login_route", &self.admin_login_route)
            .field("tiered_subcategory_ids", &self.tiered_subcategory_ids)
            .field(
                "block_branch_switch_after_order",
                &self.block_branch_switch_after_order,
            )
            .finish()
    }
}
