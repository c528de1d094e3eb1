//! Domain types and configuration shared by every nukesul crate.
//!
//! The catalog types model what the storefront REST API returns; the cart
//! types model what the client persists locally between runs.

pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod price;
pub mod users;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::{CartItem, CartSummary};
pub use catalog::{
    Branch, BranchRef, Category, CategoryRef, ListEnvelope, PricingModel, Product, Size,
    Subcategory, SubcategoryRef, TierPrices,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use price::PriceValue;
pub use users::User;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid size: {0} (expected small, medium or large)")]
    InvalidSize(String),

    #[error("invalid pricing model: {0} (expected flat or tiered)")]
    InvalidPricingModel(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
