//! HTTP client for the nukesul storefront REST API.
//!
//! Public catalog reads are anonymous; everything under `/api/admin/` needs a
//! bearer token obtained from [`ApiClient::login`].

mod admin;
pub mod client;
pub mod error;
pub mod payloads;
mod public;

pub use client::ApiClient;
pub use error::ApiError;
pub use payloads::{
    BranchPayload, CategoryPayload, ImageUpload, ProductPayload, ProductPricing,
    SubcategoryPayload,
};
