use nukesul_core::{Branch, Category, Product};

use crate::client::{Access, ApiClient};
use crate::error::ApiError;

const BRANCHES: &str = "api/public/branches/";
const CATEGORIES: &str = "api/public/categories/";
const PRODUCTS: &str = "api/public/products/";

impl ApiClient {
    /// Lists every branch, in API order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn list_branches(&self) -> Result<Vec<Branch>, ApiError> {
        self.get_list(BRANCHES, Access::Public).await
    }

    /// Lists every category, in API order.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::list_branches`].
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_list(CATEGORIES, Access::Public).await
    }

    /// Lists every product across all branches. Callers filter by branch.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::list_branches`].
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_list(PRODUCTS, Access::Public).await
    }
}
