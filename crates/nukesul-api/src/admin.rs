//! Authenticated back-office endpoints under `api/admin/`.

use nukesul_core::{Branch, Category, Product, Subcategory, User};
use reqwest::Method;
use serde::Deserialize;

use crate::client::{Access, ApiClient};
use crate::error::ApiError;
use crate::payloads::{
    BranchPayload, CategoryPayload, LoginRequest, ProductPayload, SubcategoryPayload,
};

const LOGIN: &str = "api/admin/login/";

/// Admin resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Users,
    Branches,
    Categories,
    Subcategories,
    Products,
}

impl Resource {
    fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Branches => "branches",
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
            Self::Products => "products",
        }
    }

    fn collection(self) -> String {
        format!("api/admin/{}/", self.name())
    }

    fn item(self, id: i64) -> String {
        format!("api/admin/{}/{id}/", self.name())
    }
}

/// Login responses seen in the wild: `{"token": ..}`, `{"access": ..}`,
/// `{"key": ..}` or a bare JSON string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginResponse {
    Token { token: String },
    Access { access: String },
    Key { key: String },
    Bare(String),
}

impl LoginResponse {
    fn into_token(self) -> String {
        match self {
            Self::Token { token: t }
            | Self::Access { access: t }
            | Self::Key { key: t }
            | Self::Bare(t) => t,
        }
    }
}

impl ApiClient {
    /// Exchanges credentials for an admin token.
    ///
    /// Does not install the token; call [`ApiClient::with_token`] with the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for rejected credentials and
    /// [`ApiError::Deserialize`] when no token can be found in the body.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        tracing::debug!(username, "admin login");
        let body = LoginRequest { username, password };
        let response = self
            .send_json(Method::POST, LOGIN, &body, Access::Public)
            .await?;
        let parsed: LoginResponse = Self::decode(response, "POST api/admin/login/").await?;
        tracing::info!(username, "admin login succeeded");
        Ok(parsed.into_token())
    }

    // -- users ---------------------------------------------------------------

    /// Lists registered users. Also serves as the token validity check.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a token and
    /// [`ApiError::Unauthorized`] when the server rejects it.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_list(&Resource::Users.collection(), Access::Admin)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(Resource::Users, id).await
    }

    // -- branches ------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_admin_branches(&self) -> Result<Vec<Branch>, ApiError> {
        self.get_list(&Resource::Branches.collection(), Access::Admin)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn create_branch(&self, payload: &BranchPayload) -> Result<(), ApiError> {
        self.create(Resource::Branches, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn update_branch(&self, id: i64, payload: &BranchPayload) -> Result<(), ApiError> {
        self.update(Resource::Branches, id, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn delete_branch(&self, id: i64) -> Result<(), ApiError> {
        self.delete(Resource::Branches, id).await
    }

    // -- categories ----------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_admin_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_list(&Resource::Categories.collection(), Access::Admin)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<(), ApiError> {
        self.create(Resource::Categories, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete(Resource::Categories, id).await
    }

    // -- subcategories -------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_subcategories(&self) -> Result<Vec<Subcategory>, ApiError> {
        self.get_list(&Resource::Subcategories.collection(), Access::Admin)
            .await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn create_subcategory(&self, payload: &SubcategoryPayload) -> Result<(), ApiError> {
        self.create(Resource::Subcategories, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn update_subcategory(
        &self,
        id: i64,
        payload: &SubcategoryPayload,
    ) -> Result<(), ApiError> {
        self.update(Resource::Subcategories, id, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn delete_subcategory(&self, id: i64) -> Result<(), ApiError> {
        self.delete(Resource::Subcategories, id).await
    }

    // -- products ------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn list_admin_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_list(&Resource::Products.collection(), Access::Admin)
            .await
    }

    /// Creates a product from a multipart form, uploading the image if given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Image`] if the image file cannot be read, or any
    /// request error.
    pub async fn create_product(&self, payload: ProductPayload) -> Result<(), ApiError> {
        let path = Resource::Products.collection();
        self.send_product(Method::POST, &path, payload).await
    }

    /// Replaces a product. Omitting the image keeps the stored one.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::create_product`].
    pub async fn update_product(&self, id: i64, payload: ProductPayload) -> Result<(), ApiError> {
        let path = Resource::Products.item(id);
        self.send_product(Method::PUT, &path, payload).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails or is rejected.
    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.delete(Resource::Products, id).await
    }

    // -- shared verbs --------------------------------------------------------

    async fn create<B: serde::Serialize>(
        &self,
        resource: Resource,
        payload: &B,
    ) -> Result<(), ApiError> {
        tracing::debug!(resource = resource.name(), "admin create");
        self.send_json(Method::POST, &resource.collection(), payload, Access::Admin)
            .await?;
        Ok(())
    }

    async fn update<B: serde::Serialize>(
        &self,
        resource: Resource,
        id: i64,
        payload: &B,
    ) -> Result<(), ApiError> {
        tracing::debug!(resource = resource.name(), id, "admin update");
        self.send_json(Method::PUT, &resource.item(id), payload, Access::Admin)
            .await?;
        Ok(())
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<(), ApiError> {
        tracing::debug!(resource = resource.name(), id, "admin delete");
        self.send_empty(Method::DELETE, &resource.item(id), Access::Admin)
            .await
    }

    async fn send_product(
        &self,
        method: Method,
        path: &str,
        payload: ProductPayload,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        // Fail on a missing token before reading the image from disk.
        let builder = self.request(method, &url, Access::Admin)?;
        let form = payload.into_form().await?;
        self.send(builder.multipart(form), &url).await?;
        Ok(())
    }
}
