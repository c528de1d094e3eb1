//! Request bodies for the admin endpoints.

use std::path::{Path, PathBuf};

use nukesul_core::PriceValue;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BranchPayload {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryPayload {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryPayload {
    pub name: String,
    pub category: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// How a product is priced on the create/update form.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductPricing {
    Flat {
        price: PriceValue,
    },
    Tiered {
        small: PriceValue,
        medium: PriceValue,
        large: PriceValue,
    },
}

/// A local image file to attach as the `image` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub path: PathBuf,
}

impl ImageUpload {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned())
    }

    fn mime(&self) -> &'static str {
        mime_for(&self.path)
    }

    async fn into_part(self) -> Result<Part, ApiError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ApiError::Image {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        let file_name = self.file_name();
        let mime = self.mime();
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ApiError::Image {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Product create/update body, sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub name: String,
    pub branch: i64,
    pub subcategory: i64,
    pub pricing: ProductPricing,
    pub image: Option<ImageUpload>,
}

impl ProductPayload {
    /// Text fields in the order they are appended to the form.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("branch", self.branch.to_string()),
            ("subcategory", self.subcategory.to_string()),
        ];
        match &self.pricing {
            ProductPricing::Flat { price } => fields.push(("price", price.display())),
            ProductPricing::Tiered {
                small,
                medium,
                large,
            } => {
                fields.push(("small_price", small.display()));
                fields.push(("medium_price", medium.display()));
                fields.push(("large_price", large.display()));
            }
        }
        fields
    }

    pub(crate) async fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (key, value) in self.text_fields() {
            form = form.text(key, value);
        }
        if let Some(image) = self.image {
            form = form.part("image", image.into_part().await?);
        }
        Ok(form)
    }
}
