//! Catalog entities returned by the storefront API.
//!
//! The API is loose about nesting: a product's `branch` may be a bare id or a
//! full branch object, and the same holds for `subcategory.category`. The
//! `*Ref` enums accept either shape and expose the id uniformly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::price::PriceValue;
use crate::CoreError;

const UNNAMED: &str = "Без названия";
const NO_ADDRESS: &str = "Адрес не указан";

// ---------------------------------------------------------------------------
// Branches and categories
// ---------------------------------------------------------------------------

/// A physical storefront location. Scopes every catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Branch {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED
        } else {
            &self.name
        }
    }

    /// Street address when the API has one, otherwise the city.
    #[must_use]
    pub fn location(&self) -> &str {
        let present = |s: &&str| !s.trim().is_empty();
        self.address
            .as_deref()
            .filter(present)
            .or_else(|| self.city.as_deref().filter(present))
            .unwrap_or(NO_ADDRESS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl Category {
    /// `"🍕 Пицца"` when the category has an emoji, the bare name otherwise.
    #[must_use]
    pub fn label(&self) -> String {
        match self.emoji.as_deref().filter(|e| !e.is_empty()) {
            Some(emoji) => format!("{emoji} {}", self.name),
            None => self.name.clone(),
        }
    }
}

/// How a subcategory's products are priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// One `price` for every size.
    Flat,
    /// Separate small/medium/large prices.
    Tiered,
}

impl FromStr for PricingModel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "tiered" => Ok(Self::Tiered),
            other => Err(CoreError::InvalidPricingModel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub category: CategoryRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<PricingModel>,
}

// ---------------------------------------------------------------------------
// References (bare id or nested object)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchRef {
    Id(i64),
    Object(Branch),
}

impl BranchRef {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Object(branch) => branch.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(i64),
    Object(Category),
}

impl CategoryRef {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Id(id) => *id,
            Self::Object(category) => category.id,
        }
    }
}

/// A product's subcategory as embedded in the product payload.
///
/// Every field is optional because the public endpoint sometimes sends only
/// the nested category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NestedSubcategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing_model: Option<PricingModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubcategoryRef {
    Id(i64),
    Object(NestedSubcategory),
}

impl SubcategoryRef {
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Object(sub) => sub.id,
        }
    }

    #[must_use]
    pub fn category_id(&self) -> Option<i64> {
        match self {
            Self::Id(_) => None,
            Self::Object(sub) => sub.category.as_ref().map(CategoryRef::id),
        }
    }

    #[must_use]
    pub fn pricing_model(&self) -> Option<PricingModel> {
        match self {
            Self::Id(_) => None,
            Self::Object(sub) => sub.pricing_model,
        }
    }
}

// ---------------------------------------------------------------------------
// Products and sizes
// ---------------------------------------------------------------------------

/// One of the three fixed portion sizes offered in the product modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Маленький",
            Self::Medium => "Средний",
            Self::Large => "Большой",
        }
    }

    #[must_use]
    pub fn short(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "s" => Ok(Self::Small),
            "medium" | "m" => Ok(Self::Medium),
            "large" | "l" => Ok(Self::Large),
            other => Err(CoreError::InvalidSize(other.to_string())),
        }
    }
}

/// The `prices: {small, medium, large}` object used by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TierPrices {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<PriceValue>,
}

impl TierPrices {
    #[must_use]
    pub fn get(&self, size: Size) -> Option<&PriceValue> {
        match size {
            Size::Small => self.small.as_ref(),
            Size::Medium => self.medium.as_ref(),
            Size::Large => self.large.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `null` once the branch has been deleted; such products are never listed.
    #[serde(default)]
    pub branch: Option<BranchRef>,
    #[serde(default)]
    pub subcategory: Option<SubcategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_price: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_price: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_price: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<TierPrices>,
}

impl Product {
    #[must_use]
    pub fn branch_id(&self) -> Option<i64> {
        self.branch.as_ref().map(BranchRef::id)
    }

    #[must_use]
    pub fn subcategory_id(&self) -> Option<i64> {
        self.subcategory.as_ref().and_then(SubcategoryRef::id)
    }

    #[must_use]
    pub fn category_id(&self) -> Option<i64> {
        self.subcategory
            .as_ref()
            .and_then(SubcategoryRef::category_id)
    }

    /// The pricing model embedded in the product's nested subcategory.
    #[must_use]
    pub fn pricing_model(&self) -> Option<PricingModel> {
        self.subcategory
            .as_ref()
            .and_then(SubcategoryRef::pricing_model)
    }

    /// Whether the product belongs in `category_id`'s section of `branch_id`'s
    /// menu. Products without a branch or category are never listed.
    #[must_use]
    pub fn is_listed_under(&self, branch_id: i64, category_id: i64) -> bool {
        self.branch_id() == Some(branch_id) && self.category_id() == Some(category_id)
    }

    /// The per-size price, from `<size>_price` or else `prices.<size>`.
    #[must_use]
    pub fn tier_price(&self, size: Size) -> Option<&PriceValue> {
        let field = match size {
            Size::Small => self.small_price.as_ref(),
            Size::Medium => self.medium_price.as_ref(),
            Size::Large => self.large_price.as_ref(),
        };
        field
            .filter(|p| p.is_present())
            .or_else(|| {
                self.prices
                    .as_ref()
                    .and_then(|prices| prices.get(size))
                    .filter(|p| p.is_present())
            })
    }

    #[must_use]
    pub fn has_tier_pricing(&self) -> bool {
        Size::ALL.iter().any(|size| self.tier_price(*size).is_some())
    }

    #[must_use]
    pub fn flat_price(&self) -> Option<&PriceValue> {
        self.price.as_ref().filter(|p| p.is_present())
    }

    /// The price charged for `size`, or `None` when that size cannot be ordered.
    ///
    /// Tier-priced products only offer the tiers they carry. Flat-priced
    /// products offer every size at the flat price.
    #[must_use]
    pub fn price_for(&self, size: Size) -> Option<&PriceValue> {
        if self.has_tier_pricing() {
            self.tier_price(size)
        } else {
            self.flat_price()
        }
    }

    /// The lowest advertised price: the small tier, else the flat price, else zero.
    #[must_use]
    pub fn starting_price(&self) -> PriceValue {
        self.tier_price(Size::Small)
            .or_else(|| self.flat_price())
            .cloned()
            .unwrap_or_else(|| PriceValue::from(0))
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            UNNAMED
        } else {
            &self.name
        }
    }
}

// ---------------------------------------------------------------------------
// List envelopes
// ---------------------------------------------------------------------------

/// A collection response: either a bare JSON array or `{"results": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListEnvelope<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Paged { results: items } => items,
        }
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
