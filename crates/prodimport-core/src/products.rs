use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency every imported price is listed in.
pub const CURRENCY_CODE: &str = "usd";

/// Stock level assigned to the single variant of each imported product.
pub const INVENTORY_QUANTITY: u32 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    #[error("invalid price \"{value}\": {reason}")]
    InvalidPrice { value: String, reason: String },

    #[error("product name is empty")]
    MissingName,
}

/// One record of the product CSV, keyed by the header row.
///
/// `name`, `category` and `price` columns are required; every other column
/// falls back to an empty string when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductRow {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category path as authored in the CSV, e.g. `"Film > 35mm > Point&Shoot"`.
    pub category: String,
    #[serde(default)]
    pub image: String,
    /// Additional image URLs, comma-separated.
    #[serde(default)]
    pub images: String,
    #[serde(default, rename = "mainImage")]
    pub main_image: String,
    pub price: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, rename = "short-description")]
    pub short_description: String,
    #[serde(default, rename = "short-specs")]
    pub short_specs: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub testing: String,
    #[serde(default)]
    pub delivery: String,
    #[serde(default, rename = "Lens")]
    pub lens: String,
    #[serde(default, rename = "Focal Length")]
    pub focal_length: String,
    #[serde(default, rename = "Shutter Speed")]
    pub shutter_speed: String,
    #[serde(default, rename = "ISO Range")]
    pub iso_range: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub battery: String,
    #[serde(default, rename = "Weight")]
    pub weight: String,
    #[serde(default, rename = "Dimensions")]
    pub dimensions: String,
}

impl ProductRow {
    /// URL slug for this row, see [`derive_handle`].
    #[must_use]
    pub fn handle(&self) -> String {
        derive_handle(&self.name)
    }

    /// `image` followed by every entry of `images`, trimmed, with blanks dropped.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        std::iter::once(self.image.as_str())
            .chain(self.images.split(','))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Assembles the create-product payload for this row in `category_id`.
    ///
    /// # Errors
    ///
    /// - [`ProductError::MissingName`] if the name is blank.
    /// - [`ProductError::InvalidPrice`] if the price is not a non-negative decimal.
    pub fn to_create_request(&self, category_id: &str) -> Result<ProductCreateRequest, ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::MissingName);
        }
        let amount = price_to_minor_units(&self.price)?;

        let thumbnail = [&self.main_image, &self.image]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_owned);

        Ok(ProductCreateRequest {
            title: self.name.clone(),
            handle: self.handle(),
            description: self.description.clone(),
            categories: vec![CategoryRef {
                id: category_id.to_owned(),
            }],
            images: self.image_urls(),
            thumbnail,
            variants: vec![VariantRequest {
                title: self.name.clone(),
                prices: vec![PriceRequest {
                    amount,
                    currency_code: CURRENCY_CODE.to_owned(),
                }],
                inventory_quantity: INVENTORY_QUANTITY,
                manage_inventory: true,
            }],
            status: ProductStatus::Published,
            metadata: ProductMetadata {
                brand: self.brand.clone(),
                details: ProductDetails {
                    short_description: self.short_description.clone(),
                    short_specs: self.short_specs.clone(),
                    condition: self.condition.clone(),
                    testing: self.testing.clone(),
                    delivery: self.delivery.clone(),
                },
                specs: ProductSpecs {
                    lens: self.lens.clone(),
                    focal_length: self.focal_length.clone(),
                    shutter_speed: self.shutter_speed.clone(),
                    iso_range: self.iso_range.clone(),
                    storage: self.storage.clone(),
                    battery: self.battery.clone(),
                    weight: self.weight.clone(),
                    dimensions: self.dimensions.clone(),
                },
            },
        })
    }
}

/// Derives a product handle: lower-case, spaces replaced by hyphens.
///
/// Other punctuation is left untouched, so `"Canon AE-1 Program"` becomes
/// `"canon-ae-1-program"`. Distinct names can collide on the same handle.
#[must_use]
pub fn derive_handle(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Converts a decimal price string into integer minor units (cents).
///
/// `"199.99"` becomes `19999`. Sub-cent digits are rounded half away from zero.
///
/// # Errors
///
/// Returns [`ProductError::InvalidPrice`] for blank, non-numeric, negative, or
/// out-of-range values.
pub fn price_to_minor_units(raw: &str) -> Result<i64, ProductError> {
    let invalid = |reason: &str| ProductError::InvalidPrice {
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("price is empty"));
    }

    let price = Decimal::from_str(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid("price is negative"));
    }

    price
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| invalid("price is out of range"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Published,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRequest {
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRequest {
    pub title: String,
    pub prices: Vec<PriceRequest>,
    pub inventory_quantity: u32,
    pub manage_inventory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    #[serde(rename = "short-description")]
    pub short_description: String,
    #[serde(rename = "short-specs")]
    pub short_specs: String,
    pub condition: String,
    pub testing: String,
    pub delivery: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSpecs {
    #[serde(rename = "Lens")]
    pub lens: String,
    #[serde(rename = "Focal Length")]
    pub focal_length: String,
    #[serde(rename = "Shutter Speed")]
    pub shutter_speed: String,
    #[serde(rename = "ISO Range")]
    pub iso_range: String,
    pub storage: String,
    pub battery: String,
    #[serde(rename = "Weight")]
    pub weight: String,
    #[serde(rename = "Dimensions")]
    pub dimensions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMetadata {
    pub brand: String,
    pub details: ProductDetails,
    pub specs: ProductSpecs,
}

/// Body of the admin create-product call. Built per row, sent once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCreateRequest {
    pub title: String,
    pub handle: String,
    pub description: String,
    pub categories: Vec<CategoryRef>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub variants: Vec<VariantRequest>,
    pub status: ProductStatus,
    pub metadata: ProductMetadata,
}
