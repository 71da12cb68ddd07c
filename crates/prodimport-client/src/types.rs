//! Admin API request and response shapes.
//!
//! Only the fields the importer reads are modelled; everything else in the
//! backend's payloads is ignored during deserialization.

use prodimport_core::CategoryNode;
use serde::{Deserialize, Serialize};

/// Body of `POST /admin/auth/token`.
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /admin/auth/token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// Response of `GET /admin/product-categories`.
#[derive(Debug, Deserialize)]
pub struct CategoryListResponse {
    pub product_categories: Vec<CategoryNode>,
    /// Total number of categories matching the query, across all pages.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Response of `GET /admin/products`.
#[derive(Debug, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummary>,
}

/// Response of `POST /admin/products`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    pub product: ProductSummary,
}

/// The subset of a product the importer needs for logging and checks.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
}
