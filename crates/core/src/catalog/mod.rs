//! Catalog data shapes shared by the API server and the client.
//!
//! These mirror the JSON the storefront backend speaks: snake_case fields,
//! prices as numbers, and an `{success, data, ...}` envelope around catalog
//! responses.

mod query;

pub use query::{DEFAULT_LIMIT, DEFAULT_MAX_PRICE, MAX_LIMIT, ProductQuery, SortField, SortOrder};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    /// Gallery images for the detail page; listings usually omit them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    /// Category display name.
    #[serde(default)]
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub on_sale: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether any units are left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, alias = "productCount")]
    pub product_count: u32,
    #[serde(default)]
    pub featured: bool,
}

/// A hero banner on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub cta_text: String,
    pub cta_link: String,
}

/// Backend health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub redis: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    /// A report with every dependency marked as up.
    #[must_use]
    pub fn healthy(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "healthy".to_owned(),
            database: "connected".to_owned(),
            redis: "connected".to_owned(),
            timestamp,
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: usize,
    pub total_pages: usize,
    #[serde(alias = "page")]
    pub current_page: u32,
    pub limit: u32,
}

impl ProductPage {
    /// Wrap a bare product array as a single page holding everything.
    #[must_use]
    pub fn single(products: Vec<Product>) -> Self {
        let total = products.len();
        Self {
            limit: u32::try_from(total.max(1)).unwrap_or(u32::MAX),
            products,
            total,
            total_pages: usize::from(total > 0),
            current_page: 1,
        }
    }
}

/// The `{success, data, total?, error?, message?}` wrapper around catalog
/// responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
            message: None,
        }
    }

    /// A successful envelope for a list, recording its length in `total`.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// A failed envelope with an error message and no data.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_camel_case_count() {
        let category: Category = serde_json::from_str(
            r#"{"id":1,"name":"Electronics","slug":"electronics","productCount":156}"#,
        )
        .unwrap();
        assert_eq!(category.product_count, 156);
        assert!(!category.featured);
    }

    #[test]
    fn test_product_page_accepts_page_alias() {
        let page: ProductPage = serde_json::from_str(
            r#"{"products":[],"total":0,"total_pages":0,"page":1,"limit":10}"#,
        )
        .unwrap();
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_failure_envelope_shape() {
        let envelope: Envelope<()> = Envelope::failure("Product not found");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Product not found"})
        );
    }

    #[test]
    fn test_envelope_without_data_decodes_for_any_payload() {
        let envelope: Envelope<Product> =
            serde_json::from_str(r#"{"success":false,"error":"Product not found"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.total.is_none());
        assert_eq!(envelope.error.as_deref(), Some("Product not found"));
    }
}
