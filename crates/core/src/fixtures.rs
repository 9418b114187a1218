//! Embedded catalog fixtures.
//!
//! The fixture API server serves these, and the client falls back to them
//! when the backend cannot be reached. The JSON lives in `fixtures/` at the
//! crate root and is compiled into the binary.

use crate::catalog::{Banner, Category, Product};
use crate::types::ProductId;

const PRODUCTS_JSON: &str = include_str!("../fixtures/products.json");
const CATEGORIES_JSON: &str = include_str!("../fixtures/categories.json");
const BANNERS_JSON: &str = include_str!("../fixtures/banners.json");

/// Error decoding an embedded fixture file.
#[derive(Debug, thiserror::Error)]
#[error("fixture {name} is malformed: {source}")]
pub struct FixtureError {
    name: &'static str,
    #[source]
    source: serde_json::Error,
}

fn decode<T: serde::de::DeserializeOwned>(
    name: &'static str,
    json: &str,
) -> Result<T, FixtureError> {
    serde_json::from_str(json).map_err(|source| FixtureError { name, source })
}

/// All fixture products, newest first.
///
/// # Errors
///
/// Returns `FixtureError` if the embedded JSON does not decode.
pub fn products() -> Result<Vec<Product>, FixtureError> {
    decode("products.json", PRODUCTS_JSON)
}

/// All fixture categories.
///
/// # Errors
///
/// Returns `FixtureError` if the embedded JSON does not decode.
pub fn categories() -> Result<Vec<Category>, FixtureError> {
    decode("categories.json", CATEGORIES_JSON)
}

/// All fixture banners.
///
/// # Errors
///
/// Returns `FixtureError` if the embedded JSON does not decode.
pub fn banners() -> Result<Vec<Banner>, FixtureError> {
    decode("banners.json", BANNERS_JSON)
}

/// The decoded fixture catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub banners: Vec<Banner>,
}

impl Catalog {
    /// Decode every embedded fixture.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError` naming the first file that fails to decode.
    pub fn embedded() -> Result<Self, FixtureError> {
        Ok(Self {
            products: products()?,
            categories: categories()?,
            banners: banners()?,
        })
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
