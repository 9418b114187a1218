//! Catalog route handlers.
//!
//! Every response is an `{success, data, ...}` envelope over the embedded
//! fixtures. Listings accept the query parameters understood by
//! [`ProductQuery`].

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;

use shopfront_core::catalog::{
    Banner, Category, Envelope, HealthStatus, Product, ProductPage, ProductQuery,
};
use shopfront_core::{CategoryId, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Decoded query-string pairs, in order.
type QueryPairs = Query<Vec<(String, String)>>;

/// `GET /api/banners`
pub async fn banners(State(state): State<AppState>) -> Json<Envelope<Vec<Banner>>> {
    let banners = state.catalog().banners.clone();
    let total = banners.len();
    Json(Envelope::ok(banners).with_total(total))
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>) -> Json<Envelope<Vec<Category>>> {
    let categories = state.catalog().categories.clone();
    let total = categories.len();
    Json(Envelope::ok(categories).with_total(total))
}

/// `GET /api/categories/{id}/products`
pub async fn category_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): QueryPairs,
) -> Result<Json<Envelope<ProductPage>>> {
    let catalog = state.catalog();
    let id = id
        .parse::<CategoryId>()
        .ok()
        .filter(|id| catalog.categories.iter().any(|c| c.id == *id))
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

    let mut query = ProductQuery::from_pairs(pairs);
    query.category_id = Some(id);
    Ok(Json(Envelope::ok(query.apply(&catalog.products))))
}

/// `GET /api/products`
pub async fn products(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<Envelope<ProductPage>> {
    let query = ProductQuery::from_pairs(pairs);
    tracing::debug!(?query, "Listing products");
    Json(Envelope::ok(query.apply(&state.catalog().products)))
}

/// `GET /api/products/search?q=`
pub async fn search(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Json<Envelope<ProductPage>> {
    let query = ProductQuery::from_pairs(pairs);
    let page = query.apply(&state.catalog().products);
    tracing::debug!(q = ?query.q, total = page.total, "Product search");
    Json(Envelope::ok(page))
}

/// `GET /api/products/{id}`
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Product>>> {
    id.parse::<ProductId>()
        .ok()
        .and_then(|id| state.catalog().product(id))
        .map(|product| Json(Envelope::ok(product.clone())))
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// `GET /api/health`
pub async fn health() -> Json<Envelope<HealthStatus>> {
    Json(Envelope::ok(HealthStatus::healthy(Utc::now())))
}
