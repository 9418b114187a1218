//! Storefront client with the backend unreachable: every whitelisted call
//! is answered from bundled data and tagged as such.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{Router, routing::get};
use rust_decimal::Decimal;

use shopfront_core::ProductId;
use shopfront_core::catalog::{ProductQuery, SortField, SortOrder};
use shopfront_integration_tests::{TestServer, offline_config};
use shopfront_storefront::Storefront;
use shopfront_storefront::api::{ApiError, Origin};
use shopfront_storefront::auth::AuthStatus;
use shopfront_storefront::storage::{FileStore, KeyValueStore, keys};

#[tokio::test]
async fn test_login_without_network_gives_flagged_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = Storefront::open(&offline_config(dir.path()).unwrap()).unwrap();

    app.auth.login("demo@example.com", "password123").await.unwrap();

    assert!(app.auth.is_authenticated());
    assert!(app.auth.is_offline_session());
    let token = FileStore::new(dir.path()).get(keys::AUTH_TOKEN).unwrap().unwrap();
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_fallback_listing_honours_price_filter() {
    let dir = tempfile::tempdir().unwrap();
    let app = Storefront::open(&offline_config(dir.path()).unwrap()).unwrap();

    let query = ProductQuery {
        sort_by: SortField::Price,
        sort_order: SortOrder::Asc,
        min_price: Decimal::from(50),
        max_price: Decimal::from(150),
        ..ProductQuery::default()
    };
    let response = app.api.products(&query).await.unwrap();

    assert_eq!(response.origin, Origin::Fallback);
    let prices: Vec<Decimal> = response.data.products.iter().map(|p| p.price.amount()).collect();
    assert!(!prices.is_empty());
    assert!(prices.iter().all(|p| *p >= Decimal::from(50) && *p <= Decimal::from(150)));
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_live_and_fallback_agree_on_listings() {
    let server = TestServer::spawn().await.unwrap();
    let live_dir = tempfile::tempdir().unwrap();
    let offline_dir = tempfile::tempdir().unwrap();
    let live = Storefront::open(&server.client_config(live_dir.path())).unwrap();
    let offline = Storefront::open(&offline_config(offline_dir.path()).unwrap()).unwrap();

    let query = ProductQuery {
        sort_by: SortField::Rating,
        limit: 5,
        page: 2,
        ..ProductQuery::default()
    };
    let live_page = live.api.products(&query).await.unwrap();
    let offline_page = offline.api.products(&query).await.unwrap();

    assert_eq!(live_page.origin, Origin::Live);
    assert_eq!(offline_page.origin, Origin::Fallback);
    assert_eq!(live_page.data, offline_page.data);
}

#[tokio::test]
async fn test_stopped_server_means_fallback() {
    let server = TestServer::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = server.client_config(dir.path());

    let app = Storefront::open(&config).unwrap();
    assert_eq!(app.api.health().await.unwrap().origin, Origin::Live);
    drop(app);

    server.stop().await;
    let app = Storefront::open(&config).unwrap();
    assert_eq!(app.api.health().await.unwrap().origin, Origin::Fallback);
}

#[tokio::test]
async fn test_unknown_product_is_still_an_error_offline() {
    let dir = tempfile::tempdir().unwrap();
    let app = Storefront::open(&offline_config(dir.path()).unwrap()).unwrap();

    let err = app.api.product(ProductId::new(9999)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_non_whitelisted_endpoint_propagates_network_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = Storefront::open(&offline_config(dir.path()).unwrap()).unwrap();

    let err = app
        .api
        .get::<serde_json::Value>("/api/orders")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_offline_session_restores_offline() {
    let dir = tempfile::tempdir().unwrap();
    let config = offline_config(dir.path()).unwrap();
    {
        let mut app = Storefront::open(&config).unwrap();
        app.auth.login("demo@example.com", "password123").await.unwrap();
    }

    let mut app = Storefront::open(&config).unwrap();
    assert_eq!(app.start().await, AuthStatus::Authenticated);
    assert!(app.auth.is_offline_session());

    app.auth.logout().await;
    assert!(!app.auth.is_authenticated());
}

#[tokio::test]
async fn test_slow_backend_times_out_into_fallback() {
    async fn stall() -> &'static str {
        tokio::time::sleep(Duration::from_secs(2)).await;
        "{}"
    }

    let slow = Router::new()
        .route("/api/products", get(stall))
        .route("/api/banners", get(stall));
    let server = TestServer::serve(slow).await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut config = server.client_config(dir.path());
    config.request_timeout = Duration::from_millis(100);
    let app = Storefront::open(&config).unwrap();

    let products = app.api.products(&ProductQuery::default()).await.unwrap();
    assert_eq!(products.origin, Origin::Fallback);
    assert_eq!(products.data.total, 20);

    let banners = app.api.banners().await.unwrap();
    assert_eq!(banners.origin, Origin::Fallback);
    assert_eq!(banners.data.len(), 4);
}
