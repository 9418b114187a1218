//! HTTP routes for the fixture API server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check ("ok")
//!
//! # Catalog
//! GET  /api/banners                     - Home page banners
//! GET  /api/categories                  - Category list
//! GET  /api/categories/{id}/products    - Products in a category (paged)
//! GET  /api/products                    - Product listing (paged, filtered, sorted)
//! GET  /api/products/search?q=          - Product search (paged)
//! GET  /api/products/{id}               - Product detail
//! GET  /api/health                      - Backend health report
//!
//! # Auth
//! POST /api/auth/login                  - Demo login
//! POST /api/auth/register               - Demo registration (201)
//! GET  /api/auth/profile                - Current user (bearer)
//! POST /api/auth/logout                 - Revoke token (bearer)
//! ```

pub mod auth;
pub mod catalog;

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{latency_middleware, request_id_middleware};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/banners", get(catalog::banners))
        .route("/categories", get(catalog::categories))
        .route("/categories/{id}/products", get(catalog::category_products))
        .route("/products", get(catalog::products))
        .route("/products/search", get(catalog::search))
        .route("/products/{id}", get(catalog::product))
        .route("/health", get(catalog::health))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/profile", get(auth::profile))
        .route("/logout", post(auth::logout))
}

/// Create all `/api` routes, with simulated latency applied.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/auth", auth_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            latency_middleware,
        ))
}

/// Build the full application router: `/health`, the API, and the
/// request-id, trace and CORS layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes(&state))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use shopfront_core::fixtures::Catalog;

    use super::*;
    use crate::middleware::request_id::REQUEST_ID_HEADER;
    use crate::services::AccountRegistry;

    /// The full router over the fixtures with no simulated latency.
    pub(crate) fn test_router() -> Router {
        let state = AppState::with_parts(
            Catalog::embedded().unwrap(),
            AccountRegistry::seeded().unwrap(),
            Duration::ZERO,
        );
        router(state)
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_router()
            .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/products")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_latency_applies_to_api_routes() {
        let state = AppState::with_parts(
            Catalog::embedded().unwrap(),
            AccountRegistry::new(),
            Duration::from_millis(50),
        );
        let app = router(state);

        let started = std::time::Instant::now();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
