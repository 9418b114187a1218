//! Typed storefront endpoints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopfront_core::catalog::{
    Banner, Category, Envelope, HealthStatus, Product, ProductPage, ProductQuery,
};
use shopfront_core::{CategoryId, ProductId, UserId};

use super::{ApiClient, ApiError, ApiResponse};

// =============================================================================
// Auth payloads
// =============================================================================

/// An account as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `{token, user}` returned by login and register.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque bearer token; may be empty if the server misbehaves.
    #[serde(default)]
    pub token: String,
    pub user: User,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// `POST /api/auth/login` body.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `POST /api/auth/register` body.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A body that only carries a message, such as the logout response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Payload shapes
// =============================================================================

/// Catalog routes answer with an envelope, fallbacks with the bare payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Enveloped(Envelope<T>),
    Bare(T),
}

/// Product listings come as a page object or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Page(ProductPage),
    Bare(Vec<Product>),
}

impl From<Listing> for ProductPage {
    fn from(listing: Listing) -> Self {
        match listing {
            Listing::Page(page) => page,
            Listing::Bare(products) => Self::single(products),
        }
    }
}

fn unwrap_payload<T: DeserializeOwned>(
    response: ApiResponse<Value>,
) -> Result<ApiResponse<T>, ApiError> {
    let ApiResponse {
        data,
        status,
        message,
        origin,
    } = response.decode::<Payload<T>>()?;

    let data = match data {
        Payload::Bare(data) => data,
        Payload::Enveloped(envelope) => envelope.data.ok_or_else(|| ApiError::Server {
            status,
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "Response contained no data".to_owned()),
        })?,
    };

    Ok(ApiResponse {
        data,
        status,
        message,
        origin,
    })
}

fn with_query(path: &str, query: &ProductQuery) -> String {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.to_pairs())
        .finish();
    format!("{path}?{encoded}")
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

// =============================================================================
// Endpoints
// =============================================================================

impl ApiClient {
    /// Home-page banners.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn banners(&self) -> Result<ApiResponse<Vec<Banner>>, ApiError> {
        unwrap_payload(self.send(reqwest::Method::GET, "/api/banners", None).await?)
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn categories(&self) -> Result<ApiResponse<Vec<Category>>, ApiError> {
        unwrap_payload(self.send(reqwest::Method::GET, "/api/categories", None).await?)
    }

    /// One page of products in a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn category_products(
        &self,
        id: CategoryId,
        query: &ProductQuery,
    ) -> Result<ApiResponse<ProductPage>, ApiError> {
        let path = with_query(&format!("/api/categories/{id}/products"), query);
        self.listing(&path).await
    }

    /// One page of the product listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn products(
        &self,
        query: &ProductQuery,
    ) -> Result<ApiResponse<ProductPage>, ApiError> {
        self.listing(&with_query("/api/products", query)).await
    }

    /// Free-text product search. `term` overrides `query.q`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn search_products(
        &self,
        term: &str,
        query: &ProductQuery,
    ) -> Result<ApiResponse<ProductPage>, ApiError> {
        let query = ProductQuery {
            q: Some(term.to_owned()),
            ..query.clone()
        };
        self.listing(&with_query("/api/products/search", &query)).await
    }

    async fn listing(&self, path: &str) -> Result<ApiResponse<ProductPage>, ApiError> {
        let response = self.send(reqwest::Method::GET, path, None).await?;
        Ok(unwrap_payload::<Listing>(response)?.map(ProductPage::from))
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` with status 404 for unknown ids.
    pub async fn product(&self, id: ProductId) -> Result<ApiResponse<Product>, ApiError> {
        let path = format!("/api/products/{id}");
        unwrap_payload(self.send(reqwest::Method::GET, &path, None).await?)
    }

    /// Backend health report.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails and no fallback applies.
    pub async fn health(&self) -> Result<ApiResponse<HealthStatus>, ApiError> {
        unwrap_payload(self.send(reqwest::Method::GET, "/api/health", None).await?)
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` for rejected credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiResponse<AuthSession>, ApiError> {
        self.post("/api/auth/login", Some(to_body(request)?)).await
    }

    /// Create an account and start a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` if the server rejects the registration.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiResponse<AuthSession>, ApiError> {
        self.post("/api/auth/register", Some(to_body(request)?)).await
    }

    /// The account behind the attached token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Server` with status 401 if the token is not accepted.
    pub async fn profile(&self) -> Result<ApiResponse<User>, ApiError> {
        unwrap_payload(self.send(reqwest::Method::GET, "/api/auth/profile", None).await?)
    }

    /// Invalidate the attached token on the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server call fails.
    pub async fn logout(&self) -> Result<ApiResponse<MessageBody>, ApiError> {
        self.post("/api/auth/logout", None).await
    }
}
