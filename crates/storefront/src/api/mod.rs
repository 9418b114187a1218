//! HTTP client for the storefront backend with an offline fallback.
//!
//! # Architecture
//!
//! - Every call goes through [`ApiClient::send`], which attaches the bearer
//!   token, decodes the body and normalizes non-2xx statuses into
//!   [`ApiError::Server`].
//! - When the backend cannot be reached (connect failure or timeout) the
//!   request is answered from the embedded fixture catalog instead, for the
//!   catalog, health and auth routes. Those responses carry
//!   [`Origin::Fallback`] so callers can tell degraded data from live data.
//! - Typed wrappers live in `endpoints`; the canned responses in `fallback`.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//! let page = api.products(&ProductQuery::default()).await?;
//! if page.origin.is_fallback() {
//!     println!("showing offline catalog");
//! }
//! ```

mod endpoints;
mod fallback;

pub use endpoints::{AuthSession, LoginRequest, MessageBody, RegisterRequest, User};

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shopfront_core::fixtures::{Catalog, FixtureError};
use shopfront_core::images::{ImageKind, resolve_image_url};
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;

/// Message used when the backend is unreachable and no fallback applies.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error: Unable to connect to the server. Please check your internet connection.";

// =============================================================================
// Response and error types
// =============================================================================

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Answered by the backend.
    Live,
    /// Fabricated from embedded fixtures because the backend was unreachable.
    Fallback,
}

impl Origin {
    /// Whether this is degraded, offline data.
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Fallback => "fallback",
        })
    }
}

/// A decoded API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    /// HTTP status, or the status the fallback pretends to have.
    pub status: u16,
    /// The `message` field of the body, when there is one.
    pub message: Option<String>,
    pub origin: Origin,
}

impl<T> ApiResponse<T> {
    /// Transform the payload, keeping status, message and origin.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            status: self.status,
            message: self.message,
            origin: self.origin,
        }
    }
}

impl ApiResponse<Value> {
    /// Decode the JSON payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the payload does not have the shape of `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, ApiError> {
        let Self {
            data,
            status,
            message,
            origin,
        } = self;
        let data = serde_json::from_value(data).map_err(ApiError::Decode)?;
        Ok(ApiResponse {
            data,
            status,
            message,
            origin,
        })
    }
}

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The backend was unreachable and the route has no offline data.
    #[error("Network error: Unable to connect to the server. Please check your internet connection.")]
    Network(#[source] reqwest::Error),

    /// The backend was unreachable and this auth route cannot be faked.
    #[error("Fallback not available for this endpoint: {0}")]
    FallbackUnavailable(String),

    /// The request failed for a reason other than reachability.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The path does not form a valid URL with the base URL.
    #[error("Invalid request path {path:?}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The payload did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The embedded fixtures could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

impl ApiError {
    /// HTTP status for server-reported errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend.
///
/// Cheap to clone; clones share the connection pool and the auth token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    fallback_delay: Duration,
    catalog: Catalog,
    token: RwLock<Option<SecretString>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("fallback_delay", &self.inner.fallback_delay)
            .field("has_token", &self.has_auth_token())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built, or
    /// `ApiError::Fixture` if the embedded offline catalog fails to decode.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                fallback_delay: config.fallback_delay,
                catalog: Catalog::embedded()?,
                token: RwLock::new(None),
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Attach or detach the bearer token sent with every request.
    pub fn set_auth_token(&self, token: Option<SecretString>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub fn has_auth_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn auth_token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve a stored image reference against the backend base URL.
    #[must_use]
    pub fn image_url(&self, kind: ImageKind, raw: &str) -> String {
        resolve_image_url(self.inner.base_url.as_str(), kind, raw)
    }

    // =========================================================================
    // Generic verbs
    // =========================================================================

    /// `GET path`, decoding the payload as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::GET, path, None).await?.decode()
    }

    /// `POST path` with an optional JSON body, decoding the payload as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::POST, path, body).await?.decode()
    }

    /// `PUT path` with an optional JSON body, decoding the payload as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::PUT, path, body).await?.decode()
    }

    /// `DELETE path`, decoding the payload as `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::DELETE, path, None).await?.decode()
    }

    /// Send a request and return the raw JSON payload.
    ///
    /// `path` is appended to the base URL and may carry a query string.
    ///
    /// # Errors
    ///
    /// - `ApiError::Server` for non-2xx statuses, carrying the server's
    ///   `message` or `error` field when present;
    /// - `ApiError::Network` or `ApiError::FallbackUnavailable` when the
    ///   backend is unreachable and the route has no offline data;
    /// - `ApiError::Http` for any other transport failure.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let url = self.url(path)?;

        let mut request = self
            .inner
            .client
            .request(method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.auth_token() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "API request");

        let outcome = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, content_type, text))
        }
        .await;

        match outcome {
            Ok((status, content_type, text)) => {
                interpret_response(status, content_type.as_deref(), &text)
            }
            Err(error) if error.is_connect() || error.is_timeout() => {
                self.fall_back(&method, path, body.as_ref(), error).await
            }
            Err(error) => Err(ApiError::Http(error)),
        }
    }

    async fn fall_back(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        error: reqwest::Error,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let Some(route) = fallback::Route::parse(method, path) else {
            tracing::warn!(path, error = %error, "Backend unreachable, no fallback for route");
            return Err(ApiError::Network(error));
        };

        tracing::warn!(path, error = %error, "Backend unreachable, using fallback data");
        if route.is_auth() {
            tokio::time::sleep(self.inner.fallback_delay).await;
        }
        route.respond(&self.inner.catalog, body)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        Url::parse(&format!("{base}{path}")).map_err(|source| ApiError::InvalidPath { path, source })
    }
}

/// Turn a received response into a payload or a server error.
///
/// JSON bodies are parsed (unparsable JSON becomes `{}`); anything else is
/// replaced by `{"message": "Success"}` or `{"message": "Error"}`.
fn interpret_response(
    status: u16,
    content_type: Option<&str>,
    text: &str,
) -> Result<ApiResponse<Value>, ApiError> {
    let ok = (200..300).contains(&status);
    let data = if content_type.is_some_and(|ct| ct.contains("application/json")) {
        serde_json::from_str(text).unwrap_or_else(|_| json!({}))
    } else {
        json!({ "message": if ok { "Success" } else { "Error" } })
    };

    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    let message = field("message");

    if !ok {
        let message = message
            .or_else(|| field("error"))
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        tracing::debug!(status, message = %message, "API error response");
        return Err(ApiError::Server { status, message });
    }

    Ok(ApiResponse {
        data,
        status,
        message,
        origin: Origin::Live,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn test_json_body_is_parsed() {
        let response =
            interpret_response(200, JSON, r#"{"message":"ok","items":[1,2]}"#).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.message.as_deref(), Some("ok"));
        assert_eq!(response.data["items"], json!([1, 2]));
        assert_eq!(response.origin, Origin::Live);
    }

    #[test]
    fn test_unparsable_json_becomes_empty_object() {
        let response = interpret_response(200, JSON, "{oops").unwrap();
        assert_eq!(response.data, json!({}));
    }

    #[test]
    fn test_non_json_body_gets_synthetic_message() {
        let response = interpret_response(204, Some("text/plain"), "").unwrap();
        assert_eq!(response.data, json!({"message": "Success"}));

        let err = interpret_response(502, None, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, ref message } if message == "Error"));
    }

    #[test]
    fn test_server_error_prefers_message_then_error() {
        let err = interpret_response(409, JSON, r#"{"success":false,"error":"Email taken"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Email taken");
        assert_eq!(err.status(), Some(409));

        let err = interpret_response(401, JSON, r#"{"message":"Invalid credentials","error":"x"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_server_error_without_body_uses_status() {
        let err = interpret_response(500, JSON, "{}").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = ClientConfig::new(Url::parse("http://api.local:8080/").unwrap());
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(
            api.url("/api/products?page=2").unwrap().as_str(),
            "http://api.local:8080/api/products?page=2"
        );
        assert_eq!(
            api.url("api/health").unwrap().as_str(),
            "http://api.local:8080/api/health"
        );
    }

    #[test]
    fn test_token_slot() {
        let config = ClientConfig::new(Url::parse("http://api.local").unwrap());
        let api = ApiClient::new(&config).unwrap();
        assert!(!api.has_auth_token());
        api.clone().set_auth_token(Some(SecretString::from("abc")));
        assert!(api.has_auth_token());
        assert!(!format!("{api:?}").contains("abc"));
        api.set_auth_token(None);
        assert!(!api.has_auth_token());
    }

    #[tokio::test]
    async fn test_unreachable_backend_serves_fixtures() {
        let mut config = ClientConfig::new(Url::parse("http://127.0.0.1:1").unwrap());
        config.fallback_delay = Duration::ZERO;
        let api = ApiClient::new(&config).unwrap();

        let response = api.send(Method::GET, "/api/banners", None).await.unwrap();
        assert_eq!(response.origin, Origin::Fallback);
        assert_eq!(response.data.as_array().unwrap().len(), 4);

        let err = api.send(Method::GET, "/api/orders", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
    }
}
