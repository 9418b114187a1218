//! Canned responses served while the backend is unreachable.

use chrono::Utc;
use rand::Rng;
use reqwest::Method;
use serde_json::{Value, json};
use shopfront_core::catalog::{HealthStatus, ProductQuery};
use shopfront_core::fixtures::Catalog;
use shopfront_core::{CategoryId, ProductId};

use super::{ApiError, ApiResponse, Origin};

const DEMO_EMAIL: &str = "demo@example.com";
const NEW_USER_EMAIL: &str = "user@example.com";
const DEMO_ACCOUNT_CREATED: &str = "2024-01-01T00:00:00Z";

/// A route that has offline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Route {
    Login,
    Register,
    Profile,
    Logout,
    /// Any other `/api/auth/*` path; answered with an error.
    OtherAuth(String),
    Banners,
    Categories,
    CategoryProducts(Option<CategoryId>, ProductQuery),
    Search(ProductQuery),
    Product(Option<ProductId>),
    Products(ProductQuery),
    Health,
}

impl Route {
    /// Match a request path (with optional query string) to its offline route.
    ///
    /// Auth routes answer any method; catalog routes only `GET`.
    pub(super) fn parse(method: &Method, path: &str) -> Option<Self> {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let rest = path.trim_end_matches('/').strip_prefix("/api/")?;
        let segments: Vec<&str> = rest.split('/').collect();

        if let ["auth", tail @ ..] = segments.as_slice() {
            return Some(match tail {
                ["login"] => Self::Login,
                ["register"] => Self::Register,
                ["profile"] => Self::Profile,
                ["logout"] => Self::Logout,
                _ => Self::OtherAuth(path.to_owned()),
            });
        }

        if *method != Method::GET {
            return None;
        }

        let listing = || ProductQuery::from_pairs(url::form_urlencoded::parse(query.as_bytes()));
        Some(match segments.as_slice() {
            ["banners"] => Self::Banners,
            ["categories"] => Self::Categories,
            ["categories", id, "products"] => Self::CategoryProducts(id.parse().ok(), listing()),
            ["products", "search"] => Self::Search(listing()),
            ["products", id] => Self::Product(id.parse().ok()),
            ["products"] => Self::Products(listing()),
            ["health"] => Self::Health,
            _ => return None,
        })
    }

    /// Whether this is an auth route (answered after the simulated delay).
    pub(super) const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Login | Self::Register | Self::Profile | Self::Logout | Self::OtherAuth(_)
        )
    }

    /// Build the canned response for this route.
    pub(super) fn respond(
        self,
        catalog: &Catalog,
        body: Option<&Value>,
    ) -> Result<ApiResponse<Value>, ApiError> {
        let (data, status, message) = match self {
            Self::Login => (login(body), 200, "Login successful (offline mode)"),
            Self::Register => (register(body), 201, "Registration successful (offline mode)"),
            Self::Profile => (
                demo_user(DEMO_EMAIL),
                200,
                "Profile fetched successfully (offline mode)",
            ),
            Self::Logout => (
                json!({ "message": "Logout successful" }),
                200,
                "Logout successful (offline mode)",
            ),
            Self::OtherAuth(path) => return Err(ApiError::FallbackUnavailable(path)),
            Self::Banners => (
                to_json(&catalog.banners)?,
                200,
                "Fallback banners loaded successfully",
            ),
            Self::Categories => (
                to_json(&catalog.categories)?,
                200,
                "Fallback categories loaded successfully",
            ),
            Self::CategoryProducts(id, mut query) => {
                // An unparsable id matches nothing rather than everything.
                query.category_id = Some(id.unwrap_or_else(|| CategoryId::new(0)));
                (
                    to_json(&query.apply(&catalog.products))?,
                    200,
                    "Fallback category products loaded successfully",
                )
            }
            Self::Search(query) => (
                to_json(&query.apply(&catalog.products))?,
                200,
                "Fallback search results loaded successfully",
            ),
            Self::Product(id) => {
                let product = id.and_then(|id| catalog.product(id)).ok_or_else(|| {
                    ApiError::Server {
                        status: 404,
                        message: "Product not found".to_owned(),
                    }
                })?;
                (
                    to_json(product)?,
                    200,
                    "Fallback product loaded successfully",
                )
            }
            Self::Products(query) => (
                to_json(&query.apply(&catalog.products))?,
                200,
                "Fallback products loaded successfully",
            ),
            Self::Health => (
                to_json(&HealthStatus::healthy(Utc::now()))?,
                200,
                "Health check successful (fallback)",
            ),
        };

        Ok(ApiResponse {
            data,
            status,
            message: Some(message.to_owned()),
            origin: Origin::Fallback,
        })
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

fn body_str<'a>(body: Option<&'a Value>, field: &str) -> Option<&'a str> {
    body?
        .get(field)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn demo_token() -> String {
    format!("demo_jwt_token_{}", Utc::now().timestamp_millis())
}

fn demo_user(email: &str) -> Value {
    json!({
        "id": 1,
        "name": "Demo User",
        "email": email,
        "created_at": DEMO_ACCOUNT_CREATED,
        "updated_at": DEMO_ACCOUNT_CREATED,
    })
}

fn login(body: Option<&Value>) -> Value {
    let email = body_str(body, "email").unwrap_or(DEMO_EMAIL);
    json!({ "token": demo_token(), "user": demo_user(email) })
}

fn register(body: Option<&Value>) -> Value {
    let name = [body_str(body, "first_name"), body_str(body, "last_name")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let name = if name.is_empty() {
        body_str(body, "name").unwrap_or("New User").to_owned()
    } else {
        name
    };
    let email = body_str(body, "email").unwrap_or(NEW_USER_EMAIL);
    let now = Utc::now().to_rfc3339();

    json!({
        "token": demo_token(),
        "user": {
            "id": rand::rng().random_range(1..=1000),
            "name": name,
            "email": email,
            "created_at": now,
            "updated_at": now,
        },
    })
}
