//! Bearer token extractor for the demo auth routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;

/// The token from an `Authorization: Bearer <token>` header.
///
/// Rejects with 401 when the header is missing or malformed. Whether the
/// token is live is up to the handler.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(BearerToken(token): BearerToken) -> Result<Json<User>> {
///     ...
/// }
/// ```
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;

        parse_bearer(header)
            .map(|token| Self(token.to_owned()))
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_owned()))
    }
}

/// Extract the token from a `Bearer` credential. The scheme is
/// case-insensitive.
fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("bearer  abc123 "), Some("abc123"));
        assert_eq!(parse_bearer("Basic abc123"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc123"), None);
    }
}
