//! Demo auth route handlers.
//!
//! Successful responses are bare: `{token, user}` for login and register,
//! the user for profile. Failures use the usual error envelope.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::{AuthSession, LoginRequest, MessageBody, RegisterRequest, User};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::BearerToken;
use crate::state::AppState;

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthSession>> {
    let request = body(payload)?;
    let session = state
        .accounts()
        .login(&request.email, &request.password)
        .await?;

    set_sentry_user(&session.user.id, Some(&session.user.email));
    Ok(Json(session))
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthSession>)> {
    let request = body(payload)?;
    let session = state.accounts().register(&request).await?;

    set_sentry_user(&session.user.id, Some(&session.user.email));
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/auth/profile`
pub async fn profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<User>> {
    let user = state.accounts().profile(&token).await?;
    Ok(Json(user))
}

/// `POST /api/auth/logout`
///
/// Succeeds for revoked tokens too, so a client can always sign out.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Json<MessageBody> {
    let revoked = state.accounts().logout(&token).await;
    tracing::info!(revoked, "Logout");
    clear_sentry_user();

    Json(MessageBody {
        message: Some("Logout successful".to_owned()),
    })
}
