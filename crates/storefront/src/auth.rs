//! Authentication state.
//!
//! Holds the current user and bearer token, keeps the token attached to the
//! [`ApiClient`], and persists it raw under the `auth_token` key.
//!
//! # Offline sessions
//!
//! When the backend is unreachable the API client fabricates login, register
//! and profile responses. Sessions established that way are recorded with
//! [`Origin::Fallback`]; [`Auth::is_offline_session`] exposes it so nothing
//! downstream mistakes a demo session for a verified one.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::api::{
    ApiClient, ApiError, ApiResponse, AuthSession, LoginRequest, Origin, RegisterRequest, User,
};
use crate::storage::{PersistentStore, keys};

/// Where the auth state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unauthenticated,
    /// A login, register, logout or startup check is in flight.
    Authenticating,
    Authenticated,
}

/// Errors surfaced by login and register.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server accepted the request but sent no token.
    #[error("No token received from server")]
    MissingToken,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Auth state container.
pub struct Auth {
    api: ApiClient,
    store: PersistentStore,
    token: Option<SecretString>,
    user: Option<User>,
    origin: Option<Origin>,
    status: AuthStatus,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("status", &self.status)
            .field("user", &self.user)
            .field("origin", &self.origin)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl Auth {
    /// A signed-out container. Call [`Auth::initialize`] to restore a saved
    /// session.
    #[must_use]
    pub const fn new(api: ApiClient, store: PersistentStore) -> Self {
        Self {
            api,
            store,
            token: None,
            user: None,
            origin: None,
            status: AuthStatus::Unauthenticated,
        }
    }

    /// Restore the saved session, if any, by fetching the profile for the
    /// stored token. A token the server rejects is discarded.
    pub async fn initialize(&mut self) -> AuthStatus {
        let Some(token) = self
            .store
            .load_raw(keys::AUTH_TOKEN)
            .filter(|t| !t.trim().is_empty())
        else {
            self.status = AuthStatus::Unauthenticated;
            return self.status;
        };

        self.status = AuthStatus::Authenticating;
        let token = SecretString::from(token);
        self.api.set_auth_token(Some(token.clone()));
        self.token = Some(token);

        match self.api.profile().await {
            Ok(response) => {
                tracing::info!(user_id = %response.data.id, origin = %response.origin, "Session restored");
                self.origin = Some(response.origin);
                self.user = Some(response.data);
                self.status = AuthStatus::Authenticated;
            }
            Err(error) => {
                tracing::warn!(error = %error, "Failed to fetch profile on startup, clearing token");
                self.clear_session();
            }
        }
        self.status
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the request fails, or
    /// `AuthError::MissingToken` if the response carries no token. Either
    /// way the container ends up signed out.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        self.status = AuthStatus::Authenticating;
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let result = self.api.login(&request).await;
        self.establish(result, "Login")
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Same as [`Auth::login`].
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<&User, AuthError> {
        self.status = AuthStatus::Authenticating;
        let result = self.api.register(request).await;
        self.establish(result, "Registration")
    }

    fn establish(
        &mut self,
        result: Result<ApiResponse<AuthSession>, ApiError>,
        action: &str,
    ) -> Result<&User, AuthError> {
        let response = match result {
            Ok(response) if response.data.token.trim().is_empty() => Err(AuthError::MissingToken),
            Ok(response) => Ok(response),
            Err(error) => Err(AuthError::Api(error)),
        };

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "{action} failed");
                self.clear_session();
                return Err(error);
            }
        };

        let ApiResponse { data, origin, .. } = response;
        let token = SecretString::from(data.token);
        self.store.save_raw(keys::AUTH_TOKEN, token.expose_secret());
        self.api.set_auth_token(Some(token.clone()));
        self.token = Some(token);
        self.origin = Some(origin);
        self.status = AuthStatus::Authenticated;

        if origin.is_fallback() {
            tracing::warn!(user_id = %data.user.id, "{action} completed in offline mode");
        } else {
            tracing::info!(user_id = %data.user.id, "{action} succeeded");
        }
        Ok(self.user.insert(data.user))
    }

    /// Sign out. The server is asked to invalidate the token, but local
    /// state is cleared whatever it answers.
    pub async fn logout(&mut self) {
        self.status = AuthStatus::Authenticating;
        if let Err(error) = self.api.logout().await {
            tracing::warn!(error = %error, "Logout API call failed");
        }
        self.clear_session();
        tracing::info!("Signed out");
    }

    fn clear_session(&mut self) {
        self.store.remove(keys::AUTH_TOKEN);
        self.api.set_auth_token(None);
        self.token = None;
        self.user = None;
        self.origin = None;
        self.status = AuthStatus::Unauthenticated;
    }

    /// A non-empty token and a user are both held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let has_token = self
            .token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty());
        has_token && self.user.is_some()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn status(&self) -> AuthStatus {
        self.status
    }

    /// Whether the current session came from the backend or from fallback data.
    #[must_use]
    pub const fn session_origin(&self) -> Option<Origin> {
        self.origin
    }

    /// The current session was fabricated offline.
    #[must_use]
    pub const fn is_offline_session(&self) -> bool {
        matches!(self.origin, Some(Origin::Fallback))
    }
}
