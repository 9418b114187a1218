//! Demo account registry for the fixture API server.
//!
//! Accounts and sessions live in memory for the life of the process. The
//! registry starts with one demo account so a fresh server can be logged
//! into straight away.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand::RngCore;
use thiserror::Error;
use tokio::sync::RwLock;

use shopfront_core::{Email, EmailError, UserId};

use crate::api::{AuthSession, RegisterRequest, User};

/// Email of the seeded demo account.
pub const DEMO_EMAIL: &str = "demo@example.com";
/// Password of the seeded demo account.
pub const DEMO_PASSWORD: &str = "password123";
const DEMO_NAME: &str = "Demo User";

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Random bytes per password salt.
const SALT_BYTES: usize = 16;

/// Random bytes per session token.
const TOKEN_BYTES: usize = 32;

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Invalid email address")]
    InvalidEmail(#[from] EmailError),

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("password hashing error")]
    PasswordHash,
}

struct Account {
    user: User,
    password_hash: String,
}

/// In-memory accounts plus the bearer tokens issued to them.
pub struct AccountRegistry {
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, UserId>,
    next_id: i64,
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("accounts", &self.accounts.len())
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl AccountRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            sessions: HashMap::new(),
            next_id: 1,
        }
    }

    /// A registry holding the demo account (id 1).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::PasswordHash` if the demo password cannot be hashed.
    pub fn seeded() -> Result<Self, AccountError> {
        let mut registry = Self::new();
        let email = Email::parse(DEMO_EMAIL)?;
        registry.insert(email, DEMO_NAME.to_owned(), hash_password(DEMO_PASSWORD)?);
        Ok(registry)
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Validate a registration and check the email is free.
    ///
    /// Returns the parsed email and the display name to store.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MissingFields` if a field is blank,
    /// `AccountError::InvalidEmail` or `AccountError::WeakPassword` if
    /// validation fails, and `AccountError::UserAlreadyExists` if the email
    /// is taken.
    pub fn check_registration(
        &self,
        request: &RegisterRequest,
    ) -> Result<(Email, String), AccountError> {
        let first_name = request.first_name.trim();
        let last_name = request.last_name.trim();
        if first_name.is_empty()
            || last_name.is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AccountError::MissingFields);
        }

        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        if self.accounts.contains_key(email.as_str()) {
            return Err(AccountError::UserAlreadyExists);
        }

        Ok((email, format!("{first_name} {last_name}")))
    }

    /// The user and stored password hash for a login attempt.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MissingFields` if either field is blank and
    /// `AccountError::InvalidCredentials` if the email is unknown.
    pub fn credentials(&self, email: &str, password: &str) -> Result<(User, String), AccountError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }

        let email = Email::parse(email).map_err(|_| AccountError::InvalidCredentials)?;
        self.accounts
            .get(email.as_str())
            .map(|account| (account.user.clone(), account.password_hash.clone()))
            .ok_or(AccountError::InvalidCredentials)
    }

    /// Store a new account with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UserAlreadyExists` if the email was taken in
    /// the meantime.
    pub fn create(
        &mut self,
        email: Email,
        name: String,
        password_hash: String,
    ) -> Result<User, AccountError> {
        if self.accounts.contains_key(email.as_str()) {
            return Err(AccountError::UserAlreadyExists);
        }
        Ok(self.insert(email, name, password_hash))
    }

    /// Issue a fresh bearer token for `user`.
    pub fn open_session(&mut self, user: User) -> AuthSession {
        let token = generate_token();
        self.sessions.insert(token.clone(), user.id);
        AuthSession { token, user }
    }

    /// The account a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidToken` for unknown or revoked tokens.
    pub fn profile(&self, token: &str) -> Result<User, AccountError> {
        let id = self
            .sessions
            .get(token)
            .ok_or(AccountError::InvalidToken)?;

        self.accounts
            .values()
            .find(|account| account.user.id == *id)
            .map(|account| account.user.clone())
            .ok_or(AccountError::InvalidToken)
    }

    /// Revoke a token. Returns whether it was live.
    pub fn logout(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    fn insert(&mut self, email: Email, name: String, password_hash: String) -> User {
        let now: DateTime<Utc> = Utc::now();
        let user = User {
            id: UserId::new(self.next_id),
            name,
            email: email.as_str().to_owned(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.next_id += 1;

        self.accounts.insert(
            email.into_inner(),
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        user
    }

}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The account registry behind a lock.
///
/// Guards are held only for lookups and inserts. Argon2 runs on the blocking
/// pool between them.
#[derive(Debug, Default)]
pub struct Accounts {
    registry: RwLock<AccountRegistry>,
}

impl Accounts {
    #[must_use]
    pub fn new(registry: AccountRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MissingFields` if either field is blank and
    /// `AccountError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let (user, password_hash) = self.registry.read().await.credentials(email, password)?;

        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|_| AccountError::PasswordHash)??;

        tracing::info!(user_id = %user.id, "Login succeeded");
        Ok(self.registry.write().await.open_session(user))
    }

    /// Create an account and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of
    /// [`AccountRegistry::check_registration`], and
    /// `AccountError::UserAlreadyExists` if the email is registered while the
    /// password is being hashed.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, AccountError> {
        let (email, name) = self.registry.read().await.check_registration(request)?;

        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AccountError::PasswordHash)??;

        let mut registry = self.registry.write().await;
        let user = registry.create(email, name, password_hash)?;
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(registry.open_session(user))
    }

    /// The account a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidToken` for unknown or revoked tokens.
    pub async fn profile(&self, token: &str) -> Result<User, AccountError> {
        self.registry.read().await.profile(token)
    }

    /// Revoke a token. Returns whether it was live.
    pub async fn logout(&self, token: &str) -> bool {
        self.registry.write().await.logout(token)
    }

    /// Number of registered accounts.
    pub async fn len(&self) -> usize {
        self.registry.read().await.len()
    }
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword);
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AccountError> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| AccountError::PasswordHash)?;
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn seeded() -> Accounts {
        Accounts::new(AccountRegistry::seeded().unwrap())
    }

    #[tokio::test]
    async fn test_demo_account_logs_in() {
        let accounts = seeded();
        let session = accounts.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        assert_eq!(session.user.id, UserId::new(1));
        assert_eq!(session.user.name, "Demo User");
        assert_eq!(accounts.profile(&session.token).await.unwrap(), session.user);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let accounts = seeded();
        let wrong = accounts.login(DEMO_EMAIL, "nope").await.unwrap_err();
        let unknown = accounts
            .login("ghost@example.com", DEMO_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_register_then_duplicate() {
        let accounts = seeded();
        let session = accounts
            .register(&request("Ada@Example.com", "engine1"))
            .await
            .unwrap();
        assert_eq!(session.user.id, UserId::new(2));
        assert_eq!(session.user.name, "Ada Lovelace");
        assert_eq!(session.user.email, "ada@example.com");

        let err = accounts
            .register(&request("ada@example.com", "engine2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UserAlreadyExists));
        assert_eq!(accounts.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_of_one_email() {
        let accounts = Arc::new(Accounts::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let accounts = Arc::clone(&accounts);
                tokio::spawn(async move {
                    accounts.register(&request("ada@example.com", "engine1")).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, AccountError::UserAlreadyExists)),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(accounts.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_profile_not_blocked_by_login() {
        let accounts = Arc::new(seeded());
        let session = accounts.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        let busy = Arc::clone(&accounts);
        let login = tokio::spawn(async move { busy.login(DEMO_EMAIL, DEMO_PASSWORD).await });

        let user = tokio::time::timeout(Duration::from_secs(5), accounts.profile(&session.token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email, DEMO_EMAIL);
        assert!(login.await.unwrap().is_ok());
    }

    #[test]
    fn test_create_rechecks_email() {
        let mut registry = AccountRegistry::new();
        let (email, name) = registry
            .check_registration(&request("ada@example.com", "engine1"))
            .unwrap();
        registry
            .create(email.clone(), name.clone(), "hash".to_owned())
            .unwrap();

        assert!(matches!(
            registry.create(email, name, "hash".to_owned()),
            Err(AccountError::UserAlreadyExists)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_validation() {
        let registry = AccountRegistry::new();
        assert!(matches!(
            registry.check_registration(&request("", "engine1")),
            Err(AccountError::MissingFields)
        ));
        assert!(matches!(
            registry.check_registration(&request("not-an-email", "engine1")),
            Err(AccountError::InvalidEmail(_))
        ));
        assert!(matches!(
            registry.check_registration(&request("ada@example.com", "abc")),
            Err(AccountError::WeakPassword)
        ));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let accounts = seeded();
        let session = accounts.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

        assert!(accounts.logout(&session.token).await);
        assert!(!accounts.logout(&session.token).await);
        assert!(matches!(
            accounts.profile(&session.token).await,
            Err(AccountError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let accounts = seeded();
        let a = accounts.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        let b = accounts.login(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 43);
    }
}
