//! Command implementations.
//!
//! Each command works against a [`Storefront`] and returns the text to print,
//! so commands can be tested without capturing stdout.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod wishlist;

use thiserror::Error;

use shopfront_core::ProductId;
use shopfront_storefront::Storefront;
use shopfront_storefront::api::{ApiError, Origin};
use shopfront_storefront::auth::AuthError;
use shopfront_storefront::config::{ClientConfig, ConfigError};
use shopfront_storefront::forms::FormError;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Input the user needs to correct.
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error("Product {0} is not in the wishlist")]
    NotInWishlist(ProductId),

    #[error("{0} is out of stock")]
    OutOfStock(String),

    #[error("Please sign in to view your wishlist")]
    LoginRequired,
}

/// Open the storefront configured by the environment and restore any saved
/// session.
///
/// # Errors
///
/// Returns `CommandError` if the configuration is invalid or the API client
/// cannot be built.
pub async fn open() -> Result<Storefront, CommandError> {
    let config = ClientConfig::from_env()?;
    open_with(&config).await
}

/// Open the storefront for `config`.
///
/// # Errors
///
/// Returns `CommandError::Api` if the API client cannot be built.
pub async fn open_with(config: &ClientConfig) -> Result<Storefront, CommandError> {
    let mut app = Storefront::open(config)?;
    let status = app.start().await;
    tracing::debug!(?status, data_dir = %config.data_dir.display(), "Storefront opened");
    Ok(app)
}

/// A trailing note for answers that came from bundled data.
fn origin_note(origin: Origin) -> &'static str {
    if origin.is_fallback() {
        " (offline: bundled demo data)"
    } else {
        ""
    }
}
