//! Business logic services for the fixture API server.
//!
//! # Services
//!
//! - `accounts` - Demo account registry (argon2 passwords, opaque tokens)

pub mod accounts;

pub use accounts::{AccountError, AccountRegistry, Accounts};
