//! Shopfront Core - Shared types library.
//!
//! This crate provides the types used across all Shopfront components:
//! - `storefront` - client state containers, API client and fixture API server
//! - `cli` - command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used
//! anywhere, including the client's offline fallback path.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails
//! - [`catalog`] - Product, category and banner shapes plus the listing query engine
//! - [`fixtures`] - Embedded catalog data
//! - [`images`] - Image URL resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod fixtures;
pub mod images;
pub mod types;

pub use types::*;
