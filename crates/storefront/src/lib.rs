//! Shopfront storefront library.
//!
//! Client side: the persistent store port ([`storage`]), the offline-capable
//! [`api`] client, the [`cart`], [`wishlist`] and [`auth`] state containers,
//! form validation ([`forms`]) and the [`app`] composition root.
//!
//! Server side: the fixture API server the client talks to during
//! development ([`routes`], [`services`], [`middleware`], [`state`],
//! [`error`]). The `shopfront-api` binary runs it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod wishlist;

pub use app::Storefront;
