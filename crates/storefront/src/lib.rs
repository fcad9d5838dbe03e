//! Popacart Storefront library.
//!
//! Client side of the popacart shop: a typed client for the remote shop
//! API, optimistic coordinators keeping the cart and wishlist responsive,
//! and headless view models the CLI front-end drives.
//!
//! # Modules
//!
//! - [`api`] - HTTP client for the shop API (`ApiClient`)
//! - [`store`] - The `RemoteStore` seam and its error taxonomy
//! - [`coordinator`] - Optimistic cart and wishlist coordinators
//! - [`views`] - Page view models
//! - [`session`] - Session token and its on-disk persistence
//! - [`config`] - Environment configuration
//! - [`error`] - `AppError` and Sentry helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::ApiClient;
pub use config::StorefrontConfig;
pub use error::AppError;
pub use session::{Session, SessionFile};
pub use state::AppState;
pub use store::{Ack, RemoteStore, StoreError, WishlistListing};
