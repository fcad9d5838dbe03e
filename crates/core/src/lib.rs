//! Popacart Core - Domain types for the storefront client.
//!
//! This crate provides the types shared by every popacart component:
//! - `storefront` - Remote store client, optimistic coordinators and view models
//! - `cli` - Command-line front-end driving the view models
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. Every cart and wishlist change is expressed as an
//! intent whose local effect is a pure `(snapshot, intent) -> snapshot`
//! transformation, so the optimistic view can be recomputed at any time.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, quantities, variants and emails
//! - [`cart`] - Line items and cart snapshots
//! - [`totals`] - Derived totals calculator
//! - [`intent`] - Mutation intents and their local transformations
//! - [`wishlist`] - Wishlist membership snapshot
//! - [`product`] - Catalog types
//! - [`order`] - Checkout request types
//! - [`listing`] - New product listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod intent;
pub mod listing;
pub mod order;
pub mod product;
pub mod totals;
pub mod types;
pub mod wishlist;

pub use cart::{CartSnapshot, LineItem};
pub use intent::{CartIntent, IntentError, MutationIntent, NewLine, WishlistIntent};
pub use listing::{ListingColor, ListingError, ListingImage, ProductListing};
pub use order::{OrderRequest, OrderValidationError, Payment, PaymentMethod, ShippingAddress};
pub use product::{Product, ProductColor, ProductPage, ProductQuery, ProductSummary};
pub use types::*;
pub use wishlist::WishlistSnapshot;
