//! The remote store seam.
//!
//! Coordinators talk to the shop API only through [`RemoteStore`], which
//! keeps them testable against an in-memory fake. Every implementation must
//! be single-attempt: retry policy belongs to the caller.

use std::future::Future;

use popacart_core::{CartSnapshot, MutationIntent, ProductSummary, WishlistSnapshot};
use thiserror::Error;

/// Outcome taxonomy of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport failure, timeout, server error or undecodable body.
    /// Safe to retry by re-fetching.
    #[error("Network error: {0}")]
    Network(String),

    /// The server refused the request. Carries the server's message.
    #[error("{0}")]
    Validation(String),

    /// Missing or expired session.
    #[error("Authentication required: {0}")]
    Auth(String),
}

impl StoreError {
    /// Whether re-issuing an idempotent read may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timed out".to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Network(format!("unexpected response body: {err}"))
    }
}

/// Successful acknowledgment of a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    /// Message from the server, if any.
    pub message: Option<String>,
    /// The authoritative cart, when the server echoed one.
    pub cart: Option<CartSnapshot>,
}

/// The wishlist with what is needed to display it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistListing {
    pub snapshot: WishlistSnapshot,
    pub products: Vec<ProductSummary>,
}

/// Access to the authoritative cart and wishlist.
pub trait RemoteStore: Send + Sync + 'static {
    /// Read the current cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<CartSnapshot, StoreError>> + Send;

    /// Read the current wishlist.
    fn fetch_wishlist(&self) -> impl Future<Output = Result<WishlistListing, StoreError>> + Send;

    /// Perform one mutation.
    fn mutate(&self, intent: MutationIntent) -> impl Future<Output = Result<Ack, StoreError>> + Send;
}
