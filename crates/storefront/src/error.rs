//! Unified error handling with Sentry integration.
//!
//! Provides an `AppError` type that maps every failure to a message fit for
//! the customer and captures unexpected ones to Sentry. Internal details
//! are never part of the user-facing message.

use popacart_core::{IntentError, ListingError, OrderValidationError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::coordinator::CoordinatorError;
use crate::session::SessionError;
use crate::store::StoreError;

const NETWORK_MESSAGE: &str = "Could not reach the store. Please try again.";
const LOGIN_MESSAGE: &str = "Please log in to continue.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A remote call failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An intent was rejected before anything changed.
    #[error("Invalid change: {0}")]
    Intent(#[from] IntentError),

    /// A cart or wishlist mutation did not take effect.
    #[error("Mutation failed: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// The saved session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The checkout form is incomplete.
    #[error("Order error: {0}")]
    Order(#[from] OrderValidationError),

    /// The new product form is incomplete.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Input rejected locally.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The storefront is not configured correctly.".to_string(),
            Self::Store(err) | Self::Coordinator(CoordinatorError::Rejected(err)) => {
                store_message(err)
            }
            Self::Coordinator(err @ CoordinatorError::SessionExpired) => err.to_string(),
            Self::Intent(IntentError::InvalidQuantity(_)) => {
                "Quantity must be at least 1.".to_string()
            }
            Self::Session(_) => "Could not access the saved session.".to_string(),
            Self::Order(OrderValidationError::MissingFields(_)) => {
                "Please fill in all required fields.".to_string()
            }
            Self::Order(OrderValidationError::UnknownPaymentMethod(method)) => {
                format!("Unknown payment method: {method}")
            }
            Self::Listing(ListingError::MissingFields(_)) => {
                "Please fill in all required fields.".to_string()
            }
            Self::Listing(ListingError::NegativePrice) => "Price must not be negative.".to_string(),
            Self::Listing(err @ ListingError::MissingImages(_)) => err.to_string(),
            Self::Listing(ListingError::UnknownSize(size)) => format!("Unknown size: {size}"),
            Self::Listing(ListingError::UnknownColor(color)) => format!("Unknown color: {color}"),
            Self::Validation(message) | Self::NotFound(message) => message.clone(),
        }
    }

    /// Whether the customer has to log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Auth(_)) | Self::Coordinator(CoordinatorError::SessionExpired)
        )
    }

    /// Whether this error points at a fault rather than a refusal.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Session(_)
                | Self::Store(StoreError::Network(_))
                | Self::Coordinator(CoordinatorError::Rejected(StoreError::Network(_)))
        )
    }

    /// Log the error, capturing unexpected kinds to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::info!(error = %self, "Action refused");
        }
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::Network(_) => NETWORK_MESSAGE.to_string(),
        StoreError::Validation(message) => message.clone(),
        StoreError::Auth(_) => LOGIN_MESSAGE.to_string(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with the customer.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Removed item", Some(&[("product_id", "665f1c")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use popacart_core::Quantity;

    use super::*;

    #[test]
    fn test_user_messages_hide_internal_details() {
        let err = AppError::Store(StoreError::Network("tcp connect error: 10.0.0.3".to_string()));
        assert_eq!(err.user_message(), NETWORK_MESSAGE);
        assert!(err.is_unexpected());

        let err = AppError::Coordinator(CoordinatorError::Rejected(StoreError::Validation(
            "Product is out of stock".to_string(),
        )));
        assert_eq!(err.user_message(), "Product is out of stock");
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_session_expiry_requires_login() {
        let err = AppError::Coordinator(CoordinatorError::SessionExpired);
        assert!(err.requires_login());
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please log in again."
        );
        assert!(AppError::Store(StoreError::Auth("401".to_string())).requires_login());
        assert!(!AppError::NotFound("Product not found.".to_string()).requires_login());
    }

    #[test]
    fn test_order_and_intent_messages() {
        let err = AppError::Order(OrderValidationError::MissingFields(vec!["fullName"]));
        assert_eq!(err.user_message(), "Please fill in all required fields.");

        let err = AppError::from(IntentError::from(Quantity::new(0).unwrap_err()));
        assert_eq!(err.user_message(), "Quantity must be at least 1.");
    }

    #[test]
    fn test_listing_messages() {
        let err = AppError::from(ListingError::MissingFields(vec!["brand"]));
        assert_eq!(err.user_message(), "Please fill in all required fields.");

        let err = AppError::from(ListingError::MissingImages(vec!["Red", "Blue"]));
        assert_eq!(
            err.user_message(),
            "Please upload images for the following colors: Red, Blue"
        );
        assert!(!err.is_unexpected());
    }
}
