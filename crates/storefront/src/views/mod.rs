//! Headless view models.
//!
//! Each page owns its state and a [`Notifications`] queue, takes explicit
//! handles (coordinators, API client, session) and renders into plain data
//! with a `Display` form for terminals. Actions return a [`Navigation`]
//! telling the caller where to go next.

pub mod add_to_cart;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod format;
pub mod header;
pub mod listing;
pub mod wishlist;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use popacart_core::ProductId;
use tracing::debug;

pub use add_to_cart::AddToCartWidget;
pub use auth::{LoginForm, logout};
pub use cart::{CartItemView, CartPage, CartView};
pub use catalog::{ProductDetailPage, ProductListPage};
pub use checkout::CheckoutForm;
pub use header::{Header, HeaderView};
pub use listing::ProductListingForm;
pub use wishlist::{WishlistPage, WishlistView};

/// Where the front-end should go after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Login,
    Cart,
    Products,
    ProductDetail(ProductId),
    Checkout,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A short message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        write!(f, "{marker} {}", self.message)
    }
}

/// Toast queue of one view. Toasts pushed after [`Self::unmount`] are
/// dropped, so a mutation finishing after the user left stays silent.
#[derive(Clone)]
pub struct Notifications {
    inner: Arc<NotificationsInner>,
}

struct NotificationsInner {
    mounted: AtomicBool,
    toasts: Mutex<Vec<Toast>>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            inner: Arc::new(NotificationsInner {
                mounted: AtomicBool::new(true),
                toasts: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        if !self.is_mounted() {
            debug!(message = %toast.message, "Discarding toast for unmounted view");
            return;
        }
        self.lock().push(toast);
    }

    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::Release);
        self.lock().clear();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::Acquire)
    }

    /// Take every queued toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    /// The most recent toast, left in the queue.
    #[must_use]
    pub fn latest(&self) -> Option<Toast> {
        self.lock().last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.inner
            .toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Loading state shared by pages that fetch on mount.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_after_unmount_are_dropped() {
        let notifications = Notifications::new();
        notifications.push(Toast::success("Added to your shopping bag"));
        assert_eq!(notifications.latest().map(|t| t.kind), Some(ToastKind::Success));

        let handle = notifications.clone();
        notifications.unmount();
        handle.push(Toast::error("Failed to add product to bag"));

        assert!(notifications.drain().is_empty());
    }

    #[test]
    fn test_toast_display() {
        assert_eq!(Toast::error("Out of stock").to_string(), "✗ Out of stock");
    }
}
