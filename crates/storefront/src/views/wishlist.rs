//! Favorites page.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use popacart_core::{ProductId, WishlistIntent};
use tracing::instrument;

use super::catalog::ProductCard;
use super::{LoadState, Navigation, Notifications, Toast};
use crate::coordinator::{CoordinatorError, WishlistCoordinator};
use crate::error::{AppError, add_breadcrumb};
use crate::store::{RemoteStore, WishlistListing};

/// What the favorites page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistView {
    Loading,
    Error { message: String },
    Empty,
    Items { count: usize, cards: Vec<ProductCard> },
}

impl From<&WishlistListing> for WishlistView {
    fn from(listing: &WishlistListing) -> Self {
        if listing.snapshot.is_empty() {
            return Self::Empty;
        }
        let cards = listing
            .snapshot
            .ids()
            .iter()
            .map(|id| {
                listing
                    .products
                    .iter()
                    .find(|product| &product.id == id)
                    .map_or_else(|| ProductCard::placeholder(id), ProductCard::from)
            })
            .collect();
        Self::Items {
            count: listing.snapshot.len(),
            cards,
        }
    }
}

impl fmt::Display for WishlistView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "Loading favorites..."),
            Self::Error { message } => writeln!(f, "Error: {message}"),
            Self::Empty => writeln!(f, "Your favorites list is empty"),
            Self::Items { count, cards } => {
                writeln!(f, "Favorites ({count})")?;
                for card in cards {
                    writeln!(f, "  {card}")?;
                }
                Ok(())
            }
        }
    }
}

/// The favorites list.
pub struct WishlistPage<S: RemoteStore> {
    coordinator: WishlistCoordinator<S>,
    status: Mutex<LoadState>,
    notifications: Notifications,
}

impl<S: RemoteStore> WishlistPage<S> {
    pub fn new(coordinator: WishlistCoordinator<S>) -> Self {
        Self {
            coordinator,
            status: Mutex::new(LoadState::Loading),
            notifications: Notifications::new(),
        }
    }

    pub const fn coordinator(&self) -> &WishlistCoordinator<S> {
        &self.coordinator
    }

    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    #[instrument(skip(self))]
    pub async fn mount(&self) -> Navigation {
        self.set_status(LoadState::Loading);
        match self.coordinator.load().await {
            Ok(_) => {
                self.set_status(LoadState::Ready);
                Navigation::Stay
            }
            Err(CoordinatorError::SessionExpired) => {
                self.set_status(LoadState::Ready);
                Navigation::Login
            }
            Err(err) => {
                let err = AppError::from(err);
                err.report();
                self.set_status(LoadState::Failed(err.user_message()));
                Navigation::Stay
            }
        }
    }

    pub fn unmount(&self) {
        self.notifications.unmount();
    }

    pub async fn add(&self, product_id: ProductId) -> Navigation {
        self.run(WishlistIntent::Add(product_id)).await
    }

    pub async fn remove(&self, product_id: ProductId) -> Navigation {
        self.run(WishlistIntent::Remove(product_id)).await
    }

    pub async fn toggle(&self, product_id: ProductId) -> Navigation {
        let (intent, remote) = self.coordinator.toggle(product_id);
        self.settle(&intent, remote).await
    }

    #[must_use]
    pub fn render(&self) -> WishlistView {
        match self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            LoadState::Loading => WishlistView::Loading,
            LoadState::Failed(message) => WishlistView::Error { message },
            LoadState::Ready => WishlistView::from(&self.coordinator.snapshot()),
        }
    }

    async fn run(&self, intent: WishlistIntent) -> Navigation {
        match self.coordinator.dispatch(intent.clone()) {
            Ok(remote) => self.settle(&intent, remote).await,
            Err(err) => {
                self.fail(&AppError::from(err));
                Navigation::Stay
            }
        }
    }

    async fn settle(
        &self,
        intent: &WishlistIntent,
        remote: impl Future<Output = Result<(), CoordinatorError>>,
    ) -> Navigation {
        let (action, done) = if intent.desired_membership() {
            ("Added to favorites", "Added to your favorites")
        } else {
            ("Removed from favorites", "Removed from your favorites")
        };
        add_breadcrumb(
            "wishlist",
            action,
            Some(&[("product_id", intent.product_id().as_str())]),
        );

        match remote.await {
            Ok(()) => {
                self.notifications.push(Toast::success(done));
                Navigation::Stay
            }
            Err(err) => {
                let err = AppError::from(err);
                self.fail(&err);
                if err.requires_login() {
                    Navigation::Login
                } else {
                    Navigation::Stay
                }
            }
        }
    }

    fn fail(&self, err: &AppError) {
        err.report();
        self.notifications.push(Toast::error(err.user_message()));
    }

    fn set_status(&self, status: LoadState) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}
