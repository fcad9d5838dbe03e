//! Shopping bag page.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use popacart_core::{CartIntent, CartSnapshot, LineItem, LineKey};
use rust_decimal::Decimal;
use tracing::instrument;

use super::format::{money, variant_label};
use super::{LoadState, Navigation, Notifications, Toast};
use crate::coordinator::{CartCoordinator, CoordinatorError};
use crate::error::{AppError, add_breadcrumb};
use crate::store::RemoteStore;

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub key: LineKey,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub image_url: Option<String>,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            key: item.key().clone(),
            name: item
                .name()
                .map_or_else(|| item.product_id().to_string(), str::to_owned),
            variant: variant_label(item.key()),
            quantity: item.quantity().get(),
            unit_price: money(item.unit_price()),
            subtotal: money(item.subtotal()),
            image_url: item.image_url().map(str::to_owned),
        }
    }
}

/// What the cart page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartView {
    Loading,
    Error {
        message: String,
    },
    Empty,
    Items {
        items: Vec<CartItemView>,
        subtotal: String,
        shipping: String,
        total: String,
        item_count: usize,
    },
}

impl From<&CartSnapshot> for CartView {
    fn from(snapshot: &CartSnapshot) -> Self {
        if snapshot.is_empty() {
            return Self::Empty;
        }
        // Shipping is not charged yet.
        let shipping = Decimal::ZERO;
        Self::Items {
            items: snapshot.items().iter().map(CartItemView::from).collect(),
            subtotal: money(snapshot.total_price()),
            shipping: money(shipping),
            total: money(snapshot.total_price() + shipping),
            item_count: snapshot.line_count(),
        }
    }
}

impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "Loading your bag..."),
            Self::Error { message } => writeln!(f, "{message}"),
            Self::Empty => writeln!(f, "Your bag is empty"),
            Self::Items {
                items,
                subtotal,
                shipping,
                total,
                item_count,
            } => {
                writeln!(f, "Bag ({item_count})")?;
                for item in items {
                    write!(f, "  {} x{}", item.name, item.quantity)?;
                    if let Some(variant) = &item.variant {
                        write!(f, " [{variant}]")?;
                    }
                    writeln!(f, "  {} ({} each)", item.subtotal, item.unit_price)?;
                }
                writeln!(f, "Subtotal            {subtotal}")?;
                writeln!(f, "Estimated Shipping  {shipping}")?;
                writeln!(f, "Estimated Total     {total}")
            }
        }
    }
}

/// The shopping bag.
pub struct CartPage<S: RemoteStore> {
    coordinator: CartCoordinator<S>,
    status: Mutex<LoadState>,
    notifications: Notifications,
}

impl<S: RemoteStore> CartPage<S> {
    pub fn new(coordinator: CartCoordinator<S>) -> Self {
        Self {
            coordinator,
            status: Mutex::new(LoadState::Loading),
            notifications: Notifications::new(),
        }
    }

    pub const fn coordinator(&self) -> &CartCoordinator<S> {
        &self.coordinator
    }

    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Fetch the cart. A failure shows a full error view with retry.
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

    pub async fn retry(&self) -> Navigation {
        self.mount().await
    }

    pub fn unmount(&self) {
        self.notifications.unmount();
    }

    pub async fn increase(&self, key: &LineKey) -> Navigation {
        let Some(quantity) = self.quantity_of(key) else {
            return Navigation::Stay;
        };
        self.set_quantity(key, quantity.saturating_add(1)).await
    }

    /// Lower the quantity by one. Rejected at 1; use [`Self::remove`].
    pub async fn decrease(&self, key: &LineKey) -> Navigation {
        let Some(quantity) = self.quantity_of(key) else {
            return Navigation::Stay;
        };
        self.set_quantity(key, quantity - 1).await
    }

    pub async fn set_quantity(&self, key: &LineKey, quantity: u32) -> Navigation {
        self.run(CartIntent::UpdateQuantity {
            key: key.clone(),
            quantity,
        })
        .await
    }

    pub async fn remove(&self, key: &LineKey) -> Navigation {
        self.run(CartIntent::RemoveItem { key: key.clone() }).await
    }

    pub async fn clear(&self) -> Navigation {
        self.run(CartIntent::ClearCart).await
    }

    /// Continue to checkout; only possible with something in the bag.
    pub fn checkout(&self) -> Navigation {
        if self.coordinator.snapshot().is_empty() {
            self.notifications.push(Toast::error("Your bag is empty"));
            return Navigation::Stay;
        }
        add_breadcrumb("cart", "Proceeded to checkout", None);
        Navigation::Checkout
    }

    #[must_use]
    pub fn render(&self) -> CartView {
        match self.status() {
            LoadState::Loading => CartView::Loading,
            LoadState::Failed(message) => CartView::Error { message },
            LoadState::Ready => CartView::from(&self.coordinator.snapshot()),
        }
    }

    async fn run(&self, intent: CartIntent) -> Navigation {
        let target = intent
            .key()
            .map_or_else(|| "*".to_string(), ToString::to_string);
        add_breadcrumb("cart", action_label(&intent), Some(&[("key", target.as_str())]));

        let remote = match self.coordinator.dispatch(intent) {
            Ok(remote) => remote,
            Err(err) => {
                self.fail(&AppError::from(err));
                return Navigation::Stay;
            }
        };

        match remote.await {
            Ok(()) => Navigation::Stay,
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

    fn quantity_of(&self, key: &LineKey) -> Option<u32> {
        self.coordinator
            .snapshot()
            .find(key)
            .map(|item| item.quantity().get())
    }

    fn status(&self) -> LoadState {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_status(&self, status: LoadState) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

const fn action_label(intent: &CartIntent) -> &'static str {
    match intent {
        CartIntent::AddItem(_) => "Added item",
        CartIntent::UpdateQuantity { .. } => "Changed quantity",
        CartIntent::RemoveItem { .. } => "Removed item",
        CartIntent::ClearCart => "Cleared bag",
    }
}
