//! Add-to-bag widget shown on product pages.

use popacart_core::{CartIntent, ColorChoice, LineKey, NewLine, Product, Quantity};
use rust_decimal::Decimal;
use tracing::instrument;

use super::{Navigation, Notifications, Toast};
use crate::coordinator::{CartCoordinator, CoordinatorError};
use crate::error::{AppError, add_breadcrumb};
use crate::store::{RemoteStore, StoreError};

const ADDED: &str = "Added to your shopping bag";
const FAILED: &str = "Failed to add product to bag";

/// Quantity and variant selection for one product, plus the add action.
pub struct AddToCartWidget<S: RemoteStore> {
    coordinator: CartCoordinator<S>,
    product: Product,
    quantity: Quantity,
    color: Option<ColorChoice>,
    size: Option<String>,
    notifications: Notifications,
}

impl<S: RemoteStore> AddToCartWidget<S> {
    pub fn new(coordinator: CartCoordinator<S>, product: Product) -> Self {
        Self {
            coordinator,
            product,
            quantity: Quantity::ONE,
            color: None,
            size: None,
            notifications: Notifications::new(),
        }
    }

    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub const fn increase(&mut self) {
        self.quantity = self.quantity.increment();
    }

    /// Lower the quantity; stays at 1.
    pub fn decrease(&mut self) {
        if let Some(quantity) = self.quantity.decrement() {
            self.quantity = quantity;
        }
    }

    /// Pick one of the product's colors by name. Returns whether it exists.
    pub fn select_color(&mut self, name: &str) -> bool {
        let choice = self
            .product
            .colors
            .iter()
            .find(|color| color.name.eq_ignore_ascii_case(name))
            .map(popacart_core::ProductColor::to_choice);
        let found = choice.is_some();
        if found {
            self.color = choice;
        }
        found
    }

    /// Pick one of the product's sizes. Returns whether it exists.
    pub fn select_size(&mut self, size: &str) -> bool {
        let found = self
            .product
            .sizes
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(size))
            .cloned();
        let exists = found.is_some();
        if exists {
            self.size = found;
        }
        exists
    }

    /// The line this widget would add.
    #[must_use]
    pub fn line(&self) -> NewLine {
        let mut key = LineKey::product(self.product.id.clone());
        if let Some(color) = &self.color {
            key = key.with_color(color.clone());
        }
        if let Some(size) = &self.size {
            key = key.with_size(size.clone());
        }

        // Priced like the product page until the server answers.
        let unit_price = self.product.display_price().max(Decimal::ZERO);
        NewLine {
            name: Some(self.product.name.clone()),
            image_url: self.product.primary_image().map(str::to_owned),
            ..NewLine::new(key, self.quantity, unit_price)
        }
    }

    #[instrument(skip(self), fields(product_id = %self.product.id, quantity = %self.quantity))]
    pub async fn submit(&self) -> Navigation {
        let line = self.line();
        let quantity = line.quantity.to_string();
        add_breadcrumb(
            "cart",
            "Added to bag",
            Some(&[
                ("product_id", self.product.id.as_str()),
                ("quantity", quantity.as_str()),
            ]),
        );

        let result = match self.coordinator.dispatch(CartIntent::AddItem(line)) {
            Ok(remote) => remote.await.map_err(AppError::from),
            Err(err) => Err(AppError::from(err)),
        };

        match result {
            Ok(()) => {
                self.notifications.push(Toast::success(ADDED));
                Navigation::Stay
            }
            Err(err) => {
                err.report();
                let navigation = if err.requires_login() {
                    Navigation::Login
                } else {
                    Navigation::Stay
                };
                self.notifications.push(Toast::error(failure_message(&err)));
                navigation
            }
        }
    }
}

fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Coordinator(CoordinatorError::Rejected(StoreError::Validation(message))) => {
            message.clone()
        }
        AppError::Coordinator(CoordinatorError::SessionExpired) => err.user_message(),
        _ => FAILED.to_string(),
    }
}
