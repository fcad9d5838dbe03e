//! Cart line items and snapshots.
//!
//! A [`CartSnapshot`] is an immutable value: every change produces a new
//! snapshot through one of the constructors. Locally built snapshots
//! recompute line subtotals and the cart total with the
//! [`totals`](crate::totals) calculator. Snapshots built from a server
//! response with [`CartSnapshot::from_server`] keep the prices the server
//! reported. Fields are private so totals never drift incrementally.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::totals;
use crate::types::{ColorChoice, LineKey, ProductId, Quantity, round_money};

/// One distinct product + variant entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(flatten)]
    key: LineKey,
    quantity: Quantity,
    unit_price: Decimal,
    subtotal: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl LineItem {
    /// Create a line item. Negative unit prices are clamped to zero.
    #[must_use]
    pub fn new(key: LineKey, quantity: Quantity, unit_price: Decimal) -> Self {
        let unit_price = unit_price.max(Decimal::ZERO);
        Self {
            subtotal: totals::line_subtotal(quantity, unit_price),
            key,
            quantity,
            unit_price,
            name: None,
            image_url: None,
        }
    }

    /// Attach display metadata.
    #[must_use]
    pub fn with_display(mut self, name: Option<String>, image_url: Option<String>) -> Self {
        self.name = name;
        self.image_url = image_url;
        self
    }

    /// Replace the computed subtotal with one the server reported.
    #[must_use]
    pub fn with_subtotal(mut self, subtotal: Decimal) -> Self {
        self.subtotal = round_money(subtotal.max(Decimal::ZERO));
        self
    }

    /// The same line with a different quantity (subtotal recomputed).
    #[must_use]
    pub fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            subtotal: totals::line_subtotal(quantity, self.unit_price),
            ..self.clone()
        }
    }

    /// Identity key of this line.
    #[must_use]
    pub const fn key(&self) -> &LineKey {
        &self.key
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.key.product_id
    }

    /// Selected color, if any.
    #[must_use]
    pub const fn selected_color(&self) -> Option<&ColorChoice> {
        self.key.selected_color.as_ref()
    }

    /// Selected size, if any.
    #[must_use]
    pub fn selected_size(&self) -> Option<&str> {
        self.key.selected_size.as_deref()
    }

    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `quantity × unit_price`, rounded to two decimals.
    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Fold `other` into this line: quantities add, missing display
    /// metadata is filled in. The unit price of `self` is kept.
    fn merge(&mut self, other: Self) {
        self.quantity = self.quantity.saturating_add(other.quantity);
        self.subtotal = totals::line_subtotal(self.quantity, self.unit_price);
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.image_url.is_none() {
            self.image_url = other.image_url;
        }
    }
}

/// An ordered list of line items with a derived total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(rename = "products")]
    items: Vec<LineItem>,
    total_price: Decimal,
}

impl CartSnapshot {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_price: Decimal::ZERO,
        }
    }

    /// Build a snapshot from line items.
    ///
    /// Lines sharing an identity key are merged into the first occurrence
    /// (quantities add), so the result never holds duplicate keys.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut merged: Vec<LineItem> = Vec::new();
        for item in items {
            if let Some(existing) = merged.iter_mut().find(|line| line.key == item.key) {
                existing.merge(item);
            } else {
                merged.push(item);
            }
        }
        let total_price = totals::cart_total(&merged);
        Self {
            items: merged,
            total_price,
        }
    }

    /// Build a snapshot from lines priced by the server.
    ///
    /// Duplicate keys are merged as in [`Self::from_items`]. The total is
    /// the server's when reported, otherwise recomputed.
    #[must_use]
    pub fn from_server(
        items: impl IntoIterator<Item = LineItem>,
        reported_total: Option<Decimal>,
    ) -> Self {
        let snapshot = Self::from_items(items);
        match reported_total {
            Some(total) => Self {
                total_price: round_money(total.max(Decimal::ZERO)),
                ..snapshot
            },
            None => snapshot,
        }
    }

    /// Fill in names and images missing from lines with those of the same
    /// key in `previous`. Prices and totals are kept.
    #[must_use]
    pub fn fill_display(mut self, previous: &Self) -> Self {
        for item in &mut self.items {
            let Some(known) = previous.find(&item.key) else {
                continue;
            };
            if item.name.is_none() {
                item.name.clone_from(&known.name);
            }
            if item.image_url.is_none() {
                item.image_url.clone_from(&known.image_url);
            }
        }
        self
    }

    /// Total recomputed from the current lines, ignoring any total the
    /// server reported.
    #[must_use]
    pub fn computed_total(&self) -> Decimal {
        totals::cart_total(&self.items)
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of line subtotals rounded to two decimals, or the server's total
    /// for snapshots built with [`Self::from_server`].
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines (what the header badge shows).
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Find the line with the given identity key.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    /// Whether a line with the given key exists.
    #[must_use]
    pub fn contains(&self, key: &LineKey) -> bool {
        self.find(key).is_some()
    }

    /// Consume the snapshot and return its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}
