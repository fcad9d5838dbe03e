//! Mutation intents and their local effect.
//!
//! An intent is what a view asks for ("add two of this", "remove that").
//! Its local effect is a pure function of the current snapshot, which is
//! what makes optimistic display and replay after a re-fetch possible.
//!
//! Retry behavior mirrors the remote API: re-sending `AddItem` for the same
//! key increments the quantity again, re-sending `RemoveItem` or
//! `UpdateQuantity` for an absent key is a no-op.

use rust_decimal::Decimal;

use crate::cart::{CartSnapshot, LineItem};
use crate::types::{LineKey, ProductId, Quantity, QuantityError};
use crate::wishlist::WishlistSnapshot;

/// Errors for intents rejected before any state changes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    /// A quantity below 1 was requested.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),
}

/// A line to add to the cart, with what is needed to display it before the
/// server answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLine {
    pub key: LineKey,
    pub quantity: Quantity,
    /// Unit price shown until the server's price is known.
    pub unit_price: Decimal,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl NewLine {
    /// A line without display metadata.
    #[must_use]
    pub const fn new(key: LineKey, quantity: Quantity, unit_price: Decimal) -> Self {
        Self {
            key,
            quantity,
            unit_price,
            name: None,
            image_url: None,
        }
    }

    fn to_line_item(&self) -> LineItem {
        LineItem::new(self.key.clone(), self.quantity, self.unit_price)
            .with_display(self.name.clone(), self.image_url.clone())
    }
}

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIntent {
    /// Add a line, merging quantities into an existing line with the same key.
    AddItem(NewLine),
    /// Set the quantity of an existing line. Values below 1 are rejected.
    UpdateQuantity { key: LineKey, quantity: u32 },
    /// Remove a line.
    RemoveItem { key: LineKey },
    /// Remove every line.
    ClearCart,
}

impl CartIntent {
    /// The line this intent targets, or `None` for cart-wide intents.
    #[must_use]
    pub const fn key(&self) -> Option<&LineKey> {
        match self {
            Self::AddItem(line) => Some(&line.key),
            Self::UpdateQuantity { key, .. } | Self::RemoveItem { key } => Some(key),
            Self::ClearCart => None,
        }
    }

    /// Whether the authoritative cart must be re-fetched after the server
    /// acknowledges this intent.
    ///
    /// Clearing may partially fail on the server while still reporting
    /// success, so its local effect is never trusted.
    #[must_use]
    pub const fn requires_reconcile(&self) -> bool {
        matches!(self, Self::ClearCart)
    }

    /// Check the intent without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::InvalidQuantity`] for `UpdateQuantity` below 1.
    pub fn validate(&self) -> Result<(), IntentError> {
        if let Self::UpdateQuantity { quantity, .. } = self {
            Quantity::new(*quantity)?;
        }
        Ok(())
    }

    /// Apply the intent to `snapshot`, producing the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError`] if the intent is invalid; `snapshot` is never
    /// modified.
    pub fn apply(&self, snapshot: &CartSnapshot) -> Result<CartSnapshot, IntentError> {
        match self {
            Self::AddItem(line) => Ok(CartSnapshot::from_items(
                snapshot
                    .items()
                    .iter()
                    .cloned()
                    .chain(std::iter::once(line.to_line_item())),
            )),
            Self::UpdateQuantity { key, quantity } => {
                let quantity = Quantity::new(*quantity)?;
                Ok(CartSnapshot::from_items(snapshot.items().iter().map(
                    |item| {
                        if item.key() == key {
                            item.with_quantity(quantity)
                        } else {
                            item.clone()
                        }
                    },
                )))
            }
            Self::RemoveItem { key } => Ok(CartSnapshot::from_items(
                snapshot
                    .items()
                    .iter()
                    .filter(|item| item.key() != key)
                    .cloned(),
            )),
            Self::ClearCart => Ok(CartSnapshot::empty()),
        }
    }
}

/// A change to the wishlist. Both variants are idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WishlistIntent {
    Add(ProductId),
    Remove(ProductId),
}

impl WishlistIntent {
    /// Resolve a toggle into an explicit add or remove against `snapshot`.
    #[must_use]
    pub fn toggle(snapshot: &WishlistSnapshot, product_id: ProductId) -> Self {
        if snapshot.contains(&product_id) {
            Self::Remove(product_id)
        } else {
            Self::Add(product_id)
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        match self {
            Self::Add(id) | Self::Remove(id) => id,
        }
    }

    /// Membership the product should have afterwards.
    #[must_use]
    pub const fn desired_membership(&self) -> bool {
        matches!(self, Self::Add(_))
    }

    /// Apply the intent to `snapshot`.
    #[must_use]
    pub fn apply(&self, snapshot: &WishlistSnapshot) -> WishlistSnapshot {
        match self {
            Self::Add(id) => snapshot.with(id.clone()),
            Self::Remove(id) => snapshot.without(id),
        }
    }
}

/// Any intent the remote store can be asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationIntent {
    Cart(CartIntent),
    Wishlist(WishlistIntent),
}

impl From<CartIntent> for MutationIntent {
    fn from(intent: CartIntent) -> Self {
        Self::Cart(intent)
    }
}

impl From<WishlistIntent> for MutationIntent {
    fn from(intent: WishlistIntent) -> Self {
        Self::Wishlist(intent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(id: &str) -> LineKey {
        LineKey::product(ProductId::new(id))
    }

    fn add(id: &str, quantity: u32, unit_price: Decimal) -> CartIntent {
        CartIntent::AddItem(NewLine::new(
            key(id),
            Quantity::new(quantity).unwrap(),
            unit_price,
        ))
    }

    fn cart_with_a() -> CartSnapshot {
        add("A", 2, Decimal::new(10, 0))
            .apply(&CartSnapshot::empty())
            .unwrap()
    }

    #[test]
    fn test_add_existing_key_merges_quantity() {
        let snapshot = add("A", 3, Decimal::new(10, 0))
            .apply(&CartSnapshot::empty())
            .unwrap();
        let snapshot = add("A", 2, Decimal::new(10, 0)).apply(&snapshot).unwrap();

        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.find(&key("A")).unwrap().quantity().get(), 5);
        assert_eq!(snapshot.total_price(), Decimal::new(50, 0));
    }

    #[test]
    fn test_update_quantity_below_one_rejected() {
        let snapshot = cart_with_a();
        let intent = CartIntent::UpdateQuantity {
            key: key("A"),
            quantity: 0,
        };

        assert!(matches!(
            intent.apply(&snapshot),
            Err(IntentError::InvalidQuantity(_))
        ));
        assert!(intent.validate().is_err());
        assert_eq!(snapshot.find(&key("A")).unwrap().quantity().get(), 2);
    }

    #[test]
    fn test_update_quantity_recomputes_totals() {
        let snapshot = CartIntent::UpdateQuantity {
            key: key("A"),
            quantity: 3,
        }
        .apply(&cart_with_a())
        .unwrap();

        let line = snapshot.find(&key("A")).unwrap();
        assert_eq!(line.subtotal(), Decimal::new(3000, 2));
        assert_eq!(snapshot.total_price(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let snapshot = cart_with_a();
        let next = CartIntent::RemoveItem { key: key("Z") }
            .apply(&snapshot)
            .unwrap();
        assert_eq!(next, snapshot);
    }

    #[test]
    fn test_update_absent_key_is_noop() {
        let snapshot = cart_with_a();
        let next = CartIntent::UpdateQuantity {
            key: key("Z"),
            quantity: 4,
        }
        .apply(&snapshot)
        .unwrap();
        assert_eq!(next, snapshot);
    }

    #[test]
    fn test_clear_cart_empties() {
        let next = CartIntent::ClearCart.apply(&cart_with_a()).unwrap();
        assert!(next.is_empty());
        assert_eq!(next.total_price(), Decimal::ZERO);
        assert!(CartIntent::ClearCart.requires_reconcile());
        assert!(CartIntent::ClearCart.key().is_none());
    }

    #[test]
    fn test_wishlist_toggle_resolves_to_explicit_intent() {
        let empty = WishlistSnapshot::default();
        let id = ProductId::new("W");

        let first = WishlistIntent::toggle(&empty, id.clone());
        assert_eq!(first, WishlistIntent::Add(id.clone()));

        let after = first.apply(&empty);
        let second = WishlistIntent::toggle(&after, id.clone());
        assert_eq!(second, WishlistIntent::Remove(id));
        assert_eq!(second.apply(&after), empty);
    }

    #[test]
    fn test_wishlist_intents_idempotent() {
        let id = ProductId::new("W");
        let once = WishlistIntent::Add(id.clone()).apply(&WishlistSnapshot::default());
        let twice = WishlistIntent::Add(id).apply(&once);
        assert_eq!(once, twice);
    }
}
