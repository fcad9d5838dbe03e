//! Wishlist ledger.
//!
//! Toggles are resolved against the displayed snapshot when dispatched and
//! sent as explicit add or remove requests, so repeating one is harmless.

use std::future::Future;

use popacart_core::{IntentError, ProductId, ProductSummary, WishlistIntent};

use super::{Coordinator, CoordinatorError, Ledger, Scope};
use crate::store::{Ack, RemoteStore, StoreError, WishlistListing};

pub type WishlistCoordinator<S> = Coordinator<S, WishlistLedger>;

pub struct WishlistLedger;

impl Ledger for WishlistLedger {
    type Snapshot = WishlistListing;
    type Intent = WishlistIntent;
    type Key = ProductId;

    const NAME: &'static str = "wishlist";

    fn scope(intent: &WishlistIntent) -> Scope<ProductId> {
        Scope::Key(intent.product_id().clone())
    }

    fn validate(_intent: &WishlistIntent) -> Result<(), IntentError> {
        Ok(())
    }

    fn apply(intent: &WishlistIntent, listing: &WishlistListing) -> WishlistListing {
        WishlistListing {
            snapshot: intent.apply(&listing.snapshot),
            products: listing.products.clone(),
        }
    }

    fn requires_reconcile(_intent: &WishlistIntent) -> bool {
        false
    }

    fn fetch<S: RemoteStore>(
        store: &S,
    ) -> impl Future<Output = Result<WishlistListing, StoreError>> + Send {
        store.fetch_wishlist()
    }

    fn acknowledged(_ack: Ack, _previous: &WishlistListing) -> Option<WishlistListing> {
        None
    }

    fn merge_fetched(previous: &WishlistListing, mut fetched: WishlistListing) -> WishlistListing {
        // Keep summaries for ids the server listed without details.
        for known in &previous.products {
            let listed = fetched.snapshot.contains(&known.id);
            if listed && !fetched.products.iter().any(|product| product.id == known.id) {
                fetched.products.push(known.clone());
            }
        }
        fetched
    }
}

impl<S: RemoteStore> WishlistCoordinator<S> {
    /// Flip membership of `product_id` as currently displayed.
    ///
    /// Returns the resolved intent and the remote half, as
    /// [`Coordinator::dispatch`] does.
    pub fn toggle(
        &self,
        product_id: ProductId,
    ) -> (
        WishlistIntent,
        impl Future<Output = Result<(), CoordinatorError>> + Send + 'static + use<S>,
    ) {
        let (intent, id, turn) = {
            let mut state = self.inner.lock();
            let intent = WishlistIntent::toggle(&state.displayed().snapshot, product_id);
            let (id, turn) = self.inner.begin(&mut state, intent.clone());
            (intent, id, turn)
        };
        (intent.clone(), self.launch(id, intent, turn))
    }

    /// Whether `product_id` is displayed as wishlisted.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.inner.lock().displayed().snapshot.contains(product_id)
    }

    /// Summaries for the displayed products, in wishlist order. Products
    /// without a known summary are skipped.
    #[must_use]
    pub fn products(&self) -> Vec<ProductSummary> {
        let listing = self.snapshot();
        listing
            .snapshot
            .ids()
            .iter()
            .filter_map(|id| listing.products.iter().find(|product| &product.id == id))
            .cloned()
            .collect()
    }
}
