//! Cart ledger.

use std::future::Future;

use popacart_core::{CartIntent, CartSnapshot, IntentError, LineKey};

use super::{Coordinator, Ledger, Scope};
use crate::store::{Ack, RemoteStore, StoreError};

pub type CartCoordinator<S> = Coordinator<S, CartLedger>;

pub struct CartLedger;

impl Ledger for CartLedger {
    type Snapshot = CartSnapshot;
    type Intent = CartIntent;
    type Key = LineKey;

    const NAME: &'static str = "cart";

    fn scope(intent: &CartIntent) -> Scope<LineKey> {
        intent.key().cloned().map_or(Scope::All, Scope::Key)
    }

    fn validate(intent: &CartIntent) -> Result<(), IntentError> {
        intent.validate()
    }

    fn apply(intent: &CartIntent, snapshot: &CartSnapshot) -> CartSnapshot {
        // Only validated intents reach the ledger.
        intent.apply(snapshot).unwrap_or_else(|_| snapshot.clone())
    }

    fn requires_reconcile(intent: &CartIntent) -> bool {
        intent.requires_reconcile()
    }

    fn fetch<S: RemoteStore>(
        store: &S,
    ) -> impl Future<Output = Result<CartSnapshot, StoreError>> + Send {
        store.fetch_cart()
    }

    fn acknowledged(ack: Ack, previous: &CartSnapshot) -> Option<CartSnapshot> {
        ack.cart.map(|cart| carry_display(cart, previous))
    }

    fn merge_fetched(previous: &CartSnapshot, fetched: CartSnapshot) -> CartSnapshot {
        carry_display(fetched, previous)
    }
}

/// Fill in names and images the server left out from lines already known.
fn carry_display(snapshot: CartSnapshot, previous: &CartSnapshot) -> CartSnapshot {
    if previous.is_empty() {
        return snapshot;
    }
    snapshot.fill_display(previous)
}
