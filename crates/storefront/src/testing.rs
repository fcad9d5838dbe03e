//! In-memory [`RemoteStore`] for coordinator and view tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use popacart_core::{
    CartIntent, CartSnapshot, LineKey, MutationIntent, NewLine, ProductId, ProductSummary,
    Quantity, WishlistSnapshot,
};
use rust_decimal::Decimal;

use crate::store::{Ack, RemoteStore, StoreError, WishlistListing};

#[derive(Default)]
pub struct FakeState {
    pub cart: CartSnapshot,
    pub wishlist: WishlistSnapshot,
    pub products: Vec<ProductSummary>,
    pub mutation_failures: VecDeque<StoreError>,
    pub fetch_failures: VecDeque<StoreError>,
    pub mutations: Vec<MutationIntent>,
    pub fetches: usize,
    /// Answer cart mutations with the resulting cart.
    pub echo_cart: bool,
    /// Report success for `ClearCart` without removing anything.
    pub ignore_clear: bool,
    pub mutation_delay: Option<Duration>,
    pub fetch_delay: Option<Duration>,
    pub in_flight: usize,
    pub max_in_flight: usize,
}

/// Cloning shares state, so a test keeps a handle after giving one away.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart(cart: CartSnapshot) -> Self {
        let store = Self::new();
        store.state().cart = cart;
        store
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_next_mutation(&self, err: StoreError) {
        self.state().mutation_failures.push_back(err);
    }

    pub fn fail_next_fetch(&self, err: StoreError) {
        self.state().fetch_failures.push_back(err);
    }

    pub fn mutation_count(&self) -> usize {
        self.state().mutations.len()
    }

    async fn pause(delay: Option<Duration>) {
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
    }
}

impl RemoteStore for FakeStore {
    async fn fetch_cart(&self) -> Result<CartSnapshot, StoreError> {
        let (result, delay) = {
            let mut state = self.state();
            state.fetches += 1;
            let result = state
                .fetch_failures
                .pop_front()
                .map_or_else(|| Ok(state.cart.clone()), Err);
            (result, state.fetch_delay)
        };
        Self::pause(delay).await;
        result
    }

    async fn fetch_wishlist(&self) -> Result<WishlistListing, StoreError> {
        let (result, delay) = {
            let mut state = self.state();
            state.fetches += 1;
            let result = state.fetch_failures.pop_front().map_or_else(
                || {
                    Ok(WishlistListing {
                        snapshot: state.wishlist.clone(),
                        products: state
                            .products
                            .iter()
                            .filter(|product| state.wishlist.contains(&product.id))
                            .cloned()
                            .collect(),
                    })
                },
                Err,
            );
            (result, state.fetch_delay)
        };
        Self::pause(delay).await;
        result
    }

    async fn mutate(&self, intent: MutationIntent) -> Result<Ack, StoreError> {
        let delay = {
            let mut state = self.state();
            state.mutations.push(intent.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.mutation_delay
        };
        Self::pause(delay).await;

        let mut state = self.state();
        state.in_flight -= 1;
        if let Some(err) = state.mutation_failures.pop_front() {
            return Err(err);
        }

        match intent {
            MutationIntent::Cart(CartIntent::ClearCart) if state.ignore_clear => {}
            MutationIntent::Cart(intent) => {
                state.cart = intent
                    .apply(&state.cart)
                    .map_err(|err| StoreError::Validation(err.to_string()))?;
            }
            MutationIntent::Wishlist(intent) => {
                state.wishlist = intent.apply(&state.wishlist);
            }
        }

        Ok(Ack {
            message: Some("ok".to_string()),
            cart: state.echo_cart.then(|| state.cart.clone()),
        })
    }
}

pub fn key(id: &str) -> LineKey {
    LineKey::product(ProductId::new(id))
}

pub fn line(id: &str, quantity: u32, unit_price: i64) -> NewLine {
    NewLine::new(
        key(id),
        Quantity::new(quantity).unwrap_or(Quantity::ONE),
        Decimal::new(unit_price, 0),
    )
}

pub fn cart_of(lines: &[(&str, u32, i64)]) -> CartSnapshot {
    CartSnapshot::from_items(lines.iter().map(|&(id, quantity, price)| {
        popacart_core::LineItem::new(
            key(id),
            Quantity::new(quantity).unwrap_or(Quantity::ONE),
            Decimal::new(price, 0),
        )
    }))
}

pub fn summary(id: &str, name: &str, price: i64) -> ProductSummary {
    ProductSummary {
        id: ProductId::new(id),
        name: name.to_string(),
        brand: None,
        price: Decimal::new(price, 0),
        image_url: None,
    }
}
