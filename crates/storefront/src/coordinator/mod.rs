//! Optimistic mutation coordinators for the cart and the wishlist.
//!
//! A coordinator owns three pieces of state:
//!
//! - `confirmed`: the last snapshot known to match the server
//! - `pending`: intents dispatched but not yet settled, in dispatch order
//! - the displayed snapshot, always `fold(pending, confirmed)`
//!
//! [`Coordinator::dispatch`] applies an intent locally and publishes the new
//! displayed snapshot before returning; the remote half runs on a spawned
//! task, so it completes even when the returned handle is dropped. On
//! acknowledgment the intent moves from `pending` into `confirmed` (or
//! `confirmed` is replaced by the server's answer); on failure it is
//! dropped from `pending` and the cart is re-fetched. An auth failure discards all local state.
//!
//! Mutations on the same key are sequenced FIFO through a [`Sequencer`].
//! Fetches carry a version so a response issued before a newer write to
//! `confirmed` is discarded.

mod cart;
mod sequencer;
mod wishlist;

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use popacart_core::{IntentError, MutationIntent};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{Instrument, debug, debug_span, warn};

use crate::config::StorefrontConfig;
use crate::store::{Ack, RemoteStore, StoreError};

pub use cart::{CartCoordinator, CartLedger};
pub use sequencer::{Scope, Sequencer, Turn};
pub use wishlist::{WishlistCoordinator, WishlistLedger};

/// Tuning for a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Upper bound for each remote call; expiry counts as a network error.
    pub timeout: Duration,
    /// Attempts for reads that fail with a network error.
    pub fetch_attempts: u32,
    /// Re-fetch after every acknowledged mutation, not only when the
    /// server state may have diverged.
    pub reconcile_after_ack: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            fetch_attempts: 2,
            reconcile_after_ack: false,
        }
    }
}

impl From<&StorefrontConfig> for CoordinatorOptions {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            timeout: config.request_timeout,
            fetch_attempts: config.fetch_attempts,
            reconcile_after_ack: config.reconcile_after_ack,
        }
    }
}

/// Why a dispatched mutation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The server refused the mutation or could not be reached. The local
    /// change has been rolled back.
    #[error("{0}")]
    Rejected(StoreError),

    /// The session is gone; all local state was discarded.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
}

impl CoordinatorError {
    /// Whether the failure was a network problem rather than a refusal.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Rejected(StoreError::Network(_)))
    }
}

impl From<StoreError> for CoordinatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Auth(_) => Self::SessionExpired,
            other => Self::Rejected(other),
        }
    }
}

/// A piece of remote state a [`Coordinator`] keeps in sync.
pub trait Ledger: Send + Sync + 'static {
    type Snapshot: Clone + Default + fmt::Debug + Send + Sync + 'static;
    type Intent: Clone + fmt::Debug + Into<MutationIntent> + Send + Sync + 'static;
    type Key: Clone + Eq + Hash + fmt::Display + Send + Sync + 'static;

    /// Name used in logs.
    const NAME: &'static str;

    /// What the intent needs exclusive access to.
    fn scope(intent: &Self::Intent) -> Scope<Self::Key>;

    /// Reject intents that must not be applied.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError`] when the intent is invalid.
    fn validate(intent: &Self::Intent) -> Result<(), IntentError>;

    /// The local effect of a validated intent.
    fn apply(intent: &Self::Intent, snapshot: &Self::Snapshot) -> Self::Snapshot;

    /// Whether an acknowledgment of this intent can not be trusted to
    /// describe the server state.
    fn requires_reconcile(intent: &Self::Intent) -> bool;

    /// Read the authoritative snapshot.
    fn fetch<S: RemoteStore>(
        store: &S,
    ) -> impl Future<Output = Result<Self::Snapshot, StoreError>> + Send;

    /// The authoritative snapshot carried by an acknowledgment, if any.
    fn acknowledged(ack: Ack, previous: &Self::Snapshot) -> Option<Self::Snapshot>;

    /// Combine a fetched snapshot with the one it replaces.
    fn merge_fetched(_previous: &Self::Snapshot, fetched: Self::Snapshot) -> Self::Snapshot {
        fetched
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Optimistic coordinator over one [`Ledger`].
///
/// Cheap to clone; clones share state.
pub struct Coordinator<S, L: Ledger> {
    inner: Arc<Inner<S, L>>,
}

impl<S, L: Ledger> Clone for Coordinator<S, L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, L: Ledger> {
    store: S,
    options: CoordinatorOptions,
    state: Mutex<State<L>>,
    sequencer: Sequencer<L::Key>,
    updates: watch::Sender<L::Snapshot>,
}

struct State<L: Ledger> {
    confirmed: L::Snapshot,
    pending: Vec<Pending<L::Intent>>,
    next_id: u64,
    versions: Versions,
    session_expired: bool,
}

struct Pending<I> {
    id: u64,
    intent: I,
    in_flight: bool,
    /// A fetch landed while this intent was in flight.
    diverged: bool,
}

/// Version counter shared by fetches and writes to `confirmed`.
#[derive(Debug, Default)]
struct Versions {
    issued: u64,
    applied: u64,
}

impl Versions {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn write(&mut self) {
        self.applied = self.issue();
    }

    /// Accept a fetch issued at `version` unless something newer was
    /// already applied.
    fn accept(&mut self, version: u64) -> bool {
        if version > self.applied {
            self.applied = version;
            true
        } else {
            false
        }
    }
}

impl<L: Ledger> State<L> {
    fn displayed(&self) -> L::Snapshot {
        self.pending
            .iter()
            .fold(self.confirmed.clone(), |snapshot, pending| {
                L::apply(&pending.intent, &snapshot)
            })
    }

    fn push(&mut self, intent: L::Intent) -> u64 {
        self.next_id += 1;
        self.pending.push(Pending {
            id: self.next_id,
            intent,
            in_flight: false,
            diverged: false,
        });
        self.next_id
    }

    fn start(&mut self, id: u64) -> bool {
        self.pending
            .iter_mut()
            .find(|pending| pending.id == id)
            .map(|pending| pending.in_flight = true)
            .is_some()
    }

    fn take(&mut self, id: u64) -> Option<Pending<L::Intent>> {
        let index = self.pending.iter().position(|pending| pending.id == id)?;
        Some(self.pending.remove(index))
    }
}

impl<S: RemoteStore, L: Ledger> Coordinator<S, L> {
    /// Create a coordinator with an empty snapshot. Call [`Self::load`] to
    /// fetch the real one.
    pub fn new(store: S, options: CoordinatorOptions) -> Self {
        let (updates, _) = watch::channel(L::Snapshot::default());
        Self {
            inner: Arc::new(Inner {
                store,
                options,
                state: Mutex::new(State {
                    confirmed: L::Snapshot::default(),
                    pending: Vec::new(),
                    next_id: 0,
                    versions: Versions::default(),
                    session_expired: false,
                }),
                sequencer: Sequencer::new(),
                updates,
            }),
        }
    }

    /// Fetch the authoritative snapshot, retrying network failures.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::SessionExpired`] on an auth failure and
    /// [`CoordinatorError::Rejected`] when the snapshot could not be read.
    pub async fn load(&self) -> Result<L::Snapshot, CoordinatorError> {
        self.inner
            .refresh()
            .instrument(debug_span!("load", ledger = L::NAME))
            .await
    }

    /// Apply `intent` locally and publish the result, then start the
    /// remote half.
    ///
    /// The remote half runs on a spawned task: it waits for earlier
    /// mutations on the same key, performs the remote call and reconciles.
    /// The returned future resolves to its outcome; dropping it detaches
    /// from the task without cancelling the mutation.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError`] for invalid intents; nothing is changed and
    /// no request is made.
    pub fn dispatch(
        &self,
        intent: L::Intent,
    ) -> Result<
        impl Future<Output = Result<(), CoordinatorError>> + Send + 'static + use<S, L>,
        IntentError,
    > {
        L::validate(&intent)?;
        let (id, turn) = {
            let mut state = self.inner.lock();
            self.inner.begin(&mut state, intent.clone())
        };
        Ok(self.launch(id, intent, turn))
    }

    fn launch(
        &self,
        id: u64,
        intent: L::Intent,
        turn: Turn,
    ) -> impl Future<Output = Result<(), CoordinatorError>> + Send + 'static + use<S, L> {
        let scope = L::scope(&intent);
        debug!(ledger = L::NAME, %scope, id, "Dispatched intent");

        let span = debug_span!("mutation", ledger = L::NAME, %scope, id);
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(
            async move { inner.settle(id, intent, turn).await }.instrument(span),
        );

        async move {
            task.await.unwrap_or_else(|err| {
                warn!(error = %err, id, "Mutation task did not finish");
                Err(CoordinatorError::Rejected(StoreError::Network(
                    "request was interrupted".to_string(),
                )))
            })
        }
    }

    /// The displayed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> L::Snapshot {
        self.inner.lock().displayed()
    }

    /// The last snapshot known to match the server.
    #[must_use]
    pub fn confirmed(&self) -> L::Snapshot {
        self.inner.lock().confirmed.clone()
    }

    /// Receive every displayed snapshot as it is published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<L::Snapshot> {
        self.inner.updates.subscribe()
    }

    /// Number of intents not yet settled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Whether an auth failure discarded the local state.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.inner.lock().session_expired
    }
}

impl<S: RemoteStore, L: Ledger> Inner<S, L> {
    fn lock(&self) -> MutexGuard<'_, State<L>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State<L>) {
        self.updates.send_replace(state.displayed());
    }

    /// Record `intent` as pending and reserve its turn. The turn is taken
    /// under the state lock so pending order matches sequencing order.
    fn begin(&self, state: &mut State<L>, intent: L::Intent) -> (u64, Turn) {
        let turn = self.sequencer.enqueue(L::scope(&intent));
        let id = state.push(intent);
        self.publish(state);
        (id, turn)
    }

    async fn settle(
        &self,
        id: u64,
        intent: L::Intent,
        mut turn: Turn,
    ) -> Result<(), CoordinatorError> {
        turn.ready().await;
        if !self.lock().start(id) {
            // Discarded by a session expiry while queued.
            return Err(CoordinatorError::SessionExpired);
        }

        let result = with_timeout(
            self.options.timeout,
            self.store.mutate(intent.clone().into()),
        )
        .await;

        match result {
            Ok(ack) => self.commit(id, &intent, ack).await,
            Err(err) => self.roll_back(id, err).await,
        }
    }

    async fn commit(&self, id: u64, intent: &L::Intent, ack: Ack) -> Result<(), CoordinatorError> {
        let needs_refresh = {
            let mut state = self.lock();
            let diverged = state.take(id).is_some_and(|pending| pending.diverged);

            let (confirmed, echoed) = match L::acknowledged(ack, &state.confirmed) {
                Some(snapshot) => (snapshot, true),
                None => (L::apply(intent, &state.confirmed), false),
            };
            state.confirmed = confirmed;
            state.versions.write();
            self.publish(&state);

            L::requires_reconcile(intent)
                || self.options.reconcile_after_ack
                || (diverged && !echoed)
        };

        if needs_refresh {
            match self.refresh().await {
                Ok(_) => {}
                Err(CoordinatorError::SessionExpired) => {
                    return Err(CoordinatorError::SessionExpired);
                }
                Err(err) => warn!(error = %err, "Reconcile after acknowledged mutation failed"),
            }
        }

        Ok(())
    }

    async fn roll_back(&self, id: u64, err: StoreError) -> Result<(), CoordinatorError> {
        if err.is_auth() {
            warn!(error = %err, "Mutation refused for missing session");
            self.expire();
            return Err(CoordinatorError::SessionExpired);
        }

        {
            let mut state = self.lock();
            state.take(id);
            self.publish(&state);
        }
        warn!(error = %err, "Mutation failed, rolled back");

        match self.refresh().await {
            Ok(_) => {}
            Err(CoordinatorError::SessionExpired) => return Err(CoordinatorError::SessionExpired),
            Err(refresh_err) => {
                debug!(error = %refresh_err, "Could not restore snapshot after failed mutation");
            }
        }

        Err(CoordinatorError::Rejected(err))
    }

    /// Replace `confirmed` with a fresh fetch unless a newer write landed
    /// first. Returns the displayed snapshot afterwards.
    async fn refresh(&self) -> Result<L::Snapshot, CoordinatorError> {
        let version = self.lock().versions.issue();

        match fetch_with_retry(&self.options, || L::fetch(&self.store)).await {
            Ok(fetched) => {
                let mut state = self.lock();
                if state.versions.accept(version) {
                    let merged = L::merge_fetched(&state.confirmed, fetched);
                    state.confirmed = merged;
                    state.session_expired = false;
                    for pending in state.pending.iter_mut().filter(|pending| pending.in_flight) {
                        pending.diverged = true;
                    }
                    self.publish(&state);
                } else {
                    debug!(version, "Discarding stale snapshot");
                }
                Ok(state.displayed())
            }
            Err(err) if err.is_auth() => {
                self.expire();
                Err(CoordinatorError::SessionExpired)
            }
            Err(err) => Err(CoordinatorError::Rejected(err)),
        }
    }

    fn expire(&self) {
        let mut state = self.lock();
        state.confirmed = L::Snapshot::default();
        state.pending.clear();
        state.versions.write();
        state.session_expired = true;
        self.publish(&state);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Bound `call` by `timeout`; expiry becomes a network error.
async fn with_timeout<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(timeout, call).await.unwrap_or_else(|_| {
        Err(StoreError::Network(format!(
            "request timed out after {}s",
            timeout.as_secs()
        )))
    })
}

/// Run an idempotent read, retrying network failures.
async fn fetch_with_retry<T, F, Fut>(
    options: &CoordinatorOptions,
    mut fetch: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1;
    loop {
        match with_timeout(options.timeout, fetch()).await {
            Err(err) if err.is_retryable() && attempt < options.fetch_attempts => {
                warn!(attempt, error = %err, "Fetch failed, retrying");
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
