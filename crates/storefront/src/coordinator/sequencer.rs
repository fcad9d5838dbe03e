//! Per-key FIFO ordering of remote mutations.
//!
//! Each enqueued operation gets a [`Turn`]. A keyed turn becomes ready once
//! every earlier turn on the same key and every earlier cart-wide turn has
//! finished; a cart-wide turn waits for everything enqueued before it.
//! Turns on different keys do not wait for each other.
//!
//! Completion is signalled through `tokio::sync::watch` channels: a turn
//! flips its channel to `true` when dropped, so a cancelled operation never
//! blocks the ones queued behind it.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

/// What an operation needs exclusive access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<K> {
    /// A single key.
    Key(K),
    /// Every key.
    All,
}

impl<K: fmt::Display> fmt::Display for Scope<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => key.fmt(f),
            Self::All => f.write_str("*"),
        }
    }
}

struct Tails<K> {
    keys: HashMap<K, watch::Receiver<bool>>,
    all: Option<watch::Receiver<bool>>,
}

/// Hands out turns in dispatch order.
pub struct Sequencer<K> {
    tails: Mutex<Tails<K>>,
}

impl<K> Default for Sequencer<K> {
    fn default() -> Self {
        Self {
            tails: Mutex::new(Tails {
                keys: HashMap::new(),
                all: None,
            }),
        }
    }
}

impl<K: Clone + Eq + Hash> Sequencer<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next turn for `scope`. Never blocks.
    pub fn enqueue(&self, scope: Scope<K>) -> Turn {
        let (done, signal) = watch::channel(false);
        let mut tails = self.tails.lock().unwrap_or_else(PoisonError::into_inner);

        tails.keys.retain(|_, tail| !*tail.borrow());
        if tails.all.as_ref().is_some_and(|tail| *tail.borrow()) {
            tails.all = None;
        }

        let mut waits: Vec<watch::Receiver<bool>> = tails.all.iter().cloned().collect();
        match scope {
            Scope::Key(key) => waits.extend(tails.keys.insert(key, signal)),
            Scope::All => {
                waits.extend(tails.keys.drain().map(|(_, tail)| tail));
                tails.all = Some(signal);
            }
        }

        Turn { waits, done }
    }

    /// Number of keys with unfinished turns.
    #[must_use]
    pub fn busy_keys(&self) -> usize {
        self.tails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys
            .values()
            .filter(|tail| !*tail.borrow())
            .count()
    }
}

/// A reserved slot in the sequence. Completes when dropped.
pub struct Turn {
    waits: Vec<watch::Receiver<bool>>,
    done: watch::Sender<bool>,
}

impl Turn {
    /// Wait until every turn this one is queued behind has completed.
    pub async fn ready(&mut self) {
        for wait in &mut self.waits {
            // A closed channel means the earlier turn is gone, which also
            // counts as completed.
            let _ = wait.wait_for(|done| *done).await;
        }
        self.waits.clear();
    }
}

impl Drop for Turn {
    fn drop(&mut self) {
        self.done.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Mutex as AsyncMutex;

    use super::*;

    async fn is_ready(turn: &mut Turn) -> bool {
        tokio::time::timeout(Duration::from_millis(10), turn.ready())
            .await
            .is_ok()
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_waits_for_previous() {
        let sequencer = Sequencer::new();
        let first = sequencer.enqueue(Scope::Key("a"));
        let mut second = sequencer.enqueue(Scope::Key("a"));

        assert!(!is_ready(&mut second).await);
        drop(first);
        assert!(is_ready(&mut second).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_run_concurrently() {
        let sequencer = Sequencer::new();
        let _first = sequencer.enqueue(Scope::Key("a"));
        let mut other = sequencer.enqueue(Scope::Key("b"));

        assert!(is_ready(&mut other).await);
        assert_eq!(sequencer.busy_keys(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_waits_for_every_key_and_blocks_later_turns() {
        let sequencer = Sequencer::new();
        let a = sequencer.enqueue(Scope::Key("a"));
        let b = sequencer.enqueue(Scope::Key("b"));
        let mut clear = sequencer.enqueue(Scope::All);
        let mut later = sequencer.enqueue(Scope::Key("c"));

        assert!(!is_ready(&mut clear).await);
        drop(a);
        assert!(!is_ready(&mut clear).await);
        drop(b);
        assert!(is_ready(&mut clear).await);

        assert!(!is_ready(&mut later).await);
        drop(clear);
        assert!(is_ready(&mut later).await);
    }

    #[tokio::test]
    async fn test_turns_complete_in_dispatch_order() {
        let sequencer = Arc::new(Sequencer::new());
        let order = Arc::new(AsyncMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for n in 0..5 {
            let mut turn = sequencer.enqueue(Scope::Key("same"));
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                turn.ready().await;
                tokio::task::yield_now().await;
                order.lock().await.push(n);
            }));
        }
        for handle in handles.into_iter().rev() {
            handle.await.unwrap_or_default();
        }

        assert_eq!(*order.lock().await, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_completed_tails_are_pruned() {
        let sequencer = Sequencer::new();
        drop(sequencer.enqueue(Scope::Key("a")));
        drop(sequencer.enqueue(Scope::Key("b")));
        let _c = sequencer.enqueue(Scope::Key("c"));
        assert_eq!(sequencer.busy_keys(), 1);
    }
}
