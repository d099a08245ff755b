use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Immutable snapshots of a view, swapped atomically.
///
/// Dispatches take a generation from [`ViewStore::begin`]; the snapshot's
/// own slices decide whether a completion is still the newest. After
/// [`ViewStore::teardown`] nothing is applied anymore.
#[derive(Debug)]
pub struct ViewStore<S> {
    name: String,
    current: ArcSwap<S>,
    generation: AtomicU64,
    torn_down: CancellationToken,
}

impl<S> ViewStore<S> {
    pub fn new(name: &str, initial: S) -> Self {
        ViewStore {
            name: name.to_string(),
            current: ArcSwap::from_pointee(initial),
            generation: AtomicU64::new(0),
            torn_down: CancellationToken::new(),
        }
    }

    pub fn snapshot(&self) -> Arc<S> {
        self.current.load_full()
    }

    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Build the next snapshot from the current one. Returning `None` keeps
    /// the current snapshot. Returns whether a new snapshot was stored.
    pub fn update<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&S) -> Option<S>,
    {
        let mut changed = false;
        self.current.rcu(|cur| {
            // re-checked on every retry
            if self.torn_down.is_cancelled() {
                changed = false;
                return Arc::clone(cur);
            }
            match f(&**cur) {
                Some(next) => {
                    changed = true;
                    Arc::new(next)
                }
                None => {
                    changed = false;
                    Arc::clone(cur)
                }
            }
        });
        if !changed && self.torn_down.is_cancelled() {
            debug!("[VIEW] {} torn down, dropping completion", self.name);
        }
        changed
    }

    /// After this returns no completion is applied. The snapshot is
    /// re-stored so an `update` that checked the token just before the
    /// cancel loses its compare-and-swap and retries.
    pub fn teardown(&self)
    where
        S: Clone,
    {
        self.torn_down.cancel();
        self.current.rcu(|cur| Arc::new((**cur).clone()));
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.is_cancelled()
    }
}
