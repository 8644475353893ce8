//! A ready-made host that owns root state.
//!
//! `StateCell` wraps a `Mutex<RootState>` the way a component owns its state:
//! reads hand out cheap snapshots, commits shallow-merge partial updates in
//! the order they arrive.

use crate::{Item, Linker, PartialState, RootState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub struct StateCell {
    state: Mutex<RootState>,
    commits: AtomicU64,
}

impl StateCell {
    pub fn new(state: RootState) -> Self {
        Self {
            state: Mutex::new(state),
            commits: AtomicU64::new(0),
        }
    }

    /// Current value of a top-level key.
    pub fn get(&self, key: &str) -> Option<Item> {
        self.lock().get(key).cloned()
    }

    /// Shallow-merge `partial` into the root state.
    pub fn commit(&self, partial: PartialState) {
        let mut guard = self.lock();
        let next = guard.merge(partial);
        *guard = next;
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    /// Replace the whole root state.
    pub fn replace(&self, state: RootState) {
        *self.lock() = state;
    }

    pub fn snapshot(&self) -> RootState {
        self.lock().clone()
    }

    /// Number of commits applied so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// A linker reading from and committing to this cell.
    pub fn linker(self: &Arc<Self>) -> Linker {
        let reader = Arc::clone(self);
        let writer = Arc::clone(self);
        Linker::new(
            move |key| reader.get(key),
            move |partial| writer.commit(partial),
        )
    }

    // State is only ever swapped whole, so a poisoned lock still guards a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, RootState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(RootState::new())
    }
}

impl std::fmt::Debug for StateCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("keys", &self.lock().len())
            .field("commits", &self.commit_count())
            .finish()
    }
}
