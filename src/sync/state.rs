use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::model::status::CoverIdentity;

/// Engine state for the lifetime of one run. Never persisted.
///
/// `current` is `None` exactly when the destination shows its default banner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Identity of the banner currently published.
    pub current: Option<CoverIdentity>,
    /// When the last successful publish finished.
    pub last_published: Option<Instant>,
    /// Set while a generation (or forced removal) holds the lock.
    pub generation_in_flight: bool,
    /// Throttle signals seen since the last successful evaluation.
    pub throttle_count: u32,
}

impl SyncState {
    /// Whether the published banner is older than `window`.
    ///
    /// `None` never goes stale; a banner that was never published always is.
    pub fn is_stale(&self, window: Option<std::time::Duration>, now: Instant) -> bool {
        match (window, self.last_published) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(window), Some(at)) => now.saturating_duration_since(at) >= window,
        }
    }
}

/// Shared handle to [`SyncState`]. Critical sections are short and never span an await.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedState {
    inner: Arc<Mutex<SyncState>>,
}

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut SyncState) -> R) -> R {
        f(&mut self.lock())
    }

    pub(crate) fn snapshot(&self) -> SyncState {
        self.lock().clone()
    }

    /// Check-and-set of the in-flight flag. `None` when another generation holds it.
    pub(crate) fn try_begin_generation(&self) -> Option<GenerationGuard> {
        let mut state = self.lock();
        if state.generation_in_flight {
            return None;
        }
        state.generation_in_flight = true;
        Some(GenerationGuard {
            state: self.clone(),
        })
    }
}

/// Holds the single-flight lock; dropping it clears `generation_in_flight`.
///
/// Drop runs on every exit path, including `?` returns, panics and a cancelled future.
#[derive(Debug)]
pub(crate) struct GenerationGuard {
    state: SharedState,
}

impl GenerationGuard {
    pub(crate) fn commit(&self, f: impl FnOnce(&mut SyncState)) {
        self.state.with(f);
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.state.with(|s| s.generation_in_flight = false);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/state.rs"]
mod tests;
