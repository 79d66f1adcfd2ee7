//! In-Memory Repository Implementation
//!
//! Single-process store. Per-identity atomicity comes from the DashMap entry
//! lock, which only covers the shard holding that identity.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::AttemptState;
use crate::domain::repository::AttemptStateRepository;
use crate::domain::value_objects::Identity;
use crate::error::ThrottleResult;

#[derive(Clone, Default)]
pub struct MemoryAttemptStore {
    states: Arc<DashMap<String, AttemptState>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop identities whose window opened more than `idle_secs` ago
    ///
    /// An identity whose window has expired behaves exactly like a fresh one
    /// on its next check, so purging never changes a verdict as long as
    /// `idle_secs` is at least the attempts timeout.
    pub fn purge_idle(&self, now_secs: i64, idle_secs: i64) -> usize {
        let before = self.states.len();
        self.states
            .retain(|_, state| now_secs.saturating_sub(state.last_attempt_secs) <= idle_secs);
        let purged = before.saturating_sub(self.states.len());

        if purged > 0 {
            tracing::info!(purged, "Purged idle attempt states");
        }
        purged
    }
}

impl AttemptStateRepository for MemoryAttemptStore {
    async fn load(&self, identity: &Identity) -> ThrottleResult<Option<AttemptState>> {
        Ok(self.states.get(identity.as_str()).map(|entry| *entry.value()))
    }

    async fn store(&self, identity: &Identity, state: &AttemptState) -> ThrottleResult<()> {
        self.states.insert(identity.as_str().to_owned(), *state);
        Ok(())
    }

    async fn clear(&self, identity: &Identity) -> ThrottleResult<()> {
        self.states.remove(identity.as_str());
        Ok(())
    }

    async fn modify<T, F>(&self, identity: &Identity, f: F) -> ThrottleResult<T>
    where
        T: Send,
        F: FnOnce(Option<AttemptState>) -> (AttemptState, T) + Send,
    {
        // The entry guard is held until the new state is written back
        let output = match self.states.entry(identity.as_str().to_owned()) {
            Entry::Occupied(mut entry) => {
                let (next, output) = f(Some(*entry.get()));
                entry.insert(next);
                output
            }
            Entry::Vacant(entry) => {
                let (next, output) = f(None);
                entry.insert(next);
                output
            }
        };
        Ok(output)
    }
}
