//! Repository Traits
//!
//! Interfaces for attempt state persistence. Implementations are in the
//! infrastructure layer.

use crate::domain::entities::AttemptState;
use crate::domain::value_objects::Identity;
use crate::error::ThrottleResult;

/// Identity → [`AttemptState`] store
///
/// `modify` is the operation the throttle relies on: the closure sees the
/// current state and returns the state to persist, and no other `modify` on
/// the same identity may interleave between the read and the write.
/// Different identities must not block each other.
#[trait_variant::make(AttemptStateRepository: Send)]
pub trait LocalAttemptStateRepository {
    /// Read the state of an identity (`None` if never checked or cleared)
    async fn load(&self, identity: &Identity) -> ThrottleResult<Option<AttemptState>>;

    /// Overwrite the state of an identity
    async fn store(&self, identity: &Identity, state: &AttemptState) -> ThrottleResult<()>;

    /// Forget an identity; the next check treats it as fresh
    async fn clear(&self, identity: &Identity) -> ThrottleResult<()>;

    /// Atomic read-modify-write of one identity's state
    async fn modify<T, F>(&self, identity: &Identity, f: F) -> ThrottleResult<T>
    where
        T: Send,
        F: FnOnce(Option<AttemptState>) -> (AttemptState, T) + Send;
}
