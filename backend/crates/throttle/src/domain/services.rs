//! Domain Services
//!
//! The fixed-window evaluation. Pure: no storage, no clock.

use crate::domain::entities::AttemptState;
use crate::domain::value_objects::AttemptPolicy;

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    /// State persisted by the check
    pub state: AttemptState,
    /// Seconds until a check would reopen the window, 0 when allowed
    pub retry_after_secs: u64,
}

/// Record one attempt at `now_secs` on top of `previous`
///
/// - no previous state: open a window, allow
/// - window expired (strictly): reopen it with count 1, allow
/// - otherwise count the attempt and allow while `count <= max_attempts`
///
/// Denied attempts are counted too; the counter is not capped.
pub fn evaluate(previous: Option<AttemptState>, now_secs: i64, policy: &AttemptPolicy) -> Verdict {
    let state = match previous {
        Some(previous) if !previous.window_expired(now_secs, policy) => AttemptState {
            attempt_count: previous.attempt_count.saturating_add(1),
            ..previous
        },
        _ => AttemptState::opened_at(now_secs),
    };

    let allowed = !state.exceeds(policy);
    let retry_after_secs = if allowed {
        0
    } else {
        let remaining = state.window_resets_at_secs(policy).saturating_sub(now_secs);
        u64::try_from(remaining).unwrap_or(0)
    };

    Verdict {
        allowed,
        state,
        retry_after_secs,
    }
}
