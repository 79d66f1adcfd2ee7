//! Domain Entities
//!
//! Core business entities for the throttle domain.

use crate::domain::value_objects::AttemptPolicy;

/// Attempt counter of one identity
///
/// An identity that has never been checked has no `AttemptState` at all;
/// stores return `None` for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    /// Start of the current window (Unix seconds)
    pub last_attempt_secs: i64,
    /// Checks recorded in the current window, including the one in progress
    pub attempt_count: u64,
}

impl AttemptState {
    /// State right after the first check of a window
    pub fn opened_at(now_secs: i64) -> Self {
        Self {
            last_attempt_secs: now_secs,
            attempt_count: 1,
        }
    }

    /// Strictly more than `timeout` seconds since the window opened
    pub fn window_expired(&self, now_secs: i64, policy: &AttemptPolicy) -> bool {
        now_secs.saturating_sub(self.last_attempt_secs) > policy.timeout_secs()
    }

    pub fn exceeds(&self, policy: &AttemptPolicy) -> bool {
        self.attempt_count > u64::from(policy.max_attempts())
    }

    /// First second at which a check reopens the window
    pub fn window_resets_at_secs(&self, policy: &AttemptPolicy) -> i64 {
        self.last_attempt_secs
            .saturating_add(policy.timeout_secs())
            .saturating_add(1)
    }
}
