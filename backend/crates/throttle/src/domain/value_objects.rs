//! Domain Value Objects
//!
//! Immutable value types for the throttle domain.

use kernel::id::SessionId;

use crate::error::{ThrottleError, ThrottleResult};

/// Key under which attempt state is tracked (usually a session id)
///
/// Opaque to the throttle; two identities are the same subject exactly when
/// their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Longest accepted key, matches the `identity` column width
    pub const MAX_LEN: usize = 255;

    pub fn new(value: impl Into<String>) -> ThrottleResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ThrottleError::InvalidIdentity(
                "identity must not be empty".to_string(),
            ));
        }
        if value.len() > Self::MAX_LEN {
            return Err(ThrottleError::InvalidIdentity(format!(
                "identity longer than {} bytes",
                Self::MAX_LEN
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log-safe prefix; full session ids never reach the logs
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        if prefix.len() < self.0.len() {
            format!("{prefix}…")
        } else {
            prefix
        }
    }
}

/// Minted session ids are always valid identities
impl From<SessionId> for Identity {
    fn from(id: SessionId) -> Self {
        Self(id.to_string())
    }
}

/// Attempt allowance for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
    timeout_secs: i64,
}

impl AttemptPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Both values must be positive
    pub fn new(max_attempts: u32, timeout_secs: u64) -> Option<Self> {
        if max_attempts == 0 || timeout_secs == 0 {
            return None;
        }
        let timeout_secs = i64::try_from(timeout_secs).ok()?;
        Some(Self {
            max_attempts,
            timeout_secs,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeout_secs(&self) -> i64 {
        self.timeout_secs
    }
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS as i64,
        }
    }
}
