//! Application Configuration
//!
//! Configuration for the throttle application layer.

use std::time::Duration;

use platform::cookie::SessionCookie;

use crate::domain::value_objects::AttemptPolicy;
use crate::error::{ThrottleError, ThrottleResult};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Attempts allowed inside one window
    pub max_attempts: u32,
    /// Window length, also the quiet period after which the counter resets
    pub attempts_timeout: Duration,
    /// Cookie carrying the session identity
    pub session_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: AttemptPolicy::DEFAULT_MAX_ATTEMPTS,
            attempts_timeout: Duration::from_secs(AttemptPolicy::DEFAULT_TIMEOUT_SECS),
            session_cookie_name: "throttle_session".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl ThrottleConfig {
    /// Config with the given limits; both must be positive
    pub fn new(max_attempts: u32, attempts_timeout_secs: u64) -> ThrottleResult<Self> {
        let config = Self {
            max_attempts,
            attempts_timeout: Duration::from_secs(attempts_timeout_secs),
            ..Self::default()
        };
        config.policy()?;
        Ok(config)
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::default()
        }
    }

    /// Validated window policy
    ///
    /// Sub-second timeouts are rejected: windows are measured in whole seconds.
    pub fn policy(&self) -> ThrottleResult<AttemptPolicy> {
        AttemptPolicy::new(self.max_attempts, self.attempts_timeout.as_secs()).ok_or_else(|| {
            ThrottleError::InvalidConfig(format!(
                "max_attempts ({}) and attempts_timeout ({}s) must both be positive",
                self.max_attempts,
                self.attempts_timeout.as_secs()
            ))
        })
    }

    pub fn session_cookie(&self) -> SessionCookie {
        SessionCookie {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            ..SessionCookie::new(self.session_cookie_name.clone())
        }
    }
}
