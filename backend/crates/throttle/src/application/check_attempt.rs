//! Check Attempt Use Case

use std::sync::Arc;

use platform::clock::Clock;

use crate::application::config::ThrottleConfig;
use crate::domain::entities::AttemptState;
use crate::domain::repository::AttemptStateRepository;
use crate::domain::services::{Verdict, evaluate};
use crate::domain::value_objects::{AttemptPolicy, Identity};
use crate::error::ThrottleResult;

/// Per-identity fixed-window attempt throttle
///
/// Call [`AttemptThrottle::check_attempt`] before a sensitive operation
/// (login, password recovery) and refuse the operation on `false`. Every
/// check counts as an attempt.
pub struct AttemptThrottle<R>
where
    R: AttemptStateRepository,
{
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    policy: AttemptPolicy,
}

impl<R> Clone for AttemptThrottle<R>
where
    R: AttemptStateRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            clock: self.clock.clone(),
            policy: self.policy,
        }
    }
}

impl<R> AttemptThrottle<R>
where
    R: AttemptStateRepository,
{
    /// Fails with `InvalidConfig` on non-positive limits
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, config: &ThrottleConfig) -> ThrottleResult<Self> {
        Ok(Self {
            repo,
            clock,
            policy: config.policy()?,
        })
    }

    pub fn policy(&self) -> &AttemptPolicy {
        &self.policy
    }

    pub fn now_secs(&self) -> i64 {
        self.clock.unix_secs()
    }

    /// `true` if the operation may proceed
    pub async fn check_attempt(&self, identity: &Identity) -> ThrottleResult<bool> {
        Ok(self.check_attempt_verdict(identity).await?.allowed)
    }

    /// Like [`Self::check_attempt`], returning the recorded state as well
    pub async fn check_attempt_verdict(&self, identity: &Identity) -> ThrottleResult<Verdict> {
        let now_secs = self.clock.unix_secs();
        let policy = self.policy;

        let (verdict, reopened) = self
            .repo
            .modify(identity, move |previous| {
                let reopened = previous.is_some_and(|s| s.window_expired(now_secs, &policy));
                let verdict = evaluate(previous, now_secs, &policy);
                (verdict.state, (verdict, reopened))
            })
            .await?;

        if !verdict.allowed {
            tracing::warn!(
                identity = %identity.redacted(),
                attempt_count = verdict.state.attempt_count,
                max_attempts = policy.max_attempts(),
                retry_after_secs = verdict.retry_after_secs,
                "Attempt throttled"
            );
        } else if reopened {
            tracing::info!(identity = %identity.redacted(), "Attempt window reset");
        } else {
            tracing::debug!(
                identity = %identity.redacted(),
                attempt_count = verdict.state.attempt_count,
                "Attempt allowed"
            );
        }

        Ok(verdict)
    }

    /// Forget the identity's attempts (e.g. after a successful login)
    pub async fn reset(&self, identity: &Identity) -> ThrottleResult<()> {
        self.repo.clear(identity).await?;
        tracing::info!(identity = %identity.redacted(), "Attempt counter cleared");
        Ok(())
    }

    /// Current state without recording an attempt; diagnostics only
    pub async fn state(&self, identity: &Identity) -> ThrottleResult<Option<AttemptState>> {
        self.repo.load(identity).await
    }
}
