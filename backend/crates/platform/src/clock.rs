//! Time Providers
//!
//! Window arithmetic never reads the wall clock directly; it asks a
//! [`Clock`], so tests can pin time to exact window boundaries.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as whole Unix seconds
    fn unix_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock with second resolution
///
/// Shared between tasks by reference (`Arc<ManualClock>`); every reader sees
/// the latest `set`/`advance`.
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    pub fn at(unix_secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(unix_secs),
        }
    }

    pub fn set(&self, unix_secs: i64) {
        self.secs.store(unix_secs, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.secs.load(Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn unix_secs(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_manual_clock_set_and_advance() {
        let clock = ManualClock::at(1_000);
        assert_eq!(clock.unix_secs(), 1_000);
        assert_eq!(clock.now().timestamp(), 1_000);

        clock.advance(61);
        assert_eq!(clock.unix_secs(), 1_061);

        clock.set(5);
        assert_eq!(clock.now().timestamp(), 5);
    }

    #[test]
    fn test_system_clock_is_current() {
        let before = Utc::now().timestamp();
        let now = SystemClock.unix_secs();
        assert!(now >= before);
    }

    #[tokio::test]
    async fn test_manual_clock_shared_between_tasks() {
        let clock = Arc::new(ManualClock::at(0));
        let writer = clock.clone();
        tokio::spawn(async move { writer.advance(30) })
            .await
            .unwrap();
        assert_eq!(clock.unix_secs(), 30);
    }
}
