//! Attempt Throttle Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Attempt state, window evaluation, repository traits
//! - `application/` - The throttle service and its configuration
//! - `infra/` - In-memory and PostgreSQL state stores
//! - `presentation/` - HTTP handler, guard middleware, router
//!
//! ## Model
//! - Fixed window per identity (browser session): at most `max_attempts`
//!   checks within `attempts_timeout` seconds of the window's first check
//! - Every check counts, including refused ones; the window reopens on the
//!   first check strictly after it ends
//! - The read-modify-write of one identity's state is atomic in every store
//! - A refused attempt (429) and an unavailable store (5xx) never look alike

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::check_attempt::AttemptThrottle;
pub use application::config::ThrottleConfig;
pub use domain::value_objects::Identity;
pub use error::{ThrottleError, ThrottleResult};
pub use infra::memory::MemoryAttemptStore;
pub use infra::postgres::PgAttemptStore;
pub use presentation::handlers::ThrottleAppState;
pub use presentation::router::{guarded, throttle_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
