//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary shared by every backend crate:
//! - The unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed ID wrappers (session IDs minted by the throttle)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
