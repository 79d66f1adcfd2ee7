//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Time providers (system clock, manually driven clock for tests)
//! - Session cookie management

pub mod clock;
pub mod cookie;
