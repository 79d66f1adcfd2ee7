//! Infrastructure Layer - State store implementations

pub mod memory;
pub mod postgres;
