//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (AttemptState)
//! - Domain value objects (Identity, AttemptPolicy)
//! - Domain services (fixed-window evaluation)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
