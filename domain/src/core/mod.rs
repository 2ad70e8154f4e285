//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: reasoning-engine models a council role can be bound to
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
