//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Alias mapping is not a bijection over A, B, C: {0}")]
    InvalidAliasMapping(String),

    #[error("Invalid engine binding: {0}")]
    InvalidBinding(String),
}
