//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_logger;
pub mod feedback_sink;
pub mod llm_gateway;
pub mod retrieval_engine;
pub mod symptom_classifier;

use thiserror::Error;

/// Errors from the advisory pre-stage adapters.
///
/// These never fail a consultation; the pipeline omits the result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Adapter unavailable: {0}")]
    Unavailable(String),

    #[error("Adapter failed: {0}")]
    Failed(String),
}
