//! Knowledge retrieval port

use super::AdapterError;
use async_trait::async_trait;
use council_domain::RetrievalHit;

/// Retrieval engine consulted before the council.
///
/// Implementations should return at most `k` hits; the pipeline re-sorts
/// and caps them regardless.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    async fn retrieve(&self, symptom_text: &str, k: usize) -> Result<Vec<RetrievalHit>, AdapterError>;
}

/// Retrieval engine with an empty knowledge base
pub struct NoRetrieval;

#[async_trait]
impl RetrievalEngine for NoRetrieval {
    async fn retrieve(&self, _symptom_text: &str, _k: usize) -> Result<Vec<RetrievalHit>, AdapterError> {
        Ok(Vec::new())
    }
}
