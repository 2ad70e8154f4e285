//! Symptom classifier port

use super::AdapterError;
use async_trait::async_trait;
use council_domain::ClassificationResult;

/// Local classifier consulted before the council.
///
/// Advisory only: a result can never set `red_flag` or block the pipeline.
#[async_trait]
pub trait SymptomClassifier: Send + Sync {
    async fn classify(&self, symptom_text: &str) -> Result<ClassificationResult, AdapterError>;
}

/// Classifier that never produces a result
pub struct NoClassifier;

#[async_trait]
impl SymptomClassifier for NoClassifier {
    async fn classify(&self, _symptom_text: &str) -> Result<ClassificationResult, AdapterError> {
        Err(AdapterError::Unavailable("no classifier configured".to_string()))
    }
}
