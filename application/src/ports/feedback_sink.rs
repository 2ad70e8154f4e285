//! Feedback collaborator port

use async_trait::async_trait;
use council_domain::FeedbackSubmission;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedbackError {
    #[error("Feedback endpoint not configured")]
    NotConfigured,

    #[error("Feedback rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Feedback transport error: {0}")]
    Transport(String),
}

/// Outbound feedback collaborator
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError>;
}

/// Sink used when no endpoint is configured
pub struct NoFeedbackSink;

#[async_trait]
impl FeedbackSink for NoFeedbackSink {
    async fn submit(&self, _submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        Err(FeedbackError::NotConfigured)
    }
}
