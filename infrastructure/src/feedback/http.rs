//! HTTP feedback sink.
//!
//! Posts `{summary, polarity}` as JSON to a configured endpoint.

use async_trait::async_trait;
use council_application::{FeedbackError, FeedbackSink};
use council_domain::FeedbackSubmission;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpFeedbackSink {
    client: Client,
    endpoint: String,
}

impl HttpFeedbackSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FeedbackError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedbackError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FeedbackSink for HttpFeedbackSink {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        debug!(polarity = %submission.polarity, "Posting feedback to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await
            .map_err(|e| FeedbackError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(FeedbackError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::FeedbackPolarity;

    #[test]
    fn test_new_keeps_endpoint() {
        let sink = HttpFeedbackSink::new("https://feedback.example.org/api/feedback").unwrap();
        assert_eq!(sink.endpoint(), "https://feedback.example.org/api/feedback");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let sink =
            HttpFeedbackSink::with_timeout("http://127.0.0.1:9/feedback", Duration::from_secs(2))
                .unwrap();
        let submission = FeedbackSubmission::new("Likely stable angina.", FeedbackPolarity::Helpful);
        let err = sink.submit(&submission).await.unwrap_err();
        assert!(matches!(err, FeedbackError::Transport(_)));
    }
}
