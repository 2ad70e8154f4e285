//! Submit Feedback use case
//!
//! Forwards the user's verdict on a synthesis to the feedback collaborator.
//! Dispatch never blocks the caller and never fails from the caller's view.

use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::feedback_sink::FeedbackSink;
use council_domain::{FeedbackPolarity, FeedbackSubmission};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct FeedbackDispatcher {
    sink: Arc<dyn FeedbackSink>,
    audit: Arc<dyn AuditLogger>,
}

impl FeedbackDispatcher {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self {
            sink,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Spawn the outbound call and return at once.
    ///
    /// The handle may be awaited (e.g. with a grace timeout before exit) but
    /// doing so is optional; failures are logged, not returned.
    pub fn dispatch(&self, summary: impl Into<String>, polarity: FeedbackPolarity) -> JoinHandle<()> {
        let submission = FeedbackSubmission::new(summary, polarity);
        let sink = Arc::clone(&self.sink);
        let audit = Arc::clone(&self.audit);

        tokio::spawn(async move {
            let outcome = match sink.submit(&submission).await {
                Ok(()) => {
                    info!("Feedback submitted ({})", submission.polarity);
                    "delivered".to_string()
                }
                Err(e) => {
                    warn!(polarity = %submission.polarity, cause = %e, "Feedback dispatch failed");
                    e.to_string()
                }
            };
            audit.log(AuditEvent::new(
                "feedback_dispatched",
                json!({
                    "polarity": submission.polarity.as_str(),
                    "outcome": outcome,
                }),
            ));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{RecordingAuditLogger, RecordingFeedbackSink};

    #[tokio::test]
    async fn test_dispatch_delivers_submission() {
        let sink = Arc::new(RecordingFeedbackSink::default());
        let audit = Arc::new(RecordingAuditLogger::default());
        let dispatcher = FeedbackDispatcher::new(sink.clone()).with_audit_logger(audit.clone());

        dispatcher
            .dispatch("Likely tension headache.", FeedbackPolarity::Helpful)
            .await
            .unwrap();

        let submissions = sink.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].summary, "Likely tension headache.");
        assert_eq!(audit.payloads("feedback_dispatched")[0]["outcome"], "delivered");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_swallowed() {
        let sink = Arc::new(RecordingFeedbackSink {
            fail: true,
            ..Default::default()
        });
        let audit = Arc::new(RecordingAuditLogger::default());
        let dispatcher = FeedbackDispatcher::new(sink).with_audit_logger(audit.clone());

        let handle = dispatcher.dispatch("summary", FeedbackPolarity::Unhelpful);
        assert!(handle.await.is_ok());

        let payload = &audit.payloads("feedback_dispatched")[0];
        assert_eq!(payload["polarity"], "unhelpful");
        assert!(payload["outcome"].as_str().unwrap().contains("503"));
    }
}
