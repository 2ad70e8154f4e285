//! Pipeline parameters: use case timing and limits.
//!
//! [`PipelineParams`] groups the static parameters that control how the
//! consultation pipeline waits on its collaborators. These are
//! application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts and limits for one consultation.
///
/// Every external call has its own budget, so the worst-case latency of a
/// consultation is bounded by the sum of the pre-stage maximum, one member
/// budget, the reviewer budget and the chairman budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub classification_timeout: Duration,
    pub retrieval_timeout: Duration,
    /// Budget for each divergence call (applied independently)
    pub member_timeout: Duration,
    pub reviewer_timeout: Duration,
    pub chairman_timeout: Duration,
    /// Number of retrieval hits forwarded to the council
    pub top_k: usize,
    /// Characters of each retrieved excerpt kept in the case prompt
    pub excerpt_chars: usize,
    /// Capacity of the bounded event channel
    pub event_buffer: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            classification_timeout: Duration::from_secs(5),
            retrieval_timeout: Duration::from_secs(5),
            member_timeout: Duration::from_secs(30),
            reviewer_timeout: Duration::from_secs(20),
            chairman_timeout: Duration::from_secs(30),
            top_k: 3,
            excerpt_chars: 500,
            event_buffer: 16,
        }
    }
}

impl PipelineParams {
    // ==================== Builder Methods ====================

    pub fn with_classification_timeout(mut self, timeout: Duration) -> Self {
        self.classification_timeout = timeout;
        self
    }

    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    pub fn with_member_timeout(mut self, timeout: Duration) -> Self {
        self.member_timeout = timeout;
        self
    }

    pub fn with_reviewer_timeout(mut self, timeout: Duration) -> Self {
        self.reviewer_timeout = timeout;
        self
    }

    pub fn with_chairman_timeout(mut self, timeout: Duration) -> Self {
        self.chairman_timeout = timeout;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    /// Channel capacity, at least 1
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    /// Upper bound on time spent waiting for collaborators
    pub fn worst_case_latency(&self) -> Duration {
        self.classification_timeout.max(self.retrieval_timeout)
            + self.member_timeout
            + self.reviewer_timeout
            + self.chairman_timeout
    }
}
