//! Progress events streamed to the caller.
//!
//! Wire shape per event: `{stage, status, data?}`. `data` is absent for
//! `running` events and for `done`. A pre-stage that was omitted completes
//! with `data: null`.

use crate::advisory::{ClassificationResult, RetrievalSummary};
use crate::council::{MemberIdentity, MemberJudgments, RankingResult, SynthesisResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Classification,
    RagRetrieval,
    Divergence,
    Convergence,
    Synthesis,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Classification => "classification",
            PipelineStage::RagRetrieval => "rag_retrieval",
            PipelineStage::Divergence => "divergence",
            PipelineStage::Convergence => "convergence",
            PipelineStage::Synthesis => "synthesis",
            PipelineStage::Done => "done",
        }
    }

    pub fn is_pre_stage(&self) -> bool {
        matches!(self, PipelineStage::Classification | PipelineStage::RagRetrieval)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Running,
    Complete,
}

/// De-anonymized convergence outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub ranking: RankingResult,
    /// Member identities, best first
    pub ranked_members: [MemberIdentity; 3],
}

/// Stage-specific event data
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// `None` when the classifier timed out or failed
    Classification(Option<ClassificationResult>),
    /// `None` when retrieval timed out or failed
    Retrieval(Option<RetrievalSummary>),
    Divergence(MemberJudgments),
    Convergence(ConvergenceReport),
    Synthesis(SynthesisResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineEvent {
    pub stage: PipelineStage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EventPayload>,
}

impl PipelineEvent {
    pub fn running(stage: PipelineStage) -> Self {
        Self {
            stage,
            status: StageStatus::Running,
            data: None,
        }
    }

    pub fn complete(stage: PipelineStage, data: EventPayload) -> Self {
        Self {
            stage,
            status: StageStatus::Complete,
            data: Some(data),
        }
    }

    pub fn classification(result: Option<ClassificationResult>) -> Self {
        Self::complete(PipelineStage::Classification, EventPayload::Classification(result))
    }

    pub fn retrieval(summary: Option<RetrievalSummary>) -> Self {
        Self::complete(PipelineStage::RagRetrieval, EventPayload::Retrieval(summary))
    }

    /// Terminal event; exactly one per stream
    pub fn done() -> Self {
        Self {
            stage: PipelineStage::Done,
            status: StageStatus::Complete,
            data: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == PipelineStage::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::SeverityLevel;
    use serde_json::json;

    #[test]
    fn test_done_wire_shape() {
        let json = serde_json::to_value(PipelineEvent::done()).unwrap();
        assert_eq!(json, json!({"stage": "done", "status": "complete"}));
    }

    #[test]
    fn test_running_has_no_data() {
        let json = serde_json::to_value(PipelineEvent::running(PipelineStage::Divergence)).unwrap();
        assert_eq!(json, json!({"stage": "divergence", "status": "running"}));
    }

    #[test]
    fn test_omitted_pre_stage_has_null_data() {
        let json = serde_json::to_value(PipelineEvent::retrieval(None)).unwrap();
        assert_eq!(json, json!({"stage": "rag_retrieval", "status": "complete", "data": null}));
    }

    #[test]
    fn test_classification_payload_is_flat() {
        let result = ClassificationResult::new("non_cardiac", "Non-Cardiac", SeverityLevel::Low, 0.5);
        let json = serde_json::to_value(PipelineEvent::classification(Some(result))).unwrap();
        assert_eq!(json["data"]["category"], "non_cardiac");
        assert_eq!(json["data"]["severity"], "low");
    }

    #[test]
    fn test_retrieval_payload_shape() {
        let summary = RetrievalSummary {
            documents_found: 2,
            topics: vec!["Migraine".into(), "Tension headache".into()],
        };
        let json = serde_json::to_value(PipelineEvent::retrieval(Some(summary))).unwrap();
        assert_eq!(json["data"]["documents_found"], 2);
        assert_eq!(json["data"]["topics"][1], "Tension headache");
    }
}
