//! Aggregated view of a finished (or interrupted) event stream

use super::event::{ConvergenceReport, EventPayload, PipelineEvent};
use crate::advisory::{ClassificationResult, RetrievalSummary};
use crate::council::{MemberJudgments, SynthesisResult};
use serde::Serialize;

/// Everything a consultation produced, folded from its events.
///
/// `completed` is true only once the terminal `done` event has been seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsultationReport {
    pub classification: Option<ClassificationResult>,
    pub retrieval: Option<RetrievalSummary>,
    pub divergence: Option<MemberJudgments>,
    pub convergence: Option<ConvergenceReport>,
    pub synthesis: Option<SynthesisResult>,
    pub completed: bool,
}

impl ConsultationReport {
    pub fn apply(&mut self, event: &PipelineEvent) {
        if event.is_done() {
            self.completed = true;
            return;
        }
        match &event.data {
            Some(EventPayload::Classification(result)) => self.classification = result.clone(),
            Some(EventPayload::Retrieval(summary)) => self.retrieval = summary.clone(),
            Some(EventPayload::Divergence(judgments)) => self.divergence = Some(judgments.clone()),
            Some(EventPayload::Convergence(report)) => self.convergence = Some(report.clone()),
            Some(EventPayload::Synthesis(result)) => self.synthesis = Some(result.clone()),
            None => {}
        }
    }

    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a PipelineEvent>) -> Self {
        let mut report = Self::default();
        for event in events {
            report.apply(event);
        }
        report
    }

    /// Number of council results that came from fallbacks
    pub fn degraded_count(&self) -> usize {
        let divergence = self.divergence.as_ref().map_or(0, MemberJudgments::fallback_count);
        let convergence = self
            .convergence
            .as_ref()
            .is_some_and(|c| c.ranking.is_fallback()) as usize;
        let synthesis = self.synthesis.as_ref().is_some_and(SynthesisResult::is_fallback) as usize;
        divergence + convergence + synthesis
    }
}
