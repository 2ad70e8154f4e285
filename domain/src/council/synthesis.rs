//! Chairman synthesis

use super::judgment::{FALLBACK_NEXT_STEP, MemberJudgment, MemberJudgments, ResultOrigin};
use super::parsing::ParsedSynthesis;
use serde::{Deserialize, Serialize};

const FALLBACK_SUMMARY: &str =
    "The council could not produce a combined assessment. Please seek professional evaluation.";

/// Final council opinion delivered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub final_differentials: Vec<String>,
    pub recommended_next_steps: Vec<String>,
    pub confidence: f64,
    pub red_flag: bool,
    pub summary: String,
    pub origin: ResultOrigin,
}

impl SynthesisResult {
    pub fn from_parsed(parsed: ParsedSynthesis) -> Self {
        Self {
            final_differentials: parsed.final_differentials,
            recommended_next_steps: parsed.recommended_next_steps,
            confidence: parsed.confidence,
            red_flag: parsed.red_flag,
            summary: parsed.summary,
            origin: ResultOrigin::Engine,
        }
    }

    /// Derive a synthesis from the top-ranked judgment when the chairman
    /// is unavailable. Never leaves next steps or summary empty.
    pub fn from_top_judgment(top: &MemberJudgment, cause: impl Into<String>) -> Self {
        let recommended_next_steps = if top.next_steps.is_empty() {
            vec![FALLBACK_NEXT_STEP.to_string()]
        } else {
            top.next_steps.clone()
        };

        let summary = if top.differentials.is_empty() {
            FALLBACK_SUMMARY.to_string()
        } else {
            format!(
                "Top-ranked council opinion considers: {}.",
                top.differentials.join(", ")
            )
        };

        Self {
            final_differentials: top.differentials.clone(),
            recommended_next_steps,
            confidence: top.confidence,
            red_flag: top.red_flag,
            summary,
            origin: ResultOrigin::fallback(cause),
        }
    }

    /// A red flag raised by any member survives synthesis
    pub fn with_council_red_flags(mut self, judgments: &MemberJudgments) -> Self {
        self.red_flag = self.red_flag || judgments.any_red_flag();
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }
}
