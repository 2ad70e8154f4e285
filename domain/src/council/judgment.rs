//! Member judgments produced in the divergence stage

use super::identity::MemberIdentity;
use crate::util::truncate_chars;
use serde::{Deserialize, Serialize};

/// Next step recorded on every fallback judgment and synthesis
pub const FALLBACK_NEXT_STEP: &str = "Seek professional evaluation";

/// Characters of an unusable engine reply kept on a fallback judgment
pub const RAW_REPLY_CHARS: usize = 300;

/// Whether a result came from an engine reply or was synthesized locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultOrigin {
    Engine,
    Fallback { cause: String },
}

impl ResultOrigin {
    pub fn fallback(cause: impl Into<String>) -> Self {
        ResultOrigin::Fallback {
            cause: cause.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResultOrigin::Fallback { .. })
    }
}

/// One council member's structured opinion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberJudgment {
    pub differentials: Vec<String>,
    pub next_steps: Vec<String>,
    /// In [0, 1]
    pub confidence: f64,
    pub red_flag: bool,
    /// Fallback only: the start of the unusable reply, or the failure cause
    /// when there was no reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub origin: ResultOrigin,
}

impl MemberJudgment {
    pub fn new(
        differentials: Vec<String>,
        next_steps: Vec<String>,
        confidence: f64,
        red_flag: bool,
    ) -> Self {
        Self {
            differentials,
            next_steps,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            red_flag,
            raw_text: None,
            origin: ResultOrigin::Engine,
        }
    }

    /// Placeholder used when a member timed out, failed or replied unparseably
    pub fn fallback(cause: impl Into<String>, raw_reply: Option<&str>) -> Self {
        let cause = cause.into();
        let raw_text = match raw_reply {
            Some(reply) => truncate_chars(reply, RAW_REPLY_CHARS).to_string(),
            None => cause.clone(),
        };
        Self {
            differentials: Vec::new(),
            next_steps: vec![FALLBACK_NEXT_STEP.to_string()],
            confidence: 0.0,
            red_flag: false,
            raw_text: Some(raw_text),
            origin: ResultOrigin::fallback(cause),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }

    /// Compact summary for the review prompt, e.g.
    /// `Differentials: a, b, c | Confidence: 0.80 | RedFlag: false`
    pub fn summary_line(&self) -> String {
        let differentials = if self.differentials.is_empty() {
            "none".to_string()
        } else {
            self.differentials
                .iter()
                .take(3)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Differentials: {} | Confidence: {:.2} | RedFlag: {}",
            differentials, self.confidence, self.red_flag
        )
    }
}

/// Exactly one judgment per member identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberJudgments {
    pub member_a: MemberJudgment,
    pub member_b: MemberJudgment,
    pub member_c: MemberJudgment,
}

impl MemberJudgments {
    pub fn new(member_a: MemberJudgment, member_b: MemberJudgment, member_c: MemberJudgment) -> Self {
        Self {
            member_a,
            member_b,
            member_c,
        }
    }

    /// Build from a lookup, so a missing member cannot be represented
    pub fn from_fn(mut f: impl FnMut(MemberIdentity) -> MemberJudgment) -> Self {
        Self {
            member_a: f(MemberIdentity::MemberA),
            member_b: f(MemberIdentity::MemberB),
            member_c: f(MemberIdentity::MemberC),
        }
    }

    pub fn get(&self, id: MemberIdentity) -> &MemberJudgment {
        match id {
            MemberIdentity::MemberA => &self.member_a,
            MemberIdentity::MemberB => &self.member_b,
            MemberIdentity::MemberC => &self.member_c,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberIdentity, &MemberJudgment)> {
        MemberIdentity::ALL.into_iter().map(move |id| (id, self.get(id)))
    }

    pub fn any_red_flag(&self) -> bool {
        self.iter().any(|(_, j)| j.red_flag)
    }

    pub fn fallback_count(&self) -> usize {
        self.iter().filter(|(_, j)| j.is_fallback()).count()
    }
}
