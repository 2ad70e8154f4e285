//! Convergence-stage ranking

use super::alias::{AliasLabel, AliasMap};
use super::identity::MemberIdentity;
use super::judgment::{MemberJudgments, ResultOrigin};
use super::parsing::ResponseParseError;
use serde::{Deserialize, Serialize};

/// Rationale carried by a locally computed ranking
pub const FALLBACK_RANKING_RATIONALE: &str =
    "Fallback ranking (reviewer unavailable): ordered by member confidence";

/// Reviewer's ordering of the anonymized responses, best first.
///
/// Invariant: `ordered_list` is a permutation of A, B, C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub ordered_list: [AliasLabel; 3],
    pub rationale: String,
    pub origin: ResultOrigin,
}

impl RankingResult {
    /// Accept an engine ordering only if it names each label exactly once
    pub fn from_order(
        order: Vec<AliasLabel>,
        rationale: impl Into<String>,
    ) -> Result<Self, ResponseParseError> {
        let describe = |order: &[AliasLabel]| {
            order
                .iter()
                .map(AliasLabel::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let ordered_list: [AliasLabel; 3] = order
            .as_slice()
            .try_into()
            .map_err(|_| ResponseParseError::InvalidRanking(describe(&order)))?;

        let mut sorted = ordered_list;
        sorted.sort();
        if sorted != AliasLabel::ALL {
            return Err(ResponseParseError::InvalidRanking(describe(&order)));
        }

        Ok(Self {
            ordered_list,
            rationale: rationale.into(),
            origin: ResultOrigin::Engine,
        })
    }

    /// Deterministic ranking by member confidence, highest first.
    ///
    /// Ties keep identity order (member_a before member_b before member_c).
    pub fn fallback(judgments: &MemberJudgments, aliases: &AliasMap, cause: impl Into<String>) -> Self {
        let mut ids = MemberIdentity::ALL;
        // sort_by is stable
        ids.sort_by(|a, b| {
            judgments
                .get(*b)
                .confidence
                .total_cmp(&judgments.get(*a).confidence)
        });

        Self {
            ordered_list: ids.map(|id| aliases.label_of(id)),
            rationale: FALLBACK_RANKING_RATIONALE.to_string(),
            origin: ResultOrigin::fallback(cause),
        }
    }

    pub fn top(&self) -> AliasLabel {
        self.ordered_list[0]
    }

    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }

    /// De-anonymized ordering
    pub fn ranked_members(&self, aliases: &AliasMap) -> [MemberIdentity; 3] {
        self.ordered_list.map(|label| aliases.identity_of(label))
    }

    /// `"B > A > C"`
    pub fn display_order(&self) -> String {
        self.ordered_list
            .iter()
            .map(AliasLabel::as_str)
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
