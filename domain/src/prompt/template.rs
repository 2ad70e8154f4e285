//! Prompt templates for the council flow

use crate::advisory::{ClassificationResult, RetrievalContext};
use crate::consultation::ConsultationInput;
use crate::council::{AliasLabel, MemberJudgment, RankingResult};
use crate::util::truncate_chars;

/// Case text kept in the reviewer prompt
pub const CONVERGENCE_CASE_CHARS: usize = 300;

/// Case text kept in the chairman prompt
pub const SYNTHESIS_CASE_CHARS: usize = 400;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for council members (divergence)
    pub fn member_system() -> &'static str {
        concat!(
            "You are a clinical reasoning assistant. The patient case has been de-identified. ",
            "Reply ONLY with a valid JSON object, no markdown fences, no text outside JSON. ",
            "Keys: \"differentials\" (list of strings), \"next_steps\" (list of strings), ",
            "\"confidence\" (float 0-1), \"red_flag\" (boolean)."
        )
    }

    /// Augmented case prompt shared by all three members.
    ///
    /// Advisory sections are left out when the pre-stage produced nothing.
    pub fn case_prompt(
        input: &ConsultationInput,
        classification: Option<&ClassificationResult>,
        retrieval: Option<&RetrievalContext>,
        excerpt_chars: usize,
    ) -> String {
        let mut prompt = input.narrative().trim().to_string();

        if let Some(line) = input.demographics_line() {
            prompt.push_str("\n\n");
            prompt.push_str(&line);
        }

        if let Some(classification) = classification {
            prompt.push_str("\n\n");
            prompt.push_str(&classification.hint_line());
        }

        if let Some(retrieval) = retrieval
            && !retrieval.is_empty()
        {
            prompt.push_str("\n\n");
            prompt.push_str(&retrieval.prompt_block(excerpt_chars));
        }

        prompt
    }

    /// System prompt for the reviewer (convergence)
    pub fn review_system() -> &'static str {
        "You are a clinical peer reviewer. Output only valid JSON."
    }

    /// Reviewer prompt over anonymized one-line summaries.
    ///
    /// `summaries` must contain alias labels only, never member identities.
    pub fn review_prompt(case: &str, summaries: &[(AliasLabel, String)]) -> String {
        let summary_lines = summaries
            .iter()
            .map(|(label, line)| format!("  {}: {}", label, line))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Case: {}

Council member summaries:
{}

Task: Rank the responses A, B, C by clinical accuracy and reasoning quality.
Output ONLY this JSON (no other text):
{{"ranking": ["A", "B", "C"], "reasoning": "brief reason"}}"#,
            truncate_chars(case, CONVERGENCE_CASE_CHARS),
            summary_lines
        )
    }

    /// System prompt for the chairman (synthesis)
    pub fn chairman_system() -> &'static str {
        "You are the Chairman of a medical AI council. Be concise and accurate."
    }

    /// Chairman prompt built from the top-ranked judgment and the ranking
    pub fn synthesis_prompt(case: &str, top: &MemberJudgment, ranking: &RankingResult) -> String {
        let best = serde_json::json!({
            "differentials": top.differentials,
            "next_steps": top.next_steps,
            "confidence": top.confidence,
            "red_flag": top.red_flag,
        });
        let best = serde_json::to_string_pretty(&best).unwrap_or_else(|_| best.to_string());

        format!(
            r#"Case: {}

Best council response:
{}

Peer ranking: {} (reasoning: {})

Synthesise a final clinical answer. Reply ONLY with JSON keys: "final_differentials" (list), "recommended_next_steps" (list), "confidence" (float 0-1), "red_flag" (boolean), "summary" (string, at most 3 sentences)."#,
            truncate_chars(case, SYNTHESIS_CASE_CHARS),
            best,
            ranking.display_order(),
            ranking.rationale
        )
    }
}
