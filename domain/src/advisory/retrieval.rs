//! Knowledge retrieval context
//!
//! A retrieval engine returns scored excerpts; [`RetrievalContext`] keeps them
//! ordered by relevance and capped at the requested K.

use crate::util::truncate_chars;
use serde::{Deserialize, Serialize};

/// A single retrieved knowledge excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub topic: String,
    pub excerpt: String,
    /// Relevance in [0, 1]
    pub relevance_score: f64,
    pub source: String,
}

impl RetrievalHit {
    pub fn new(
        topic: impl Into<String>,
        excerpt: impl Into<String>,
        relevance_score: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            excerpt: excerpt.into(),
            relevance_score,
            source: source.into(),
        }
    }
}

/// Payload of the `rag_retrieval` complete event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSummary {
    pub documents_found: usize,
    pub topics: Vec<String>,
}

/// Ordered, bounded set of retrieval hits.
///
/// Invariant: at most `k` hits, sorted by non-increasing relevance, every
/// score finite and within [0, 1].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrievalContext {
    hits: Vec<RetrievalHit>,
}

impl RetrievalContext {
    pub fn new(hits: Vec<RetrievalHit>, k: usize) -> Self {
        let mut hits: Vec<RetrievalHit> = hits
            .into_iter()
            .filter(|h| h.relevance_score.is_finite())
            .map(|mut h| {
                h.relevance_score = h.relevance_score.clamp(0.0, 1.0);
                h
            })
            .collect();
        // Stable sort keeps engine order among equal scores
        hits.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        hits.truncate(k);
        Self { hits }
    }

    pub fn hits(&self) -> &[RetrievalHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn summary(&self) -> RetrievalSummary {
        RetrievalSummary {
            documents_found: self.hits.len(),
            topics: self.hits.iter().map(|h| h.topic.clone()).collect(),
        }
    }

    /// Context block appended to the case prompt. Empty when there are no hits.
    pub fn prompt_block(&self, excerpt_chars: usize) -> String {
        if self.hits.is_empty() {
            return String::new();
        }

        let mut block = String::from("--- RETRIEVED MEDICAL CONTEXT (RAG) ---\n");
        for (i, hit) in self.hits.iter().enumerate() {
            block.push_str(&format!(
                "[Medical Knowledge {}] {} (Source: {}, Relevance: {:.2})\n{}\n\n",
                i + 1,
                hit.topic,
                hit.source,
                hit.relevance_score,
                truncate_chars(&hit.excerpt, excerpt_chars),
            ));
        }
        block.push_str("--- END CONTEXT ---");
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(topic: &str, score: f64) -> RetrievalHit {
        RetrievalHit::new(topic, format!("{} excerpt", topic), score, "kb")
    }

    #[test]
    fn test_context_sorted_and_capped() {
        let ctx = RetrievalContext::new(
            vec![hit("a", 0.2), hit("b", 0.9), hit("c", 0.5), hit("d", 0.7)],
            3,
        );
        let topics: Vec<_> = ctx.hits().iter().map(|h| h.topic.as_str()).collect();
        assert_eq!(topics, vec!["b", "d", "c"]);
    }

    #[test]
    fn test_context_drops_non_finite_and_clamps() {
        let ctx = RetrievalContext::new(vec![hit("a", f64::NAN), hit("b", 1.5)], 3);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.hits()[0].relevance_score, 1.0);
    }

    #[test]
    fn test_summary() {
        let ctx = RetrievalContext::new(vec![hit("Atrial fibrillation", 0.8)], 3);
        let summary = ctx.summary();
        assert_eq!(summary.documents_found, 1);
        assert_eq!(summary.topics, vec!["Atrial fibrillation"]);
    }

    #[test]
    fn test_prompt_block_format() {
        let ctx = RetrievalContext::new(vec![hit("Syncope", 0.456)], 3);
        let block = ctx.prompt_block(500);
        assert!(block.starts_with("--- RETRIEVED MEDICAL CONTEXT (RAG) ---"));
        assert!(block.contains("[Medical Knowledge 1] Syncope (Source: kb, Relevance: 0.46)"));
        assert!(block.ends_with("--- END CONTEXT ---"));
    }

    #[test]
    fn test_prompt_block_truncates_excerpt() {
        let ctx = RetrievalContext::new(
            vec![RetrievalHit::new("t", "x".repeat(800), 0.5, "kb")],
            1,
        );
        let block = ctx.prompt_block(500);
        assert!(block.contains(&"x".repeat(500)));
        assert!(!block.contains(&"x".repeat(501)));
    }

    #[test]
    fn test_prompt_block_counts_excerpt_in_characters() {
        let ctx = RetrievalContext::new(
            vec![RetrievalHit::new("t", "é".repeat(800), 0.5, "kb")],
            1,
        );
        let block = ctx.prompt_block(500);
        assert!(block.contains(&"é".repeat(500)));
        assert!(!block.contains(&"é".repeat(501)));
    }

    #[test]
    fn test_empty_context_has_no_block() {
        assert!(RetrievalContext::default().prompt_block(500).is_empty());
    }
}
