//! In-memory knowledge-base retriever.
//!
//! Entries are indexed once at startup as normalized term-frequency vectors
//! over `"topic. content"`. A query is scored by cosine similarity against
//! every entry, so scores stay in [0, 1].

use async_trait::async_trait;
use council_application::{AdapterError, RetrievalEngine};
use council_domain::RetrievalHit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_SOURCE: &str = "built-in";

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can",
    "for", "from", "has", "have", "i", "in", "into", "is", "it", "its", "may", "me", "my", "no",
    "not", "of", "on", "or", "our", "so", "than", "that", "the", "their", "then", "there",
    "these", "this", "to", "up", "was", "were", "when", "which", "while", "with", "without",
];

#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("Could not read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid knowledge base {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One curated knowledge entry as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub topic: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl KnowledgeEntry {
    pub fn new(topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            topic: topic.into(),
            content: content.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

struct IndexedEntry {
    entry: KnowledgeEntry,
    vector: HashMap<String, f64>,
}

/// Term-frequency cosine retriever over a fixed set of entries
pub struct KnowledgeBaseRetriever {
    entries: Vec<IndexedEntry>,
}

impl KnowledgeBaseRetriever {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let vector = term_vector(&format!("{}. {}", entry.topic, entry.content));
                IndexedEntry { entry, vector }
            })
            .collect();
        Self { entries }
    }

    /// Load a JSON array of entries; entries without a `source` take the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut entries: Vec<KnowledgeEntry> =
            serde_json::from_str(&raw).map_err(|source| KnowledgeBaseError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "knowledge_base".to_string());
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.source.get_or_insert_with(|| stem.clone());
            entry.id.get_or_insert_with(|| format!("kb_{}", index));
        }

        info!(
            "Loaded {} knowledge entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(entries))
    }

    /// Small curated cardiology set used when no knowledge base file is configured
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score every entry against the query, best first, zero scores dropped.
    pub fn search(&self, query: &str, k: usize) -> Vec<RetrievalHit> {
        let query_vector = term_vector(query);
        if query_vector.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &KnowledgeEntry)> = self
            .entries
            .iter()
            .map(|indexed| (cosine(&query_vector, &indexed.vector), &indexed.entry))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        debug!(hits = scored.len(), "Knowledge base search");

        scored
            .into_iter()
            .map(|(score, entry)| {
                RetrievalHit::new(
                    entry.topic.clone(),
                    entry.content.clone(),
                    score.clamp(0.0, 1.0),
                    entry
                        .source
                        .clone()
                        .unwrap_or_else(|| BUILTIN_SOURCE.to_string()),
                )
            })
            .collect()
    }
}

#[async_trait]
impl RetrievalEngine for KnowledgeBaseRetriever {
    async fn retrieve(
        &self,
        symptom_text: &str,
        k: usize,
    ) -> Result<Vec<RetrievalHit>, AdapterError> {
        Ok(self.search(symptom_text, k))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 1)
        .map(str::to_lowercase)
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
}

/// L2-normalized term frequencies
fn term_vector(text: &str) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }

    let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in counts.values_mut() {
            *value /= norm;
        }
    }
    counts
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum()
}

fn builtin_entries() -> Vec<KnowledgeEntry> {
    [
        (
            "Acute coronary syndrome",
            "Chest pain or pressure lasting more than a few minutes, often radiating to the left arm, jaw or back and accompanied by sweating, nausea or shortness of breath, suggests acute coronary syndrome. Obtain a 12-lead ECG and troponin without delay.",
        ),
        (
            "Stable angina",
            "Exertional chest discomfort that is predictable and relieved by rest or nitroglycerin within minutes is typical of stable angina. Risk stratification with stress testing and optimisation of antianginal therapy are recommended.",
        ),
        (
            "Heart failure",
            "Progressive breathlessness, orthopnea, paroxysmal nocturnal dyspnea, ankle swelling and fatigue point to heart failure. Echocardiography assesses ejection fraction; natriuretic peptides support the diagnosis.",
        ),
        (
            "Atrial fibrillation",
            "Irregularly irregular palpitations, fatigue or dizziness may indicate atrial fibrillation. Confirm with ECG or Holter monitoring and assess stroke risk with CHA2DS2-VASc before deciding on anticoagulation.",
        ),
        (
            "Supraventricular tachycardia",
            "Sudden onset and offset of a rapid regular heartbeat, sometimes terminated by vagal manoeuvres, suggests supraventricular tachycardia. Document an episode on ECG and refer for electrophysiology if recurrent.",
        ),
        (
            "Bradycardia and syncope",
            "A slow heart rate with dizziness, fainting or exercise intolerance requires evaluation for conduction disease. Review medications that slow the heart and consider pacemaker assessment for symptomatic bradycardia.",
        ),
        (
            "Hypertension management",
            "Blood pressure persistently above 140/90 mmHg confirms hypertension. Lifestyle changes including salt reduction, weight loss and exercise come first, followed by antihypertensive medication according to cardiovascular risk.",
        ),
        (
            "Cardiovascular risk factors",
            "Smoking, diabetes, elevated LDL cholesterol, obesity, sedentary lifestyle and family history of premature coronary disease increase cardiovascular risk. Estimate ten-year risk and address modifiable factors.",
        ),
        (
            "Aortic dissection",
            "Sudden tearing chest or back pain with unequal arm blood pressures is a red flag for aortic dissection, a surgical emergency requiring immediate imaging.",
        ),
        (
            "Non-cardiac chest pain",
            "Chest pain reproduced by pressing on the chest wall, burning pain after meals relieved by antacids, or pain with anxiety and hyperventilation often has musculoskeletal, gastro-oesophageal or psychological causes once cardiac causes are excluded.",
        ),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (topic, content))| {
        let mut entry = KnowledgeEntry::new(topic, content).with_source(BUILTIN_SOURCE);
        entry.id = Some(format!("builtin_{}", index));
        entry
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ranks_relevant_topic_first() {
        let retriever = KnowledgeBaseRetriever::builtin();
        assert!(!retriever.is_empty());

        let hits = retriever.search("irregular palpitations and dizziness, possible atrial fibrillation", 3);
        assert!(!hits.is_empty());
        assert!(hits.len() <= 3);
        assert_eq!(hits[0].topic, "Atrial fibrillation");
        assert_eq!(hits[0].source, BUILTIN_SOURCE);
        for pair in hits.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
        for hit in &hits {
            assert!(hit.relevance_score > 0.0 && hit.relevance_score <= 1.0);
        }
    }

    #[test]
    fn test_unrelated_query_returns_nothing() {
        let retriever = KnowledgeBaseRetriever::new(vec![KnowledgeEntry::new(
            "Hypertension",
            "Blood pressure above 140/90.",
        )]);
        assert!(retriever.search("zzz qqq", 3).is_empty());
        assert!(retriever.search("", 3).is_empty());
        assert!(retriever.search("blood pressure", 0).is_empty());
    }

    #[test]
    fn test_identical_text_scores_one() {
        let retriever =
            KnowledgeBaseRetriever::new(vec![KnowledgeEntry::new("Palpitations", "racing heart")]);
        let hits = retriever.search("Palpitations. racing heart", 1);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].relevance_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_path_fills_source_from_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardiology.json");
        std::fs::write(
            &path,
            r#"[
                {"topic": "Heart failure", "content": "Ankle swelling and orthopnea."},
                {"id": "x1", "topic": "Syncope", "content": "Fainting on exertion.", "source": "ESC 2018"}
            ]"#,
        )
        .unwrap();

        let retriever = KnowledgeBaseRetriever::from_path(&path).unwrap();
        assert_eq!(retriever.len(), 2);

        let hits = retriever.search("swelling of the ankle", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "cardiology");

        let hits = retriever.search("fainting", 5);
        assert_eq!(hits[0].source, "ESC 2018");
    }

    #[test]
    fn test_from_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = KnowledgeBaseRetriever::from_path(&path).err().unwrap();
        assert!(matches!(err, KnowledgeBaseError::Parse { .. }));

        let err = KnowledgeBaseRetriever::from_path(dir.path().join("missing.json"))
            .err()
            .unwrap();
        assert!(matches!(err, KnowledgeBaseError::Io { .. }));
    }

    #[tokio::test]
    async fn test_port_caps_at_k() {
        let retriever = KnowledgeBaseRetriever::builtin();
        let hits = retriever.retrieve("chest pain", 2).await.unwrap();
        assert!(hits.len() <= 2);
        assert!(!hits.is_empty());
    }
}
