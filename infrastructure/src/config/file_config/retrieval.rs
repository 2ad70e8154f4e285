//! Knowledge retrieval settings from TOML (`[retrieval]` section)

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrievalConfig {
    /// Number of excerpts forwarded to the council
    pub top_k: usize,
    /// JSON array of `{topic, content, source?}`; the built-in entries are used when unset
    pub knowledge_base: Option<PathBuf>,
    /// Characters of each excerpt kept in the case prompt
    pub excerpt_chars: usize,
}

impl Default for FileRetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            knowledge_base: None,
            excerpt_chars: 500,
        }
    }
}

impl FileRetrievalConfig {
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.top_k == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTopK,
                "retrieval.top_k: must be greater than 0",
            ));
        }
        issues
    }
}
