//! Feedback collaborator from TOML (`[feedback]` section)

use super::provider::is_http_url;
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Absent `endpoint` disables feedback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFeedbackConfig {
    pub endpoint: Option<String>,
}

impl FileFeedbackConfig {
    pub fn issues(&self) -> Vec<ConfigIssue> {
        match &self.endpoint {
            Some(url) if !is_http_url(url) => vec![ConfigIssue::warning(
                ConfigIssueCode::InvalidUrl {
                    field: "feedback.endpoint".to_string(),
                },
                format!(
                    "feedback.endpoint: '{}' is not an http(s) URL, feedback disabled",
                    url
                ),
            )],
            _ => Vec::new(),
        }
    }

    /// Endpoint if it is usable
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|url| is_http_url(url))
    }
}
