//! Per-call budgets from TOML (`[timeouts]` section)

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts in seconds, one per collaborator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTimeoutsConfig {
    pub classification: u64,
    pub retrieval: u64,
    /// Applied independently to each divergence call
    pub member: u64,
    pub reviewer: u64,
    pub chairman: u64,
}

impl Default for FileTimeoutsConfig {
    fn default() -> Self {
        Self {
            classification: 5,
            retrieval: 5,
            member: 30,
            reviewer: 20,
            chairman: 30,
        }
    }
}

impl FileTimeoutsConfig {
    fn fields(&self) -> [(&'static str, u64); 5] {
        [
            ("classification", self.classification),
            ("retrieval", self.retrieval),
            ("member", self.member),
            ("reviewer", self.reviewer),
            ("chairman", self.chairman),
        ]
    }

    pub fn classification(&self) -> Duration {
        Duration::from_secs(self.classification)
    }

    pub fn retrieval(&self) -> Duration {
        Duration::from_secs(self.retrieval)
    }

    pub fn member(&self) -> Duration {
        Duration::from_secs(self.member)
    }

    pub fn reviewer(&self) -> Duration {
        Duration::from_secs(self.reviewer)
    }

    pub fn chairman(&self) -> Duration {
        Duration::from_secs(self.chairman)
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        self.fields()
            .into_iter()
            .filter(|(_, secs)| *secs == 0)
            .map(|(field, _)| {
                ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout {
                        field: field.to_string(),
                    },
                    format!("timeouts.{}: timeout cannot be 0", field),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileTimeoutsConfig::default();
        assert_eq!(config.member(), Duration::from_secs(30));
        assert_eq!(config.reviewer(), Duration::from_secs(20));
        assert!(config.issues().is_empty());
    }

    #[test]
    fn test_zero_timeout_is_an_error() {
        let toml_str = r#"
[timeouts]
reviewer = 0
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.timeouts.issues();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::ZeroTimeout { field } if field == "reviewer"
        ));
        // Untouched fields keep their defaults
        assert_eq!(config.timeouts.chairman, 30);
    }
}
