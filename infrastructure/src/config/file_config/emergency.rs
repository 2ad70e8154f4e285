//! Emergency gate extensions from TOML (`[emergency]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, EmergencyGate};
use serde::{Deserialize, Serialize};

/// Extra phrases appended to the fixed table. The fixed table cannot be reduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmergencyConfig {
    pub extra_phrases: Vec<String>,
}

impl FileEmergencyConfig {
    pub fn to_gate(&self) -> EmergencyGate {
        EmergencyGate::new().with_extra_phrases(&self.extra_phrases)
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        if self.extra_phrases.iter().any(|p| p.trim().is_empty()) {
            vec![ConfigIssue::warning(
                ConfigIssueCode::EmptyPhrase,
                "emergency.extra_phrases: blank entries are ignored",
            )]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_phrases_extend_fixed_table() {
        let toml_str = r#"
[emergency]
extra_phrases = ["Blue Lips", ""]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let gate = config.emergency.to_gate();
        assert_eq!(gate.phrases().len(), EmergencyGate::default().phrases().len() + 1);
        assert!(gate.phrases().iter().any(|p| p == "blue lips"));

        let issues = config.emergency.issues();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }
}
