//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod council;
mod emergency;
mod feedback;
mod logging;
mod output;
mod provider;
mod retrieval;
mod timeouts;

pub use council::{FileCouncilConfig, FileEngineConfig};
pub use emergency::FileEmergencyConfig;
pub use feedback::FileFeedbackConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use provider::FileProviderConfig;
pub use retrieval::FileRetrievalConfig;
pub use timeouts::FileTimeoutsConfig;

use council_application::{CouncilConfig, PipelineParams};
use council_domain::{ConfigIssue, DomainError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration that cannot be turned into a runtime [`CouncilConfig`]
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{}", join_messages(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error(transparent)]
    Binding(#[from] DomainError),
}

fn join_messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Role-based engine bindings
    pub council: FileCouncilConfig,
    /// Per-call budgets
    pub timeouts: FileTimeoutsConfig,
    /// Knowledge retrieval settings
    pub retrieval: FileRetrievalConfig,
    /// Emergency phrase table extensions
    pub emergency: FileEmergencyConfig,
    /// Reasoning-engine endpoint
    pub provider: FileProviderConfig,
    /// Feedback collaborator
    pub feedback: FileFeedbackConfig,
    /// Audit and operational log files
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. Nothing here
    /// aborts; the caller decides what to do with errors.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.council.issues());
        issues.extend(self.timeouts.issues());
        issues.extend(self.retrieval.issues());
        issues.extend(self.emergency.issues());
        issues.extend(self.provider.issues());
        issues.extend(self.feedback.issues());

        issues
    }

    /// Pipeline parameters derived from `[timeouts]` and `[retrieval]`
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams::default()
            .with_classification_timeout(self.timeouts.classification())
            .with_retrieval_timeout(self.timeouts.retrieval())
            .with_member_timeout(self.timeouts.member())
            .with_reviewer_timeout(self.timeouts.reviewer())
            .with_chairman_timeout(self.timeouts.chairman())
            .with_top_k(self.retrieval.top_k)
            .with_excerpt_chars(self.retrieval.excerpt_chars)
    }

    /// Build the runtime configuration, refusing any error-level issue.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        let errors: Vec<ConfigIssue> = self
            .validate()
            .into_iter()
            .filter(ConfigIssue::is_error)
            .collect();
        if !errors.is_empty() {
            return Err(ConfigValidationError::Invalid(errors));
        }

        Ok(CouncilConfig::new(
            self.council.to_bindings(),
            self.pipeline_params(),
            self.emergency.to_gate(),
        )?)
    }
}
