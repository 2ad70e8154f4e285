//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a consultation is rendered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every pipeline event as it arrives (default)
    Events,
    /// Only the final opinion
    Summary,
    /// The aggregated report as JSON
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Events
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "summary" => Ok(Self::Summary),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
