//! Symptom classification result

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity attached to a classification category.
///
/// `Critical` is advisory only; it never routes a request to the emergency path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeverityLevel {
    Critical,
    Moderate,
    LowModerate,
    Low,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Critical => "critical",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::LowModerate => "low-moderate",
            SeverityLevel::Low => "low",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "critical" => Ok(SeverityLevel::Critical),
            "moderate" => Ok(SeverityLevel::Moderate),
            "low-moderate" => Ok(SeverityLevel::LowModerate),
            "low" => Ok(SeverityLevel::Low),
            other => Err(format!("unknown severity level: {}", other)),
        }
    }
}

/// Output of the symptom classifier adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Machine category key (e.g. `cardiac_arrhythmia`)
    pub category: String,
    pub severity: SeverityLevel,
    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable category name
    pub label: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub recommended_action: String,
}

impl ClassificationResult {
    pub fn new(
        category: impl Into<String>,
        label: impl Into<String>,
        severity: SeverityLevel,
        confidence: f64,
    ) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
            severity,
            confidence: clamp_unit(confidence),
            rationale: String::new(),
            recommended_action: String::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_recommended_action(mut self, action: impl Into<String>) -> Self {
        self.recommended_action = action.into();
        self
    }

    /// One-line hint embedded in the council case prompt
    pub fn hint_line(&self) -> String {
        format!(
            "Classifier hint: {} (severity: {}, confidence: {:.0}%)",
            self.label,
            self.severity,
            self.confidence * 100.0
        )
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
