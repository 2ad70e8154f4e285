//! User feedback on a delivered synthesis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolarity {
    Helpful,
    Unhelpful,
}

impl FeedbackPolarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackPolarity::Helpful => "helpful",
            FeedbackPolarity::Unhelpful => "unhelpful",
        }
    }
}

impl fmt::Display for FeedbackPolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedbackPolarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "helpful" | "positive" | "up" => Ok(FeedbackPolarity::Helpful),
            "unhelpful" | "negative" | "down" => Ok(FeedbackPolarity::Unhelpful),
            other => Err(format!("unknown feedback polarity: {}", other)),
        }
    }
}

/// What is sent to the feedback collaborator: the synthesis summary and a
/// polarity. Never the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub summary: String,
    pub polarity: FeedbackPolarity,
}

impl FeedbackSubmission {
    pub fn new(summary: impl Into<String>, polarity: FeedbackPolarity) -> Self {
        Self {
            summary: summary.into(),
            polarity,
        }
    }
}
