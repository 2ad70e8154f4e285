//! Model value object representing a reasoning-engine model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reasoning-engine models known to the council (Value Object)
///
/// Known identifiers get their own variant so the default roster is
/// type-checked; anything else served by an OpenAI-compatible endpoint
/// is carried as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    /// 70B general reasoning model
    Llama33Versatile,
    /// Small, fast 8B model
    Llama31Instant,
    /// Qwen3 32B
    Qwen3,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Llama33Versatile => "llama-3.3-70b-versatile",
            Model::Llama31Instant => "llama-3.1-8b-instant",
            Model::Qwen3 => "qwen/qwen3-32b",
            Model::Custom(s) => s,
        }
    }

    /// Whether the model emits a reasoning trace (`<think>...</think>`)
    /// ahead of its answer
    pub fn emits_reasoning(&self) -> bool {
        matches!(self, Model::Qwen3)
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Llama33Versatile
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "llama-3.3-70b-versatile" => Model::Llama33Versatile,
            "llama-3.1-8b-instant" => Model::Llama31Instant,
            "qwen/qwen3-32b" => Model::Qwen3,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
