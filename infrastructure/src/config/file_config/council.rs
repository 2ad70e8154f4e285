//! Council role bindings from TOML (`[council]` section)

use council_domain::{
    ConfigIssue, ConfigIssueCode, CouncilBindings, EngineBinding, MemberIdentity, Model,
};
use serde::{Deserialize, Serialize};

/// Overrides for one role. Unset fields keep the built-in binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl FileEngineConfig {
    /// Apply the overrides on top of `base`.
    pub fn resolve(&self, base: &EngineBinding) -> EngineBinding {
        let model = match self.model.as_deref() {
            Some(name) if !name.trim().is_empty() => name
                .trim()
                .parse::<Model>()
                .unwrap_or_else(|never| match never {}),
            _ => base.model.clone(),
        };
        EngineBinding::new(
            model,
            self.temperature.unwrap_or(base.temperature),
            self.max_tokens.unwrap_or(base.max_tokens),
        )
    }

    fn issues(&self, field: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(model) = &self.model
            && model.trim().is_empty()
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModelName {
                    field: field.to_string(),
                },
                format!("council.{}.model: model name cannot be empty", field),
            ));
        }

        if let Some(temperature) = self.temperature
            && (!temperature.is_finite() || !(0.0..=2.0).contains(&temperature))
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidTemperature {
                    field: field.to_string(),
                },
                format!(
                    "council.{}.temperature: {} is outside 0.0..=2.0",
                    field, temperature
                ),
            ));
        }

        if self.max_tokens == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroMaxTokens {
                    field: field.to_string(),
                },
                format!("council.{}.max_tokens: must be greater than 0", field),
            ));
        }

        issues
    }
}

/// Role-based engine configuration from TOML
///
/// # Example
///
/// ```toml
/// [council.member_c]
/// model = "qwen/qwen3-32b"
/// temperature = 0.6
///
/// [council.chairman]
/// max_tokens = 800
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    pub member_a: FileEngineConfig,
    pub member_b: FileEngineConfig,
    pub member_c: FileEngineConfig,
    pub reviewer: FileEngineConfig,
    pub chairman: FileEngineConfig,
}

impl FileCouncilConfig {
    fn member(&self, id: MemberIdentity) -> &FileEngineConfig {
        match id {
            MemberIdentity::MemberA => &self.member_a,
            MemberIdentity::MemberB => &self.member_b,
            MemberIdentity::MemberC => &self.member_c,
        }
    }

    /// Resolve every role against the default roster.
    pub fn to_bindings(&self) -> CouncilBindings {
        let defaults = CouncilBindings::default();
        let mut bindings = defaults.clone();
        for id in MemberIdentity::ALL {
            bindings = bindings.with_member(id, self.member(id).resolve(defaults.member(id)));
        }
        bindings
            .with_reviewer(self.reviewer.resolve(&defaults.reviewer))
            .with_chairman(self.chairman.resolve(&defaults.chairman))
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for id in MemberIdentity::ALL {
            issues.extend(self.member(id).issues(id.as_str()));
        }
        issues.extend(self.reviewer.issues("reviewer"));
        issues.extend(self.chairman.issues("chairman"));
        issues
    }
}
