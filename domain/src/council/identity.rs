//! Council identities and role-based engine bindings.
//!
//! [`CouncilBindings`] maps every council role to a reasoning-engine binding.
//! It is a static value object: once built, bindings don't change for the
//! lifetime of a pipeline.

use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed identity of a council member. Exactly three per consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberIdentity {
    MemberA,
    MemberB,
    MemberC,
}

impl MemberIdentity {
    pub const ALL: [MemberIdentity; 3] = [
        MemberIdentity::MemberA,
        MemberIdentity::MemberB,
        MemberIdentity::MemberC,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberIdentity::MemberA => "member_a",
            MemberIdentity::MemberB => "member_b",
            MemberIdentity::MemberC => "member_c",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MemberIdentity::MemberA => 0,
            MemberIdentity::MemberB => 1,
            MemberIdentity::MemberC => 2,
        }
    }
}

impl fmt::Display for MemberIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role a reasoning engine plays in one consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CouncilRole {
    Member(MemberIdentity),
    Reviewer,
    Chairman,
}

impl fmt::Display for CouncilRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouncilRole::Member(id) => write!(f, "{}", id),
            CouncilRole::Reviewer => write!(f, "reviewer"),
            CouncilRole::Chairman => write!(f, "chairman"),
        }
    }
}

/// Model and sampling parameters for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineBinding {
    pub model: Model,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl EngineBinding {
    pub fn new(model: Model, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model,
            temperature,
            max_tokens,
        }
    }

    fn member(model: Model) -> Self {
        Self::new(model, 0.7, 512)
    }

    fn validate(&self, role: CouncilRole) -> Result<(), DomainError> {
        if self.model.as_str().trim().is_empty() {
            return Err(DomainError::InvalidBinding(format!("{}: empty model name", role)));
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::InvalidBinding(format!(
                "{}: temperature {} outside 0.0..=2.0",
                role, self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(DomainError::InvalidBinding(format!("{}: max_tokens is 0", role)));
        }
        Ok(())
    }
}

/// Engine binding for every council role.
///
/// The default roster deliberately mixes model families so the three
/// members reason independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilBindings {
    pub member_a: EngineBinding,
    pub member_b: EngineBinding,
    pub member_c: EngineBinding,
    pub reviewer: EngineBinding,
    pub chairman: EngineBinding,
}

impl Default for CouncilBindings {
    fn default() -> Self {
        Self {
            member_a: EngineBinding::member(Model::Llama33Versatile),
            member_b: EngineBinding::member(Model::Llama31Instant),
            member_c: EngineBinding::member(Model::Qwen3),
            reviewer: EngineBinding::new(Model::Llama31Instant, 0.1, 80),
            chairman: EngineBinding::new(Model::Llama33Versatile, 0.2, 600),
        }
    }
}

impl CouncilBindings {
    pub fn member(&self, id: MemberIdentity) -> &EngineBinding {
        match id {
            MemberIdentity::MemberA => &self.member_a,
            MemberIdentity::MemberB => &self.member_b,
            MemberIdentity::MemberC => &self.member_c,
        }
    }

    pub fn for_role(&self, role: CouncilRole) -> &EngineBinding {
        match role {
            CouncilRole::Member(id) => self.member(id),
            CouncilRole::Reviewer => &self.reviewer,
            CouncilRole::Chairman => &self.chairman,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_member(mut self, id: MemberIdentity, binding: EngineBinding) -> Self {
        match id {
            MemberIdentity::MemberA => self.member_a = binding,
            MemberIdentity::MemberB => self.member_b = binding,
            MemberIdentity::MemberC => self.member_c = binding,
        }
        self
    }

    pub fn with_reviewer(mut self, binding: EngineBinding) -> Self {
        self.reviewer = binding;
        self
    }

    pub fn with_chairman(mut self, binding: EngineBinding) -> Self {
        self.chairman = binding;
        self
    }

    /// Reject bindings no engine could serve
    pub fn validate(&self) -> Result<(), DomainError> {
        for id in MemberIdentity::ALL {
            self.member(id).validate(CouncilRole::Member(id))?;
        }
        self.reviewer.validate(CouncilRole::Reviewer)?;
        self.chairman.validate(CouncilRole::Chairman)
    }
}
