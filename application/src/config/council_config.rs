//! Council configuration container.
//!
//! [`CouncilConfig`] groups role bindings, pipeline parameters and the
//! emergency gate. It is process-wide and read-only during request
//! processing; consultations share it through an `Arc`.

use crate::config::PipelineParams;
use council_domain::{CouncilBindings, DomainError, EmergencyGate};

#[derive(Debug, Clone, Default)]
pub struct CouncilConfig {
    bindings: CouncilBindings,
    params: PipelineParams,
    gate: EmergencyGate,
}

impl CouncilConfig {
    /// Create a config, rejecting bindings no engine could serve.
    pub fn new(
        bindings: CouncilBindings,
        params: PipelineParams,
        gate: EmergencyGate,
    ) -> Result<Self, DomainError> {
        bindings.validate()?;
        Ok(Self {
            bindings,
            params,
            gate,
        })
    }

    // ==================== Accessors ====================

    /// Role-based engine bindings.
    pub fn bindings(&self) -> &CouncilBindings {
        &self.bindings
    }

    /// Timeouts and limits.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Emergency gate with its phrase table.
    pub fn gate(&self) -> &EmergencyGate {
        &self.gate
    }

    // ==================== Builder Methods (init-time) ====================

    pub fn with_params(mut self, params: PipelineParams) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{EngineBinding, MemberIdentity, Model};

    #[test]
    fn test_new_validates_bindings() {
        let bindings = CouncilBindings::default()
            .with_member(MemberIdentity::MemberA, EngineBinding::new(Model::Qwen3, 0.7, 0));
        let err = CouncilConfig::new(bindings, PipelineParams::default(), EmergencyGate::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidBinding(_)));
    }

    #[test]
    fn test_default_is_valid() {
        let config = CouncilConfig::new(
            CouncilBindings::default(),
            PipelineParams::default(),
            EmergencyGate::default(),
        )
        .unwrap();
        assert_eq!(config.params().top_k, 3);
        assert!(!config.gate().phrases().is_empty());
    }
}
