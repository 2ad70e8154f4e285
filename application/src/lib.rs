//! Application layer for clinical-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, PipelineParams};
pub use ports::{
    AdapterError,
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    feedback_sink::{FeedbackError, FeedbackSink, NoFeedbackSink},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    retrieval_engine::{NoRetrieval, RetrievalEngine},
    symptom_classifier::{NoClassifier, SymptomClassifier},
};
pub use use_cases::run_consultation::{
    ConsultationError, ConsultationPipeline, EventStream, Submission,
};
pub use use_cases::run_council::{CouncilStageEngine, EngineCallError};
pub use use_cases::submit_feedback::FeedbackDispatcher;
