//! Infrastructure layer for clinical-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod classifier;
pub mod config;
pub mod feedback;
pub mod logging;
pub mod providers;
pub mod retrieval;

// Re-export commonly used types
pub use classifier::KeywordSymptomClassifier;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCouncilConfig, FileEngineConfig,
    FileLoggingConfig, FileOutputConfig, FileOutputFormat, FileProviderConfig,
};
pub use feedback::HttpFeedbackSink;
pub use logging::JsonlAuditLogger;
pub use providers::{OpenAiCompatibleConfig, OpenAiCompatibleGateway};
pub use retrieval::{KnowledgeBaseError, KnowledgeBaseRetriever, KnowledgeEntry};
