//! Domain layer for clinical-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Emergency Gate
//!
//! A deterministic check of vitals and narrative that runs before anything
//! else. If it triggers, the consultation ends with an advisory verdict and
//! no data reaches any reasoning engine.
//!
//! ## Council
//!
//! Three members reason independently (**Divergence**), a reviewer ranks
//! their anonymized answers (**Convergence**) and a chairman produces the
//! final opinion (**Synthesis**). Every stage degrades to a deterministic
//! fallback instead of failing.
//!
//! ## Pipeline Events
//!
//! Progress is streamed as ordered [`PipelineEvent`]s terminated by exactly
//! one `done` event.

pub mod advisory;
pub mod config;
pub mod consultation;
pub mod core;
pub mod council;
pub mod emergency;
pub mod feedback;
pub mod pipeline;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use advisory::{ClassificationResult, RetrievalContext, RetrievalHit, RetrievalSummary, SeverityLevel};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consultation::{ConsultationInput, Sex, ValidationError, Vitals};
pub use core::{error::DomainError, model::Model};
pub use council::{
    AliasLabel, AliasMap, CouncilBindings, CouncilRole, EngineBinding, FALLBACK_NEXT_STEP,
    MemberIdentity, MemberJudgment, MemberJudgments, RAW_REPLY_CHARS, RankingResult,
    ResponseParseError, ResultOrigin, SynthesisResult, parse_member_judgment, parse_ranking,
    parse_synthesis,
};
pub use emergency::{EmergencyGate, EmergencyVerdict};
pub use feedback::{FeedbackPolarity, FeedbackSubmission};
pub use pipeline::{
    ConsultationReport, ConvergenceReport, EventPayload, PipelineEvent, PipelineStage, StageStatus,
};
pub use prompt::PromptTemplate;
