//! Pipeline progress events and their aggregation

pub mod event;
pub mod report;

pub use event::{ConvergenceReport, EventPayload, PipelineEvent, PipelineStage, StageStatus};
pub use report::ConsultationReport;
