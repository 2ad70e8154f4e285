//! Advisory pre-stage outputs: symptom classification and knowledge retrieval.
//!
//! Both are optional inputs to the council. A missing result degrades the
//! prompt, never the consultation.

pub mod classification;
pub mod retrieval;

pub use classification::{ClassificationResult, SeverityLevel};
pub use retrieval::{RetrievalContext, RetrievalHit, RetrievalSummary};
