//! Prompt domain
//!
//! Templates for the case prompt and each council stage.

mod template;

pub use template::{CONVERGENCE_CASE_CHARS, PromptTemplate, SYNTHESIS_CASE_CHARS};
