//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_consultation;
pub mod run_council;
pub mod submit_feedback;

#[cfg(test)]
pub(crate) mod test_support;
