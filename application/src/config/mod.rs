//! Application-level configuration.
//!
//! - [`PipelineParams`]: per-call timeouts and pre-stage limits
//! - [`CouncilConfig`]: container shared read-only by every consultation

pub mod council_config;
pub mod pipeline_params;

pub use council_config::CouncilConfig;
pub use pipeline_params::PipelineParams;
