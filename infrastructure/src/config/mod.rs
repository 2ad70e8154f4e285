//! Configuration file loading for clinical-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `COUNCIL_` (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./council.toml` or `./.council.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/clinical-council/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileCouncilConfig, FileEmergencyConfig, FileEngineConfig,
    FileFeedbackConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat, FileProviderConfig,
    FileRetrievalConfig, FileTimeoutsConfig,
};
pub use loader::ConfigLoader;
