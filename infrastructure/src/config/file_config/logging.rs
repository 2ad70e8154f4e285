//! Log destinations from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL audit trail; no audit log when unset
    pub audit_log: Option<PathBuf>,
    /// Operational `tracing` output file (`--log-file` overrides)
    pub log_file: Option<PathBuf>,
}
