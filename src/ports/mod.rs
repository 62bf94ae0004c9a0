// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::errors::*;

/// Port for running the external transcoder
#[async_trait]
pub trait ToolPort: Send + Sync {
    /// Run `argv` (program first) to completion.
    ///
    /// With a log file both output streams are redirected there (truncating
    /// it), otherwise they are captured and dropped. Returns true iff the
    /// process exited successfully; spawn failures are reported as false.
    async fn run(&self, argv: &[String], log_file: Option<&Path>) -> bool;

    /// Run `argv` and hand back its output for inspection
    async fn capture(&self, argv: &[String]) -> Result<ToolOutput, DomainError>;
}

/// Captured output of one tool invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Container duration in seconds, `None` when it cannot be determined
    async fn probe_duration(&self, file_path: &Path) -> Option<f64>;
}

/// Port for logging, handed explicitly to every operation
pub trait LogPort: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    fn debug(&self, message: &str);

    /// Child handle whose records carry `scope` (a file or group name)
    fn scoped(&self, scope: &str) -> Arc<dyn LogPort>;
}

/// Port for the scan-progress registry
#[async_trait]
pub trait ProgressPort: Send + Sync {
    /// Status recorded for the path by an earlier scan
    async fn status_of(&self, file_path: &Path) -> Option<ScanStatus>;

    /// Whether the path was already processed by an earlier scan
    async fn is_recorded(&self, file_path: &Path) -> bool {
        self.status_of(file_path).await.is_some()
    }

    /// Record the scan status of a path and persist the registry
    async fn record(&self, file_path: &Path, status: ScanStatus) -> Result<(), DomainError>;

    /// All recorded entries, sorted by path
    async fn entries(&self) -> Vec<(String, RegistryEntry)>;
}

/// Result of scanning one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Ok,
    Error,
}

/// Registry record for one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub last_scan: DateTime<Local>,
    pub status: ScanStatus,
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
