//! Scripted stand-ins for the external tools
//!
//! Lets interactors be exercised without a real transcoder on the machine.
//! Responses are decided by closures over the argument vector.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

type RunScript = Box<dyn Fn(&[String]) -> bool + Send + Sync>;
type CaptureScript = Box<dyn Fn(&[String]) -> ToolOutput + Send + Sync>;

/// Tool adapter whose behaviour is scripted per call.
///
/// By default every `run` succeeds and every `capture` reports clean output.
/// A successful `run` creates its output file (the last argument) so later
/// filesystem checks see an artifact.
pub struct ScriptedToolAdapter {
    run_script: RunScript,
    capture_script: CaptureScript,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedToolAdapter {
    pub fn new() -> Self {
        Self {
            run_script: Box::new(|_| true),
            capture_script: Box::new(|_| ToolOutput {
                success: true,
                ..ToolOutput::default()
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_run(mut self, script: impl Fn(&[String]) -> bool + Send + Sync + 'static) -> Self {
        self.run_script = Box::new(script);
        self
    }

    pub fn with_capture(
        mut self,
        script: impl Fn(&[String]) -> ToolOutput + Send + Sync + 'static,
    ) -> Self {
        self.capture_script = Box::new(script);
        self
    }

    /// Every `run` invocation so far, in order
    pub fn runs(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for ScriptedToolAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolPort for ScriptedToolAdapter {
    async fn run(&self, argv: &[String], log_file: Option<&Path>) -> bool {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(argv.to_vec());
        }
        if let Some(log) = log_file {
            let _ = std::fs::write(log, argv.join(" "));
        }

        let success = (self.run_script)(argv);
        if success {
            if let Some(output) = argv.last().filter(|arg| arg.as_str() != "-") {
                let _ = std::fs::write(output, b"scripted");
            }
        }
        success
    }

    async fn capture(&self, argv: &[String]) -> Result<ToolOutput, DomainError> {
        Ok((self.capture_script)(argv))
    }
}

/// Probe adapter returning fixed durations per path
#[derive(Debug, Default, Clone)]
pub struct StaticProbeAdapter {
    durations: HashMap<PathBuf, f64>,
    fallback: Option<f64>,
}

impl StaticProbeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, path: impl Into<PathBuf>, seconds: f64) -> Self {
        self.durations.insert(path.into(), seconds);
        self
    }

    /// Duration reported for every path without an explicit entry
    pub fn with_fallback(mut self, seconds: f64) -> Self {
        self.fallback = Some(seconds);
        self
    }
}

#[async_trait]
impl ProbePort for StaticProbeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Option<f64> {
        self.durations.get(file_path).copied().or(self.fallback)
    }
}

/// Log adapter that keeps every record in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingLogAdapter {
    records: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingLogAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(level, message)` pairs in emission order, across all scoped children
    pub fn records(&self) -> Vec<(String, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|(l, message)| l == level && message.contains(needle))
    }

    fn push(&self, level: &str, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push((level.to_string(), message.to_string()));
        }
    }
}

impl LogPort for RecordingLogAdapter {
    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }

    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn scoped(&self, _scope: &str) -> Arc<dyn LogPort> {
        Arc::new(self.clone())
    }
}
