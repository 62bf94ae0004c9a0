//! FFprobe duration adapter

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::*;

/// Duration prober backed by `ffprobe`
pub struct FfprobeAdapter {
    tool: Arc<dyn ToolPort>,
    binary: String,
}

impl FfprobeAdapter {
    pub fn new(tool: Arc<dyn ToolPort>, binary: impl Into<String>) -> Self {
        Self {
            tool,
            binary: binary.into(),
        }
    }

    fn probe_args(&self, file_path: &Path) -> Vec<String> {
        vec![
            self.binary.clone(),
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            file_path.to_string_lossy().into_owned(),
        ]
    }
}

/// Parse the bare duration value printed by ffprobe
pub fn parse_duration(output: &str) -> Option<f64> {
    let value: f64 = output.lines().next()?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Option<f64> {
        let output = match self.tool.capture(&self.probe_args(file_path)).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Could not probe {}: {}", file_path.display(), e);
                return None;
            }
        };
        if !output.success {
            tracing::debug!(stderr = %output.stderr.trim(), "ffprobe failed for {}", file_path.display());
            return None;
        }
        parse_duration(&output.stdout)
    }
}
