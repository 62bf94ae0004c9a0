//! Read-only diagnostic passes

use std::path::Path;

use crate::domain::rules::CheckPass;
use crate::engine::FfmpegCommand;

/// Builds the two null-muxer passes run by the Diagnostic Oracle
#[derive(Debug, Clone)]
pub struct DiagnosticChecks {
    binary: String,
}

impl DiagnosticChecks {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn command(&self, pass: CheckPass, file: &Path) -> Vec<String> {
        match pass {
            CheckPass::Strict => FfmpegCommand::new(&self.binary)
                .args(["-v", "error"])
                .input(file)
                .args(["-f", "null", "-"])
                .build(),
            CheckPass::StreamCopy => FfmpegCommand::new(&self.binary)
                .input(file)
                .args(["-c", "copy", "-f", "null", "-"])
                .build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_write_to_null_muxer() {
        let checks = DiagnosticChecks::new("ffmpeg");
        assert_eq!(
            checks.command(CheckPass::Strict, Path::new("a.mkv")),
            vec!["ffmpeg", "-v", "error", "-i", "a.mkv", "-f", "null", "-"]
        );
        assert_eq!(
            checks.command(CheckPass::StreamCopy, Path::new("a.mkv")),
            vec!["ffmpeg", "-i", "a.mkv", "-c", "copy", "-f", "null", "-"]
        );
    }
}
