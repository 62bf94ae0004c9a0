// Diagnostic Oracle - Read-only health classification of a media file

use std::path::Path;
use std::sync::Arc;

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::DiagnosticChecks;
use crate::ports::*;

/// Runs the strict decode pass and the stream-copy pass against a file and
/// classifies what they print. Any check that cannot complete counts as a
/// fault.
pub struct DiagnosticOracle {
    tool_port: Arc<dyn ToolPort>,
    classifier: Arc<dyn DiagnosticClassifier>,
    checks: DiagnosticChecks,
}

impl DiagnosticOracle {
    /// Create new oracle with the default signature classifier
    pub fn new(tool_port: Arc<dyn ToolPort>, ffmpeg: impl Into<String>) -> Self {
        Self {
            tool_port,
            classifier: Arc::new(SignatureClassifier::default()),
            checks: DiagnosticChecks::new(ffmpeg),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn DiagnosticClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run both checks. Both always run, so the diagnosis is the union of
    /// their signals.
    pub async fn diagnose(&self, file_path: &Path, log: &dyn LogPort) -> Diagnosis {
        let mut diagnosis = Diagnosis::healthy();

        if !file_path.is_file() {
            diagnosis.generic_fault = Some(format!("{} does not exist", file_path.display()));
        } else {
            for pass in [CheckPass::Strict, CheckPass::StreamCopy] {
                let (kind, text) = self.run_check(pass, file_path).await;
                absorb(&mut diagnosis, kind, text);
            }
        }

        if diagnosis.is_healthy() {
            log.debug(&format!("No errors found in {}", file_path.display()));
        } else {
            log.warn(&format!(
                "File has errors ({}):\n{}",
                file_path.display(),
                diagnosis.report()
            ));
        }
        diagnosis
    }

    pub async fn classify(&self, file_path: &Path, log: &dyn LogPort) -> Health {
        self.diagnose(file_path, log).await.health()
    }

    pub async fn is_healthy(&self, file_path: &Path, log: &dyn LogPort) -> bool {
        self.diagnose(file_path, log).await.is_healthy()
    }

    async fn run_check(&self, pass: CheckPass, file_path: &Path) -> (FaultKind, String) {
        let argv = self.checks.command(pass, file_path);
        match self.tool_port.capture(&argv).await {
            Ok(output) => {
                let text = output.stderr.trim().to_string();
                match self.classifier.classify(pass, &output.stderr) {
                    FaultKind::None if !output.success => (
                        FaultKind::Generic,
                        format!("{:?} check exited with failure. {}", pass, text)
                            .trim()
                            .to_string(),
                    ),
                    kind => (kind, text),
                }
            }
            Err(e) => (FaultKind::Generic, e.to_string()),
        }
    }
}

fn absorb(diagnosis: &mut Diagnosis, kind: FaultKind, text: String) {
    let slot = match kind {
        FaultKind::None => return,
        FaultKind::Generic => &mut diagnosis.generic_fault,
        FaultKind::Timestamp => &mut diagnosis.timestamp_fault,
    };
    *slot = Some(match slot.take() {
        Some(existing) => format!("{}\n{}", existing, text),
        None => text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_tool::{RecordingLogAdapter, ScriptedToolAdapter};
    use crate::domain::errors::DomainError;
    use async_trait::async_trait;

    fn output(success: bool, stderr: &str) -> ToolOutput {
        ToolOutput {
            success,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn is_strict(argv: &[String]) -> bool {
        argv.iter().any(|arg| arg == "-v")
    }

    fn media_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("a.mkv");
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[tokio::test]
    async fn test_clean_file_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let oracle = DiagnosticOracle::new(Arc::new(ScriptedToolAdapter::new()), "ffmpeg");
        let log = RecordingLogAdapter::new();

        assert_eq!(oracle.classify(&path, &log).await, Health::Healthy);
    }

    #[tokio::test]
    async fn test_strict_output_is_generic_fault() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let tool = ScriptedToolAdapter::new().with_capture(|argv| {
            if is_strict(argv) {
                output(true, "[h264 @ 0x5] error while decoding MB 10 4")
            } else {
                output(true, "")
            }
        });
        let oracle = DiagnosticOracle::new(Arc::new(tool), "ffmpeg");
        let log = RecordingLogAdapter::new();

        let diagnosis = oracle.diagnose(&path, &log).await;
        assert_eq!(diagnosis.health(), Health::GenericFault);
        assert!(log.contains("warn", "error while decoding"));
    }

    #[tokio::test]
    async fn test_both_checks_are_unioned() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let tool = ScriptedToolAdapter::new().with_capture(|argv| {
            if is_strict(argv) {
                output(true, "corrupt frame")
            } else {
                output(true, "Application provided invalid, non monotonically increasing dts")
            }
        });
        let oracle = DiagnosticOracle::new(Arc::new(tool), "ffmpeg");

        let diagnosis = oracle.diagnose(&path, &RecordingLogAdapter::new()).await;
        assert!(diagnosis.generic_fault.is_some());
        assert!(diagnosis.timestamp_fault.is_some());
        assert_eq!(diagnosis.health(), Health::TimestampFault);
    }

    #[tokio::test]
    async fn test_silent_non_zero_exit_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let tool = ScriptedToolAdapter::new().with_capture(|_| output(false, ""));
        let oracle = DiagnosticOracle::new(Arc::new(tool), "ffmpeg");

        assert!(!oracle.is_healthy(&path, &RecordingLogAdapter::new()).await);
    }

    struct BrokenTool;

    #[async_trait]
    impl ToolPort for BrokenTool {
        async fn run(&self, _argv: &[String], _log_file: Option<&Path>) -> bool {
            false
        }

        async fn capture(&self, argv: &[String]) -> Result<ToolOutput, DomainError> {
            Err(DomainError::InvocationFailure(format!("cannot start {}", argv[0])))
        }
    }

    #[tokio::test]
    async fn test_invocation_error_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let path = media_file(&dir);
        let oracle = DiagnosticOracle::new(Arc::new(BrokenTool), "ffmpeg");

        let diagnosis = oracle.diagnose(&path, &RecordingLogAdapter::new()).await;
        assert_eq!(diagnosis.health(), Health::GenericFault);
        assert!(diagnosis.report().contains("cannot start ffmpeg"));
    }

    #[tokio::test]
    async fn test_missing_file_is_faulty() {
        let oracle = DiagnosticOracle::new(Arc::new(ScriptedToolAdapter::new()), "ffmpeg");
        let health = oracle
            .classify(Path::new("/nonexistent/a.mkv"), &RecordingLogAdapter::new())
            .await;
        assert_eq!(health, Health::GenericFault);
    }
}
