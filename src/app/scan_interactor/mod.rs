// Scan interactor - Classifies a tree of media files and records progress

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

use crate::app::batch::run_bounded;
use crate::app::oracle::DiagnosticOracle;
use crate::domain::errors::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Media files under `root`, sorted by path. A file root is returned as-is
/// when it has a media extension.
pub fn find_media_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_media_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_media_file(path))
        .collect()
}

/// One file seen by a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub status: ScanStatus,
    /// False when the status came from an earlier scan
    pub fresh: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub files: Vec<ScannedFile>,
}

impl ScanSummary {
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    pub fn scanned(&self) -> usize {
        self.files.iter().filter(|f| f.fresh).count()
    }

    pub fn skipped(&self) -> usize {
        self.processed() - self.scanned()
    }

    pub fn faulty(&self) -> Vec<&Path> {
        self.with_status(ScanStatus::Error)
    }

    pub fn healthy(&self) -> Vec<&Path> {
        self.with_status(ScanStatus::Ok)
    }

    fn with_status(&self, status: ScanStatus) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| f.status == status)
            .map(|f| f.path.as_path())
            .collect()
    }
}

/// Interactor for the scan use case
pub struct ScanInteractor {
    oracle: Arc<DiagnosticOracle>,
    registry: Arc<dyn ProgressPort>,
}

impl ScanInteractor {
    pub fn new(oracle: Arc<DiagnosticOracle>, registry: Arc<dyn ProgressPort>) -> Self {
        Self { oracle, registry }
    }

    pub fn registry(&self) -> Arc<dyn ProgressPort> {
        Arc::clone(&self.registry)
    }

    /// Classify every media file under `root` that the registry has not
    /// seen yet, recording each result as it completes.
    pub async fn scan(
        self: &Arc<Self>,
        root: &Path,
        recursive: bool,
        jobs: usize,
        log: Arc<dyn LogPort>,
    ) -> Result<ScanSummary, DomainError> {
        if !root.exists() {
            return Err(DomainError::BadArgs(format!(
                "Path does not exist: {}",
                root.display()
            )));
        }

        let files = find_media_files(root, recursive);
        log.info(&format!(
            "Found {} media files under {}",
            files.len(),
            root.display()
        ));

        let this = Arc::clone(self);
        let results = run_bounded(files.clone(), jobs, move |path| {
            let this = Arc::clone(&this);
            let log = log.scoped(&path.to_string_lossy());
            async move { this.scan_file(path, log.as_ref()).await }
        })
        .await;

        let files = files
            .into_iter()
            .zip(results)
            .map(|(path, result)| {
                result.unwrap_or(ScannedFile {
                    path,
                    status: ScanStatus::Error,
                    fresh: true,
                })
            })
            .collect();
        Ok(ScanSummary { files })
    }

    async fn scan_file(&self, path: PathBuf, log: &dyn LogPort) -> ScannedFile {
        if let Some(status) = self.registry.status_of(&path).await {
            log.debug("Already scanned; skipping");
            return ScannedFile {
                path,
                status,
                fresh: false,
            };
        }

        let status = if self.oracle.is_healthy(&path, log).await {
            ScanStatus::Ok
        } else {
            ScanStatus::Error
        };
        if let Err(e) = self.registry.record(&path, status).await {
            log.error(&format!("Could not record scan result: {}", e));
        }
        ScannedFile {
            path,
            status,
            fresh: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::json_registry::JsonProgressRegistry;
    use crate::adapters::mock_tool::{RecordingLogAdapter, ScriptedToolAdapter};

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_find_media_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.mkv"));
        touch(&dir.path().join("a.MP4"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested").join("c.avi"));

        let flat = find_media_files(dir.path(), false);
        assert_eq!(flat, vec![dir.path().join("a.MP4"), dir.path().join("b.mkv")]);

        let deep = find_media_files(dir.path(), true);
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("nested").join("c.avi")));
    }

    #[tokio::test]
    async fn test_scan_records_and_skips_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.mkv");
        let bad = dir.path().join("bad.mkv");
        touch(&good);
        touch(&bad);

        let tool = Arc::new(ScriptedToolAdapter::new().with_capture(|argv| ToolOutput {
            success: true,
            stdout: String::new(),
            stderr: if argv.iter().any(|a| a.ends_with("bad.mkv")) {
                "corrupt".to_string()
            } else {
                String::new()
            },
        }));
        let oracle = Arc::new(DiagnosticOracle::new(tool, "ffmpeg"));
        let registry =
            Arc::new(JsonProgressRegistry::load(dir.path().join("logs").join("progress.json")).unwrap());
        let scan = Arc::new(ScanInteractor::new(oracle, registry));

        let summary = scan
            .scan(dir.path(), true, 2, Arc::new(RecordingLogAdapter::new()))
            .await
            .unwrap();
        assert_eq!(summary.scanned(), 2);
        assert_eq!(summary.faulty(), vec![bad.as_path()]);
        assert_eq!(summary.healthy(), vec![good.as_path()]);

        let rerun = scan
            .scan(dir.path(), true, 2, Arc::new(RecordingLogAdapter::new()))
            .await
            .unwrap();
        assert_eq!(rerun.scanned(), 0);
        assert_eq!(rerun.skipped(), 2);
        assert_eq!(rerun.faulty(), vec![bad.as_path()]);
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let tool = Arc::new(ScriptedToolAdapter::new());
        let oracle = Arc::new(DiagnosticOracle::new(tool, "ffmpeg"));
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(JsonProgressRegistry::load(dir.path().join("p.json")).unwrap());
        let scan = Arc::new(ScanInteractor::new(oracle, registry));

        let result = scan
            .scan(
                Path::new("/nonexistent/videos"),
                true,
                1,
                Arc::new(RecordingLogAdapter::new()),
            )
            .await;
        assert!(matches!(result, Err(DomainError::BadArgs(_))));
    }
}
