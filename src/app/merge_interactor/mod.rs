// Merge interactor - Validates, probes, builds the graph and encodes

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::app::batch::run_bounded;
use crate::app::discover_interactor::{Discovery, SkippedSequence};
use crate::app::oracle::DiagnosticOracle;
use crate::domain::graph::GraphBuilder;
use crate::domain::model::*;
use crate::engine::{EncodeProfile, MergeCommand};
use crate::ports::*;
use crate::utils::fs;
use crate::utils::OutputLayout;

/// Outcome of merging every candidate group of one directory
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeSummary {
    pub merged: Vec<PathBuf>,
    /// Base name and the artifact left behind, if any
    pub failed: Vec<(String, Option<PathBuf>)>,
    pub skipped: Vec<SkippedSequence>,
}

/// Interactor for the merge executor
pub struct MergeInteractor {
    tool_port: Arc<dyn ToolPort>,
    probe_port: Arc<dyn ProbePort>,
    oracle: Arc<DiagnosticOracle>,
    command: MergeCommand,
    container: String,
}

impl MergeInteractor {
    /// Create new merge interactor with injected ports
    pub fn new(
        tool_port: Arc<dyn ToolPort>,
        probe_port: Arc<dyn ProbePort>,
        oracle: Arc<DiagnosticOracle>,
        ffmpeg: impl Into<String>,
        profile: EncodeProfile,
    ) -> Self {
        let container = profile.container.clone();
        Self {
            tool_port,
            probe_port,
            oracle,
            command: MergeCommand::new(ffmpeg, profile),
            container,
        }
    }

    /// Merge `files` in the given order into `output`.
    ///
    /// Inputs are re-validated first since they may have changed after
    /// discovery. A failed merge still reports an output artifact when one
    /// exists, and never deletes it.
    pub async fn merge(
        &self,
        files: &[MediaFile],
        output: &Path,
        params: MergeParams,
        log: &dyn LogPort,
    ) -> MergeResult {
        for file in files {
            if !self.oracle.is_healthy(&file.path, log).await {
                log.error(&format!("Cannot merge: {} has errors", file));
                return MergeResult::failed(None);
            }
        }

        let mut probed = Vec::with_capacity(files.len());
        for file in files {
            let duration = self.probe_port.probe_duration(&file.path).await;
            probed.push(file.clone().with_duration(duration));
        }

        let graph = match GraphBuilder::build(&probed, params.mode, params.crossfade_duration) {
            Ok(graph) => graph,
            Err(e) => {
                log.error(&format!("Cannot merge into {}: {}", output.display(), e));
                return MergeResult::failed(None);
            }
        };
        for warning in graph.warnings() {
            log.warn(warning);
        }

        let tool_log = OutputLayout::merge_log(output);
        if let Some(logs_dir) = tool_log.parent() {
            if let Err(e) = fs::ensure_dir(logs_dir) {
                log.error(&format!("Cannot create {}: {}", logs_dir.display(), e));
                return MergeResult::failed(None);
            }
        }

        // a leftover from an earlier run must not pass for this run's artifact
        match fs::remove_if_exists(output) {
            Ok(true) => log.debug(&format!("Removed stale {}", output.display())),
            Ok(false) => {}
            Err(e) => {
                log.error(&format!("Cannot remove stale {}: {}", output.display(), e));
                return MergeResult::failed(None);
            }
        }

        let inputs: Vec<&Path> = files.iter().map(|f| f.path.as_path()).collect();
        let argv = self.command.command(&inputs, &graph, output);
        log.info(&format!(
            "Merging {} files ({}) into {}",
            files.len(),
            params.mode,
            output.display()
        ));

        if !self.tool_port.run(&argv, Some(&tool_log)).await {
            log.error(&format!(
                "Merge failed for {}; see {}",
                output.display(),
                tool_log.display()
            ));
            return MergeResult::failed(output.exists().then(|| output.to_path_buf()));
        }

        if !self.oracle.is_healthy(output, log).await {
            log.error(&format!(
                "Merged file has errors, keeping it for inspection: {}",
                output.display()
            ));
            return MergeResult::failed(Some(output.to_path_buf()));
        }

        if let Some(first) = files.first() {
            if let Err(e) = fs::preserve_timestamps(&first.path, output) {
                log.warn(&format!(
                    "Could not preserve timestamps on {}: {}",
                    output.display(),
                    e
                ));
            }
        }
        log.info(&format!("Merged into {}", output.display()));
        MergeResult::succeeded(output.to_path_buf())
    }

    /// Merge every discovered group into `output_dir/<base>_merged.<container>`,
    /// with up to `jobs` groups in flight.
    pub async fn merge_discovered(
        self: &Arc<Self>,
        discovery: Discovery,
        output_dir: &Path,
        params: MergeParams,
        jobs: usize,
        log: Arc<dyn LogPort>,
    ) -> MergeSummary {
        let layout = OutputLayout::new(output_dir);
        let mut summary = MergeSummary {
            skipped: discovery.skipped,
            ..MergeSummary::default()
        };

        if let Err(e) = fs::ensure_dir(output_dir) {
            log.error(&format!("Cannot create {}: {}", output_dir.display(), e));
            summary.failed = discovery
                .groups
                .into_keys()
                .map(|base| (base, None))
                .collect();
            return summary;
        }

        let work: Vec<(String, Vec<MediaFile>, PathBuf)> = discovery
            .groups
            .into_iter()
            .map(|(base, group)| {
                let output = layout.merged_path(&base, &self.container);
                (base, group.files(), output)
            })
            .collect();
        let bases: Vec<String> = work.iter().map(|(base, _, _)| base.clone()).collect();

        let this = Arc::clone(self);
        let results = run_bounded(work, jobs, move |(base, files, output)| {
            let this = Arc::clone(&this);
            let log = log.scoped(&base);
            async move { this.merge(&files, &output, params, log.as_ref()).await }
        })
        .await;

        for (base, result) in bases.into_iter().zip(results) {
            match result {
                Ok(result) if result.success => {
                    if let Some(path) = result.output_path {
                        summary.merged.push(path);
                    }
                }
                Ok(result) => summary.failed.push((base, result.output_path)),
                Err(_) => summary.failed.push((base, None)),
            }
        }
        summary
    }
}
