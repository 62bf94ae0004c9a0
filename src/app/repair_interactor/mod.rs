// Repair interactor - Drives the repair ladder for one file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::app::batch::run_bounded;
use crate::app::oracle::DiagnosticOracle;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{EncodeProfile, Reencoder, Remuxer, StreamExtractor};
use crate::ports::*;
use crate::utils::fs;
use crate::utils::path::unique_stems;
use crate::utils::OutputLayout;

/// Where and how repairs are written
#[derive(Debug, Clone)]
pub struct RepairConfig {
    pub output_dir: PathBuf,
    pub ffmpeg: String,
    pub profile: EncodeProfile,
    pub extract_streams: bool,
}

/// What happened to one file of a repair batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairReport {
    pub path: PathBuf,
    /// None when the file was healthy and left alone
    pub outcome: Option<RepairOutcome>,
}

/// Interactor for the remux → re-encode → extract ladder
pub struct RepairInteractor {
    tool_port: Arc<dyn ToolPort>,
    oracle: Arc<DiagnosticOracle>,
    layout: OutputLayout,
    remuxer: Remuxer,
    reencoder: Reencoder,
    extractor: StreamExtractor,
    extract_streams: bool,
}

impl RepairInteractor {
    /// Create new repair interactor with injected ports
    pub fn new(
        tool_port: Arc<dyn ToolPort>,
        oracle: Arc<DiagnosticOracle>,
        config: RepairConfig,
    ) -> Self {
        Self {
            tool_port,
            oracle,
            layout: OutputLayout::new(config.output_dir),
            remuxer: Remuxer::new(config.ffmpeg.clone()),
            reencoder: Reencoder::new(config.ffmpeg.clone(), config.profile),
            extractor: StreamExtractor::new(config.ffmpeg),
            extract_streams: config.extract_streams,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run the ladder for `input` until it finishes.
    ///
    /// Stages run strictly in order and each artifact is validated by the
    /// oracle before the next decision. Artifacts of failed stages stay on
    /// disk.
    pub async fn repair(&self, input: &MediaFile, log: &dyn LogPort) -> RepairOutcome {
        self.repair_as(input, &input.stem(), log).await
    }

    /// Like [`repair`](Self::repair), naming every artifact after `stem`
    /// instead of the input's own stem
    pub async fn repair_as(&self, input: &MediaFile, stem: &str, log: &dyn LogPort) -> RepairOutcome {
        let log = log.scoped(&input.file_name());
        let log = log.as_ref();

        if let Err(e) = fs::ensure_dir(&self.layout.logs_dir()) {
            log.error(&format!(
                "Cannot create output directory {}: {}",
                self.layout.logs_dir().display(),
                e
            ));
            return RepairOutcome::Unrepairable {
                last_stage: RepairStage::Start,
            };
        }

        let legacy = input.is_legacy_format();
        if legacy {
            log.info(&format!(
                "{} is in an old format ({}); marked for re-encoding",
                input, input.extension
            ));
        }

        let mut ladder = RepairLadder::new(legacy, self.extract_streams);
        let mut report = StageReport::Skipped;
        loop {
            match ladder.advance(report) {
                Transition::Enter(stage) => {
                    log.debug(&format!("Entering {} stage", stage));
                    report = self.run_stage(stage, input, stem, log).await;
                }
                Transition::Finish(outcome) => {
                    self.log_outcome(input, &outcome, log);
                    return outcome;
                }
            }
        }
    }

    /// Repair `input` unless it is already healthy and not a legacy
    /// container. `force` runs the ladder regardless.
    pub async fn repair_if_needed(
        &self,
        input: &MediaFile,
        force: bool,
        log: &dyn LogPort,
    ) -> Option<RepairOutcome> {
        if !self.needs_repair(input, force, log).await {
            return None;
        }
        Some(self.repair(input, log).await)
    }

    /// Repair many files with up to `jobs` in flight.
    ///
    /// Inputs sharing a file stem get distinct artifact names, so no two
    /// jobs ever write the same output.
    pub async fn repair_all(
        self: &Arc<Self>,
        files: Vec<PathBuf>,
        force: bool,
        jobs: usize,
        log: Arc<dyn LogPort>,
    ) -> Vec<RepairReport> {
        let inputs: Vec<MediaFile> = files.iter().map(MediaFile::new).collect();
        let stems = unique_stems(&inputs);
        for (input, stem) in inputs.iter().zip(&stems) {
            if *stem != input.stem() {
                log.info(&format!(
                    "{} shares its name with another input; writing its artifacts as {}",
                    input.path.display(),
                    stem
                ));
            }
        }

        let this = Arc::clone(self);
        let work: Vec<(MediaFile, String)> = inputs.into_iter().zip(stems).collect();
        let results = run_bounded(work, jobs, move |(input, stem)| {
            let this = Arc::clone(&this);
            let log = Arc::clone(&log);
            async move {
                if !this.needs_repair(&input, force, log.as_ref()).await {
                    return None;
                }
                Some(this.repair_as(&input, &stem, log.as_ref()).await)
            }
        })
        .await;

        files
            .into_iter()
            .zip(results)
            .map(|(path, result)| RepairReport {
                path,
                outcome: result.unwrap_or(Some(RepairOutcome::Unrepairable {
                    last_stage: RepairStage::Start,
                })),
            })
            .collect()
    }

    /// Healthy non-legacy files are left alone unless `force` is set
    async fn needs_repair(&self, input: &MediaFile, force: bool, log: &dyn LogPort) -> bool {
        if force || input.is_legacy_format() {
            return true;
        }
        let health = self.oracle.classify(&input.path, log).await;
        if health.is_healthy() {
            log.info(&format!("{} has no errors; nothing to repair", input));
            return false;
        }
        log.info(&format!("{} has a {}; starting repair", input, health));
        true
    }

    async fn run_stage(
        &self,
        stage: RepairStage,
        input: &MediaFile,
        stem: &str,
        log: &dyn LogPort,
    ) -> StageReport {
        match stage {
            RepairStage::Remux => self.remux(input, stem, log).await,
            RepairStage::Reencode => self.reencode(input, stem, log).await,
            RepairStage::Extract => self.extract(input, stem, log).await,
            RepairStage::Start | RepairStage::Finished => StageReport::Skipped,
        }
    }

    async fn remux(&self, input: &MediaFile, stem: &str, log: &dyn LogPort) -> StageReport {
        let output = self.layout.remux_path(stem, &input.extension);
        let argv = self.remuxer.command(&input.path, &output);
        log.info(&format!("Attempting to remux {}", input));
        self.produce(input, stem, &output, argv, RepairStage::Remux, log)
            .await
    }

    async fn reencode(&self, input: &MediaFile, stem: &str, log: &dyn LogPort) -> StageReport {
        let output = self
            .layout
            .reencode_path(stem, &self.reencoder.profile().container);
        let argv = self.reencoder.command(&input.path, &output);
        log.info(&format!("Attempting to re-encode {}", input));
        self.produce(input, stem, &output, argv, RepairStage::Reencode, log)
            .await
    }

    /// Run one producing stage and validate its artifact
    async fn produce(
        &self,
        input: &MediaFile,
        stem: &str,
        output: &Path,
        argv: Vec<String>,
        stage: RepairStage,
        log: &dyn LogPort,
    ) -> StageReport {
        if !self.prepare_output(input, output, stage, log) {
            return StageReport::Skipped;
        }

        let tool_log = self.layout.stage_log(stem, stage);
        if !self.tool_port.run(&argv, Some(&tool_log)).await {
            log.error(&format!(
                "{} failed for {}; see {}",
                stage,
                input,
                tool_log.display()
            ));
            return StageReport::InvocationFailed;
        }

        self.preserve_timestamps(input, output, log);
        if self.oracle.is_healthy(output, log).await {
            log.info(&format!("{} produced a healthy file: {}", stage, output.display()));
            StageReport::Healthy(output.to_path_buf())
        } else {
            log.warn(&format!(
                "{} output still has errors: {}",
                stage,
                output.display()
            ));
            StageReport::Unhealthy(output.to_path_buf())
        }
    }

    async fn extract(&self, input: &MediaFile, stem: &str, log: &dyn LogPort) -> StageReport {
        if !self.extract_streams {
            log.info("Stream extraction is disabled");
            return StageReport::Skipped;
        }

        let (video, audio) = self.layout.extract_paths(stem);
        if !self.prepare_output(input, &video, RepairStage::Extract, log)
            || !self.prepare_output(input, &audio, RepairStage::Extract, log)
        {
            return StageReport::Skipped;
        }

        log.info(&format!("Extracting raw streams from {}", input));
        let video_log = self.layout.named_log(stem, "extract_video");
        if !self
            .tool_port
            .run(&self.extractor.video_command(&input.path, &video), Some(&video_log))
            .await
        {
            log.error(&format!(
                "Video extraction failed for {}; see {}",
                input,
                video_log.display()
            ));
            return StageReport::InvocationFailed;
        }
        self.preserve_timestamps(input, &video, log);

        let audio_log = self.layout.named_log(stem, "extract_audio");
        let audio = if self
            .tool_port
            .run(&self.extractor.audio_command(&input.path, &audio), Some(&audio_log))
            .await
        {
            self.preserve_timestamps(input, &audio, log);
            Some(audio)
        } else {
            log.warn(&format!("No audio stream could be extracted from {}", input));
            None
        };

        StageReport::Extracted { video, audio }
    }

    /// Refuse to overwrite the source and clear any stale artifact
    fn prepare_output(
        &self,
        input: &MediaFile,
        output: &Path,
        stage: RepairStage,
        log: &dyn LogPort,
    ) -> bool {
        if same_file(&input.path, output) {
            log.warn(&format!(
                "Skipping {}: output {} would overwrite the source",
                stage,
                output.display()
            ));
            return false;
        }
        match fs::remove_if_exists(output) {
            Ok(true) => {
                log.debug(&format!("Removed stale {}", output.display()));
                true
            }
            Ok(false) => true,
            Err(e) => {
                log.error(&format!("Cannot remove stale {}: {}", output.display(), e));
                false
            }
        }
    }

    fn preserve_timestamps(&self, input: &MediaFile, output: &Path, log: &dyn LogPort) {
        if let Err(e) = fs::preserve_timestamps(&input.path, output) {
            log.warn(&format!(
                "Could not preserve timestamps on {}: {}",
                output.display(),
                e
            ));
        }
    }

    fn log_outcome(&self, input: &MediaFile, outcome: &RepairOutcome, log: &dyn LogPort) {
        match outcome {
            RepairOutcome::Remuxed { path } | RepairOutcome::Reencoded { path } => log.info(
                &format!("Repaired {} by {}: {}", input, outcome.stage(), path.display()),
            ),
            RepairOutcome::StreamsExtracted { video, audio } => log.warn(&format!(
                "Could not repair {}; salvaged streams to {}{}",
                input,
                video.display(),
                audio
                    .as_ref()
                    .map(|a| format!(" and {}", a.display()))
                    .unwrap_or_default()
            )),
            RepairOutcome::Unrepairable { last_stage } => log.error(&format!(
                "Could not repair {} (gave up after {})",
                input, last_stage
            )),
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
