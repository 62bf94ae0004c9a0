// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::rules;

/// Health classification of a media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Health {
    Healthy,
    GenericFault,
    TimestampFault,
    /// Not probed yet
    Unknown,
}

impl Health {
    pub fn is_healthy(self) -> bool {
        self == Health::Healthy
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Health::Healthy => "healthy",
            Health::GenericFault => "generic fault",
            Health::TimestampFault => "timestamp fault",
            Health::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Verdict of the two read-only checks run against one file.
///
/// Both signals are kept; a file is healthy only when neither fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnosis {
    /// Diagnostic text from the strict decode check, when it reported anything
    pub generic_fault: Option<String>,
    /// Diagnostic text from the stream-copy check, when it matched a timestamp signature
    pub timestamp_fault: Option<String>,
}

impl Diagnosis {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn is_healthy(&self) -> bool {
        self.generic_fault.is_none() && self.timestamp_fault.is_none()
    }

    /// Collapse both signals into a single classification.
    /// Timestamp faults are the more specific signal and win.
    pub fn health(&self) -> Health {
        if self.timestamp_fault.is_some() {
            Health::TimestampFault
        } else if self.generic_fault.is_some() {
            Health::GenericFault
        } else {
            Health::Healthy
        }
    }

    /// Raw diagnostic text of every check that fired, one block per check
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        if let Some(text) = &self.generic_fault {
            lines.push(format!("Basic errors: {}", text));
        }
        if let Some(text) = &self.timestamp_fault {
            lines.push(format!("DTS/PTS errors: {}", text));
        }
        lines.join("\n")
    }
}

/// A media file identified by its path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Lower-cased extension including the leading dot, empty when absent
    pub extension: String,
    /// Duration in seconds, filled by probing on demand
    pub duration: Option<f64>,
    pub health: Health,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            path,
            extension,
            duration: None,
            health: Health::Unknown,
        }
    }

    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_legacy_format(&self) -> bool {
        rules::is_legacy_format(&self.extension)
    }
}

impl fmt::Display for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Stages of the repair ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepairStage {
    Start,
    Remux,
    Reencode,
    Extract,
    Finished,
}

impl RepairStage {
    /// Suffix used for the stage's tool log file
    pub fn log_suffix(self) -> &'static str {
        match self {
            RepairStage::Start => "start",
            RepairStage::Remux => "remux",
            RepairStage::Reencode => "reencode",
            RepairStage::Extract => "extract",
            RepairStage::Finished => "finished",
        }
    }
}

impl fmt::Display for RepairStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log_suffix().to_uppercase())
    }
}

/// What a single stage produced, as fed into the ladder's transition function
#[derive(Debug, Clone, PartialEq)]
pub enum StageReport {
    /// The stage was not run (e.g. output path would overwrite the source)
    Skipped,
    /// The tool could not run or exited non-zero
    InvocationFailed,
    /// The tool succeeded but the artifact still has faults
    Unhealthy(PathBuf),
    /// The artifact passed the Diagnostic Oracle
    Healthy(PathBuf),
    /// Raw elementary streams were demuxed
    Extracted {
        video: PathBuf,
        audio: Option<PathBuf>,
    },
}

/// Final result of one repair ladder run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RepairOutcome {
    Remuxed { path: PathBuf },
    Reencoded { path: PathBuf },
    StreamsExtracted { video: PathBuf, audio: Option<PathBuf> },
    Unrepairable { last_stage: RepairStage },
}

impl RepairOutcome {
    /// Path of a healthy repaired file, if one was produced
    pub fn repaired_path(&self) -> Option<&Path> {
        match self {
            RepairOutcome::Remuxed { path } | RepairOutcome::Reencoded { path } => Some(path),
            _ => None,
        }
    }

    /// Stage at which this outcome was produced
    pub fn stage(&self) -> RepairStage {
        match self {
            RepairOutcome::Remuxed { .. } => RepairStage::Remux,
            RepairOutcome::Reencoded { .. } => RepairStage::Reencode,
            RepairOutcome::StreamsExtracted { .. } => RepairStage::Extract,
            RepairOutcome::Unrepairable { last_stage } => *last_stage,
        }
    }

    pub fn is_repaired(&self) -> bool {
        self.repaired_path().is_some()
    }
}

/// A discovered run of numbered files sharing one base name.
///
/// Ordinals form a contiguous range without duplicates and there are at
/// least two members.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceGroup {
    pub base_name: String,
    members: Vec<(u64, MediaFile)>,
}

impl SequenceGroup {
    pub fn new(
        base_name: impl Into<String>,
        mut members: Vec<(u64, MediaFile)>,
    ) -> Result<Self, DomainError> {
        let base_name = base_name.into();
        if members.len() < 2 {
            return Err(DomainError::PreconditionFailure(format!(
                "Sequence '{}' needs at least two members, found {}",
                base_name,
                members.len()
            )));
        }
        members.sort_by_key(|(ordinal, _)| *ordinal);
        let ordinals: Vec<u64> = members.iter().map(|(ordinal, _)| *ordinal).collect();
        if !rules::is_contiguous(&ordinals) {
            return Err(DomainError::PreconditionFailure(format!(
                "Sequence '{}' is not consecutive: {:?}",
                base_name, ordinals
            )));
        }
        Ok(Self { base_name, members })
    }

    pub fn ordinals(&self) -> Vec<u64> {
        self.members.iter().map(|(ordinal, _)| *ordinal).collect()
    }

    /// Member files in ascending ordinal order
    pub fn files(&self) -> Vec<MediaFile> {
        self.members.iter().map(|(_, file)| file.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// How a sequence is combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeMode {
    /// Plain N-way concatenation
    Concat,
    /// Chain of pairwise crossfades
    Crossfade,
}

impl MergeMode {
    /// Parse a merge mode from configuration text
    pub fn parse(mode: &str) -> Result<Self, DomainError> {
        match mode.trim().to_lowercase().as_str() {
            "concat" | "trim" => Ok(MergeMode::Concat),
            "crossfade" => Ok(MergeMode::Crossfade),
            other => Err(DomainError::GraphBuildFailure(format!(
                "Unknown merge mode: {}. Valid modes: concat, crossfade",
                other
            ))),
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Concat => f.write_str("concat"),
            MergeMode::Crossfade => f.write_str("crossfade"),
        }
    }
}

/// Parameters for one merge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeParams {
    pub mode: MergeMode,
    /// Crossfade length in seconds; ignored in concat mode
    pub crossfade_duration: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            mode: MergeMode::Concat,
            crossfade_duration: 1.0,
        }
    }
}

/// Result of one merge attempt.
///
/// A failed merge may still carry the output path when an artifact exists
/// on disk, so it can be inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeResult {
    pub success: bool,
    pub output_path: Option<PathBuf>,
}

impl MergeResult {
    pub fn succeeded(output_path: PathBuf) -> Self {
        Self {
            success: true,
            output_path: Some(output_path),
        }
    }

    pub fn failed(output_path: Option<PathBuf>) -> Self {
        Self {
            success: false,
            output_path,
        }
    }
}
