// Domain rules - Business logic and policies

use std::path::{Path, PathBuf};

use crate::domain::model::*;

/// Extensions the scanner and repair commands treat as media
pub const MEDIA_EXTENSIONS: &[&str] = &[
    ".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".m4v", ".mpg", ".mpeg", ".m2ts", ".vob",
    ".ts", ".mts",
];

/// Extensions allowed in numbered sequence filenames
pub const SEQUENCE_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "ts", "mts", "mpg", "mpeg", "vob",
];

/// Containers that are always re-encoded, even after a clean remux
pub const LEGACY_FORMATS: &[&str] = &[".flv", ".wmv", ".avi", ".mpg", ".vob"];

/// Substrings in the stream-copy pass that indicate timestamp ordering faults
pub const TIMESTAMP_FAULT_SIGNATURES: &[&str] =
    &["non monotonically increasing dts", "Invalid DTS/PTS"];

/// Check if a path has a supported media extension
pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if an extension (with leading dot, any case) is a legacy container
pub fn is_legacy_format(extension: &str) -> bool {
    let lowered = extension.to_lowercase();
    LEGACY_FORMATS.contains(&lowered.as_str())
}

/// True when the ordinals are exactly `min..=max` with no gaps or duplicates
pub fn is_contiguous(ordinals: &[u64]) -> bool {
    let mut sorted = ordinals.to_vec();
    sorted.sort_unstable();
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return false;
    };
    let expected: Vec<u64> = (min..=max).collect();
    sorted == expected
}

/// Which read-only check produced a diagnostic stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPass {
    /// Errors-only decode with a null muxer
    Strict,
    /// Stream-copy pass with a null muxer
    StreamCopy,
}

/// Fault detected in one diagnostic stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    None,
    Generic,
    Timestamp,
}

/// Turns raw diagnostic text into a fault verdict.
///
/// Kept behind a trait so the substring heuristics can be swapped out.
pub trait DiagnosticClassifier: Send + Sync {
    fn classify(&self, pass: CheckPass, raw: &str) -> FaultKind;
}

/// Default classifier: any strict-pass output is a fault, and the
/// stream-copy pass is searched for known timestamp signatures.
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    signatures: Vec<String>,
}

impl SignatureClassifier {
    pub fn new() -> Self {
        Self {
            signatures: TIMESTAMP_FAULT_SIGNATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Add an extra timestamp fault signature
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signatures.push(signature.into());
        self
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticClassifier for SignatureClassifier {
    fn classify(&self, pass: CheckPass, raw: &str) -> FaultKind {
        match pass {
            CheckPass::Strict if !raw.trim().is_empty() => FaultKind::Generic,
            CheckPass::Strict => FaultKind::None,
            CheckPass::StreamCopy => {
                if self.signatures.iter().any(|sig| raw.contains(sig.as_str())) {
                    FaultKind::Timestamp
                } else {
                    FaultKind::None
                }
            }
        }
    }
}

/// Next step chosen by the repair ladder
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Enter(RepairStage),
    Finish(RepairOutcome),
}

/// Finite-state machine for the repair ladder.
///
/// `START -> REMUX -> REENCODE -> EXTRACT`, terminal on the first healthy
/// artifact. Legacy containers go on to REENCODE after a clean remux and
/// fall back to the remuxed file if re-encoding does not come out clean.
/// Decisions depend only on the reports of the stages run in this ladder.
#[derive(Debug, Clone)]
pub struct RepairLadder {
    stage: RepairStage,
    legacy: bool,
    extract_enabled: bool,
    clean_remux: Option<PathBuf>,
}

impl RepairLadder {
    pub fn new(legacy: bool, extract_enabled: bool) -> Self {
        Self {
            stage: RepairStage::Start,
            legacy,
            extract_enabled,
            clean_remux: None,
        }
    }

    pub fn stage(&self) -> RepairStage {
        self.stage
    }

    /// Feed the report of the current stage and get the next step
    pub fn advance(&mut self, report: StageReport) -> Transition {
        let transition = match (self.stage, report) {
            (RepairStage::Start, _) => Transition::Enter(RepairStage::Remux),
            (RepairStage::Remux, StageReport::Healthy(path)) if !self.legacy => {
                Transition::Finish(RepairOutcome::Remuxed { path })
            }
            // Legacy containers are re-encoded even when the remux comes out
            // clean; the clean remux is only the fallback if re-encoding fails.
            (RepairStage::Remux, StageReport::Healthy(path)) => {
                self.clean_remux = Some(path);
                Transition::Enter(RepairStage::Reencode)
            }
            (RepairStage::Remux, _) => Transition::Enter(RepairStage::Reencode),
            (RepairStage::Reencode, StageReport::Healthy(path)) => {
                Transition::Finish(RepairOutcome::Reencoded { path })
            }
            (RepairStage::Reencode, _) => match self.clean_remux.take() {
                Some(path) => Transition::Finish(RepairOutcome::Remuxed { path }),
                None if self.extract_enabled => Transition::Enter(RepairStage::Extract),
                None => Transition::Finish(RepairOutcome::Unrepairable {
                    last_stage: RepairStage::Reencode,
                }),
            },
            (RepairStage::Extract, StageReport::Extracted { video, audio }) => {
                Transition::Finish(RepairOutcome::StreamsExtracted { video, audio })
            }
            (RepairStage::Extract, _) => Transition::Finish(RepairOutcome::Unrepairable {
                last_stage: RepairStage::Extract,
            }),
            (RepairStage::Finished, _) => Transition::Finish(RepairOutcome::Unrepairable {
                last_stage: RepairStage::Finished,
            }),
        };

        self.stage = match &transition {
            Transition::Enter(stage) => *stage,
            Transition::Finish(_) => RepairStage::Finished,
        };
        transition
    }
}

#[cfg(test)]
mod tests;
