//! Argument-vector builders for every transcoder invocation
//!
//! Nothing here runs a process; the builders only describe what the
//! `ToolPort` should execute.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod check;
pub mod extract;
pub mod merge;
pub mod reencode;
pub mod remux;

pub use check::DiagnosticChecks;
pub use extract::StreamExtractor;
pub use merge::MergeCommand;
pub use reencode::Reencoder;
pub use remux::Remuxer;

/// Encoding settings shared by re-encode and merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeProfile {
    /// Video codec
    pub video_codec: String,
    /// Encoding preset
    pub preset: String,
    /// Constant Rate Factor (0-51)
    pub crf: u8,
    /// Audio codec
    pub audio_codec: String,
    /// Audio bitrate, in the transcoder's notation
    pub audio_bitrate: String,
    /// Subtitle codec used when re-encoding
    pub subtitle_codec: String,
    pub max_muxing_queue_size: u32,
    /// Normalized container extension, without the dot
    pub container: String,
}

impl Default for EncodeProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            subtitle_codec: "copy".to_string(),
            max_muxing_queue_size: 9999,
            container: "mkv".to_string(),
        }
    }
}

/// Incremental builder for one argument vector, program first
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    argv: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(binary: &str) -> Self {
        Self {
            argv: vec![binary.to_string()],
        }
    }

    /// Overwrite outputs without asking
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn input(self, path: &Path) -> Self {
        self.arg("-i").arg(path.to_string_lossy())
    }

    pub fn output(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    /// Video, audio and muxing options of an encode profile
    pub fn encode_with(self, profile: &EncodeProfile) -> Self {
        self.args([
            "-c:v".to_string(),
            profile.video_codec.clone(),
            "-preset".to_string(),
            profile.preset.clone(),
            "-crf".to_string(),
            profile.crf.to_string(),
            "-c:a".to_string(),
            profile.audio_codec.clone(),
            "-b:a".to_string(),
            profile.audio_bitrate.clone(),
        ])
    }

    /// Muxer options that keep timestamps non-negative under heavy interleaving
    pub fn safe_muxing(self, profile: &EncodeProfile) -> Self {
        self.arg("-max_muxing_queue_size")
            .arg(profile.max_muxing_queue_size.to_string())
            .args(["-avoid_negative_ts", "make_zero"])
    }

    pub fn build(self) -> Vec<String> {
        self.argv
    }
}
