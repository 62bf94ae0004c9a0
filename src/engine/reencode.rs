//! Full re-encode into the normalized container

use std::path::Path;

use crate::engine::{EncodeProfile, FfmpegCommand};

/// Re-encoder regenerating timestamps for every stream
#[derive(Debug, Clone)]
pub struct Reencoder {
    binary: String,
    profile: EncodeProfile,
}

impl Reencoder {
    pub fn new(binary: impl Into<String>, profile: EncodeProfile) -> Self {
        Self {
            binary: binary.into(),
            profile,
        }
    }

    pub fn profile(&self) -> &EncodeProfile {
        &self.profile
    }

    /// Video and audio are transcoded, subtitles pass through with the
    /// profile's subtitle codec. Presentation timestamps are regenerated
    /// from the demuxer.
    pub fn command(&self, input: &Path, output: &Path) -> Vec<String> {
        FfmpegCommand::new(&self.binary)
            .overwrite()
            .args(["-fflags", "+genpts"])
            .input(input)
            .encode_with(&self.profile)
            .arg("-c:s")
            .arg(self.profile.subtitle_codec.clone())
            .args(["-map", "0"])
            .safe_muxing(&self.profile)
            .output(output)
            .build()
    }
}
