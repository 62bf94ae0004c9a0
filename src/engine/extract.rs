//! Elementary stream extraction

use std::path::Path;

use crate::engine::FfmpegCommand;

/// Demuxes the first video and first audio stream by stream copy
#[derive(Debug, Clone)]
pub struct StreamExtractor {
    binary: String,
}

impl StreamExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn video_command(&self, input: &Path, output: &Path) -> Vec<String> {
        FfmpegCommand::new(&self.binary)
            .overwrite()
            .input(input)
            .args(["-map", "0:v:0", "-c", "copy", "-an", "-sn"])
            .output(output)
            .build()
    }

    pub fn audio_command(&self, input: &Path, output: &Path) -> Vec<String> {
        FfmpegCommand::new(&self.binary)
            .overwrite()
            .input(input)
            .args(["-map", "0:a:0", "-c", "copy", "-vn", "-sn"])
            .output(output)
            .build()
    }
}
