//! Lossless container rewrite

use std::path::Path;

use crate::engine::FfmpegCommand;

/// Stream-copy remux of every stream into a fresh container
#[derive(Debug, Clone)]
pub struct Remuxer {
    binary: String,
}

impl Remuxer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Copies all streams without transcoding, ignoring minor decode errors
    pub fn command(&self, input: &Path, output: &Path) -> Vec<String> {
        FfmpegCommand::new(&self.binary)
            .overwrite()
            .args(["-err_detect", "ignore_err"])
            .input(input)
            .args(["-c", "copy", "-map", "0"])
            .output(output)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remux_is_stream_copy_of_all_streams() {
        let argv = Remuxer::new("ffmpeg").command(Path::new("a.mp4"), Path::new("out/a_remux.mp4"));
        assert_eq!(argv.first().map(String::as_str), Some("ffmpeg"));
        assert_eq!(argv.last().map(String::as_str), Some("out/a_remux.mp4"));
        let joined = argv.join(" ");
        assert!(joined.contains("-c copy -map 0"));
        assert!(joined.contains("-err_detect ignore_err -i a.mp4"));
        assert!(!joined.contains("libx264"));
    }
}
