//! Merge invocation over a prepared filter graph

use std::path::Path;

use crate::domain::graph::FilterGraph;
use crate::engine::{EncodeProfile, FfmpegCommand};

/// Encodes N inputs through a filter graph into one output
#[derive(Debug, Clone)]
pub struct MergeCommand {
    binary: String,
    profile: EncodeProfile,
}

impl MergeCommand {
    pub fn new(binary: impl Into<String>, profile: EncodeProfile) -> Self {
        Self {
            binary: binary.into(),
            profile,
        }
    }

    /// Input order on the command line matches the graph's input indices
    pub fn command(&self, inputs: &[&Path], graph: &FilterGraph, output: &Path) -> Vec<String> {
        let mut command = FfmpegCommand::new(&self.binary).overwrite();
        for input in inputs {
            command = command.input(input);
        }
        command
            .arg("-filter_complex")
            .arg(graph.to_filter_complex())
            .arg("-map")
            .arg(graph.video_out().to_string())
            .arg("-map")
            .arg(graph.audio_out().to_string())
            .encode_with(&self.profile)
            .safe_muxing(&self.profile)
            .output(output)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::GraphBuilder;
    use crate::domain::model::{MediaFile, MergeMode};

    #[test]
    fn test_merge_maps_final_labels() {
        let files = vec![
            MediaFile::new("clip_1.mkv").with_duration(Some(4.0)),
            MediaFile::new("clip_2.mkv").with_duration(Some(4.0)),
        ];
        let graph = GraphBuilder::build(&files, MergeMode::Concat, 1.0).unwrap();
        let inputs: Vec<&Path> = files.iter().map(|f| f.path.as_path()).collect();
        let argv = MergeCommand::new("ffmpeg", EncodeProfile::default()).command(
            &inputs,
            &graph,
            Path::new("out/clip_merged.mkv"),
        );
        let joined = argv.join(" ");

        assert!(joined.starts_with("ffmpeg -y -i clip_1.mkv -i clip_2.mkv -filter_complex "));
        assert!(joined.contains("-map [vout] -map [aout]"));
        assert!(joined.contains("-c:v libx264 -preset medium -crf 23 -c:a aac -b:a 192k"));
        assert!(joined.ends_with("out/clip_merged.mkv"));
    }
}
