//! Output naming conventions
//!
//! Every artifact the tool writes is named here, so the interactors never
//! format file names themselves.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::domain::model::{MediaFile, RepairStage};

/// Directory under an output root that holds per-invocation tool logs
pub const LOGS_DIR: &str = "logs";

/// Layout of artifacts inside one output directory
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// `<stem>_remux<ext>`, keeping the source container
    pub fn remux_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.root.join(format!("{}_remux{}", stem, extension))
    }

    /// `<stem>.<container>` in the normalized container
    pub fn reencode_path(&self, stem: &str, container: &str) -> PathBuf {
        self.root.join(format!("{}.{}", stem, container))
    }

    /// `(<stem>_video.mkv, <stem>_audio.mka)`
    pub fn extract_paths(&self, stem: &str) -> (PathBuf, PathBuf) {
        (
            self.root.join(format!("{}_video.mkv", stem)),
            self.root.join(format!("{}_audio.mka", stem)),
        )
    }

    /// `<base>_merged.<container>`
    pub fn merged_path(&self, base_name: &str, container: &str) -> PathBuf {
        self.root
            .join(format!("{}_merged.{}", base_name, container))
    }

    /// Tool log for one repair stage of the artifacts named `stem`
    pub fn stage_log(&self, stem: &str, stage: RepairStage) -> PathBuf {
        self.named_log(stem, stage.log_suffix())
    }

    /// `logs/<stem>_<suffix>.log`
    pub fn named_log(&self, stem: &str, suffix: &str) -> PathBuf {
        self.logs_dir().join(format!("{}_{}.log", stem, suffix))
    }

    /// Tool log for a merge, placed next to its output
    pub fn merge_log(output: &Path) -> PathBuf {
        let stem = output
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(output.parent().unwrap_or_else(|| Path::new("")))
            .named_log(&stem, "merge")
    }
}

/// Artifact stem for every input, unique within one output directory.
///
/// The first input with a given stem keeps it; later ones get `_2`, `_3`
/// and so on, skipping any stem another input already carries. Stems are
/// compared case-insensitively.
pub fn unique_stems(inputs: &[MediaFile]) -> Vec<String> {
    let mut taken: HashSet<String> = inputs.iter().map(|f| f.stem().to_lowercase()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let stem = input.stem();
            if seen.insert(stem.to_lowercase()) {
                return stem;
            }
            let mut n = 2;
            loop {
                let candidate = format!("{}_{}", stem, n);
                if taken.insert(candidate.to_lowercase()) {
                    seen.insert(candidate.to_lowercase());
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_artifact_names() {
        let layout = OutputLayout::new("out");
        let input = MediaFile::new("/in/Holiday.MP4");
        let stem = input.stem();

        assert_eq!(
            layout.remux_path(&stem, &input.extension),
            PathBuf::from("out/Holiday_remux.mp4")
        );
        assert_eq!(layout.reencode_path(&stem, "mkv"), PathBuf::from("out/Holiday.mkv"));
        assert_eq!(
            layout.extract_paths(&stem),
            (
                PathBuf::from("out/Holiday_video.mkv"),
                PathBuf::from("out/Holiday_audio.mka")
            )
        );
        assert_eq!(
            layout.stage_log(&stem, RepairStage::Reencode),
            PathBuf::from("out/logs/Holiday_reencode.log")
        );
    }

    #[test]
    fn test_merge_names() {
        let layout = OutputLayout::new("out");
        let merged = layout.merged_path("clip", "mkv");
        assert_eq!(merged, PathBuf::from("out/clip_merged.mkv"));
        assert_eq!(
            OutputLayout::merge_log(&merged),
            PathBuf::from("out/logs/clip_merged_merge.log")
        );
    }

    #[test]
    fn test_unique_stems_disambiguate_same_name() {
        let inputs = vec![
            MediaFile::new("/dvd1/VTS_01_1.VOB"),
            MediaFile::new("/dvd2/VTS_01_1.VOB"),
            MediaFile::new("/dvd3/vts_01_1.vob"),
            MediaFile::new("/other/holiday.mp4"),
        ];
        assert_eq!(
            unique_stems(&inputs),
            vec!["VTS_01_1", "VTS_01_1_2", "vts_01_1_3", "holiday"]
        );
    }

    #[test]
    fn test_unique_stems_skip_existing_names() {
        let inputs = vec![
            MediaFile::new("/a/clip.mp4"),
            MediaFile::new("/b/clip.mp4"),
            MediaFile::new("/c/clip_2.mp4"),
        ];
        assert_eq!(unique_stems(&inputs), vec!["clip", "clip_3", "clip_2"]);
    }
}
