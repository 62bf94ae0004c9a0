// Merge filter graph - Typed steps serialized to the transcoder's filter syntax

use std::collections::HashSet;
use std::fmt;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaFile, MergeMode};

/// Kind of elementary stream a step operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    fn specifier(self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }
}

/// Named pad inside the graph, rendered as `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// One filter invocation in the graph
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStep {
    /// Rebase an input stream so it starts at zero
    ResetTimestamps {
        input: usize,
        kind: StreamKind,
        output: Label,
    },
    /// N-way concatenation of one stream kind
    Concat {
        inputs: Vec<Label>,
        kind: StreamKind,
        output: Label,
    },
    /// Pairwise video crossfade starting `offset` seconds into `first`
    VideoCrossfade {
        first: Label,
        second: Label,
        duration: f64,
        offset: f64,
        output: Label,
    },
    /// Pairwise audio crossfade
    AudioCrossfade {
        first: Label,
        second: Label,
        duration: f64,
        output: Label,
    },
}

impl FilterStep {
    /// Labels this step reads (input streams of the tool are not labels)
    pub fn consumed(&self) -> Vec<&Label> {
        match self {
            FilterStep::ResetTimestamps { .. } => Vec::new(),
            FilterStep::Concat { inputs, .. } => inputs.iter().collect(),
            FilterStep::VideoCrossfade { first, second, .. }
            | FilterStep::AudioCrossfade { first, second, .. } => vec![first, second],
        }
    }

    pub fn output(&self) -> &Label {
        match self {
            FilterStep::ResetTimestamps { output, .. }
            | FilterStep::Concat { output, .. }
            | FilterStep::VideoCrossfade { output, .. }
            | FilterStep::AudioCrossfade { output, .. } => output,
        }
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStep::ResetTimestamps {
                input,
                kind,
                output,
            } => {
                let filter = match kind {
                    StreamKind::Video => "setpts",
                    StreamKind::Audio => "asetpts",
                };
                write!(
                    f,
                    "[{}:{}]{}=PTS-STARTPTS{}",
                    input,
                    kind.specifier(),
                    filter,
                    output
                )
            }
            FilterStep::Concat {
                inputs,
                kind,
                output,
            } => {
                for label in inputs {
                    write!(f, "{}", label)?;
                }
                let (v, a) = match kind {
                    StreamKind::Video => (1, 0),
                    StreamKind::Audio => (0, 1),
                };
                write!(f, "concat=n={}:v={}:a={}{}", inputs.len(), v, a, output)
            }
            FilterStep::VideoCrossfade {
                first,
                second,
                duration,
                offset,
                output,
            } => write!(
                f,
                "{}{}xfade=transition=fade:duration={}:offset={}{}",
                first, second, duration, offset, output
            ),
            FilterStep::AudioCrossfade {
                first,
                second,
                duration,
                output,
            } => write!(f, "{}{}acrossfade=d={}{}", first, second, duration, output),
        }
    }
}

/// Filter graph for one merge: ordered steps plus the two final outputs
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    steps: Vec<FilterStep>,
    video_out: Label,
    audio_out: Label,
    warnings: Vec<String>,
}

impl FilterGraph {
    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    pub fn video_out(&self) -> &Label {
        &self.video_out
    }

    pub fn audio_out(&self) -> &Label {
        &self.audio_out
    }

    /// Non-fatal adjustments made while building (e.g. clamped offsets)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Offsets of every video crossfade, in chain order
    pub fn crossfade_offsets(&self) -> Vec<f64> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                FilterStep::VideoCrossfade { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    /// Render as a `-filter_complex` argument
    pub fn to_filter_complex(&self) -> String {
        self.steps
            .iter()
            .map(|step| step.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Every label is produced once, consumed only after it is produced,
    /// and both final outputs exist.
    pub fn check_labels(&self) -> Result<(), DomainError> {
        let mut produced: HashSet<&Label> = HashSet::new();
        for step in &self.steps {
            for label in step.consumed() {
                if !produced.contains(label) {
                    return Err(DomainError::GraphBuildFailure(format!(
                        "Label {} is consumed before it is produced",
                        label
                    )));
                }
            }
            if !produced.insert(step.output()) {
                return Err(DomainError::GraphBuildFailure(format!(
                    "Label {} is produced twice",
                    step.output()
                )));
            }
        }
        for out in [&self.video_out, &self.audio_out] {
            if !produced.contains(out) {
                return Err(DomainError::GraphBuildFailure(format!(
                    "Output label {} is never produced",
                    out
                )));
            }
        }
        Ok(())
    }
}

/// Builds merge graphs from an ordered list of probed files
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build the graph for `files` in the given mode.
    ///
    /// Every file must carry a probed duration. In crossfade mode the
    /// offset of transition `i` is `duration(i-1) - crossfade_duration`,
    /// clamped to zero with a warning when the previous clip is shorter
    /// than the transition.
    pub fn build(
        files: &[MediaFile],
        mode: MergeMode,
        crossfade_duration: f64,
    ) -> Result<FilterGraph, DomainError> {
        if files.is_empty() {
            return Err(DomainError::GraphBuildFailure(
                "No input files to merge".to_string(),
            ));
        }

        let durations = files
            .iter()
            .map(|file| {
                file.duration.ok_or_else(|| {
                    DomainError::GraphBuildFailure(format!(
                        "Could not determine duration for {}",
                        file
                    ))
                })
            })
            .collect::<Result<Vec<f64>, DomainError>>()?;

        let mut steps = Vec::with_capacity(files.len() * 2 + 2);
        for input in 0..files.len() {
            steps.push(FilterStep::ResetTimestamps {
                input,
                kind: StreamKind::Video,
                output: Label::new(format!("v{}", input)),
            });
            steps.push(FilterStep::ResetTimestamps {
                input,
                kind: StreamKind::Audio,
                output: Label::new(format!("a{}", input)),
            });
        }

        let graph = match mode {
            MergeMode::Concat => Self::concat(steps, files.len()),
            MergeMode::Crossfade => Self::crossfade(steps, files, &durations, crossfade_duration)?,
        };
        graph.check_labels()?;
        Ok(graph)
    }

    fn concat(mut steps: Vec<FilterStep>, count: usize) -> FilterGraph {
        let video_out = Label::new("vout");
        let audio_out = Label::new("aout");
        steps.push(FilterStep::Concat {
            inputs: (0..count).map(|i| Label::new(format!("v{}", i))).collect(),
            kind: StreamKind::Video,
            output: video_out.clone(),
        });
        steps.push(FilterStep::Concat {
            inputs: (0..count).map(|i| Label::new(format!("a{}", i))).collect(),
            kind: StreamKind::Audio,
            output: audio_out.clone(),
        });
        FilterGraph {
            steps,
            video_out,
            audio_out,
            warnings: Vec::new(),
        }
    }

    fn crossfade(
        mut steps: Vec<FilterStep>,
        files: &[MediaFile],
        durations: &[f64],
        crossfade_duration: f64,
    ) -> Result<FilterGraph, DomainError> {
        if !(crossfade_duration > 0.0) {
            return Err(DomainError::GraphBuildFailure(format!(
                "Crossfade duration must be positive, got {}",
                crossfade_duration
            )));
        }

        let mut warnings = Vec::new();
        let mut running_video = Label::new("v0");
        let mut running_audio = Label::new("a0");

        for i in 1..files.len() {
            let previous = durations[i - 1];
            let mut offset = previous - crossfade_duration;
            if offset < 0.0 {
                warnings.push(format!(
                    "Crossfade duration {}s is too long for {} (duration {}s); offset clamped to 0",
                    crossfade_duration,
                    files[i - 1],
                    previous
                ));
                offset = 0.0;
            }

            let faded_video = Label::new(format!("vfade{}", i));
            let faded_audio = Label::new(format!("afade{}", i));
            steps.push(FilterStep::VideoCrossfade {
                first: running_video,
                second: Label::new(format!("v{}", i)),
                duration: crossfade_duration,
                offset,
                output: faded_video.clone(),
            });
            steps.push(FilterStep::AudioCrossfade {
                first: running_audio,
                second: Label::new(format!("a{}", i)),
                duration: crossfade_duration,
                output: faded_audio.clone(),
            });
            running_video = faded_video;
            running_audio = faded_audio;
        }

        Ok(FilterGraph {
            steps,
            video_out: running_video,
            audio_out: running_audio,
            warnings,
        })
    }
}
