// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod json_registry;
pub mod mock_tool;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegToolAdapter;
pub use json_registry::JsonProgressRegistry;
pub use mock_tool::{RecordingLogAdapter, ScriptedToolAdapter, StaticProbeAdapter};
pub use probe_ffprobe::FfprobeAdapter;
pub use toml_config::{Settings, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
