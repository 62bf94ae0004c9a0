// TOML config adapter - Typed settings from file and environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::model::{MergeMode, MergeParams};
use crate::engine::EncodeProfile;
use crate::error::{MendError, MendResult};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "mediamend.toml";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "MEDIAMEND_";

/// External tool binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Defaults for the merge command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub mode: String,
    /// Seconds
    pub crossfade_duration: f64,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            mode: "concat".to_string(),
            crossfade_duration: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSettings {
    /// Demux raw streams when remux and re-encode both fail
    pub extract_streams: bool,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            extract_streams: true,
        }
    }
}

/// Complete runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolSettings,
    pub encode: EncodeProfile,
    pub merge: MergeSettings,
    pub repair: RepairSettings,
    /// Files or groups processed concurrently
    pub jobs: usize,
    /// Scan progress registry
    pub registry_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools: ToolSettings::default(),
            encode: EncodeProfile::default(),
            merge: MergeSettings::default(),
            repair: RepairSettings::default(),
            jobs: num_cpus::get().max(1),
            registry_file: PathBuf::from("logs/progress.json"),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> MendResult<()> {
        if self.encode.crf > 51 {
            return Err(config_error(format!(
                "CRF must be between 0 and 51, got {}",
                self.encode.crf
            )));
        }
        if !(self.merge.crossfade_duration.is_finite() && self.merge.crossfade_duration > 0.0) {
            return Err(config_error(format!(
                "Crossfade duration must be positive, got {}",
                self.merge.crossfade_duration
            )));
        }
        if self.jobs == 0 {
            return Err(config_error("jobs must be at least 1".to_string()));
        }
        MergeMode::parse(&self.merge.mode)?;
        Ok(())
    }

    /// Merge parameters resolved from the configured defaults
    pub fn merge_params(&self) -> MendResult<MergeParams> {
        Ok(MergeParams {
            mode: MergeMode::parse(&self.merge.mode)?,
            crossfade_duration: self.merge.crossfade_duration,
        })
    }
}

fn config_error(message: String) -> MendError {
    MendError::ConfigError { message }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse settings; missing keys fall back to defaults
    pub fn parse(content: &str) -> MendResult<Settings> {
        toml::from_str(content)
            .map_err(|e| config_error(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load settings from `explicit` (which must exist), else from
    /// `mediamend.toml` when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> MendResult<(Settings, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(config_error(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    config_error(format!("Failed to read config file {}: {}", path.display(), e))
                })?;
                Ok((Self::parse(&content)?, Some(path)))
            }
            None => Ok((Settings::default(), None)),
        }
    }

    /// Apply `MEDIAMEND_*` overrides read through `lookup`.
    /// Returns the names of the variables that were applied.
    pub fn apply_env<F>(settings: &mut Settings, lookup: F) -> MendResult<Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        let mut var = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            let value = lookup(&key);
            if value.is_some() {
                applied.push(key);
            }
            value
        };

        if let Some(value) = var("FFMPEG") {
            settings.tools.ffmpeg = value;
        }
        if let Some(value) = var("FFPROBE") {
            settings.tools.ffprobe = value;
        }
        if let Some(value) = var("PRESET") {
            settings.encode.preset = value;
        }
        if let Some(value) = var("CRF") {
            settings.encode.crf = parse_env("CRF", &value)?;
        }
        if let Some(value) = var("JOBS") {
            settings.jobs = parse_env("JOBS", &value)?;
        }
        if let Some(value) = var("MERGE_MODE") {
            settings.merge.mode = value;
        }
        if let Some(value) = var("CROSSFADE_DURATION") {
            settings.merge.crossfade_duration = parse_env("CROSSFADE_DURATION", &value)?;
        }
        if let Some(value) = var("EXTRACT_STREAMS") {
            settings.repair.extract_streams = parse_env("EXTRACT_STREAMS", &value)?;
        }
        if let Some(value) = var("REGISTRY") {
            settings.registry_file = PathBuf::from(value);
        }

        Ok(applied)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> MendResult<T> {
    value.trim().parse().map_err(|_| {
        config_error(format!(
            "Invalid value for {}{}: {}",
            ENV_PREFIX, name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.tools.ffmpeg, "ffmpeg");
        assert_eq!(settings.registry_file, PathBuf::from("logs/progress.json"));
        assert!(settings.jobs >= 1);
        assert!(settings.repair.extract_streams);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = TomlConfigAdapter::parse(
            r#"
            jobs = 3

            [encode]
            crf = 20

            [merge]
            mode = "crossfade"
            crossfade_duration = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.jobs, 3);
        assert_eq!(settings.encode.crf, 20);
        assert_eq!(settings.encode.preset, "medium");
        assert_eq!(settings.merge_params().unwrap().mode, MergeMode::Crossfade);
        assert_eq!(settings.tools.ffprobe, "ffprobe");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        settings.encode.crf = 60;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.merge.crossfade_duration = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.merge.mode = "wipe".to_string();
        assert!(settings.validate().is_err());

        assert!(TomlConfigAdapter::parse("jobs = \"many\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MEDIAMEND_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
            ("MEDIAMEND_CRF", "19"),
            ("MEDIAMEND_EXTRACT_STREAMS", "false"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        let applied = TomlConfigAdapter::apply_env(&mut settings, |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(applied.len(), 3);
        assert_eq!(settings.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(settings.encode.crf, 19);
        assert!(!settings.repair.extract_streams);
    }

    #[test]
    fn test_bad_env_value() {
        let mut settings = Settings::default();
        let result = TomlConfigAdapter::apply_env(&mut settings, |key| {
            (key == "MEDIAMEND_JOBS").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(MendError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = TomlConfigAdapter::load(Some(Path::new("/nonexistent/mediamend.toml")));
        assert!(result.is_err());
    }
}
