//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::{Settings, TomlConfigAdapter};
use crate::cli::args::MergeOptions;
use crate::cli::{Cli, Commands};

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<Settings> {
    // Steps 1 and 2: defaults, then the config file when there is one
    let (mut settings, source) =
        TomlConfigAdapter::load(cli.config.as_deref()).context("Failed to load configuration")?;
    match source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => debug!("No configuration file found; using defaults"),
    }

    // Step 3: environment variables
    let applied = TomlConfigAdapter::apply_env(&mut settings, |key| std::env::var(key).ok())
        .context("Invalid environment override")?;
    if !applied.is_empty() {
        info!("Applied environment overrides: {}", applied.join(", "));
    }

    // Step 4: CLI arguments
    apply_cli_overrides(&mut settings, cli);

    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(jobs) = cli.jobs {
        settings.jobs = jobs;
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        settings.tools.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &cli.ffprobe {
        settings.tools.ffprobe = ffprobe.clone();
    }
    if let Some(registry) = &cli.registry {
        settings.registry_file = registry.clone();
    }

    match &cli.command {
        Commands::Repair(args) if args.no_extract => settings.repair.extract_streams = false,
        Commands::Merge(args) => apply_merge_options(settings, &args.merge),
        Commands::Process(args) => {
            if args.no_extract {
                settings.repair.extract_streams = false;
            }
            apply_merge_options(settings, &args.merge);
        }
        _ => {}
    }
}

fn apply_merge_options(settings: &mut Settings, options: &MergeOptions) {
    if let Some(mode) = &options.mode {
        settings.merge.mode = mode.clone();
    }
    if let Some(duration) = options.crossfade_duration {
        settings.merge.crossfade_duration = duration;
    }
}
