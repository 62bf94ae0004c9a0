//! MediaMend CLI
//!
//! Repairs damaged video files and merges numbered multi-part recordings.
//!
//! # Usage
//!
//! ```bash
//! mediamend scan /videos
//! mediamend repair /videos/broken.mp4 --output repaired
//! mediamend merge /videos --mode crossfade --crossfade-duration 1.5
//! mediamend process /videos --output output
//! mediamend report
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mediamend::app::container::DefaultAppContainer;
use mediamend::cli::{commands, Cli, Commands};
use mediamend::config_initialization::initialize_configuration_hierarchy;
use mediamend::ports::LogLevel;
use mediamend::utils::logging::{init_logging, LogFormat, LoggingConfig};

/// Main entry point for the MediaMend CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig {
        level: LogLevel::parse(&cli.log_level)?,
        format: LogFormat::parse(&cli.log_format)?,
        log_dir: cli.log_dir.clone(),
    })
    .context("Failed to initialize logging")?;

    info!("Starting MediaMend {}", env!("CARGO_PKG_VERSION"));

    let settings = initialize_configuration_hierarchy(&cli)?;
    let container =
        DefaultAppContainer::new(settings).context("Failed to initialize application")?;

    match cli.command {
        Commands::Scan(args) => commands::scan(&container, args, cli.json).await?,
        Commands::Repair(args) => commands::repair(&container, args, cli.json).await?,
        Commands::Merge(args) => commands::merge(&container, args, cli.json).await?,
        Commands::Process(args) => commands::process(&container, args, cli.json).await?,
        Commands::Report(args) => commands::report(&container, args, cli.json).await?,
    }

    info!("MediaMend completed");
    Ok(())
}
