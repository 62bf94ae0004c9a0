//! CLI module for MediaMend
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// MediaMend video repair and merge tool
///
/// Repairs damaged video files by escalating from a lossless remux to a full
/// re-encode, and joins numbered multi-part recordings into one file.
#[derive(Parser, Debug)]
#[command(name = "mediamend")]
#[command(about = "MediaMend - Repair damaged videos and merge numbered recordings")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MEDIAMEND_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Console log format (pretty, compact, json)
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: String,

    /// Also write JSON logs to <LOG_DIR>/mediamend.log
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Configuration file (default: ./mediamend.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of files or groups processed concurrently
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Transcoder binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Prober binary
    #[arg(long, global = true)]
    pub ffprobe: Option<String>,

    /// Scan progress registry file
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// Print command summaries as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify media files and record the results in the progress registry
    Scan(args::ScanArgs),
    /// Repair a damaged file, or every damaged file in a directory
    Repair(args::RepairArgs),
    /// Merge numbered sequences found in a directory
    Merge(args::MergeArgs),
    /// Scan, repair faulty files, collect healthy ones and merge sequences
    Process(args::ProcessArgs),
    /// List files recorded with errors
    Report(args::ReportArgs),
}
