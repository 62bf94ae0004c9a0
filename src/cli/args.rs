//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory (scanned recursively) or single file
    pub input: PathBuf,
}

/// Arguments for the repair command
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// File or directory to repair
    pub input: PathBuf,

    /// Output directory for repaired files
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Run the ladder even for files that are already healthy
    #[arg(long)]
    pub force: bool,

    /// Do not demux raw streams when remux and re-encode fail
    #[arg(long)]
    pub no_extract: bool,
}

/// Merge options shared by merge and process
#[derive(Args, Debug, Clone)]
pub struct MergeOptions {
    /// Merge mode (concat, crossfade)
    #[arg(long)]
    pub mode: Option<String>,

    /// Crossfade length in seconds
    #[arg(long)]
    pub crossfade_duration: Option<f64>,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Directory containing numbered files
    pub input: PathBuf,

    /// Output directory for merged files (default: the input directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub merge: MergeOptions,
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Directory to process
    pub input: PathBuf,

    /// Output directory for repaired, copied and merged files
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Do not demux raw streams when remux and re-encode fail
    #[arg(long)]
    pub no_extract: bool,

    #[command(flatten)]
    pub merge: MergeOptions,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {}
