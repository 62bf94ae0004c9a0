//! Command implementations

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::merge_interactor::MergeSummary;
use crate::app::repair_interactor::RepairReport;
use crate::app::scan_interactor::{find_media_files, ScanSummary};
use crate::cli::args::{MergeArgs, ProcessArgs, RepairArgs, ReportArgs, ScanArgs};
use crate::domain::model::RepairOutcome;
use crate::ports::ScanStatus;
use crate::utils::fs;

/// Execute the scan command
pub async fn scan(container: &DefaultAppContainer, args: ScanArgs, json: bool) -> Result<()> {
    info!("Starting scan of {}", args.input.display());
    let jobs = container.settings().jobs;

    let summary = container
        .scan_interactor()
        .scan(&args.input, true, jobs, container.log())
        .await
        .context("Scan failed")?;

    if json {
        print_json(&summary)?;
    } else {
        display_scan_summary(&summary);
    }
    Ok(())
}

/// Execute the repair command
pub async fn repair(container: &DefaultAppContainer, args: RepairArgs, json: bool) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_media_files(&args.input, args.recursive)
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };
    info!(
        "Repairing {} file(s) into {}",
        files.len(),
        args.output.display()
    );

    let reports = container
        .repair_interactor(&args.output)
        .repair_all(files, args.force, container.settings().jobs, container.log())
        .await;

    if json {
        print_json(&reports)?;
    } else {
        display_repair_reports(&reports);
    }
    Ok(())
}

/// Execute the merge command
pub async fn merge(container: &DefaultAppContainer, args: MergeArgs, json: bool) -> Result<()> {
    if !args.input.is_dir() {
        return Err(anyhow::anyhow!(
            "Input directory does not exist: {}",
            args.input.display()
        ));
    }
    let output = args.output.clone().unwrap_or_else(|| args.input.clone());

    let summary = discover_and_merge(container, &args.input, &output).await?;
    if json {
        print_json(&summary)?;
    } else {
        display_merge_summary(&summary);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProcessSummary {
    scan: ScanSummary,
    repairs: Vec<RepairReport>,
    copied: Vec<PathBuf>,
    merge: MergeSummary,
}

/// Execute the process command: scan, repair, collect, merge
pub async fn process(container: &DefaultAppContainer, args: ProcessArgs, json: bool) -> Result<()> {
    let jobs = container.settings().jobs;
    info!("Processing {} into {}", args.input.display(), args.output.display());

    let scan = container
        .scan_interactor()
        .scan(&args.input, true, jobs, container.log())
        .await
        .context("Scan failed")?;

    fs::ensure_dir(&args.output).with_context(|| {
        format!("Cannot create output directory {}", args.output.display())
    })?;

    let faulty: Vec<PathBuf> = scan.faulty().into_iter().map(Path::to_path_buf).collect();
    info!("Repairing {} faulty file(s)", faulty.len());
    let repairs = container
        .repair_interactor(&args.output)
        .repair_all(faulty, true, jobs, container.log())
        .await;

    let mut copied = Vec::new();
    for source in scan.healthy() {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = args.output.join(name);
        if target == source {
            continue;
        }
        match fs::copy_preserving(source, &target) {
            Ok(_) => copied.push(target),
            Err(e) => warn!("Could not copy {}: {}", source.display(), e),
        }
    }
    info!("Copied {} healthy file(s)", copied.len());

    let merge = discover_and_merge(container, &args.output, &args.output).await?;

    let summary = ProcessSummary {
        scan,
        repairs,
        copied,
        merge,
    };
    if json {
        print_json(&summary)?;
    } else {
        display_scan_summary(&summary.scan);
        display_repair_reports(&summary.repairs);
        println!("Copied healthy files: {}", summary.copied.len());
        display_merge_summary(&summary.merge);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    path: String,
    last_scan: String,
}

/// Execute the report command
pub async fn report(container: &DefaultAppContainer, _args: ReportArgs, json: bool) -> Result<()> {
    let entries: Vec<ReportEntry> = container
        .scan_interactor()
        .registry()
        .entries()
        .await
        .into_iter()
        .filter(|(_, entry)| entry.status == ScanStatus::Error)
        .map(|(path, entry)| ReportEntry {
            path,
            last_scan: entry.last_scan.to_rfc3339(),
        })
        .collect();

    if json {
        print_json(&entries)?;
    } else if entries.is_empty() {
        println!("No files with errors recorded");
    } else {
        println!("Files with errors: {}", entries.len());
        let mut tree = ErrorTree::default();
        for entry in &entries {
            tree.insert(Path::new(&entry.path), &entry.last_scan);
        }
        for line in tree.render() {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Errored files grouped by directory, for the human-readable report
#[derive(Debug, Default)]
struct ErrorTree {
    dirs: BTreeMap<String, ErrorTree>,
    files: Vec<(String, String)>,
}

impl ErrorTree {
    fn insert(&mut self, path: &Path, last_scan: &str) {
        let mut node = self;
        if let Some(parent) = path.parent() {
            for component in parent.components() {
                if let Component::Normal(name) = component {
                    node = node
                        .dirs
                        .entry(name.to_string_lossy().into_owned())
                        .or_default();
                }
            }
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        node.files.push((name, last_scan.to_string()));
    }

    fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(1, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let mut files = self.files.clone();
        files.sort();
        for (name, last_scan) in files {
            lines.push(format!("{}- {} (scanned {})", indent, name, last_scan));
        }
        for (name, child) in &self.dirs {
            lines.push(format!("{}/{}/", indent, name));
            child.render_into(depth + 1, lines);
        }
    }
}

async fn discover_and_merge(
    container: &DefaultAppContainer,
    input: &Path,
    output: &Path,
) -> Result<MergeSummary> {
    let params = container.settings().merge_params()?;
    let log = container.log();

    let discovery = container
        .discover_interactor()
        .discover(input, log.as_ref())
        .await
        .with_context(|| format!("Sequence discovery failed in {}", input.display()))?;
    info!("Found {} sequence(s) to merge", discovery.groups.len());

    Ok(container
        .merge_interactor()
        .merge_discovered(discovery, output, params, container.settings().jobs, log)
        .await)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize summary to JSON")?;
    println!("{}", json);
    Ok(())
}

fn display_scan_summary(summary: &ScanSummary) {
    println!("Scan summary");
    println!("  Processed: {}", summary.processed());
    println!("  Scanned:   {}", summary.scanned());
    println!("  Skipped:   {}", summary.skipped());
    let faulty = summary.faulty();
    println!("  Faulty:    {}", faulty.len());
    for path in faulty {
        println!("    {}", path.display());
    }
}

fn display_repair_reports(reports: &[RepairReport]) {
    println!("Repair summary");
    for report in reports {
        let status = match &report.outcome {
            None => "healthy, untouched".to_string(),
            Some(RepairOutcome::Remuxed { path }) => format!("remuxed -> {}", path.display()),
            Some(RepairOutcome::Reencoded { path }) => format!("re-encoded -> {}", path.display()),
            Some(RepairOutcome::StreamsExtracted { video, .. }) => {
                format!("not repaired, streams salvaged -> {}", video.display())
            }
            Some(RepairOutcome::Unrepairable { last_stage }) => {
                format!("unrepairable (last stage {})", last_stage)
            }
        };
        println!("  {}: {}", report.path.display(), status);
    }
}

fn display_merge_summary(summary: &MergeSummary) {
    println!("Merge summary");
    println!("  Merged: {}", summary.merged.len());
    for path in &summary.merged {
        println!("    {}", path.display());
    }
    println!("  Failed: {}", summary.failed.len());
    for (base, artifact) in &summary.failed {
        match artifact {
            Some(path) => println!("    {} (kept {})", base, path.display()),
            None => println!("    {}", base),
        }
    }
    if !summary.skipped.is_empty() {
        println!("  Skipped: {}", summary.skipped.len());
    }
}
