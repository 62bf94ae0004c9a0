// Discover interactor - Finds numbered runs of files that can be merged

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::app::oracle::DiagnosticOracle;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// `<base>[_]<digits>.<ext>`, the base taken as short as possible
static SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(.+?)_?(\d+)\.({})$",
        SEQUENCE_EXTENSIONS.join("|")
    ))
    .unwrap()
});

/// Split a file name into sequence base and ordinal
pub fn parse_sequence_name(file_name: &str) -> Option<(String, u64)> {
    let captures = SEQUENCE_RE.captures(file_name)?;
    let ordinal = captures.get(2)?.as_str().parse().ok()?;
    Some((captures.get(1)?.as_str().to_string(), ordinal))
}

/// Why a base name did not become a merge candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    SingleFile,
    NotConsecutive(Vec<u64>),
    FaultyMember(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSequence {
    pub base_name: String,
    pub reason: SkipReason,
}

/// Candidate groups keyed by base name, plus everything that was rejected
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Discovery {
    pub groups: BTreeMap<String, SequenceGroup>,
    pub skipped: Vec<SkippedSequence>,
}

/// Interactor for sequence discovery
pub struct DiscoverInteractor {
    oracle: Arc<DiagnosticOracle>,
}

impl DiscoverInteractor {
    pub fn new(oracle: Arc<DiagnosticOracle>) -> Self {
        Self { oracle }
    }

    /// Group the files directly inside `dir` by sequence base.
    ///
    /// A group survives when it has at least two members, its ordinals are
    /// consecutive, and every member passes the oracle. Validation stops at
    /// the first faulty member.
    pub async fn discover(&self, dir: &Path, log: &dyn LogPort) -> Result<Discovery, DomainError> {
        let mut by_base: BTreeMap<String, Vec<(u64, PathBuf)>> = BTreeMap::new();
        for path in list_files(dir)? {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if let Some((base, ordinal)) = parse_sequence_name(&name) {
                by_base.entry(base).or_default().push((ordinal, path));
            }
        }

        let mut discovery = Discovery::default();
        for (base, mut members) in by_base {
            members.sort();
            let ordinals: Vec<u64> = members.iter().map(|(ordinal, _)| *ordinal).collect();

            if members.len() < 2 {
                log.debug(&format!("'{}' has a single file; nothing to merge", base));
                discovery.skip(base, SkipReason::SingleFile);
                continue;
            }
            if !is_contiguous(&ordinals) {
                log.warn(&format!(
                    "'{}' is not a consecutive sequence {:?}; skipping",
                    base, ordinals
                ));
                discovery.skip(base, SkipReason::NotConsecutive(ordinals));
                continue;
            }

            let mut faulty = None;
            for (_, path) in &members {
                if !self.oracle.is_healthy(path, log).await {
                    faulty = Some(path.clone());
                    break;
                }
            }
            if let Some(path) = faulty {
                log.warn(&format!(
                    "'{}' has a faulty member {}; skipping",
                    base,
                    path.display()
                ));
                discovery.skip(base, SkipReason::FaultyMember(path));
                continue;
            }

            let files = members
                .into_iter()
                .map(|(ordinal, path)| (ordinal, MediaFile::new(path).with_health(Health::Healthy)))
                .collect();
            let group = SequenceGroup::new(base.clone(), files)?;
            log.info(&format!(
                "Found sequence '{}' with {} files",
                base,
                group.len()
            ));
            discovery.groups.insert(base, group);
        }

        Ok(discovery)
    }
}

impl Discovery {
    fn skip(&mut self, base_name: String, reason: SkipReason) {
        self.skipped.push(SkippedSequence { base_name, reason });
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DomainError::FsFail(format!("Cannot read directory {}: {}", dir.display(), e))
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
