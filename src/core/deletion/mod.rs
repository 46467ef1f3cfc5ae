//! # Deletion Module
//!
//! The explicit, separate step that acts on a scan's delete recommendations.
//! A scan never touches the filesystem; this is the only code that removes
//! files, and in [`DeletionMode::DryRun`] it only reports what it would do.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Whether files are actually removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeletionMode {
    #[default]
    DryRun,
    Delete,
}

/// What happened to one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionStatus {
    /// Dry run: the file exists and would be removed
    WouldDelete { bytes: u64 },
    Deleted { bytes: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub status: DeletionStatus,
}

/// Per-path outcomes of one batch, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub mode: DeletionMode,
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    /// Files removed, or that would be removed in a dry run
    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, DeletionStatus::Failed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    /// Bytes freed, or that would be freed in a dry run
    pub fn bytes_freed(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                DeletionStatus::WouldDelete { bytes } | DeletionStatus::Deleted { bytes } => bytes,
                DeletionStatus::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> + '_ {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeletionStatus::Failed { .. }))
    }
}

/// Apply (or rehearse) deletion of `paths`.
///
/// One failing path never stops the batch. Only regular files are removed.
pub fn apply_deletions<P: AsRef<Path>>(paths: &[P], mode: DeletionMode) -> DeletionReport {
    let outcomes: Vec<DeletionOutcome> = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            DeletionOutcome {
                path: path.to_path_buf(),
                status: delete_one(path, mode),
            }
        })
        .collect();

    let report = DeletionReport { mode, outcomes };
    info!(
        ?mode,
        succeeded = report.succeeded_count(),
        failed = report.failed_count(),
        bytes = report.bytes_freed(),
        "deletion batch finished"
    );
    report
}

fn delete_one(path: &Path, mode: DeletionMode) -> DeletionStatus {
    // symlink_metadata so a link is never followed to its target
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => return failed(path, e.to_string()),
    };

    if !metadata.is_file() {
        return failed(path, "not a regular file".to_string());
    }

    let bytes = metadata.len();
    match mode {
        DeletionMode::DryRun => DeletionStatus::WouldDelete { bytes },
        DeletionMode::Delete => match fs::remove_file(path) {
            Ok(()) => DeletionStatus::Deleted { bytes },
            Err(e) => failed(path, e.to_string()),
        },
    }
}

fn failed(path: &Path, reason: String) -> DeletionStatus {
    warn!(path = %path.display(), %reason, "could not delete");
    DeletionStatus::Failed { reason }
}
