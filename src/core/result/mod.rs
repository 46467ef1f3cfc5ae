//! # Result Module
//!
//! The write-once [`ScanResult`] handed to CLI, GUI and export layers, and
//! the [`ResultAggregator`] that builds it during a scan.

use crate::core::hasher::{FileError, FileOutcome, ImageRecord, SIGNATURE_VERSION};
use crate::core::scanner::DiscoveryWarning;
use crate::core::selection::DuplicateGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Every discovered file was handled
    Complete,
    /// Stopped early on request; totals cover only the handled files
    Cancelled,
}

/// Final, plain-data outcome of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Canonical scan root
    pub root: PathBuf,
    pub threshold: u32,
    pub signature_version: u32,
    pub status: ScanStatus,
    /// Image files found by discovery
    pub total_discovered: usize,
    /// Files hashed successfully
    pub total_processed: usize,
    /// Files that could not be hashed
    pub total_errored: usize,
    pub errors: Vec<FileError>,
    /// Entries skipped during discovery
    pub warnings: Vec<DiscoveryWarning>,
    pub groups: Vec<DuplicateGroup>,
    /// Number of delete recommendations across all groups
    pub files_reclaimable: usize,
    /// Total size of all delete recommendations
    pub bytes_reclaimable: u64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScanResult {
    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }

    /// Discovered files never reached because of cancellation
    pub fn total_skipped(&self) -> usize {
        self.total_discovered
            .saturating_sub(self.total_processed + self.total_errored)
    }

    /// Every delete recommendation, group by group
    pub fn delete_candidates(&self) -> Vec<PathBuf> {
        self.groups
            .iter()
            .flat_map(|g| g.delete.iter().cloned())
            .collect()
    }
}

/// Collects per-file outcomes while a scan runs
pub struct ResultAggregator {
    root: PathBuf,
    threshold: u32,
    started_at: DateTime<Utc>,
    clock: Instant,
    total_discovered: usize,
    records: Vec<ImageRecord>,
    errors: Vec<FileError>,
    warnings: Vec<DiscoveryWarning>,
}

impl ResultAggregator {
    pub fn new(root: &Path, threshold: u32) -> Self {
        Self {
            root: root.to_path_buf(),
            threshold,
            started_at: Utc::now(),
            clock: Instant::now(),
            total_discovered: 0,
            records: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_warning(&mut self, warning: DiscoveryWarning) {
        self.warnings.push(warning);
    }

    pub fn set_discovered(&mut self, total: usize) {
        self.total_discovered = total;
    }

    pub fn record_outcome(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Hashed(record) => self.records.push(record),
            FileOutcome::Failed(error) => self.errors.push(error),
        }
    }

    /// Successfully hashed records, in the order they were recorded
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Files handled so far, successful or not
    pub fn handled(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    /// Freeze the result
    pub fn finish(self, groups: Vec<DuplicateGroup>, status: ScanStatus) -> ScanResult {
        let files_reclaimable = groups.iter().map(|g| g.delete.len()).sum();
        let bytes_reclaimable = groups.iter().map(|g| g.bytes_reclaimable).sum();

        ScanResult {
            root: self.root,
            threshold: self.threshold,
            signature_version: SIGNATURE_VERSION,
            status,
            total_discovered: self.total_discovered,
            total_processed: self.records.len(),
            total_errored: self.errors.len(),
            errors: self.errors,
            warnings: self.warnings,
            groups,
            files_reclaimable,
            bytes_reclaimable,
            started_at: self.started_at,
            duration_ms: self.clock.elapsed().as_millis() as u64,
        }
    }
}
