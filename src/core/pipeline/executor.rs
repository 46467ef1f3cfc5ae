//! Pipeline execution implementation.

use super::options::{Parallelism, ScanOptions};
use crate::core::comparator::{ComparisonStrategy, GreedyGrouper, ThresholdStrategy};
use crate::core::hasher::{FileOutcome, HashComputer};
use crate::core::result::{ResultAggregator, ScanResult, ScanStatus};
use crate::core::scanner::{DiscoveredFile, WalkDirScanner};
use crate::core::selection::{select_groups, LargestFilePolicy};
use crate::error::ScanError;
use crate::events::{
    null_sender, Event, EventSender, GroupEvent, HashEvent, HashProgress, PipelineEvent,
    PipelinePhase, PipelineSummary, ScanEvent,
};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Scan `root` for duplicate images.
///
/// Only an unusable root is an error. Unreadable files and skipped
/// directories are reported inside the result, and cancellation returns a
/// partial result marked [`ScanStatus::Cancelled`].
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    scan_with_events(root, options, &null_sender())
}

/// Same as [`scan`], reporting progress on `events`
pub fn scan_with_events(
    root: &Path,
    options: &ScanOptions,
    events: &EventSender,
) -> Result<ScanResult, ScanError> {
    events.send(Event::Pipeline(PipelineEvent::Started));

    // Phase 1: Discovery
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Discovering,
    }));

    let discovery = WalkDirScanner::new(options.discovery.clone()).discover(root)?;
    let root = discovery.root().to_path_buf();
    info!(root = %root.display(), threshold = options.threshold, "scan started");
    events.send(Event::Scan(ScanEvent::Started { root: root.clone() }));

    let mut aggregator = ResultAggregator::new(&root, options.threshold);
    let mut files = Vec::new();
    let mut interrupted = false;
    for item in discovery {
        if options.cancellation.is_cancelled() {
            interrupted = true;
            break;
        }
        match item {
            Ok(file) => files.push(file),
            Err(warning) => {
                warn!(path = %warning.path.display(), message = %warning.message, "entry skipped");
                events.send(Event::Scan(ScanEvent::Warning {
                    path: warning.path.clone(),
                    message: warning.message.clone(),
                }));
                aggregator.record_warning(warning);
            }
        }
    }

    let total = files.len();
    aggregator.set_discovered(total);
    options.progress.reset(total);
    debug!(total, "discovery finished");
    events.send(Event::Scan(ScanEvent::Completed { total_files: total }));

    // Phase 2: Hashing
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Hashing,
    }));
    events.send(Event::Hash(HashEvent::Started { total_files: total }));

    let outcomes = if interrupted {
        Vec::new()
    } else {
        hash_files(&files, options, events)
    };
    let cancelled = interrupted || outcomes.len() < total;
    for outcome in outcomes {
        aggregator.record_outcome(outcome);
    }

    let errored = aggregator.handled() - aggregator.records().len();
    events.send(Event::Hash(HashEvent::Completed {
        processed: aggregator.records().len(),
        errored,
    }));

    // Phase 3: Grouping, over whatever was hashed
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Grouping,
    }));
    events.send(Event::Group(GroupEvent::Started {
        total_records: aggregator.records().len(),
    }));

    let strategy = ThresholdStrategy::new(options.threshold);
    debug!(strategy = %strategy.description(), "grouping");
    let grouper = GreedyGrouper::new(strategy);
    let candidates = grouper.group(aggregator.records().iter().cloned());

    // Phase 4: Selection
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Selecting,
    }));
    let groups = select_groups(candidates, &LargestFilePolicy);

    let status = if cancelled {
        ScanStatus::Cancelled
    } else {
        ScanStatus::Complete
    };
    let result = aggregator.finish(groups, status);

    events.send(Event::Group(GroupEvent::Completed {
        total_groups: result.groups.len(),
        files_reclaimable: result.files_reclaimable,
    }));

    if cancelled {
        info!(
            processed = result.total_processed + result.total_errored,
            total, "scan cancelled"
        );
        events.send(Event::Pipeline(PipelineEvent::Cancelled {
            processed: result.total_processed + result.total_errored,
            total,
        }));
    } else {
        info!(
            files = total,
            groups = result.groups.len(),
            errored = result.total_errored,
            duration_ms = result.duration_ms,
            "scan completed"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: total,
                duplicate_groups: result.groups.len(),
                files_reclaimable: result.files_reclaimable,
                bytes_reclaimable: result.bytes_reclaimable,
                duration_ms: result.duration_ms,
            },
        }));
    }

    Ok(result)
}

/// Hash files in discovery order, stopping at the first cancellation check
/// that fails. Outcomes come back in the same order as `files`.
fn hash_files(
    files: &[DiscoveredFile],
    options: &ScanOptions,
    events: &EventSender,
) -> Vec<FileOutcome> {
    let hasher = HashComputer::new();
    let total = files.len();
    debug!(algorithm = hasher.algorithm_name(), total, "hashing started");

    let hash_one = |file: &DiscoveredFile| -> Option<FileOutcome> {
        if options.cancellation.is_cancelled() {
            return None;
        }

        let outcome = hasher.compute(file);
        let completed = options.progress.increment();

        if let FileOutcome::Failed(error) = &outcome {
            events.send(Event::Hash(HashEvent::Error {
                path: error.path.clone(),
                message: error.reason.clone(),
            }));
        }
        events.send(Event::Hash(HashEvent::Progress(HashProgress {
            completed,
            total,
            current_path: file.path.clone(),
        })));

        Some(outcome)
    };

    let sequential = || files.iter().map_while(&hash_one).collect::<Vec<_>>();

    match options.parallelism {
        Parallelism::Sequential => sequential(),
        Parallelism::Parallel { workers } => {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => {
                    debug!(workers, "hashing in parallel");
                    let outcomes: Vec<Option<FileOutcome>> =
                        pool.install(|| files.par_iter().map(&hash_one).collect());
                    outcomes.into_iter().flatten().collect()
                }
                Err(error) => {
                    warn!(%error, "worker pool unavailable, hashing sequentially");
                    sequential()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::CancellationToken;
    use crate::events::EventChannel;
    use image::{GrayImage, Luma};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, value: u8) -> PathBuf {
        let path = dir.path().join(name);
        GrayImage::from_pixel(16, 16, Luma([value]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn empty_directory_gives_empty_complete_result() {
        let temp_dir = TempDir::new().unwrap();

        let result = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert!(result.is_complete());
        assert_eq!(result.total_discovered, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn identical_copies_form_one_group() {
        let temp_dir = TempDir::new().unwrap();
        let original = write_png(&temp_dir, "a.png", 200);
        std::fs::copy(&original, temp_dir.path().join("b.png")).unwrap();

        let result = scan(temp_dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].members.len(), 2);
        assert_eq!(result.files_reclaimable, 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let err = scan(&missing, &ScanOptions::default()).unwrap_err();

        assert!(matches!(err, ScanError::DirectoryNotFound { .. }));
    }

    #[test]
    fn pre_cancelled_scan_is_partial() {
        let temp_dir = TempDir::new().unwrap();
        write_png(&temp_dir, "a.png", 10);
        write_png(&temp_dir, "b.png", 10);

        let token = CancellationToken::new();
        token.cancel();
        let options = ScanOptions::new().cancellation(token);

        let result = scan(temp_dir.path(), &options).unwrap();

        assert!(!result.is_complete());
        assert_eq!(result.total_processed, 0);
        assert!(result.groups.is_empty());
    }

    #[test]
    fn progress_reaches_total() {
        let temp_dir = TempDir::new().unwrap();
        write_png(&temp_dir, "a.png", 10);
        write_png(&temp_dir, "b.png", 90);
        std::fs::write(temp_dir.path().join("c.png"), b"broken").unwrap();

        let options = ScanOptions::default();
        let result = scan(temp_dir.path(), &options).unwrap();

        let snapshot = options.progress.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.processed, 3);
        assert_eq!(result.total_errored, 1);
    }

    #[test]
    fn events_bracket_the_scan() {
        let temp_dir = TempDir::new().unwrap();
        write_png(&temp_dir, "a.png", 10);

        let (sender, receiver) = EventChannel::new();
        scan_with_events(temp_dir.path(), &ScanOptions::default(), &sender).unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert!(matches!(events.first(), Some(Event::Pipeline(PipelineEvent::Started))));
        assert!(matches!(
            events.last(),
            Some(Event::Pipeline(PipelineEvent::Completed { .. }))
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Hash(HashEvent::Progress(p)) if p.completed == 1)));
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let temp_dir = TempDir::new().unwrap();
        for (i, value) in [10u8, 10, 200, 200, 90].iter().enumerate() {
            write_png(&temp_dir, &format!("{i}.png"), *value);
        }

        let sequential = scan(temp_dir.path(), &ScanOptions::default()).unwrap();
        let parallel = scan(
            temp_dir.path(),
            &ScanOptions::new().parallelism(Parallelism::Parallel { workers: 3 }),
        )
        .unwrap();

        assert_eq!(sequential.groups, parallel.groups);
    }
}
