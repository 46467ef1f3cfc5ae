//! # CLI Module
//!
//! Command-line interface for the duplicate image engine.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for duplicates (dry run)
//! image-dedup scan ~/Pictures
//!
//! # Stricter matching, all cores
//! image-dedup scan ~/Pictures --threshold 2 --parallel
//!
//! # Save a JSON report
//! image-dedup scan ~/Pictures --save report.json
//!
//! # Delete the recommended files after confirming
//! image-dedup scan ~/Pictures --no-dry-run
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_dedup::core::comparator::ThresholdStrategy;
use image_dedup::core::deletion::{apply_deletions, DeletionMode, DeletionReport, DeletionStatus};
use image_dedup::core::pipeline::{scan_with_events, Parallelism, ScanOptions};
use image_dedup::core::result::ScanResult;
use image_dedup::core::selection::{KeepPolicy, LargestFilePolicy};
use image_dedup::error::{DedupError, Result};
use image_dedup::events::{Event, EventChannel, HashEvent, PipelineEvent, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Image Dedup - find visually similar images and reclaim the space
#[derive(Parser, Debug)]
#[command(name = "image-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory for duplicate images
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Maximum signature distance for a match (lower = stricter, 0-64)
        #[arg(short, long, default_value_t = ThresholdStrategy::DEFAULT_THRESHOLD)]
        threshold: u32,

        /// Hash files on all available cores
        #[arg(short, long)]
        parallel: bool,

        /// Number of hashing threads (implies --parallel)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,

        /// Save the full report as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Actually delete the recommended files (asks first)
        #[arg(long)]
        no_dry_run: bool,

        /// Skip the confirmation prompt with --no-dry-run
        #[arg(short, long)]
        yes: bool,

        /// Include hidden files and directories (default)
        #[arg(long, overrides_with = "skip_hidden")]
        include_hidden: bool,

        /// Skip hidden files and directories
        #[arg(long)]
        skip_hidden: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (delete candidates only)
    Minimal,
}

/// Settings of one CLI run, as recorded in a saved report
struct RunSettings {
    root: PathBuf,
    options: ScanOptions,
    format: OutputFormat,
    save: Option<PathBuf>,
    mode: DeletionMode,
    assume_yes: bool,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            threshold,
            parallel,
            jobs,
            format,
            save,
            no_dry_run,
            yes,
            include_hidden: _,
            skip_hidden,
            verbose,
        } => {
            image_dedup::init_tracing(verbose);

            let parallelism = match jobs {
                Some(workers) => Parallelism::Parallel { workers },
                None if parallel => Parallelism::parallel(),
                None => Parallelism::Sequential,
            };

            let options = ScanOptions::new()
                .threshold(threshold)
                .parallelism(parallelism)
                .include_hidden(!skip_hidden);
            options.validate()?;

            run_scan(RunSettings {
                root: path,
                options,
                format,
                save,
                mode: if no_dry_run {
                    DeletionMode::Delete
                } else {
                    DeletionMode::DryRun
                },
                assume_yes: yes,
                verbose,
            })
        }
    }
}

fn run_scan(settings: RunSettings) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(settings.format, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Image Dedup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if pretty {
        let pb = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(bar_style);
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = settings.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let scanned = scan_with_events(&settings.root, &settings.options, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = scanned?;

    match settings.format {
        OutputFormat::Pretty => print_pretty_results(&term, &result, settings.verbose),
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    if let Some(ref path) = settings.save {
        save_report(path, &result, &settings)?;
        if pretty {
            term.write_line(&format!(
                "  Results saved to {}",
                style(display_path(path)).cyan()
            ))
            .ok();
        }
    }

    handle_deletion(&term, &result, &settings)
}

fn handle_deletion(term: &Term, result: &ScanResult, settings: &RunSettings) -> Result<()> {
    let candidates = result.delete_candidates();
    if candidates.is_empty() {
        return Ok(());
    }

    if settings.mode == DeletionMode::DryRun {
        if matches!(settings.format, OutputFormat::Pretty) {
            term.write_line(&format!(
                "{}",
                style("This was a dry run. No files were deleted. Run with --no-dry-run to delete.")
                    .dim()
            ))
            .ok();
        }
        return Ok(());
    }

    if !result.is_complete() {
        term.write_line(&format!(
            "{} Scan did not complete, refusing to delete",
            style("!").red().bold()
        ))
        .ok();
        return Ok(());
    }

    if !settings.assume_yes && !confirm(term, candidates.len(), result.bytes_reclaimable)? {
        term.write_line("Deletion cancelled.").ok();
        return Ok(());
    }

    let report = apply_deletions(&candidates, DeletionMode::Delete);
    print_deletion_report(term, &report);
    Ok(())
}

fn confirm(term: &Term, count: usize, bytes: u64) -> Result<bool> {
    term.write_str(&format!(
        "Delete {} duplicate files ({})? (y/N): ",
        count,
        format_bytes(bytes)
    ))
    .ok();

    let answer = term.read_line().map_err(|source| DedupError::Io {
        path: PathBuf::from("<stdin>"),
        source,
    })?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_deletion_report(term: &Term, report: &DeletionReport) {
    term.write_line(&format!(
        "{} Deleted {} files, freed {}",
        style("✓").green().bold(),
        style(report.succeeded_count()).cyan(),
        style(format_bytes(report.bytes_freed())).yellow()
    ))
    .ok();

    if report.failed_count() > 0 {
        term.write_line(&format!(
            "  {} {} files could not be deleted:",
            style("!").red().bold(),
            report.failed_count()
        ))
        .ok();
        for outcome in report.failures() {
            if let DeletionStatus::Failed { ref reason } = outcome.status {
                term.write_line(&format!("    {}: {}", display_path(&outcome.path), reason))
                    .ok();
            }
        }
    }
}

fn print_pretty_results(term: &Term, result: &ScanResult, verbose: bool) {
    term.write_line("").ok();
    if result.is_complete() {
        term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
            .ok();
    } else {
        term.write_line(&format!(
            "{} Scan Cancelled, {} of {} files processed, {} not reached",
            style("!").yellow().bold(),
            result.total_processed + result.total_errored,
            result.total_discovered,
            result.total_skipped()
        ))
        .ok();
    }
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(result.total_discovered).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if result.total_errored > 0 {
        term.write_line(&format!(
            "  {} images could not be read",
            style(result.total_errored).red()
        ))
        .ok();
    }

    term.write_line(&format!(
        "  {} duplicate groups found",
        style(result.groups.len()).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} files recommended for deletion",
        style(result.files_reclaimable).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(result.bytes_reclaimable)).yellow()
    ))
    .ok();

    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for group in &result.groups {
            term.write_line(&format!(
                "  {} {} ({} images, {})",
                style(format!("Group {}:", group.id)).bold(),
                style(format!("{}", group.match_type)).yellow(),
                group.members.len(),
                format_bytes(group.bytes_reclaimable)
            ))
            .ok();

            for member in &group.members {
                let marker = if member.record.path == group.keep {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };

                let details = if verbose {
                    format!(
                        "{}, {}, {}x{}",
                        format_bytes(member.record.size),
                        member.record.format,
                        member.record.width,
                        member.record.height
                    )
                } else {
                    format_bytes(member.record.size)
                };

                term.write_line(&format!(
                    "    {} {} ({})",
                    marker,
                    display_path(&member.record.path),
                    details
                ))
                .ok();
            }

            if verbose {
                let kept = group
                    .keep_record()
                    .map(|r| display_path(&r.path))
                    .unwrap_or_default();
                term.write_line(&format!(
                    "    {} {}",
                    style("Recommended:").dim(),
                    style(format!(
                        "keep {}, delete {} ({})",
                        kept,
                        group.duplicate_count(),
                        LargestFilePolicy.description()
                    ))
                    .dim()
                ))
                .ok();
            }

            term.write_line("").ok();
        }
    }

    if verbose && !result.errors.is_empty() {
        term.write_line(&format!("{}", style("Unreadable Files:").bold().underlined()))
            .ok();
        for error in &result.errors {
            term.write_line(&format!(
                "    {} {}",
                style("✗").red(),
                display_path(&error.path)
            ))
            .ok();
            term.write_line(&format!("      {}", style(&error.reason).dim()))
                .ok();
        }
        term.write_line("").ok();
    }
}

fn print_json_results(result: &ScanResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn print_minimal_results(result: &ScanResult) {
    for path in result.delete_candidates() {
        println!("{}", path.display());
    }
}

/// Write the scan report together with the settings it ran with
fn save_report(path: &Path, result: &ScanResult, settings: &RunSettings) -> Result<()> {
    let report = serde_json::json!({
        "stats": {
            "total_discovered": result.total_discovered,
            "total_processed": result.total_processed,
            "total_errored": result.total_errored,
            "duplicate_groups": result.groups.len(),
            "files_reclaimable": result.files_reclaimable,
            "bytes_reclaimable": result.bytes_reclaimable,
            "duration_ms": result.duration_ms,
            "status": result.status,
        },
        "groups": result.groups,
        "errors": result.errors,
        "warnings": result.warnings,
        "settings": {
            "directory": result.root,
            "threshold": result.threshold,
            "signature_version": result.signature_version,
            "dry_run": settings.mode == DeletionMode::DryRun,
            "include_hidden": settings.options.discovery.include_hidden,
            "started_at": result.started_at,
        },
    });

    let json = serde_json::to_string_pretty(&report)?;
    fs::write(path, json).map_err(|source| DedupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(&home).ok().map(Path::to_path_buf))
        .map(|relative| format!("~/{}", relative.display()))
        .unwrap_or_else(|| path.display().to_string())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let cli = Cli::try_parse_from(["image-dedup", "scan", "/photos"]).unwrap();
        let Commands::Scan {
            threshold,
            parallel,
            no_dry_run,
            skip_hidden,
            ..
        } = cli.command;

        assert_eq!(threshold, 5);
        assert!(!parallel);
        assert!(!no_dry_run);
        assert!(!skip_hidden);
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(2_202_010), "2.1 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn paths_outside_home_are_unchanged() {
        assert_eq!(display_path(Path::new("/definitely/not/home.jpg")), "/definitely/not/home.jpg");
    }
}
