//! # Core Module
//!
//! The GUI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Discovers image files under a root
//! - `hasher` - Computes content digests and perceptual signatures
//! - `comparator` - Groups records by signature distance
//! - `selection` - Picks the file to keep in each group
//! - `result` - The frozen scan result and its aggregator
//! - `pipeline` - Orchestrates the full workflow
//! - `deletion` - Applies delete recommendations, dry run by default

pub mod comparator;
pub mod deletion;
pub mod hasher;
pub mod pipeline;
pub mod result;
pub mod scanner;
pub mod selection;

// Re-export commonly used types
pub use comparator::MatchType;
pub use deletion::{apply_deletions, DeletionMode, DeletionReport};
pub use hasher::{ImageRecord, PerceptualSignature};
pub use pipeline::{scan, scan_with_events, CancellationToken, Parallelism, ScanOptions};
pub use result::{ScanResult, ScanStatus};
pub use selection::DuplicateGroup;
