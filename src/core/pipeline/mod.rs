//! # Pipeline Module
//!
//! Orchestrates the full duplicate detection workflow.
//!
//! ## Pipeline Stages
//! 1. **Discover** - Walk the root for candidate image files
//! 2. **Hash** - Compute content digest and perceptual signature per file
//! 3. **Group** - Greedy first-fit clustering by signature distance
//! 4. **Select** - Pick the file to keep in each group
//!
//! ## Parallelism
//! Hashing runs on the calling thread by default. [`Parallelism::Parallel`]
//! hashes on a dedicated rayon pool; grouping always runs afterwards, on the
//! outcomes in discovery order, so both modes produce the same groups.

mod control;
mod executor;
mod options;

pub use control::{CancellationToken, ProgressCounter, ProgressSnapshot};
pub use executor::{scan, scan_with_events};
pub use options::{Parallelism, ScanOptions};
