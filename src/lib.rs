//! # Image Dedup
//!
//! Finds groups of visually similar images under a directory and recommends
//! which copy of each group to keep.
//!
//! ## Core Philosophy
//! - **Scans never mutate** - Deleting is a separate, explicit step
//! - **Explain matches** - Every group member records how it joined
//! - **Deterministic** - The same tree and threshold give the same groups
//!
//! ## Architecture
//! - `core` - The duplicate detection engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the application.
///
/// Called by the binary, never by the library. `RUST_LOG` takes precedence
/// over `verbose`. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
