//! # image-dedup CLI
//!
//! Command-line interface for the duplicate image engine.
//!
//! ## Usage
//! ```bash
//! image-dedup scan ~/Pictures --threshold 8
//! image-dedup scan ~/Pictures --format json --save report.json
//! ```

mod cli;

use image_dedup::Result;

fn main() -> Result<()> {
    cli::run()
}
