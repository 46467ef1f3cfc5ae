//! # Scanner Module
//!
//! Discovers candidate image files under a root directory.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - BMP (.bmp)
//! - GIF (.gif)
//! - TIFF (.tiff, .tif)
//! - WebP (.webp)
//!
//! ## Example
//! ```rust,ignore
//! use image_dedup::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! for item in scanner.discover("/Users/photos".as_ref())? {
//!     match item {
//!         Ok(file) => println!("{}", file.path.display()),
//!         Err(warning) => eprintln!("skipped: {warning}"),
//!     }
//! }
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, SUPPORTED_EXTENSIONS};
pub use walker::{Discovery, ScanConfig, WalkDirScanner};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A candidate image file found during discovery. No hashing has happened yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// A non-fatal problem met while walking the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// One step of discovery: a file, or a skipped entry
pub type DiscoveryItem = Result<DiscoveredFile, DiscoveryWarning>;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
    WebP,
    Unknown,
}

impl ImageFormat {
    /// Format reported by the decoder, which may disagree with the extension
    pub fn from_decoded(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::Tiff => ImageFormat::Tiff,
            image::ImageFormat::WebP => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_format_maps_to_supported() {
        assert_eq!(
            ImageFormat::from_decoded(image::ImageFormat::Png),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_decoded(image::ImageFormat::Ico),
            ImageFormat::Unknown
        );
    }
}
