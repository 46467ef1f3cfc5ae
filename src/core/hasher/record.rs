//! Per-file outcomes of the Hash Computer.

use super::digest::ContentDigest;
use super::traits::PerceptualSignature;
use crate::core::scanner::{DiscoveredFile, ImageFormat};
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity and fingerprints of one successfully hashed image.
///
/// The path is the unique key. Records are never modified once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    /// Size in bytes of the content that was hashed
    pub size: u64,
    pub width: u32,
    pub height: u32,
    /// Format detected from the file content
    pub format: ImageFormat,
    pub digest: ContentDigest,
    pub signature: PerceptualSignature,
}

/// Why a file could not be hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileErrorKind {
    Io,
    PermissionDenied,
    Decode,
    EmptyImage,
}

/// A file that was discovered but could not be hashed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub path: PathBuf,
    /// Size reported at discovery time
    pub size: u64,
    pub kind: FileErrorKind,
    pub reason: String,
}

impl FileError {
    pub fn new(file: &DiscoveredFile, error: &HashError) -> Self {
        let kind = match error {
            HashError::Io { .. } => FileErrorKind::Io,
            HashError::PermissionDenied { .. } => FileErrorKind::PermissionDenied,
            HashError::Decode { .. } => FileErrorKind::Decode,
            HashError::EmptyImage { .. } => FileErrorKind::EmptyImage,
        };

        Self {
            path: file.path.clone(),
            size: file.size,
            kind,
            reason: error.to_string(),
        }
    }
}

/// Result of hashing one file: a record, or the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileOutcome {
    Hashed(ImageRecord),
    Failed(FileError),
}
