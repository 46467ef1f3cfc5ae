//! # Error Module
//!
//! Error types for the duplicate image engine.
//!
//! ## Taxonomy
//! - **Fatal** - the scan root is missing or not a directory ([`ScanError`])
//! - **Per-file** - a single image could not be read or decoded ([`HashError`]).
//!   These are turned into data on the scan result and never abort a scan.
//! - **Cancellation** is not an error; it yields a partial result.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize scan result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fatal errors that reject a scan before any file is processed
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to resolve scan root {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while hashing a single image
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Permission denied reading: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },
}

impl HashError {
    /// Build an I/O error, singling out permission problems
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            HashError::PermissionDenied { path }
        } else {
            HashError::Io { path, source }
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn permission_denied_io_is_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let error = HashError::from_io(PathBuf::from("/locked.png"), io);
        assert!(matches!(error, HashError::PermissionDenied { .. }));
    }

    #[test]
    fn scan_error_converts_into_top_level() {
        let error: DedupError = ScanError::NotADirectory {
            path: PathBuf::from("/photos/file.jpg"),
        }
        .into();
        assert!(error.to_string().starts_with("Scanning error"));
    }
}
