//! # Hasher Module
//!
//! Derives two independent fingerprints for every discovered file:
//!
//! - **Exact digest** - BLAKE3 over the raw bytes, equal only for identical files
//! - **Perceptual signature** - 64-bit average hash over an 8x8 luminance grid
//!
//! ## How It Works
//! 1. Read the whole file once
//! 2. Decode it (format guessed from content, not extension)
//! 3. Compute the signature from the decoded pixels
//! 4. Compute the digest from the bytes already in memory
//!
//! A failure at any step turns into a [`FileOutcome::Failed`] value. Nothing
//! escapes this module as an `Err`.
//!
//! ## Example
//! ```rust,ignore
//! use image_dedup::core::hasher::{FileOutcome, HashComputer};
//!
//! let computer = HashComputer::new();
//! match computer.compute(&file) {
//!     FileOutcome::Hashed(record) => println!("{}", record.signature),
//!     FileOutcome::Failed(error) => eprintln!("{}", error.reason),
//! }
//! ```

mod average;
mod digest;
mod record;
mod traits;

pub use average::AverageHasher;
pub use digest::ContentDigest;
pub use record::{FileError, FileErrorKind, FileOutcome, ImageRecord};
pub use traits::{
    PerceptualSignature, SignatureAlgorithm, GRID_SIZE, SIGNATURE_BITS, SIGNATURE_VERSION,
};

use crate::core::scanner::{DiscoveredFile, ImageFormat};
use crate::error::HashError;
use image::ImageReader;
use std::fs;
use std::io::Cursor;

/// Turns discovered files into image records
pub struct HashComputer {
    algorithm: Box<dyn SignatureAlgorithm>,
}

impl HashComputer {
    /// Hash computer using the average hash
    pub fn new() -> Self {
        Self::with_algorithm(Box::new(AverageHasher::new()))
    }

    pub fn with_algorithm(algorithm: Box<dyn SignatureAlgorithm>) -> Self {
        Self { algorithm }
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Hash one file. Never fails; errors are returned as data.
    pub fn compute(&self, file: &DiscoveredFile) -> FileOutcome {
        match self.try_compute(file) {
            Ok(record) => FileOutcome::Hashed(record),
            Err(error) => {
                tracing::debug!(path = %file.path.display(), %error, "image skipped");
                FileOutcome::Failed(FileError::new(file, &error))
            }
        }
    }

    fn try_compute(&self, file: &DiscoveredFile) -> Result<ImageRecord, HashError> {
        let path = &file.path;
        let bytes = fs::read(path).map_err(|e| HashError::from_io(path.clone(), e))?;

        if bytes.is_empty() {
            return Err(HashError::EmptyImage { path: path.clone() });
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| HashError::from_io(path.clone(), e))?;

        let format = reader
            .format()
            .map(ImageFormat::from_decoded)
            .unwrap_or(ImageFormat::Unknown);

        let image = reader.decode().map_err(|e| HashError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage { path: path.clone() });
        }

        let signature = self.algorithm.hash_image(&image)?;
        let digest = ContentDigest::of_bytes(&bytes);

        Ok(ImageRecord {
            path: path.clone(),
            size: bytes.len() as u64,
            width: image.width(),
            height: image.height(),
            format,
            digest,
            signature,
        })
    }
}

impl Default for HashComputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Luma};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn discovered(path: &Path) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_path_buf(),
            size: fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        }
    }

    fn write_png(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let img = ImageBuffer::from_fn(16, 16, |x, _| Luma([if x < 8 { 0u8 } else { 255 }]));
        DynamicImage::ImageLuma8(img).save(&path).unwrap();
        path
    }

    #[test]
    fn valid_png_produces_record() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "half.png");

        let outcome = HashComputer::new().compute(&discovered(&path));

        let FileOutcome::Hashed(record) = outcome else {
            panic!("expected a record, got {outcome:?}");
        };
        assert_eq!(record.width, 16);
        assert_eq!(record.height, 16);
        assert_eq!(record.format, ImageFormat::Png);
        assert_eq!(record.size, fs::metadata(&path).unwrap().len());
        // Right half bright: each row reads 00001111
        assert_eq!(record.signature.bits(), 0x0F0F_0F0F_0F0F_0F0F);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let outcome = HashComputer::new().compute(&discovered(&path));

        let FileOutcome::Failed(error) = outcome else {
            panic!("expected a failure");
        };
        assert_eq!(error.kind, FileErrorKind::Decode);
        assert!(error.reason.contains("broken.jpg"));
    }

    #[test]
    fn empty_file_is_reported_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        fs::write(&path, b"").unwrap();

        let outcome = HashComputer::new().compute(&discovered(&path));

        assert!(matches!(
            outcome,
            FileOutcome::Failed(FileError { kind: FileErrorKind::EmptyImage, .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let file = DiscoveredFile {
            path: PathBuf::from("/nonexistent/gone.png"),
            size: 10,
        };

        let outcome = HashComputer::new().compute(&file);

        assert!(matches!(
            outcome,
            FileOutcome::Failed(FileError { kind: FileErrorKind::Io, size: 10, .. })
        ));
    }

    #[test]
    fn copies_share_digest_and_signature() {
        let dir = TempDir::new().unwrap();
        let original = write_png(&dir, "a.png");
        let copy = dir.path().join("b.png");
        fs::copy(&original, &copy).unwrap();

        let computer = HashComputer::new();
        let (FileOutcome::Hashed(a), FileOutcome::Hashed(b)) = (
            computer.compute(&discovered(&original)),
            computer.compute(&discovered(&copy)),
        ) else {
            panic!("both copies should hash");
        };

        assert_eq!(a.digest, b.digest);
        assert_eq!(a.signature, b.signature);
    }
}
