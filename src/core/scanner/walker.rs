//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{DiscoveredFile, DiscoveryItem, DiscoveryWarning};
use crate::error::ScanError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links. Loops are detected and reported.
    /// When false, symlinked files are not discovered at all.
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
#[derive(Debug, Clone)]
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Start a lazy walk of `root`.
    ///
    /// Fails only when the root is missing or not a directory. Entries are
    /// visited in file-name order so an unchanged tree is always walked
    /// the same way.
    pub fn discover(&self, root: &Path) -> Result<Discovery, ScanError> {
        let root = validate_root(root)?;

        let mut walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(Discovery {
            root,
            entries: walker.into_iter(),
            filter: self.filter.clone(),
            follow_symlinks: self.config.follow_symlinks,
            seen: HashMap::new(),
        })
    }
}

/// Resolve the scan root to an absolute directory path
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    if !root.exists() {
        return Err(ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    fs::canonicalize(root).map_err(|source| ScanError::Canonicalize {
        path: root.to_path_buf(),
        source,
    })
}

/// Lazy, single-pass sequence of discovered files and warnings.
///
/// Every underlying file is yielded at most once. A second path to a file
/// already seen (a followed symlink or a hard link) becomes a warning, so no
/// group can pair a file with itself.
pub struct Discovery {
    root: PathBuf,
    entries: walkdir::IntoIter,
    filter: ImageFilter,
    follow_symlinks: bool,
    seen: HashMap<FileIdentity, PathBuf>,
}

impl Discovery {
    /// The canonical root being walked
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Discovery {
    type Item = DiscoveryItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(warning_from_walk_error(&e, &self.root))),
            };

            if entry.file_type().is_dir() {
                if entry.depth() > 0
                    && !self.filter.includes_hidden()
                    && is_hidden(entry.file_name())
                {
                    self.entries.skip_current_dir();
                }
                continue;
            }

            if entry.path_is_symlink() && !self.follow_symlinks {
                debug!(path = %entry.path().display(), "symlink not followed");
                continue;
            }

            if !self.filter.should_include(entry.path()) {
                continue;
            }

            // fs::metadata follows a symlinked file to its target
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    return Some(Err(DiscoveryWarning {
                        path: entry.into_path(),
                        message: format!("cannot read metadata: {e}"),
                    }));
                }
            };

            let path = entry.into_path();
            if let Some(identity) = file_identity(&path, &metadata) {
                match self.seen.entry(identity) {
                    Entry::Occupied(first) => {
                        let message = format!("same file as {}", first.get().display());
                        return Some(Err(DiscoveryWarning { path, message }));
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(path.clone());
                    }
                }
            }

            return Some(Ok(DiscoveredFile {
                size: metadata.len(),
                path,
            }));
        }
    }
}

#[cfg(unix)]
type FileIdentity = (u64, u64);

#[cfg(not(unix))]
type FileIdentity = PathBuf;

/// Device and inode: equal for hard links and for a link and its target
#[cfg(unix)]
fn file_identity(_path: &Path, metadata: &fs::Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_identity(path: &Path, _metadata: &fs::Metadata) -> Option<FileIdentity> {
    fs::canonicalize(path).ok()
}

fn warning_from_walk_error(error: &walkdir::Error, root: &Path) -> DiscoveryWarning {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    let message = if let Some(ancestor) = error.loop_ancestor() {
        format!("symlink loop back to {}", ancestor.display())
    } else if error.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        "permission denied".to_string()
    } else {
        error.to_string()
    };

    DiscoveryWarning { path, message }
}
