//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Directory walking with extension and minimum-size filters
//! - Streaming content hashing with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`hasher`]: BLAKE3 file hashing (streaming, cancellable)
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: 1024,  // Skip files under 1KB
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! let (files, stats) = walker.collect();
//! for file in &files {
//!     println!("{}: {} bytes", file.path.display(), file.size);
//! }
//! println!("{} entries skipped", stats.skipped_entries);
//! ```

pub mod hasher;
pub mod walker;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{hash_to_hex, Hash, Hasher, CHUNK_SIZE};
pub use walker::{WalkStats, Walker};

/// A candidate file discovered during enumeration.
///
/// Entries are created once per scan and never mutated afterwards. The
/// modification time is not stored; it is read from the filesystem when
/// [`FileEntry::modified`] is called, so a file that disappeared since the
/// scan simply yields an error there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at enumeration time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }

    /// Query the current modification time of the file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file is gone or unreadable.
    pub fn modified(&self) -> std::io::Result<SystemTime> {
        std::fs::metadata(&self.path)?.modified()
    }
}

/// Case-insensitive set of accepted file extensions.
///
/// Extensions are stored lowercase with their leading dot (`.jpg`), which is
/// the form they are matched in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from user-supplied extensions.
    ///
    /// Each value is trimmed and lowercased, and gets a leading dot if it has
    /// none. Empty values are ignored.
    ///
    /// ```
    /// use dupefinder::scanner::ExtensionFilter;
    ///
    /// let filter = ExtensionFilter::new(["JPG", ".png"]);
    /// assert!(filter.contains(".jpg"));
    /// assert!(filter.contains(".png"));
    /// ```
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Whether no extension was given (every file is accepted).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Whether the normalized extension is part of the set.
    #[must_use]
    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Check a path against the filter.
    ///
    /// Files without an extension never match a non-empty filter.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension() {
            Some(ext) => {
                let dotted = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&dotted)
            }
            None => false,
        }
    }

    /// Iterate over the normalized extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false only direct children of the
    /// root are considered.
    pub recursive: bool,

    /// Minimum file size to include (in bytes).
    /// Files strictly smaller than this are skipped.
    pub min_size: u64,

    /// Accepted extensions. Empty means all extensions.
    pub extensions: ExtensionFilter,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            min_size: 0,
            extensions: ExtensionFilter::default(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(recursive: bool, min_size: u64, extensions: ExtensionFilter) -> Self {
        Self {
            recursive,
            min_size,
            extensions,
        }
    }
}

/// Errors that can occur for a single entry during directory scanning.
///
/// These are never fatal; the walker logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished between listing and inspection.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stop was requested before the file was fully read.
    #[error("Hashing cancelled: {0}")]
    Cancelled(PathBuf),
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The file the error is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Cancelled(path) => path,
            Self::Io { path, .. } => path,
        }
    }

    /// Whether this error is the result of a stop request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
