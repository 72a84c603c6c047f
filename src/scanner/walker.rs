//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory and
//! collecting the candidate files for duplicate detection.
//!
//! # Features
//!
//! - Recursive or single-level traversal
//! - Case-insensitive extension filtering
//! - Minimum size filtering
//! - Deterministic order (entries sorted by file name within each directory)
//! - Unreadable entries are reported and skipped, never fatal
//! - Stop handle checked before descending into each directory
//!
//! Only regular files are candidates. Symbolic links are not followed.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::signal::StopHandle;

/// Outcome counters of a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries that could not be read and were skipped
    pub skipped_entries: usize,
    /// Whether the walk ended early because a stop was requested
    pub stopped: bool,
}

/// Directory walker for candidate file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional stop handle for cooperative cancellation
    stop: Option<StopHandle>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            stop: None,
        }
    }

    /// Set the stop handle.
    ///
    /// Once a stop is requested the walker does not enter any further
    /// directory and ends the iteration.
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    fn is_stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(StopHandle::is_stop_requested)
    }

    /// Walk the directory tree, yielding candidate files.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration, so a partially inaccessible tree still produces every
    /// reachable candidate.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };

        let walk_dir = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name();

        walk_dir
            .into_iter()
            .filter_entry(move |entry| {
                // Do not descend once a stop was requested
                !(entry.file_type().is_dir() && self.is_stop_requested())
            })
            .take_while(move |_| {
                if self.is_stop_requested() {
                    log::debug!("Walker: stop requested, ending enumeration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        return None;
                    }
                    self.process_file_entry(entry)
                }
                Err(e) => Some(Err(self.handle_walkdir_error(e))),
            })
    }

    /// Walk the tree to completion and materialize the candidate list.
    ///
    /// Per-entry errors are logged and counted.
    #[must_use]
    pub fn collect(&self) -> (Vec<FileEntry>, WalkStats) {
        let mut files = Vec::new();
        let mut stats = WalkStats::default();

        for result in self.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {}", e);
                    stats.skipped_entries += 1;
                }
            }
        }

        stats.stopped = self.is_stop_requested();
        log::debug!(
            "Walk of {} finished: {} candidates, {} skipped{}",
            self.root.display(),
            files.len(),
            stats.skipped_entries,
            if stats.stopped { " (stopped)" } else { "" }
        );

        (files, stats)
    }

    /// Apply the filters to a regular file and build its entry.
    fn process_file_entry(
        &self,
        entry: walkdir::DirEntry,
    ) -> Option<Result<FileEntry, ScanError>> {
        let path = entry.path();

        // Extension check needs no syscall, do it first
        if !self.config.extensions.matches(path) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walkdir_error(e))),
        };

        let size = metadata.len();
        if size < self.config.min_size {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileEntry::new(entry.into_path(), size)))
    }

    /// Convert a walkdir error into a per-entry scan error.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.into_io_error() {
            Some(io) => {
                let err = ScanError::from_io(&path, io);
                if matches!(err, ScanError::PermissionDenied(_)) {
                    log::debug!("Permission denied: {}", path.display());
                } else {
                    log::warn!("{}", err);
                }
                err
            }
            None => {
                // Loop detection only happens when following links
                log::warn!("Walker error for {}", path.display());
                ScanError::Io {
                    path,
                    source: std::io::Error::other("filesystem loop"),
                }
            }
        }
    }
}
