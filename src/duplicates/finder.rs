//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Enumerate candidate files under the root
//! 2. **Size classification** - Bucket candidates by exact size and drop
//!    files whose size is unique (see [`crate::duplicates::groups`])
//! 3. **Hash** - Stream the full content of every remaining file through BLAKE3
//! 4. **Group** - Collect files sharing `(size, digest)` into duplicate groups
//! 5. **Verify** (optional) - Compare group members byte by byte
//!
//! Every stage polls the finder's [`StopHandle`]. A stopped scan returns
//! [`ScanOutcome::Cancelled`] and never a partial [`ScanResult`].
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::duplicates::{DuplicateFinder, FinderConfig, ScanOutcome};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! match finder.find_duplicates(Path::new(".")).unwrap() {
//!     ScanOutcome::Completed(result) => {
//!         println!("{} groups, {} bytes reclaimable",
//!             result.summary.duplicate_groups, result.summary.wasted_space);
//!     }
//!     ScanOutcome::Cancelled { processed, total } => {
//!         println!("Stopped after {processed}/{total} files");
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_digest, group_by_size, DuplicateGroup, SizeBucket};
use super::state::ScanState;
use crate::progress::{ProgressSink, ProgressTracker, PHASE_HASH, PHASE_WALK};
use crate::scanner::{FileEntry, Hash, HashError, Hasher, Walker, WalkerConfig};
use crate::signal::StopHandle;

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing workers. 1 hashes sequentially on the scanning thread.
    pub io_threads: usize,
    /// Enable byte-by-byte verification after hash matching (paranoid mode).
    pub paranoid: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Stop handle to observe. A private one is created when absent.
    pub stop_handle: Option<StopHandle>,
    /// Optional progress sink.
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("paranoid", &self.paranoid)
            .field("walker_config", &self.walker_config)
            .field("stop_handle", &self.stop_handle)
            .field("progress", &self.progress.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            paranoid: false,
            walker_config: WalkerConfig::default(),
            stop_handle: None,
            progress: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing workers (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable paranoid mode (byte-by-byte verification).
    #[must_use]
    pub fn with_paranoid(mut self, enabled: bool) -> Self {
        self.paranoid = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Share an externally owned stop handle (e.g. the Ctrl+C handle).
    #[must_use]
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop_handle = Some(stop);
        self
    }

    /// Set the progress sink.
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of candidate files considered
    pub total_files: usize,
    /// Total size of all candidate files in bytes
    pub total_size: u64,
    /// Directory entries that could not be read during enumeration
    pub skipped_entries: usize,
    /// Files eliminated without hashing (unique size or empty)
    pub eliminated_by_size: usize,
    /// Files whose content was hashed successfully
    pub hashed_files: usize,
    /// Files dropped because they could not be read
    pub failed_hashes: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one keeper per group)
    pub duplicate_files: usize,
    /// Total bytes reclaimable by keeping one copy per group
    pub wasted_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of scanned bytes that are redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.wasted_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format wasted space as human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        format_size(self.wasted_space)
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Duplicate groups plus statistics of a scan that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Duplicate groups in first-seen order
    pub groups: Vec<DuplicateGroup>,
    /// Aggregate statistics
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Build a result and derive the group statistics from `groups`.
    #[must_use]
    pub fn new(groups: Vec<DuplicateGroup>, mut summary: ScanSummary) -> Self {
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.wasted_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        Self { groups, summary }
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// How a scan ended.
///
/// A stop request is neither a success nor an error: callers should report
/// "stopped", never "no duplicates".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan ran to completion.
    Completed(ScanResult),
    /// The scan was stopped. Its partial findings are discarded.
    Cancelled {
        /// Units completed before the stop took effect
        processed: usize,
        /// Units the scan would have processed
        total: usize,
    },
}

impl ScanOutcome {
    /// Whether the scan was stopped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The result of a completed scan.
    #[must_use]
    pub fn completed(&self) -> Option<&ScanResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled { .. } => None,
        }
    }

    /// Take the result of a completed scan.
    #[must_use]
    pub fn into_completed(self) -> Option<ScanResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Errors that prevent a scan from starting.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be inspected.
    #[error("Cannot access {path}: {source}")]
    Inaccessible {
        /// The root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Another scan is in flight on this finder.
    #[error("A scan is already running on this finder")]
    AlreadyRunning,
}

impl FinderError {
    /// Whether the error is due to the root argument itself.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, Self::AlreadyRunning)
    }
}

/// Result of hashing one file.
enum HashOutcome {
    Hashed(Hash),
    Failed,
    Cancelled,
}

/// Duplicate finder that runs the detection pipeline.
///
/// One finder runs at most one scan at a time; a concurrent call returns
/// [`FinderError::AlreadyRunning`]. Use [`DuplicateFinder::stop_handle`] to
/// stop a scan from another thread.
///
/// # Example
///
/// ```no_run
/// use dupefinder::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let finder = Arc::new(DuplicateFinder::new(FinderConfig::default()));
/// let stop = finder.stop_handle();
///
/// let worker = {
///     let finder = Arc::clone(&finder);
///     std::thread::spawn(move || finder.find_duplicates(Path::new("/data")))
/// };
/// stop.request_stop();
/// let outcome = worker.join().unwrap().unwrap();
/// assert!(outcome.is_cancelled() || outcome.completed().is_some());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    state: ScanState,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let stop = config.stop_handle.clone().unwrap_or_default();
        let hasher = Hasher::new().with_stop_handle(stop.clone());
        Self {
            config,
            state: ScanState::new(stop),
            hasher,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Handle that stops the running scan from any thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.state.stop_handle().clone()
    }

    /// Request that the running scan stops.
    pub fn request_stop(&self) {
        self.state.stop_handle().request_stop();
    }

    /// Whether a scan is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn is_stop_requested(&self) -> bool {
        self.state.stop_handle().is_stop_requested()
    }

    /// Find all duplicate files under the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] before any work begins if the path does not
    /// exist, is not a directory, or another scan is running on this finder.
    /// Unreadable entries and files are skipped and counted, never returned
    /// as errors.
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanOutcome, FinderError> {
        let start_time = Instant::now();

        validate_root(path)?;
        let _guard = self.state.begin().ok_or(FinderError::AlreadyRunning)?;

        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        log::info!("Starting duplicate scan of {}", root.display());

        if let Some(ref sink) = self.config.progress {
            sink.on_phase_start(PHASE_WALK, 0);
            sink.on_message(&format!("Walking {}", root.display()));
        }
        let walker = Walker::new(&root, self.config.walker_config.clone())
            .with_stop_handle(self.state.stop_handle().clone());
        let (files, walk_stats) = walker.collect();
        if let Some(ref sink) = self.config.progress {
            sink.on_phase_end(PHASE_WALK);
        }

        if walk_stats.stopped {
            log::info!("Scan stopped during enumeration");
            return Ok(ScanOutcome::Cancelled {
                processed: 0,
                total: files.len(),
            });
        }

        log::info!(
            "Found {} candidate files ({} unreadable entries skipped)",
            files.len(),
            walk_stats.skipped_entries
        );

        let mut outcome = self.find_duplicates_in(files)?;
        if let ScanOutcome::Completed(ref mut result) = outcome {
            result.summary.skipped_entries = walk_stats.skipped_entries;
            result.summary.scan_duration = start_time.elapsed();
        }
        Ok(outcome)
    }

    /// Find duplicates among an already enumerated candidate list.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::AlreadyRunning`] if a scan is in flight.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<ScanOutcome, FinderError> {
        let start_time = Instant::now();
        let _guard = self.state.begin().ok_or(FinderError::AlreadyRunning)?;

        let mut outcome = self.find_duplicates_in(files)?;
        if let ScanOutcome::Completed(ref mut result) = outcome {
            result.summary.scan_duration = start_time.elapsed();
        }
        Ok(outcome)
    }

    /// Classification, hashing and grouping. The caller holds the running guard.
    fn find_duplicates_in(&self, files: Vec<FileEntry>) -> Result<ScanOutcome, FinderError> {
        let (buckets, size_stats) = group_by_size(files);
        let tracker = ProgressTracker::new(size_stats.total_files, self.config.progress.clone());

        let mut summary = ScanSummary {
            total_files: size_stats.total_files,
            total_size: size_stats.total_size,
            eliminated_by_size: size_stats.eliminated(),
            ..Default::default()
        };

        if let Some(ref sink) = self.config.progress {
            sink.on_phase_start(PHASE_HASH, tracker.total());
        }
        let outcome = self.classify_and_hash(buckets, size_stats.eliminated(), &tracker, &mut summary);
        let groups = outcome.and_then(|hashed| {
            let groups = group_by_digest(hashed);
            if self.config.paranoid {
                self.verify_groups(groups, &mut summary)
            } else {
                Some(groups)
            }
        });
        if let Some(ref sink) = self.config.progress {
            sink.on_phase_end(PHASE_HASH);
        }

        let Some(groups) = groups else {
            log::info!(
                "Scan stopped after {}/{} files",
                tracker.processed(),
                tracker.total()
            );
            return Ok(ScanOutcome::Cancelled {
                processed: tracker.processed(),
                total: tracker.total(),
            });
        };

        let result = ScanResult::new(groups, summary);
        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            result.summary.duplicate_groups,
            result.summary.duplicate_files,
            result.summary.wasted_display()
        );

        Ok(ScanOutcome::Completed(result))
    }

    /// Account for eliminated files, then hash every bucket member.
    ///
    /// Returns `None` if a stop was requested.
    fn classify_and_hash(
        &self,
        buckets: Vec<SizeBucket>,
        eliminated: usize,
        tracker: &ProgressTracker,
        summary: &mut ScanSummary,
    ) -> Option<Vec<(FileEntry, Hash)>> {
        // Files dropped by size classification are finished units
        for _ in 0..eliminated {
            if self.is_stop_requested() {
                return None;
            }
            tracker.advance();
        }

        let candidates: Vec<FileEntry> = buckets.into_iter().flat_map(|b| b.files).collect();
        if candidates.is_empty() {
            log::debug!("No files left to hash after size classification");
            return Some(Vec::new());
        }
        log::info!("Hashing {} files", candidates.len());

        let outcomes = if self.config.io_threads > 1 {
            self.hash_parallel(candidates, tracker)?
        } else {
            self.hash_sequential(candidates, tracker)?
        };

        let mut hashed = Vec::with_capacity(outcomes.len());
        for (file, outcome) in outcomes {
            match outcome {
                HashOutcome::Hashed(hash) => {
                    summary.hashed_files += 1;
                    hashed.push((file, hash));
                }
                HashOutcome::Failed => summary.failed_hashes += 1,
                HashOutcome::Cancelled => return None,
            }
        }

        Some(hashed)
    }

    fn hash_sequential(
        &self,
        candidates: Vec<FileEntry>,
        tracker: &ProgressTracker,
    ) -> Option<Vec<(FileEntry, HashOutcome)>> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        for file in candidates {
            if self.is_stop_requested() {
                return None;
            }
            let outcome = self.hash_one(&file, tracker);
            if matches!(outcome, HashOutcome::Cancelled) {
                return None;
            }
            outcomes.push((file, outcome));
        }
        Some(outcomes)
    }

    fn hash_parallel(
        &self,
        candidates: Vec<FileEntry>,
        tracker: &ProgressTracker,
    ) -> Option<Vec<(FileEntry, HashOutcome)>> {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
                return self.hash_sequential(candidates, tracker);
            }
        };

        // Indexed collect keeps candidate order regardless of scheduling
        let outcomes: Vec<(FileEntry, HashOutcome)> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|file| {
                    if self.is_stop_requested() {
                        return (file, HashOutcome::Cancelled);
                    }
                    let outcome = self.hash_one(&file, tracker);
                    (file, outcome)
                })
                .collect()
        });

        if self.is_stop_requested() {
            return None;
        }
        Some(outcomes)
    }

    /// Hash a single file and complete its progress unit.
    fn hash_one(&self, file: &FileEntry, tracker: &ProgressTracker) -> HashOutcome {
        if file.size > LARGE_FILE_THRESHOLD {
            log::debug!(
                "Hashing large file ({} MB): {}",
                file.size / (1024 * 1024),
                file.path.display()
            );
        }

        let outcome = match self.hasher.full_hash(&file.path) {
            Ok(hash) => {
                log::trace!("Hashed {}", file.path.display());
                HashOutcome::Hashed(hash)
            }
            Err(HashError::Cancelled(_)) => return HashOutcome::Cancelled,
            Err(e) => {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
                HashOutcome::Failed
            }
        };

        tracker.advance();
        outcome
    }

    /// Confirm each group byte by byte, splitting groups whose members differ.
    ///
    /// Each member is compared with the first file of every content class
    /// found so far. An unreadable file is dropped and counted once, whether
    /// it is the member being placed or a class representative.
    ///
    /// Returns `None` if a stop was requested.
    fn verify_groups(
        &self,
        groups: Vec<DuplicateGroup>,
        summary: &mut ScanSummary,
    ) -> Option<Vec<DuplicateGroup>> {
        log::info!("Verifying {} groups byte by byte", groups.len());
        if let Some(ref sink) = self.config.progress {
            sink.on_message(&format!("Verifying {} groups", groups.len()));
        }
        let mut verified = Vec::with_capacity(groups.len());

        for group in groups {
            let (hash, size) = (group.hash, group.size);
            let mut classes: Vec<Vec<FileEntry>> = Vec::new();

            for file in group.files {
                loop {
                    match self.place(&classes, &file)? {
                        Placement::Class(i) => classes[i].push(file),
                        Placement::NewClass => classes.push(vec![file]),
                        Placement::Unreadable => summary.failed_hashes += 1,
                        Placement::RepresentativeUnreadable(i) => {
                            summary.failed_hashes += 1;
                            classes[i].remove(0);
                            if classes[i].is_empty() {
                                classes.remove(i);
                            }
                            // Compare again against the remaining classes
                            continue;
                        }
                    }
                    break;
                }
            }

            if classes.len() > 1 {
                log::warn!(
                    "Digest {} matched files with different content",
                    crate::scanner::hash_to_hex(&hash)
                );
            }
            verified.extend(
                classes
                    .into_iter()
                    .filter(|class| class.len() > 1)
                    .map(|class| DuplicateGroup::new(hash, size, class)),
            );
        }

        Some(verified)
    }

    /// Find the content class `file` belongs to. `None` on a stop request.
    fn place(&self, classes: &[Vec<FileEntry>], file: &FileEntry) -> Option<Placement> {
        for (i, class) in classes.iter().enumerate() {
            let representative = &class[0].path;
            match self.hasher.files_identical(representative, &file.path) {
                Ok(true) => return Some(Placement::Class(i)),
                Ok(false) => {}
                Err(HashError::Cancelled(_)) => return None,
                Err(e) if e.path() == representative.as_path() => {
                    log::warn!("Verification failed for {}: {}", representative.display(), e);
                    return Some(Placement::RepresentativeUnreadable(i));
                }
                Err(e) => {
                    log::warn!("Verification failed for {}: {}", file.path.display(), e);
                    return Some(Placement::Unreadable);
                }
            }
        }
        Some(Placement::NewClass)
    }
}

/// Where byte-by-byte verification puts a group member.
enum Placement {
    /// Same content as the class at this index
    Class(usize),
    /// Differs from every class so far
    NewClass,
    /// The member itself could not be read
    Unreadable,
    /// The first file of the class at this index could not be read
    RepresentativeUnreadable(usize),
}

/// Reject roots that are missing or not directories.
fn validate_root(path: &Path) -> Result<(), FinderError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FinderError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FinderError::PathNotFound(path.to_path_buf()))
        }
        Err(e) => Err(FinderError::Inaccessible {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Format a byte size as a human-readable string (base 1024).
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;
    const PB: u64 = TB * 1024;

    if bytes >= PB {
        format!("{:.2} PB", bytes as f64 / PB as f64)
    } else if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} B", bytes as f64)
    }
}
