//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "wasted_space": 1024,
//!       "files": [
//!         { "path": "/path/to/file1.txt", "size": 1024, "modified": "2024-01-01T00:00:00Z" },
//!         { "path": "/path/to/file2.txt", "size": 1024, "modified": "2024-02-01T00:00:00Z" }
//!       ]
//!     }
//!   ],
//!   "statistics": {
//!     "total_groups": 1,
//!     "total_duplicates": 1,
//!     "wasted_space_bytes": 1024,
//!     "files_scanned": 100,
//!     "bytes_scanned": 1048576,
//!     "skipped_entries": 0,
//!     "failed_hashes": 0,
//!     "scan_duration_ms": 1234
//!   }
//! }
//! ```
//!
//! With a [`KeepPolicy`], every member carries a `"keep": true|false` flag.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::duplicates::DuplicateFinder;
//! use dupefinder::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! if let Some(result) = finder.find_duplicates(Path::new(".")).unwrap().into_completed() {
//!     let output = JsonOutput::new(&result);
//!     println!("{}", output.to_json_pretty().unwrap());
//! }
//! ```

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::{select_for_removal, DuplicateGroup, KeepPolicy, ScanResult, ScanSummary};
use crate::scanner::FileEntry;

/// A single group member in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// File size in bytes
    pub size: u64,
    /// Last modification time, if readable
    pub modified: Option<DateTime<Utc>>,
    /// Whether the keep policy retains this copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep: Option<bool>,
}

impl JsonFile {
    fn from_entry(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.to_string_lossy().into_owned(),
            size: entry.size,
            modified: entry.modified().ok().map(DateTime::<Utc>::from),
            keep: None,
        }
    }
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Bytes reclaimable by keeping one copy
    pub wasted_space: u64,
    /// Members, sorted by path
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            wasted_space: group.wasted_space(),
            files: group.files.iter().map(JsonFile::from_entry).collect(),
        }
    }

    /// Mark which members the policy keeps.
    ///
    /// Members whose modification time cannot be read stay unmarked.
    fn mark_keepers(&mut self, group: &DuplicateGroup, policy: KeepPolicy) {
        let Some(selection) = select_for_removal(group, policy) else {
            return;
        };
        let removed: Vec<&PathBuf> = selection.remove.iter().map(|f| &f.path).collect();

        for (json, entry) in self.files.iter_mut().zip(&group.files) {
            if entry.path == selection.keep.path {
                json.keep = Some(true);
            } else if removed.contains(&&entry.path) {
                json.keep = Some(false);
            }
        }
    }
}

/// Aggregate statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonStatistics {
    /// Number of duplicate groups
    pub total_groups: usize,
    /// Redundant copies across all groups
    pub total_duplicates: usize,
    /// Bytes reclaimable by keeping one copy per group
    pub wasted_space_bytes: u64,
    /// Candidate files considered
    pub files_scanned: usize,
    /// Total size of the candidate files
    pub bytes_scanned: u64,
    /// Directory entries that could not be read
    pub skipped_entries: usize,
    /// Files that could not be hashed
    pub failed_hashes: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
}

impl JsonStatistics {
    /// Create JSON statistics from a ScanSummary.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary) -> Self {
        Self {
            total_groups: summary.duplicate_groups,
            total_duplicates: summary.duplicate_files,
            wasted_space_bytes: summary.wasted_space,
            files_scanned: summary.total_files,
            bytes_scanned: summary.total_size,
            skipped_entries: summary.skipped_entries,
            failed_hashes: summary.failed_hashes,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan statistics
    pub statistics: JsonStatistics,
}

impl JsonOutput {
    /// Create a new JSON output from a completed scan.
    ///
    /// # Example
    ///
    /// ```
    /// use dupefinder::duplicates::{DuplicateGroup, ScanResult, ScanSummary};
    /// use dupefinder::output::json::JsonOutput;
    /// use dupefinder::scanner::FileEntry;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new([0u8; 32], 1024, vec![
    ///     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
    ///     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
    /// ])];
    /// let result = ScanResult::new(groups, ScanSummary::default());
    ///
    /// let output = JsonOutput::new(&result);
    /// assert_eq!(output.duplicates.len(), 1);
    /// assert_eq!(output.statistics.wasted_space_bytes, 1024);
    /// ```
    #[must_use]
    pub fn new(result: &ScanResult) -> Self {
        Self {
            duplicates: result
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            statistics: JsonStatistics::from_scan_summary(&result.summary),
        }
    }

    /// Create JSON output with every member flagged by `policy`.
    #[must_use]
    pub fn with_keep_policy(result: &ScanResult, policy: KeepPolicy) -> Self {
        let mut output = Self::new(result);
        for (json, group) in output.duplicates.iter_mut().zip(&result.groups) {
            json.mark_keepers(group, policy);
        }
        output
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
