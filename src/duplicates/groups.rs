//! Size bucketing and duplicate group construction.
//!
//! # Overview
//!
//! ## Size classification
//!
//! Files are first grouped by exact byte size. A size shared by only one file
//! carries no duplication signal, so that file is eliminated before any
//! content is read. Zero-length files are eliminated as well: they are all
//! trivially identical and not worth reporting.
//!
//! ## Digest grouping
//!
//! After hashing, the survivors are grouped by `(size, digest)`. Only groups
//! with two or more members are duplicate groups.
//!
//! Both steps keep encounter order: buckets and groups come out in the order
//! their first member was seen, and files inside a bucket stay in enumeration
//! order. Duplicate group members are sorted by path.
//!
//! # Example
//!
//! ```
//! use dupefinder::scanner::FileEntry;
//! use dupefinder::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/file1.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file2.txt"), 1024),
//!     FileEntry::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// Files sharing one exact byte size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size, in encounter order
    pub files: Vec<FileEntry>,
}

impl SizeBucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this bucket.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the file size doesn't match the bucket size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match bucket size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the bucket can contain duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    pub hash: Hash,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Members, sorted by path
    pub files: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Members are sorted by path.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut files: Vec<FileEntry>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Bytes reclaimable by keeping a single copy: `size * (count - 1)`.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (total - 1 keeper).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the size classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct non-zero file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated because their size is unique
    pub eliminated_unique: usize,
    /// Number of zero-length files (never grouped)
    pub empty_files: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Files that need no hashing (unique size or empty).
    #[must_use]
    pub fn eliminated(&self) -> usize {
        self.eliminated_unique + self.empty_files
    }

    /// Percentage of files eliminated by size classification.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated() as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by exact size.
///
/// O(n), no file I/O. Returns only buckets with two or more files, in the
/// order each size was first seen.
///
/// # Example
///
/// ```
/// use dupefinder::scanner::FileEntry;
/// use dupefinder::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileEntry::new(PathBuf::from("/a.txt"), 100),
///     FileEntry::new(PathBuf::from("/b.txt"), 100),
///     FileEntry::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (buckets, stats) = group_by_size(files);
///
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (Vec<SizeBucket>, GroupingStats) {
    let mut buckets: Vec<SizeBucket> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;

        if file.size == 0 {
            stats.empty_files += 1;
            log::trace!("Empty file not grouped: {}", file.path.display());
            continue;
        }

        let slot = *index.entry(file.size).or_insert_with(|| {
            buckets.push(SizeBucket::new(file.size));
            buckets.len() - 1
        });
        buckets[slot].add(file);
    }

    stats.unique_sizes = buckets.len();

    let buckets: Vec<SizeBucket> = buckets
        .into_iter()
        .filter(|bucket| {
            if bucket.has_duplicates() {
                stats.potential_duplicates += bucket.len();
                stats.duplicate_groups += 1;
                log::trace!(
                    "Size bucket {} bytes: {} potential duplicates",
                    bucket.size,
                    bucket.len()
                );
                true
            } else {
                stats.eliminated_unique += 1;
                false
            }
        })
        .collect();

    log::debug!(
        "Size classification: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (buckets, stats)
}

/// Group hashed files into duplicate groups.
///
/// Files are keyed by `(size, digest)`. Groups come out in the order their
/// first member was seen; groups with a single member are dropped.
#[must_use]
pub fn group_by_digest(hashed: impl IntoIterator<Item = (FileEntry, Hash)>) -> Vec<DuplicateGroup> {
    let mut order: Vec<(u64, Hash)> = Vec::new();
    let mut members: HashMap<(u64, Hash), Vec<FileEntry>> = HashMap::new();

    for (file, hash) in hashed {
        let key = (file.size, hash);
        members
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(file);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let files = members.remove(&key)?;
            if files.len() < 2 {
                return None;
            }
            let group = DuplicateGroup::new(key.1, key.0, files);
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                group.hash_hex(),
                group.len(),
                group.size
            );
            Some(group)
        })
        .collect()
}
