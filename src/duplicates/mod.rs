//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (unique sizes never get hashed)
//! - Full content hashing of the remaining candidates
//! - Duplicate group construction and optional byte-by-byte verification
//! - Keeper selection by modification time

pub mod finder;
pub mod groups;
pub mod selection;
pub mod state;

pub use finder::{
    format_size, DuplicateFinder, FinderConfig, FinderError, ScanOutcome, ScanResult, ScanSummary,
};
pub use groups::{group_by_digest, group_by_size, DuplicateGroup, GroupingStats, SizeBucket};
pub use selection::{select_for_removal, KeepPolicy, Selection};
pub use state::{RunningGuard, ScanState};
