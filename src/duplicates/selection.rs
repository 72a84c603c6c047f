//! Keeper selection inside a duplicate group.
//!
//! Picks one file to keep per group by modification time and lists the rest
//! as removal candidates. Nothing is deleted here.
//!
//! Modification times are read when [`select_for_removal`] runs, not when the
//! scan ran. A file touched or removed in between is judged by its current
//! state; this race is inherent to any scan-then-act tool and is not guarded
//! against.

use serde::{Deserialize, Serialize};

use super::DuplicateGroup;
use crate::scanner::FileEntry;

/// Which copy of a duplicate group to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    /// Keep the least recently modified copy
    Oldest,
    /// Keep the most recently modified copy
    Newest,
}

impl std::fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeepPolicy::Oldest => write!(f, "oldest"),
            KeepPolicy::Newest => write!(f, "newest"),
        }
    }
}

/// Outcome of applying a [`KeepPolicy`] to one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The copy to keep
    pub keep: FileEntry,
    /// Copies that could be removed
    pub remove: Vec<FileEntry>,
}

/// Choose the keeper of a group and the copies to remove.
///
/// Members whose modification time cannot be read are left out of both
/// lists. Ties keep path order. Returns `None` when fewer than two members
/// have a readable modification time.
#[must_use]
pub fn select_for_removal(group: &DuplicateGroup, policy: KeepPolicy) -> Option<Selection> {
    let mut dated: Vec<_> = group
        .files
        .iter()
        .filter_map(|file| match file.modified() {
            Ok(mtime) => Some((mtime, file)),
            Err(e) => {
                log::debug!("Cannot read mtime of {}: {}", file.path.display(), e);
                None
            }
        })
        .collect();

    if dated.len() < 2 {
        return None;
    }

    dated.sort_by_key(|(mtime, _)| *mtime);

    let keep_index = match policy {
        KeepPolicy::Oldest => 0,
        KeepPolicy::Newest => dated.len() - 1,
    };

    let keep = dated[keep_index].1.clone();
    let remove = dated
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != keep_index)
        .map(|(_, (_, file))| (*file).clone())
        .collect();

    Some(Selection { keep, remove })
}
