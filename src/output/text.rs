//! Plain text report for duplicate scan results.
//!
//! # Format
//!
//! ```text
//! Duplicate File Finder Results
//! ============================================================
//!
//! Group 1 (Hash: af1349b9...)
//! File size: 1.00 KB
//! Copies: 2
//!
//!   - /path/to/file1.txt
//!   - /path/to/file2.txt
//!
//! ------------------------------------------------------------
//!
//!
//! Total groups: 1
//! Total duplicates: 1
//! Wasted space: 1.00 KB
//! ```

use std::io::Write;

use crate::duplicates::{format_size, select_for_removal, KeepPolicy, ScanResult};

const RULE_WIDTH: usize = 60;

/// Text report generator.
#[derive(Debug)]
pub struct TextOutput<'a> {
    result: &'a ScanResult,
    keep: Option<KeepPolicy>,
}

impl<'a> TextOutput<'a> {
    /// Create a report for a completed scan.
    #[must_use]
    pub fn new(result: &'a ScanResult) -> Self {
        Self { result, keep: None }
    }

    /// Name the copy `policy` keeps under each group's member list.
    #[must_use]
    pub fn with_keep_policy(mut self, policy: KeepPolicy) -> Self {
        self.keep = Some(policy);
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "Duplicate File Finder Results")?;
        writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(writer)?;

        for (index, group) in self.result.groups.iter().enumerate() {
            let hex = group.hash_hex();
            writeln!(writer, "Group {} (Hash: {}...)", index + 1, &hex[..8])?;
            writeln!(writer, "File size: {}", format_size(group.size))?;
            writeln!(writer, "Copies: {}", group.len())?;
            writeln!(writer)?;

            for file in &group.files {
                writeln!(writer, "  - {}", file.path.display())?;
            }

            if let Some(policy) = self.keep {
                if let Some(selection) = select_for_removal(group, policy) {
                    writeln!(writer)?;
                    writeln!(writer, "Keep ({}): {}", policy, selection.keep.path.display())?;
                }
            }

            writeln!(writer)?;
            writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
            writeln!(writer)?;
        }

        let summary = &self.result.summary;
        writeln!(writer)?;
        writeln!(writer, "Total groups: {}", summary.duplicate_groups)?;
        writeln!(writer, "Total duplicates: {}", summary.duplicate_files)?;
        writeln!(writer, "Wasted space: {}", summary.wasted_display())?;
        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn to_string_report(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
