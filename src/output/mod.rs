//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - JSON for automation and scripting
//! - A plain text report for reading or archiving
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

pub mod json;
pub mod text;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::duplicates::{KeepPolicy, ScanResult};

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;

/// Write `result` to `path`: JSON if the file name ends in `.json`, text otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_file(
    result: &ScanResult,
    path: &Path,
    keep: Option<KeepPolicy>,
) -> Result<(), JsonOutputError> {
    let mut writer = BufWriter::new(File::create(path)?);

    if is_json_path(path) {
        let output = match keep {
            Some(policy) => JsonOutput::with_keep_policy(result, policy),
            None => JsonOutput::new(result),
        };
        output.write_to(&mut writer, true)?;
    } else {
        let output = TextOutput::new(result);
        match keep {
            Some(policy) => output.with_keep_policy(policy).write_to(&mut writer)?,
            None => output.write_to(&mut writer)?,
        }
    }

    writer.flush()?;
    log::info!("Exported results to {}", path.display());
    Ok(())
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
