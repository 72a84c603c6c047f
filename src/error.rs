//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::{FinderError, ScanOutcome};

/// Exit codes for the dupefinder binary.
///
/// - 0: Completed, duplicates found
/// - 1: Could not start, or an unexpected failure
/// - 2: Completed, no duplicates found
/// - 130: Stopped by the user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: The scan could not start or failed unexpectedly.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Interrupted: Scan was stopped by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DF000",
            Self::GeneralError => "DF001",
            Self::NoDuplicates => "DF002",
            Self::Interrupted => "DF130",
        }
    }

    /// Exit code for the way a scan ended.
    #[must_use]
    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Completed(result) if result.is_empty() => Self::NoDuplicates,
            ScanOutcome::Completed(_) => Self::Success,
            ScanOutcome::Cancelled { .. } => Self::Interrupted,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the root argument itself was rejected
    pub invalid_input: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            invalid_input: err
                .downcast_ref::<FinderError>()
                .is_some_and(FinderError::is_invalid_input),
        }
    }
}
