//! Cooperative stop signal and Ctrl+C wiring.
//!
//! A [`StopHandle`] wraps a shared `AtomicBool`. The scan pipeline polls it at
//! every unit of work (each directory while walking, each file while
//! classifying, each chunk while hashing) and unwinds as soon as it is set.
//! Anything holding a clone can request a stop from any thread.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupefinder::signal::install_handler;
//! use dupefinder::duplicates::{DuplicateFinder, FinderConfig};
//!
//! // Ctrl+C now sets the handle's flag
//! let stop = install_handler().expect("Failed to install signal handler");
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_stop_handle(stop));
//! ```
//!
//! # Exit Codes
//!
//! When a signal is received the flag is set, a short notice is printed to
//! stderr, and the binary exits with code 130 (128 + SIGINT) once the scan
//! has unwound.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption.
/// This follows Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared, cloneable stop request flag.
///
/// Clones observe the same flag, so a handle given to another thread (or to
/// a signal handler) stops the scan that owns the original.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a new handle with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current scan stops at its next checkpoint.
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag. Called at the start of every scan.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLE: OnceLock<StopHandle> = OnceLock::new();

/// Install a Ctrl+C handler that requests a stop on interrupt.
///
/// The process can only register one handler, so repeated calls return the
/// handle registered first (after resetting it). If another component already
/// owns the signal, an unhooked handle is returned; it still works for manual
/// [`StopHandle::request_stop`] calls.
///
/// # Errors
///
/// Currently always succeeds; the `Result` is kept so callers handle a future
/// hard failure of `ctrlc`.
pub fn install_handler() -> Result<StopHandle, SignalError> {
    if let Some(handle) = GLOBAL_HANDLE.get() {
        handle.reset();
        return Ok(handle.clone());
    }

    let handle = StopHandle::new();
    let hooked = handle.clone();

    match ctrlc::set_handler(move || {
        hooked.request_stop();

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping scan...");
        let _ = std::io::stderr().flush();

        log::info!("Stop signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_HANDLE.set(handle.clone());
            Ok(handle)
        }
        Err(e) => {
            if let Some(existing) = GLOBAL_HANDLE.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler already registered ({}), using unhooked handle", e);
                let fallback = StopHandle::new();
                let _ = GLOBAL_HANDLE.set(fallback.clone());
                Ok(fallback)
            }
        }
    }
}
