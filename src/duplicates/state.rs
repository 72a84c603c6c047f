//! Per-engine scan state.
//!
//! A [`DuplicateFinder`](super::DuplicateFinder) owns one [`ScanState`]: a
//! `running` flag and the [`StopHandle`] its scans observe. Starting a scan
//! claims the state through [`ScanState::begin`]; the returned guard clears
//! `running` when dropped, including on early return or panic.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::signal::StopHandle;

/// Running flag plus cooperative stop flag for one engine instance.
#[derive(Debug, Default)]
pub struct ScanState {
    running: AtomicBool,
    stop: StopHandle,
}

impl ScanState {
    /// Create a state observing the given stop handle.
    #[must_use]
    pub fn new(stop: StopHandle) -> Self {
        Self {
            running: AtomicBool::new(false),
            stop,
        }
    }

    /// Whether a scan is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The stop handle scans on this state observe.
    #[must_use]
    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    /// Claim the state for a new scan and clear any previous stop request.
    ///
    /// Returns `None` if another scan already holds it.
    #[must_use]
    pub fn begin(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.stop.reset();
        Some(RunningGuard { state: self })
    }
}

/// Clears the running flag on drop.
#[derive(Debug)]
pub struct RunningGuard<'a> {
    state: &'a ScanState,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
    }
}
