//! Progress reporting for the scan pipeline.
//!
//! The pipeline reports through the [`ProgressSink`] trait and never touches
//! presentation state itself. Two sinks ship with the crate:
//!
//! - [`ChannelProgress`] forwards [`ProgressEvent`]s over an `mpsc` channel,
//!   for callers that render progress on their own thread.
//! - [`Progress`] draws terminal progress bars with indicatif.
//!
//! # Units
//!
//! A scan has one unit per candidate file. A unit completes when the size
//! classifier eliminates the file or when the hasher is done with it, whether
//! hashing succeeded or not. [`ProgressTracker`] serializes the counter and
//! the sink call so observers always see a non-decreasing `processed` that
//! never exceeds `total`.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while enumerating candidates.
pub const PHASE_WALK: &str = "walking";
/// Phase name used while classifying and hashing candidates.
pub const PHASE_HASH: &str = "hashing";

/// Receiver of scan progress.
///
/// Implementations must not block indefinitely; they are called from the
/// scanning thread (or a hashing worker).
pub trait ProgressSink: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALK`] or [`PHASE_HASH`])
    /// * `total` - Total number of units, 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called after each unit of work.
    ///
    /// # Arguments
    ///
    /// * `processed` - Units completed so far
    /// * `total` - Total units in this phase
    fn on_progress(&self, processed: usize, total: usize);

    /// Called when a phase completes (or is abandoned on stop).
    fn on_phase_end(&self, phase: &str);

    /// Called to update the status message.
    fn on_message(&self, _message: &str) {}
}

/// A progress notification carried over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A phase started with the given number of units.
    PhaseStarted {
        /// Phase name
        phase: String,
        /// Units in the phase
        total: usize,
    },
    /// Units completed so far.
    Progress {
        /// Units completed
        processed: usize,
        /// Units in the phase
        total: usize,
    },
    /// A phase ended.
    PhaseEnded {
        /// Phase name
        phase: String,
    },
    /// Status text, such as the directory being walked.
    Message(String),
}

/// Sink that forwards every notification as a [`ProgressEvent`].
///
/// Events are dropped silently once the receiver is gone.
///
/// # Example
///
/// ```
/// use dupefinder::progress::{ChannelProgress, ProgressEvent, ProgressSink};
///
/// let (sink, events) = ChannelProgress::new();
/// sink.on_progress(1, 4);
/// assert_eq!(events.recv().unwrap(), ProgressEvent::Progress { processed: 1, total: 4 });
/// ```
#[derive(Debug)]
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

impl ProgressSink for ChannelProgress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.send(ProgressEvent::PhaseStarted {
            phase: phase.to_string(),
            total,
        });
    }

    fn on_progress(&self, processed: usize, total: usize) {
        self.send(ProgressEvent::Progress { processed, total });
    }

    fn on_phase_end(&self, phase: &str) {
        self.send(ProgressEvent::PhaseEnded {
            phase: phase.to_string(),
        });
    }

    fn on_message(&self, message: &str) {
        self.send(ProgressEvent::Message(message.to_string()));
    }
}

/// Shared unit counter for one scan.
///
/// Increment and notification happen under a single lock, so concurrent
/// hashing workers still produce an ordered stream of updates.
pub struct ProgressTracker {
    total: usize,
    processed: Mutex<usize>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("total", &self.total)
            .field("processed", &self.processed())
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

impl ProgressTracker {
    /// Create a tracker for `total` units.
    #[must_use]
    pub fn new(total: usize, sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            total,
            processed: Mutex::new(0),
            sink,
        }
    }

    /// Total units in this scan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Units completed so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        *self
            .processed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Complete one unit and notify the sink. Returns the new count.
    pub fn advance(&self) -> usize {
        let mut processed = self
            .processed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *processed < self.total {
            *processed += 1;
        }
        if let Some(ref sink) = self.sink {
            sink.on_progress(*processed, self.total);
        }
        *processed
    }
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// ```
    /// use dupefinder::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn lock(slot: &Mutex<Option<ProgressBar>>) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ProgressSink for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALK => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Enumerating files");
                pb.enable_steady_tick(Duration::from_millis(100));
                *Self::lock(&self.walking) = Some(pb);
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Comparing");
                *Self::lock(&self.hashing) = Some(pb);
            }
        }
    }

    fn on_progress(&self, processed: usize, _total: usize) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *Self::lock(&self.hashing) {
            pb.set_position(processed as u64);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALK => {
                if let Some(pb) = Self::lock(&self.walking).take() {
                    pb.finish_with_message("Enumeration complete");
                }
            }
            _ => {
                if let Some(pb) = Self::lock(&self.hashing).take() {
                    pb.finish_with_message("Comparison complete");
                }
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *Self::lock(&self.hashing) {
            pb.set_message(message.to_string());
        } else if let Some(ref pb) = *Self::lock(&self.walking) {
            pb.set_message(message.to_string());
        }
    }
}
