use dupefinder::duplicates::{DuplicateFinder, FinderConfig, ScanOutcome};
use dupefinder::progress::{ChannelProgress, ProgressEvent, ProgressSink, PHASE_HASH};
use dupefinder::signal::StopHandle;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn populate(root: &Path, count: usize, content: &[u8]) {
    for i in 0..count {
        fs::write(root.join(format!("file{i:03}.bin")), content).unwrap();
    }
}

/// Forwards to a channel and requests a stop once `after` units are done.
struct StopAt {
    after: usize,
    stop: StopHandle,
    inner: ChannelProgress,
}

impl ProgressSink for StopAt {
    fn on_phase_start(&self, phase: &str, total: usize) {
        self.inner.on_phase_start(phase, total);
    }

    fn on_progress(&self, processed: usize, total: usize) {
        self.inner.on_progress(processed, total);
        if processed >= self.after {
            self.stop.request_stop();
        }
    }

    fn on_phase_end(&self, phase: &str) {
        self.inner.on_phase_end(phase);
    }
}

#[test]
fn test_stop_during_hashing_discards_results() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 10, b"all files are equal");

    let stop = StopHandle::new();
    let (inner, events) = ChannelProgress::new();
    let sink = StopAt {
        after: 3,
        stop: stop.clone(),
        inner,
    };
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_stop_handle(stop)
            .with_progress(Arc::new(sink)),
    );

    let outcome = finder.find_duplicates(dir.path()).unwrap();
    drop(finder);

    assert_eq!(
        outcome,
        ScanOutcome::Cancelled {
            processed: 3,
            total: 10
        }
    );

    // The last reported count matches the outcome
    let last = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress { processed, .. } => Some(processed),
            _ => None,
        })
        .last();
    assert_eq!(last, Some(3));
}

#[test]
fn test_stop_before_scan_starts_is_cleared() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 2, b"dup");

    let stop = StopHandle::new();
    stop.request_stop();
    let finder = DuplicateFinder::new(FinderConfig::default().with_stop_handle(stop.clone()));

    let outcome = finder.find_duplicates(dir.path()).unwrap();
    assert!(!outcome.is_cancelled());
    assert!(!stop.is_stop_requested());
}

#[test]
fn test_stop_from_another_thread() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 64, &vec![9u8; 256 * 1024]);

    let finder = Arc::new(DuplicateFinder::new(FinderConfig::default()));
    let handle = finder.stop_handle();

    let worker = {
        let finder = Arc::clone(&finder);
        let root = dir.path().to_path_buf();
        std::thread::spawn(move || finder.find_duplicates(&root))
    };

    while !finder.is_running() && !worker.is_finished() {
        std::thread::yield_now();
    }
    handle.request_stop();

    match worker.join().unwrap().unwrap() {
        ScanOutcome::Cancelled { processed, total } => {
            assert!(processed <= total);
        }
        // A fast machine may finish before the stop lands
        ScanOutcome::Completed(result) => assert_eq!(result.groups.len(), 1),
    }
    assert!(!finder.is_running());
}

#[test]
fn test_finder_usable_after_cancellation() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 4, b"same bytes");

    let stop = StopHandle::new();
    let (inner, _events) = ChannelProgress::new();
    let sink = StopAt {
        after: 1,
        stop: stop.clone(),
        inner,
    };
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_stop_handle(stop)
            .with_progress(Arc::new(sink)),
    );

    assert!(finder.find_duplicates(dir.path()).unwrap().is_cancelled());
    assert!(!finder.is_running());

    // The sink stops every scan after one unit; a scan over an empty tree
    // has no units and completes.
    let empty = tempdir().unwrap();
    let outcome = finder.find_duplicates(empty.path()).unwrap();
    assert!(outcome.completed().is_some());
}

#[test]
fn test_hashing_phase_is_announced_with_total() {
    let dir = tempdir().unwrap();
    populate(dir.path(), 3, b"abc");

    let (sink, events) = ChannelProgress::new();
    let finder = DuplicateFinder::new(FinderConfig::default().with_progress(Arc::new(sink)));
    finder.find_duplicates(dir.path()).unwrap();
    drop(finder);

    let started: Vec<ProgressEvent> = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::PhaseStarted { .. }))
        .collect();
    assert!(started.contains(&ProgressEvent::PhaseStarted {
        phase: PHASE_HASH.to_string(),
        total: 3
    }));
}
