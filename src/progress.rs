//! Progress reporting for thumbnail extraction.
//!
//! Decoding frames is the slow part of making a screenlist. A
//! [`ProgressCallback`] attached through
//! [`ScreenlistOptions::with_progress`](crate::ScreenlistOptions::with_progress)
//! is notified after every thumbnail.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use screengen::{ProgressCallback, ProgressInfo, ScreenlistOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} thumbnails", info.current, info.total);
//!     }
//! }
//!
//! let options = ScreenlistOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// A snapshot of extraction progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Thumbnails written so far.
    pub current: u64,
    /// Thumbnails in the screenlist.
    pub total: u64,
    /// Timestamp of the thumbnail just written, in milliseconds.
    pub timestamp_ms: u64,
    /// Wall-clock time since extraction started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates.
///
/// Callbacks observe; they cannot stop the run.
pub trait ProgressCallback: Send + Sync {
    /// Called once per extracted thumbnail.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Counts finished items and forwards snapshots to the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one finished thumbnail.
    pub(crate) fn advance(&mut self, timestamp_ms: u64) {
        self.current += 1;
        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            timestamp_ms,
            elapsed: self.start_time.elapsed(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u64, u64, u64)>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0
                .lock()
                .unwrap()
                .push((info.current, info.total, info.timestamp_ms));
        }
    }

    #[test]
    fn tracker_counts_up() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), 2);
        tracker.advance(0);
        tracker.advance(5000);
        assert_eq!(*recorder.0.lock().unwrap(), vec![(1, 2, 0), (2, 2, 5000)]);
    }
}
