//! Per-run completion latch.
//!
//! Reset by `start`, signalled exactly once by the worker thread when it
//! exits (normally or by unwinding). Any number of threads may wait on it.
//! A latch that was never reset counts as finished.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub(crate) struct Completion {
    finished: Mutex<bool>,
    signal: Condvar,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            finished: Mutex::new(true),
            signal: Condvar::new(),
        }
    }

    pub(crate) fn reset(&self) {
        *self.finished.lock() = false;
    }

    pub(crate) fn finish(&self) {
        *self.finished.lock() = true;
        self.signal.notify_all();
    }

    pub(crate) fn is_finished(&self) -> bool {
        *self.finished.lock()
    }

    /// Block until the current run has finished.
    pub(crate) fn wait(&self) {
        let mut finished = self.finished.lock();
        while !*finished {
            self.signal.wait(&mut finished);
        }
    }

    /// Guard that finishes the run when dropped.
    pub(crate) fn finish_on_drop(&self) -> FinishOnDrop<'_> {
        FinishOnDrop { completion: self }
    }
}

pub(crate) struct FinishOnDrop<'a> {
    completion: &'a Completion,
}

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.completion.finish();
    }
}
