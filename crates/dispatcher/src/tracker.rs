//! In-flight tracker backing `drain`.
//!
//! Counts records that were accepted but have not reached a terminal state.
//! Waiters are parked on a condvar (blocking) or a `Notify` (async); nothing spins.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct InFlightTracker {
    count: Mutex<usize>,
    zero: Condvar,
    notify: Notify,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record was accepted
    pub fn begin(&self) {
        *self.lock() += 1;
    }

    /// A record reached Delivered or Failed
    pub fn complete(&self) {
        let mut count = self.lock();
        debug_assert!(*count > 0, "complete() without matching begin()");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_all();
            self.notify.notify_waiters();
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.lock()
    }

    /// Wait until the counter reaches zero
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a completion in between is not lost.
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Block the calling thread until the counter reaches zero
    ///
    /// Must not be called from a task of a current-thread runtime that also
    /// drives the delivery worker.
    pub fn wait_blocking(&self) {
        let mut count = self.lock();
        while *count > 0 {
            count = self
                .zero
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
