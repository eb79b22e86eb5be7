//! Queue metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single dispatch queue
#[derive(Debug, Default)]
pub struct QueueMetrics {
    /// Records accepted by enqueue
    accepted: AtomicU64,
    /// Records the endpoint acknowledged
    delivered: AtomicU64,
    /// Accepted records that failed at delivery time
    failed: AtomicU64,
    /// Records rejected at enqueue (full or shut down)
    dropped: AtomicU64,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn inc_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the counters plus the live gauges supplied by the queue
    pub fn snapshot(&self, queue_len: usize, in_flight: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len,
            in_flight,
            accepted: self.accepted(),
            delivered: self.delivered(),
            failed: self.failed(),
            dropped: self.dropped(),
        }
    }
}

/// Snapshot of queue metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Records waiting in the buffer
    pub queue_len: usize,
    /// Accepted but not yet terminal
    pub in_flight: usize,
    pub accepted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl MetricsSnapshot {
    /// Accepted records that reached a terminal state
    pub fn terminated(&self) -> u64 {
        self.delivered + self.failed
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "accepted={} delivered={} failed={} dropped={} queued={} in_flight={}",
            self.accepted, self.delivered, self.failed, self.dropped, self.queue_len, self.in_flight
        )
    }
}
