//! Diagnostic sinks
//!
//! Where dispatch failures go instead of back to the producer.

use std::sync::{Mutex, PoisonError};
use tracing::{error, warn};

use crate::error::DispatchError;

/// Best-effort receiver of dispatch failures
///
/// Implementations must not panic; they run on producer threads (enqueue
/// rejections) and on the delivery worker.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, queue: &str, error: &DispatchError);
}

/// Logs through `tracing` and counts through the `metrics` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, queue: &str, err: &DispatchError) {
        if err.is_enqueue_rejection() {
            warn!(queue = %queue, reason = err.reason(), "{err}");
            observability::record_event_dropped(queue, err.reason());
        } else {
            error!(queue = %queue, reason = err.reason(), error = %err, "Delivery failed");
            observability::record_delivery_failed(queue, err.reason());
        }
    }
}

/// A reported failure, as captured by [`MemoryDiagnostics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub queue: String,
    pub reason: &'static str,
    pub message: String,
}

/// Keeps every report in memory; meant for tests and embedding applications
/// that surface drops themselves.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    reports: Mutex<Vec<Captured>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Captured> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of reports with the given reason label
    pub fn count(&self, reason: &str) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| c.reason == reason)
            .count()
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn report(&self, queue: &str, err: &DispatchError) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Captured {
                queue: queue.to_string(),
                reason: err.reason(),
                message: err.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_diagnostics_captures() {
        let sink = MemoryDiagnostics::new();
        sink.report("main", &DispatchError::MissingCredential);
        sink.report("main", &DispatchError::Rejected { status: 503 });

        assert_eq!(sink.count("missing_credential"), 1);
        assert_eq!(sink.count("rejected"), 1);
        assert_eq!(sink.reports()[1].message, "received response status 503");
    }

    #[test]
    fn test_tracing_diagnostics_does_not_panic() {
        TracingDiagnostics.report(
            "main",
            &DispatchError::QueueFull {
                queue: "main".to_string(),
                capacity: 1,
            },
        );
        TracingDiagnostics.report("main", &DispatchError::MissingCredential);
    }
}
