//! Dispatch metrics recorded through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op, so library
//! code can record unconditionally.

use metrics::{counter, gauge, histogram};

/// A record was accepted into a dispatch queue
pub fn record_event_enqueued(queue: &str) {
    counter!("faultline_events_enqueued_total", "queue" => queue.to_string()).increment(1);
}

/// A record was turned away at enqueue
pub fn record_event_dropped(queue: &str, reason: &str) {
    counter!(
        "faultline_events_dropped_total",
        "queue" => queue.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// The endpoint acknowledged a record
pub fn record_event_delivered(queue: &str) {
    counter!("faultline_events_delivered_total", "queue" => queue.to_string()).increment(1);
}

/// An accepted record failed at delivery time
pub fn record_delivery_failed(queue: &str, reason: &str) {
    counter!(
        "faultline_delivery_failures_total",
        "queue" => queue.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Current number of buffered records
pub fn record_queue_depth(queue: &str, depth: usize) {
    gauge!("faultline_queue_depth", "queue" => queue.to_string()).set(depth as f64);
}

/// Time spent on one delivery attempt, terminal state included
pub fn record_delivery_latency_ms(queue: &str, latency_ms: f64) {
    histogram!("faultline_delivery_latency_ms", "queue" => queue.to_string()).record(latency_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_event_enqueued("main");
        record_event_dropped("main", "queue_full");
        record_event_delivered("main");
        record_delivery_failed("main", "transport");
        record_queue_depth("main", 3);
        record_delivery_latency_ms("main", 12.5);
    }
}
