//! # Dispatcher
//!
//! Asynchronous event dispatch queue.
//!
//! Responsibilities:
//! - Accept `EventRecord`s without ever blocking the producer
//! - Drop the newest record when the bounded queue is full
//! - Deliver accepted records in FIFO order from a single worker task
//! - Let callers wait until every accepted record reached a terminal state

pub mod credential;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod tracker;
pub mod transports;

pub use contracts::{DeliveryTransport, EventRecord};
pub use credential::Credential;
pub use diagnostics::{DiagnosticSink, MemoryDiagnostics, TracingDiagnostics};
pub use error::DispatchError;
pub use metrics::{MetricsSnapshot, QueueMetrics};
pub use queue::{DispatchQueue, QueueConfig};
pub use tracker::InFlightTracker;
pub use transports::{HttpTransport, HttpTransportConfig, LogTransport};
