//! DispatchQueue - bounded FIFO queue drained by a single delivery worker

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use bytes::Bytes;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace};

use contracts::{DeliveryTransport, EventRecord, DEFAULT_CAPACITY};

use crate::credential::Credential;
use crate::diagnostics::DiagnosticSink;
use crate::error::DispatchError;
use crate::metrics::{MetricsSnapshot, QueueMetrics};
use crate::tracker::InFlightTracker;

/// The only status code treated as a successful delivery
pub const SUCCESS_STATUS: u16 = 200;

/// Dispatch queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue name (used for logging/metrics)
    pub name: String,
    /// Maximum number of buffered records; 0 rejects everything
    pub capacity: usize,
}

impl QueueConfig {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new("default", DEFAULT_CAPACITY)
    }
}

/// Handle to a running dispatch queue
///
/// `enqueue` never blocks and never fails loudly: rejected records are
/// reported to the diagnostic sink and counted as dropped.
pub struct DispatchQueue<R = EventRecord> {
    /// Queue name
    name: String,
    /// Configured capacity (the channel keeps one unused slot when this is 0)
    capacity: usize,
    /// Producer side of the buffer
    tx: mpsc::Sender<R>,
    /// Accepted-but-unterminated records
    tracker: Arc<InFlightTracker>,
    /// Shared counters
    metrics: Arc<QueueMetrics>,
    /// Failure reporting
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Cancelled once shutdown was requested
    shutdown: CancellationToken,
    /// Worker task handle, taken by the first `shutdown` call
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Serialize + Send + 'static> DispatchQueue<R> {
    /// Create the queue and spawn its delivery worker
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Panics
    /// If `config.capacity` exceeds tokio's channel limit (`usize::MAX >> 3`).
    /// `ClientConfig` validation caps it at `contracts::MAX_CAPACITY`.
    #[instrument(
        name = "dispatch_queue_spawn",
        skip(config, transport, credential, diagnostics),
        fields(queue = %config.name, capacity = config.capacity)
    )]
    pub fn spawn<T: DeliveryTransport + 'static>(
        config: QueueConfig,
        transport: T,
        credential: Credential,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        // tokio channels need at least one slot
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let tracker = Arc::new(InFlightTracker::new());
        let metrics = Arc::new(QueueMetrics::new());
        let shutdown = CancellationToken::new();

        let worker = DeliveryWorker {
            name: config.name.clone(),
            transport,
            rx,
            credential,
            tracker: Arc::clone(&tracker),
            metrics: Arc::clone(&metrics),
            diagnostics: Arc::clone(&diagnostics),
            shutdown: shutdown.clone(),
        };
        let worker_handle = tokio::spawn(worker.run());

        Self {
            name: config.name,
            capacity: config.capacity,
            tx,
            tracker,
            metrics,
            diagnostics,
            shutdown,
            worker: Mutex::new(Some(worker_handle)),
        }
    }

    /// Offer a record to the queue (non-blocking)
    ///
    /// Returns true if accepted, false if it was dropped.
    pub fn enqueue(&self, record: R) -> bool {
        if self.shutdown.is_cancelled() {
            return self.reject(DispatchError::ShutDown {
                queue: self.name.clone(),
            });
        }
        if self.capacity == 0 {
            return self.reject(self.queue_full());
        }

        match self.tx.try_reserve() {
            Ok(permit) => {
                // Count before the worker can possibly see the record.
                self.tracker.begin();
                self.metrics.inc_accepted();
                permit.send(record);
                observability::record_event_enqueued(&self.name);
                observability::record_queue_depth(&self.name, self.queue_len());
                true
            }
            Err(mpsc::error::TrySendError::Full(())) => self.reject(self.queue_full()),
            Err(mpsc::error::TrySendError::Closed(())) => self.reject(DispatchError::ShutDown {
                queue: self.name.clone(),
            }),
        }
    }
}

impl<R> DispatchQueue<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently buffered (not counting the one being delivered)
    pub fn queue_len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.in_flight()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.queue_len(), self.tracker.in_flight())
    }

    /// Wait until every record accepted so far reached Delivered or Failed
    ///
    /// Records enqueued concurrently with this call may or may not be
    /// included in the wait. There is no timeout; wrap the future in
    /// `tokio::time::timeout` for a bounded wait.
    pub async fn drain(&self) {
        self.tracker.wait().await;
    }

    /// Blocking variant of [`drain`](Self::drain) for synchronous callers
    pub fn drain_blocking(&self) {
        self.tracker.wait_blocking();
    }

    /// Stop accepting records, deliver what is already queued, then stop the worker
    ///
    /// Idempotent; later calls return immediately.
    #[instrument(name = "dispatch_queue_shutdown", skip(self), fields(queue = %self.name))]
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(queue = %self.name, error = ?e, "Worker task panicked");
            }
            debug!(queue = %self.name, "DispatchQueue shutdown complete");
        }
    }

    fn queue_full(&self) -> DispatchError {
        DispatchError::QueueFull {
            queue: self.name.clone(),
            capacity: self.capacity,
        }
    }

    fn reject(&self, err: DispatchError) -> bool {
        self.metrics.inc_dropped();
        self.diagnostics.report(&self.name, &err);
        false
    }
}

impl<R> Drop for DispatchQueue<R> {
    fn drop(&mut self) {
        // The worker finishes the buffered records on its own and exits.
        self.shutdown.cancel();
    }
}

/// Worker task state
///
/// Per record: Queued -> Dequeued -> Serialized -> Delivered | Failed.
/// Both terminal states release the in-flight slot; nothing is retried.
/// A panic inside the transport fails that record only.
struct DeliveryWorker<T, R> {
    name: String,
    transport: T,
    rx: mpsc::Receiver<R>,
    credential: Credential,
    tracker: Arc<InFlightTracker>,
    metrics: Arc<QueueMetrics>,
    diagnostics: Arc<dyn DiagnosticSink>,
    shutdown: CancellationToken,
}

impl<T: DeliveryTransport, R: Serialize> DeliveryWorker<T, R> {
    #[instrument(
        name = "delivery_worker_loop",
        skip(self),
        fields(queue = %self.name, transport = %self.transport.name())
    )]
    async fn run(mut self) {
        debug!(queue = %self.name, "Delivery worker started");

        let mut closing = false;
        loop {
            let next = tokio::select! {
                next = self.rx.recv() => next,
                _ = self.shutdown.cancelled(), if !closing => {
                    // Stop intake; buffered records are still delivered below.
                    self.rx.close();
                    closing = true;
                    continue;
                }
            };

            let Some(record) = next else {
                break;
            };
            self.process(record).await;
        }

        if let Err(e) = self.transport.close().await {
            error!(queue = %self.name, error = %e, "Transport close failed on shutdown");
        }

        debug!(
            queue = %self.name,
            delivered = self.metrics.delivered(),
            failed = self.metrics.failed(),
            "Delivery worker stopped"
        );
    }

    async fn process(&mut self, record: R) {
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.deliver(record))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(DispatchError::Panicked {
                    message: panic_message(panic.as_ref()),
                })
            });

        match outcome {
            Ok(()) => {
                self.metrics.inc_delivered();
                observability::record_event_delivered(&self.name);
                trace!(queue = %self.name, "Record delivered");
            }
            Err(e) => {
                self.metrics.inc_failed();
                self.diagnostics.report(&self.name, &e);
            }
        }

        observability::record_delivery_latency_ms(
            &self.name,
            started.elapsed().as_secs_f64() * 1000.0,
        );
        self.tracker.complete();
    }

    async fn deliver(&mut self, record: R) -> Result<(), DispatchError> {
        if self.credential.is_empty() {
            return Err(DispatchError::MissingCredential);
        }

        let body = serde_json::to_vec(&record)?;
        let status = self
            .transport
            .send(Bytes::from(body))
            .await
            .map_err(DispatchError::Transport)?;

        if status != SUCCESS_STATUS {
            return Err(DispatchError::Rejected { status });
        }
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
