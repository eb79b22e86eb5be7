//! Dispatch error types
//!
//! Every variant is terminal for the record it describes. None of them is
//! ever returned to a producer; they are handed to a `DiagnosticSink`.

use thiserror::Error;

/// Per-record dispatch failure
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Queue full - record dropped at enqueue
    #[error("queue '{queue}' full (capacity {capacity}), dropping record on the floor")]
    QueueFull { queue: String, capacity: usize },

    /// Queue shut down - record dropped at enqueue
    #[error("queue '{queue}' is shut down, record dropped")]
    ShutDown { queue: String },

    /// No access credential configured at delivery time
    #[error("empty access token, record dropped")]
    MissingCredential,

    /// Record could not be encoded
    #[error("failed to encode payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport produced no response
    #[error("POST failed: {0}")]
    Transport(#[source] contracts::ContractError),

    /// Transport panicked while delivering the record
    #[error("transport panicked: {message}")]
    Panicked { message: String },

    /// Endpoint answered with a non-success status
    #[error("received response status {status}")]
    Rejected { status: u16 },
}

impl DispatchError {
    /// Short machine-readable reason (used as a metrics label)
    pub fn reason(&self) -> &'static str {
        match self {
            Self::QueueFull { .. } => "queue_full",
            Self::ShutDown { .. } => "shut_down",
            Self::MissingCredential => "missing_credential",
            Self::Serialization(_) => "serialization",
            Self::Transport(_) => "transport",
            Self::Panicked { .. } => "panicked",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// Whether the record was turned away at enqueue (never accepted)
    pub fn is_enqueue_rejection(&self) -> bool {
        matches!(self, Self::QueueFull { .. } | Self::ShutDown { .. })
    }
}
