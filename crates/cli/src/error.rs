//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// `--extra` value without a `=`
    #[error("Invalid extra '{raw}', expected KEY=VALUE")]
    InvalidExtra { raw: String },

    /// Delivery did not finish within the wait timeout
    #[error("Timed out after {secs}s waiting for delivery")]
    WaitTimeout { secs: u64 },

    /// The record was dropped or failed to deliver
    #[error("Record was not delivered ({snapshot})")]
    NotDelivered { snapshot: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_extra(raw: impl Into<String>) -> Self {
        Self::InvalidExtra { raw: raw.into() }
    }
}

/// The error reported by `send --error`
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ReportedError(pub String);
