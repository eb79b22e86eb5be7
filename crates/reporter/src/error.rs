//! Reporter error types

use thiserror::Error;

/// Errors raised while constructing a client
///
/// Reporting calls themselves never fail; see `dispatcher::DiagnosticSink`.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Redaction pattern does not compile
    #[error("invalid '{field}' pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Config rejected or transport could not be built
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}
