//! ClientConfig - Config Loader output
//!
//! Everything needed to construct a reporting client.

use serde::{Deserialize, Serialize};

/// Default ingestion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

/// Default dispatch queue capacity
pub const DEFAULT_CAPACITY: usize = 1000;

/// Largest accepted dispatch queue capacity
pub const MAX_CAPACITY: usize = 1 << 20;

/// Default header redaction pattern
pub const DEFAULT_FILTER_HEADERS: &str = "Authorization";

/// Default form/query field redaction pattern
pub const DEFAULT_FILTER_FIELDS: &str = "password|secret|token";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Access token; records are dropped at delivery time while this is empty
    #[serde(default)]
    pub access_token: String,

    /// Environment every record is filed under
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Ingestion endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Dispatch queue capacity (0 rejects everything, at most `MAX_CAPACITY`)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Regex matched against header names to redact
    #[serde(default = "default_filter_headers")]
    pub filter_headers: String,

    /// Regex matched against query/form field names to redact
    #[serde(default = "default_filter_fields")]
    pub filter_fields: String,

    /// Running code version
    #[serde(default)]
    pub code_version: String,

    /// Server hostname (indexed by the ingestion API)
    #[serde(default)]
    pub server_host: String,

    /// Application code root, without the trailing slash
    #[serde(default)]
    pub server_root: String,

    /// Per-request HTTP timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_filter_headers() -> String {
    DEFAULT_FILTER_HEADERS.to_string()
}

fn default_filter_fields() -> String {
    DEFAULT_FILTER_FIELDS.to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            environment: default_environment(),
            endpoint: default_endpoint(),
            capacity: default_capacity(),
            filter_headers: default_filter_headers(),
            filter_fields: default_filter_fields(),
            code_version: String::new(),
            server_host: String::new(),
            server_root: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Config with the given token and every other field defaulted
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }
}
