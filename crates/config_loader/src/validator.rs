//! Config validation
//!
//! Rules:
//! - endpoint is an absolute http(s) URL
//! - both redaction patterns compile
//! - timeout_ms > 0
//! - capacity <= MAX_CAPACITY
//!
//! A capacity of zero is allowed; such a client rejects every record.

use contracts::{ClientConfig, ContractError, MAX_CAPACITY};
use regex::Regex;
use url::Url;

/// Validate a ClientConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ClientConfig) -> Result<(), ContractError> {
    validate_endpoint(config)?;
    validate_pattern("filter_headers", &config.filter_headers)?;
    validate_pattern("filter_fields", &config.filter_fields)?;
    validate_timeout(config)?;
    validate_capacity(config)?;
    Ok(())
}

fn validate_endpoint(config: &ClientConfig) -> Result<(), ContractError> {
    let url = Url::parse(&config.endpoint).map_err(|e| {
        ContractError::config_validation("endpoint", format!("invalid URL '{}': {e}", config.endpoint))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ContractError::config_validation(
            "endpoint",
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

fn validate_pattern(field: &str, pattern: &str) -> Result<(), ContractError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ContractError::config_validation(field, e.to_string()))
}

fn validate_timeout(config: &ClientConfig) -> Result<(), ContractError> {
    if config.timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "timeout_ms",
            "timeout_ms must be > 0",
        ));
    }
    Ok(())
}

/// capacity must fit the dispatch channel
pub fn validate_capacity(config: &ClientConfig) -> Result<(), ContractError> {
    if config.capacity > MAX_CAPACITY {
        return Err(ContractError::config_validation(
            "capacity",
            format!("capacity {} exceeds the maximum of {MAX_CAPACITY}", config.capacity),
        ));
    }
    Ok(())
}
