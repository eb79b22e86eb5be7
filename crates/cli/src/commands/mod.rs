//! Command implementations.

mod info;
mod send;
mod validate;

pub use info::run_info;
pub use send::run_send;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ClientConfig;

use crate::error::CliError;

/// Load a config file, failing early with a readable error when it is missing
pub(crate) fn load_config(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Mask all but the last four characters of a token
pub(crate) fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count == 0 {
        return "(none)".to_string();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
