//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ClientConfig;
use serde::Serialize;
use tracing::info;

use super::{load_config, mask_token};
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    access_token: String,
    environment: String,
    endpoint: String,
    capacity: usize,
    timeout_ms: u64,
    redaction: RedactionInfo,
    server: ServerInfo,
}

#[derive(Serialize)]
struct RedactionInfo {
    filter_headers: String,
    filter_fields: String,
}

#[derive(Serialize)]
struct ServerInfo {
    #[serde(skip_serializing_if = "String::is_empty")]
    host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    root: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    code_version: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &ClientConfig) -> ConfigInfo {
    ConfigInfo {
        access_token: mask_token(&config.access_token),
        environment: config.environment.clone(),
        endpoint: config.endpoint.clone(),
        capacity: config.capacity,
        timeout_ms: config.timeout_ms,
        redaction: RedactionInfo {
            filter_headers: config.filter_headers.clone(),
            filter_fields: config.filter_fields.clone(),
        },
        server: ServerInfo {
            host: config.server_host.clone(),
            root: config.server_root.clone(),
            code_version: config.code_version.clone(),
        },
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

fn print_config_info(config: &ClientConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Faultline Client Configuration                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📤 Delivery");
    println!("   ├─ Endpoint: {}", config.endpoint);
    println!("   ├─ Access Token: {}", mask_token(&config.access_token));
    println!("   ├─ Queue Capacity: {}", config.capacity);
    println!("   └─ Timeout: {}ms", config.timeout_ms);

    println!("\n🏷️  Context");
    println!("   ├─ Environment: {}", config.environment);
    println!("   ├─ Code Version: {}", or_unset(&config.code_version));
    println!("   ├─ Server Host: {}", or_unset(&config.server_host));
    println!("   └─ Server Root: {}", or_unset(&config.server_root));

    println!("\n🔒 Redaction");
    println!("   ├─ Headers: /{}/i", config.filter_headers);
    println!("   └─ Fields: /{}/", config.filter_fields);

    println!();
}
