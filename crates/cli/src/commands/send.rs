//! `send` command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::ClientConfig;
use dispatcher::{LogTransport, MetricsSnapshot, TracingDiagnostics};
use reporter::{Client, Extras};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::load_config;
use crate::cli::SendArgs;
use crate::error::{CliError, ReportedError};

/// Execute the `send` command
#[instrument(name = "cli_send", skip(args), fields(level = %args.level, dry_run = args.dry_run))]
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let config = build_config(args)?;
    let extras = parse_extras(&args.extras)?;

    print_config_summary(&config, args.dry_run);

    let client = if args.dry_run {
        info!("Dry run: payload will be logged, not sent");
        config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;
        Client::with_transport(config, LogTransport::new("dry_run"), Arc::new(TracingDiagnostics))
    } else {
        Client::new(config)
    }
    .context("Failed to start reporting client")?;

    if args.error {
        let err = ReportedError(args.message.clone());
        client.error_with_extras(args.level, &err, extras);
    } else {
        client.message_with_extras(args.level, &args.message, extras);
    }

    let outcome = tokio::select! {
        result = wait_for_delivery(&client, args.wait_timeout) => result,
        _ = setup_shutdown_signal() => {
            warn!("Received shutdown signal, abandoning wait");
            Ok(())
        }
    };

    client.shutdown().await;
    let snapshot = client.metrics();
    println!("{snapshot}");

    outcome?;
    check_delivered(&snapshot)
}

/// Load the config (or defaults) and apply CLI overrides
fn build_config(args: &SendArgs) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    if let Some(ref token) = args.token {
        config.access_token = token.clone();
    }
    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(ref environment) = args.environment {
        config.environment = environment.clone();
    }

    Ok(config)
}

/// Parse repeated `KEY=VALUE` arguments; values that parse as JSON keep their type
fn parse_extras(raw: &[String]) -> Result<Extras, CliError> {
    let mut extras = Extras::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| CliError::invalid_extra(item.as_str()))?;
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        extras.insert(key.to_string(), value);
    }
    Ok(extras)
}

async fn wait_for_delivery(client: &Client, timeout_secs: u64) -> Result<()> {
    if timeout_secs == 0 {
        client.wait().await;
        return Ok(());
    }
    tokio::time::timeout(Duration::from_secs(timeout_secs), client.wait())
        .await
        .map_err(|_| anyhow::Error::from(CliError::WaitTimeout { secs: timeout_secs }))
}

fn check_delivered(snapshot: &MetricsSnapshot) -> Result<()> {
    if snapshot.delivered == 0 {
        return Err(CliError::NotDelivered {
            snapshot: snapshot.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Setup shutdown signal handler
async fn setup_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let ctrl_c = tokio::signal::ctrl_c();
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, only Ctrl+C will work");
                let _ = ctrl_c.await;
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn print_config_summary(config: &ClientConfig, dry_run: bool) {
    info!(
        environment = %config.environment,
        endpoint = %config.endpoint,
        capacity = config.capacity,
        has_token = !config.access_token.is_empty(),
        dry_run,
        "Client configuration"
    );
}
