//! Burst Reporting Demo
//!
//! Reports a burst of messages into a deliberately small queue so the
//! drop-newest overflow behaviour is visible, then drains and shuts down.
//! Payloads are logged instead of sent, so no endpoint or token is needed.
//!
//! Run with: cargo run -p faultline-demos --bin report_burst [config.toml]

use std::sync::Arc;

use config_loader::ConfigLoader;
use contracts::{ClientConfig, Level};
use dispatcher::{LogTransport, TracingDiagnostics};
use reporter::{Client, Extras};

const BURST: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;

    tracing::info!("Starting burst reporting demo");

    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading client config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        ClientConfig {
            capacity: 4,
            environment: "demo".to_string(),
            ..ClientConfig::with_token("demo-token")
        }
    };

    let client = Client::with_transport(
        config,
        LogTransport::new("demo_log"),
        Arc::new(TracingDiagnostics),
    )?;
    client.set_code_version(env!("CARGO_PKG_VERSION"));

    // Everything past the queue capacity (plus the record the worker has
    // already picked up) is rejected immediately.
    for i in 0..BURST {
        let mut extras = Extras::new();
        extras.insert("sequence".to_string(), i.into());
        client.message_with_extras(Level::Info, &format!("burst event {i}"), extras);
    }

    let before = client.metrics();
    tracing::info!(%before, "Burst enqueued");

    client.wait().await;
    client.shutdown().await;

    let after = client.metrics();
    tracing::info!(%after, "Burst drained");
    println!("accepted {} of {BURST}, dropped {}", after.accepted, after.dropped);

    Ok(())
}
