//! Request Error Demo
//!
//! Builds an `http::Request` carrying credentials in its headers, query
//! string and form body, reports an error against it, and logs the redacted
//! payload.
//!
//! Run with: cargo run -p faultline-demos --bin http_request_error

use std::fmt;
use std::sync::Arc;

use contracts::{ClientConfig, Level};
use dispatcher::{LogTransport, TracingDiagnostics};
use reporter::{Client, RequestInfo};

#[derive(Debug)]
struct LoginError {
    source: std::io::Error,
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login backend unavailable")
    }
}

impl std::error::Error for LoginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let client = Client::with_transport(
        ClientConfig::with_token("demo-token"),
        LogTransport::new("demo_log"),
        Arc::new(TracingDiagnostics),
    )?;
    client.set_server_host("demo-host");

    let request = http::Request::builder()
        .method("POST")
        .uri("https://app.example.com/login?next=%2Fhome&token=abc123")
        .header("authorization", "Bearer abc123")
        .header("user-agent", "faultline-demo")
        .body(())?;

    let info = RequestInfo::from(&request)
        .with_form_field("username", "alice")
        .with_form_field("password", "hunter2");

    let err = LoginError {
        source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    };
    client.request_error(Level::Critical, &info, &err);

    client.wait().await;
    client.shutdown().await;

    tracing::info!(metrics = %client.metrics(), "Done");
    Ok(())
}
