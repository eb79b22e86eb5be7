//! # Reporter
//!
//! Application-facing reporting client.
//!
//! Responsibilities:
//! - Build event payloads for errors and messages
//! - Extract and redact HTTP request details
//! - Hand finished records to the dispatch queue, fire-and-forget
//!
//! # Example
//!
//! ```no_run
//! use reporter::{Client, Level};
//! use contracts::ClientConfig;
//!
//! # async fn run() -> Result<(), reporter::ReporterError> {
//! let client = Client::new(ClientConfig::with_token("POST_SERVER_ITEM_TOKEN"))?;
//! client.message(Level::Info, "deploy finished");
//! client.wait().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod payload;
pub mod redact;
pub mod request;

pub use client::Client;
pub use contracts::Level;
pub use error::ReporterError;
pub use payload::{Extras, Settings};
pub use redact::{Params, FILTERED};
pub use request::RequestInfo;
