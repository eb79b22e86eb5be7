//! # Contracts
//!
//! Shared interface contracts for the faultline workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Record model
//! - An [`EventRecord`] is opaque cargo once built: the dispatch queue never
//!   looks inside it, it only serializes and ships it.
//! - A [`DeliveryTransport`] is the narrow `send(bytes) -> status` seam to the network.

mod config;
mod error;
mod level;
mod record;
mod transport;

pub use config::*;
pub use error::*;
pub use level::Level;
pub use record::EventRecord;
pub use transport::{DeliveryTransport, LocalDeliveryTransport};
