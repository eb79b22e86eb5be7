//! DeliveryTransport trait - dispatch worker output interface
//!
//! The only thing the dispatch core knows about the network.

use bytes::Bytes;

use crate::ContractError;

/// Network delivery seam
///
/// Called by exactly one worker at a time, so implementations need no
/// internal synchronization.
#[trait_variant::make(DeliveryTransport: Send)]
pub trait LocalDeliveryTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Ship one serialized record and report the response status code
    ///
    /// # Errors
    /// Returns a transport error when no response was obtained at all
    async fn send(&mut self, body: Bytes) -> Result<u16, ContractError>;

    /// Release any held resources; called once after the worker stops
    async fn close(&mut self) -> Result<(), ContractError>;
}
