//! LogTransport - logs payload summaries via tracing instead of shipping them

use bytes::Bytes;
use contracts::{ContractError, DeliveryTransport};
use tracing::{info, instrument};

/// Transport for dry runs: every payload is "delivered" with status 200
pub struct LogTransport {
    name: String,
    sent: u64,
}

impl LogTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: 0,
        }
    }

    /// Payloads logged so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl DeliveryTransport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_transport_send", skip(self, body), fields(transport = %self.name))]
    async fn send(&mut self, body: Bytes) -> Result<u16, ContractError> {
        self.sent += 1;
        info!(
            transport = %self.name,
            seq = self.sent,
            bytes = body.len(),
            "Payload received"
        );
        Ok(200)
    }

    #[instrument(name = "log_transport_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(transport = %self.name, sent = self.sent, "LogTransport closed");
        Ok(())
    }
}
