//! HttpTransport - JSON POST to the ingestion endpoint

use std::time::Duration;

use bytes::Bytes;
use contracts::{ClientConfig, ContractError, DeliveryTransport};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

/// Configuration for HttpTransport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Absolute endpoint URL
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Transport that POSTs each serialized record
pub struct HttpTransport {
    name: String,
    config: HttpTransportConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HttpTransport
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be built (e.g. TLS backend init)
    #[instrument(name = "http_transport_new", skip(name, config), fields(endpoint = %config.endpoint))]
    pub fn new(name: impl Into<String>, config: HttpTransportConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContractError::transport(&name, e.to_string()))?;

        debug!(transport = %name, endpoint = %config.endpoint, "HttpTransport ready");

        Ok(Self {
            name,
            config,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl DeliveryTransport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_transport_send",
        skip(self, body),
        fields(transport = %self.name, bytes = body.len())
    )]
    async fn send(&mut self, body: Bytes) -> Result<u16, ContractError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ContractError::transport(&self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                transport = %self.name,
                status = %status,
                body = %detail,
                "Endpoint rejected payload"
            );
        }
        Ok(status.as_u16())
    }

    #[instrument(name = "http_transport_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(transport = %self.name, "HttpTransport closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn transport_for(endpoint: String) -> HttpTransport {
        HttpTransport::new(
            "test_http",
            HttpTransportConfig {
                endpoint,
                timeout: Duration::from_secs(2),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_config_from_client_config() {
        let client = ClientConfig {
            timeout_ms: 1500,
            ..ClientConfig::default()
        };
        let config = HttpTransportConfig::from_client_config(&client);
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.endpoint, contracts::DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/1/item/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::JsonString(r#"{"access_token":"abc"}"#.to_string()))
            .with_status(200)
            .create_async()
            .await;

        let mut transport = transport_for(format!("{}/api/1/item/", server.url()));
        let status = transport
            .send(Bytes::from_static(br#"{"access_token":"abc"}"#))
            .await
            .unwrap();

        assert_eq!(status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_not_errored() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let mut transport = transport_for(format!("{}/", server.url()));
        let status = transport.send(Bytes::from_static(b"{}")).await.unwrap();
        assert_eq!(status, 429);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // port 9 (discard) is essentially never listening on localhost
        let mut transport = transport_for("http://127.0.0.1:9/".to_string());
        let result = transport.send(Bytes::from_static(b"{}")).await;
        assert!(matches!(result, Err(ContractError::Transport { .. })));
    }
}
