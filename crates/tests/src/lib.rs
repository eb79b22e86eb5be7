//! # Integration Tests
//!
//! End-to-end tests across the workspace crates.
//!
//! - Config file -> Client -> HttpTransport -> mock ingestion endpoint
//! - Delivery failure, missing credential and redaction paths

#[cfg(test)]
mod contract_tests {
    use contracts::{ClientConfig, Level};

    #[test]
    fn test_default_config_is_valid() {
        config_loader::ConfigLoader::validate(&ClientConfig::default()).unwrap();
        assert_eq!(Level::default(), Level::Error);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fmt;
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ClientConfig, Level};
    use dispatcher::{HttpTransport, HttpTransportConfig, MemoryDiagnostics};
    use mockito::{Matcher, Server, ServerGuard};
    use reporter::{Client, RequestInfo};
    use serde_json::json;

    const ITEM_PATH: &str = "/api/1/item/";

    #[derive(Debug)]
    struct UploadFailed;

    impl fmt::Display for UploadFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "upload failed")
        }
    }

    impl std::error::Error for UploadFailed {}

    fn config_for(server: &ServerGuard, token: &str) -> ClientConfig {
        let toml = format!(
            "access_token = \"{token}\"\n\
             environment = \"e2e\"\n\
             endpoint = \"{}{ITEM_PATH}\"\n\
             capacity = 16\n\
             timeout_ms = 2000\n",
            server.url()
        );
        ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap()
    }

    fn client_with_diagnostics(config: ClientConfig) -> (Client, Arc<MemoryDiagnostics>) {
        let transport =
            HttpTransport::new("http", HttpTransportConfig::from_client_config(&config)).unwrap();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let client = Client::with_transport(config, transport, diagnostics.clone()).unwrap();
        (client, diagnostics)
    }

    /// Config file -> Client::new -> mock endpoint
    #[tokio::test]
    async fn test_e2e_message_delivery() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ITEM_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "access_token": "tok",
                "data": {
                    "environment": "e2e",
                    "level": "warning",
                    "title": "disk almost full",
                    "body": { "message": { "body": "disk almost full" } }
                }
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(config_for(&server, "tok")).unwrap();
        client.message(Level::Warning, "disk almost full");
        client.wait().await;

        let snapshot = client.metrics();
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.in_flight, 0);
        mock.assert_async().await;

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_e2e_each_record_posted_once() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for i in 0..3 {
            let mock = server
                .mock("POST", ITEM_PATH)
                .match_body(Matcher::PartialJson(json!({
                    "data": { "body": { "message": { "body": format!("event {i}") } } }
                })))
                .with_status(200)
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }

        let client = Client::new(config_for(&server, "tok")).unwrap();
        for i in 0..3 {
            client.message(Level::Info, &format!("event {i}"));
        }
        client.wait().await;

        assert_eq!(client.metrics().delivered, 3);
        for mock in &mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_e2e_server_error_is_reported() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ITEM_PATH)
            .with_status(500)
            .with_body("internal error")
            .expect(2)
            .create_async()
            .await;

        let (client, diagnostics) = client_with_diagnostics(config_for(&server, "tok"));
        client.error(Level::Error, &UploadFailed);
        client.message(Level::Info, "second");
        client.wait().await;

        let snapshot = client.metrics();
        assert_eq!(snapshot.failed, 2);
        assert_eq!(snapshot.delivered, 0);
        assert_eq!(diagnostics.count("rejected"), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_missing_token_never_hits_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ITEM_PATH)
            .match_body(Matcher::PartialJson(json!({ "access_token": "late" })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (client, diagnostics) = client_with_diagnostics(config_for(&server, ""));
        client.message(Level::Info, "before token");
        client.wait().await;
        assert_eq!(diagnostics.count("missing_credential"), 1);

        client.set_token("late");
        client.message(Level::Info, "after token");
        client.wait().await;

        assert_eq!(client.metrics().delivered, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_request_error_is_redacted() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ITEM_PATH)
            .match_body(Matcher::PartialJson(json!({
                "data": {
                    "request": {
                        "method": "POST",
                        "headers": {
                            "Authorization": "[FILTERED]",
                            "Accept": "application/json"
                        },
                        "GET": { "password": "[FILTERED]", "page": "2" },
                        "POST": { "secret": "[FILTERED]", "name": "bob" }
                    }
                }
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(config_for(&server, "tok")).unwrap();
        let request = RequestInfo::new("POST", "https://app.example.com/login?password=hunter2&page=2")
            .with_header("Authorization", "Bearer abc")
            .with_header("Accept", "application/json")
            .with_form_field("secret", "s3cr3t")
            .with_form_field("name", "bob");

        client.request_error(Level::Critical, &request, &UploadFailed);
        client.wait().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_shutdown_flushes_then_rejects() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", ITEM_PATH)
            .with_status(200)
            .expect(2)
            .create_async()
            .await;

        let client = Client::new(config_for(&server, "tok")).unwrap();
        client.message(Level::Info, "one");
        client.message(Level::Info, "two");
        client.shutdown().await;

        client.message(Level::Info, "after shutdown");
        client.wait().await;

        let snapshot = client.metrics();
        assert_eq!(snapshot.delivered, 2);
        assert_eq!(snapshot.dropped, 1);
        mock.assert_async().await;
    }
}
