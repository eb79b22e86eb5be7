//! Client - fire-and-forget reporting entry point

use std::error::Error;
use std::sync::{Arc, PoisonError, RwLock};

use config_loader::ConfigLoader;
use contracts::{ClientConfig, DeliveryTransport, EventRecord, Level};
use dispatcher::{
    Credential, DiagnosticSink, DispatchQueue, HttpTransport, HttpTransportConfig,
    MetricsSnapshot, QueueConfig, TracingDiagnostics,
};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::ReporterError;
use crate::payload::{self, Extras, Settings};
use crate::request::RequestInfo;

const QUEUE_NAME: &str = "reporter";

/// Reporting client
///
/// Every reporting method builds a record on the calling thread and offers
/// it to the dispatch queue; none of them block or return an error. Drops
/// and delivery failures go to the configured `DiagnosticSink`.
pub struct Client {
    settings: RwLock<Settings>,
    credential: Credential,
    filter_headers: Regex,
    filter_fields: Regex,
    queue: DispatchQueue<EventRecord>,
}

impl Client {
    /// Validate `config`, build the HTTP transport and start the delivery worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: ClientConfig) -> Result<Self, ReporterError> {
        ConfigLoader::validate(&config)?;
        let transport = HttpTransport::new("http", HttpTransportConfig::from_client_config(&config))?;
        Self::with_transport(config, transport, Arc::new(TracingDiagnostics))
    }

    /// Start a client on a caller-supplied transport and diagnostic sink
    ///
    /// Only the capacity bound and the redaction patterns are checked here.
    #[instrument(
        name = "client_with_transport",
        skip(config, transport, diagnostics),
        fields(environment = %config.environment, capacity = config.capacity)
    )]
    pub fn with_transport<T: DeliveryTransport + 'static>(
        config: ClientConfig,
        transport: T,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, ReporterError> {
        ConfigLoader::validate_capacity(&config)?;

        // header names arrive lowercased from `http`, so match them case-insensitively
        let filter_headers = RegexBuilder::new(&config.filter_headers)
            .case_insensitive(true)
            .build()
            .map_err(|source| ReporterError::InvalidPattern {
                field: "filter_headers",
                source,
            })?;
        let filter_fields =
            Regex::new(&config.filter_fields).map_err(|source| ReporterError::InvalidPattern {
                field: "filter_fields",
                source,
            })?;

        let credential = Credential::new(config.access_token);
        let queue = DispatchQueue::spawn(
            QueueConfig::new(QUEUE_NAME, config.capacity),
            transport,
            credential.clone(),
            diagnostics,
        );

        debug!("Reporter client started");

        Ok(Self {
            settings: RwLock::new(Settings {
                environment: config.environment,
                code_version: config.code_version,
                server_host: config.server_host,
                server_root: config.server_root,
            }),
            credential,
            filter_headers,
            filter_fields,
            queue,
        })
    }

    // -- Settings

    /// Affects records built afterwards and the delivery-time credential check
    pub fn set_token(&self, token: impl Into<String>) {
        self.credential.set(token);
    }

    pub fn set_environment(&self, environment: impl Into<String>) {
        self.write_settings(|s| s.environment = environment.into());
    }

    pub fn set_code_version(&self, code_version: impl Into<String>) {
        self.write_settings(|s| s.code_version = code_version.into());
    }

    pub fn set_server_host(&self, server_host: impl Into<String>) {
        self.write_settings(|s| s.server_host = server_host.into());
    }

    /// Path to the application code root, not including the final slash
    pub fn set_server_root(&self, server_root: impl Into<String>) {
        self.write_settings(|s| s.server_root = server_root.into());
    }

    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // -- Error reporting

    pub fn error<E: Error + ?Sized + 'static>(&self, level: Level, err: &E) {
        self.error_with_extras(level, err, Extras::new());
    }

    pub fn error_with_extras<E: Error + ?Sized + 'static>(
        &self,
        level: Level,
        err: &E,
        extras: Extras,
    ) {
        let body = self.error_envelope(level, err, extras);
        self.push(payload::into_record(body));
    }

    /// Report an error together with redacted details of the request being served
    pub fn request_error<E: Error + ?Sized + 'static>(
        &self,
        level: Level,
        request: &RequestInfo,
        err: &E,
    ) {
        self.request_error_with_extras(level, request, err, Extras::new());
    }

    pub fn request_error_with_extras<E: Error + ?Sized + 'static>(
        &self,
        level: Level,
        request: &RequestInfo,
        err: &E,
        extras: Extras,
    ) {
        let mut body = self.error_envelope(level, err, extras);
        payload::set_data_field(
            &mut body,
            "request",
            request.to_payload(&self.filter_headers, &self.filter_fields),
        );
        self.push(payload::into_record(body));
    }

    // -- Message reporting

    pub fn message(&self, level: Level, message: &str) {
        self.message_with_extras(level, message, Extras::new());
    }

    pub fn message_with_extras(&self, level: Level, message: &str, extras: Extras) {
        let mut body = self.envelope(level, message, extras);
        payload::set_data_field(&mut body, "body", payload::message_body(message));
        self.push(payload::into_record(body));
    }

    /// Offer an already-built record to the queue
    pub fn push(&self, record: EventRecord) {
        self.queue.enqueue(record);
    }

    // -- Lifecycle

    /// Wait until every record reported so far has been delivered or dropped
    pub async fn wait(&self) {
        self.queue.drain().await;
    }

    /// Blocking variant of [`wait`](Self::wait)
    pub fn wait_blocking(&self) {
        self.queue.drain_blocking();
    }

    /// Deliver what is queued, stop the worker, reject later reports
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.queue.metrics()
    }

    fn envelope(&self, level: Level, title: &str, extras: Extras) -> Map<String, Value> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        payload::build_body(&self.credential.get(), &settings, level, title, extras)
    }

    fn error_envelope<E: Error + ?Sized + 'static>(
        &self,
        level: Level,
        err: &E,
        extras: Extras,
    ) -> Map<String, Value> {
        let mut body = self.envelope(level, &err.to_string(), extras);
        let (error_body, fingerprint) = payload::error_body(err);
        payload::set_data_field(&mut body, "body", error_body);
        payload::set_data_field(&mut body, "fingerprint", Value::String(fingerprint));
        body
    }

    fn write_settings(&self, update: impl FnOnce(&mut Settings)) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut *settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::ContractError;
    use dispatcher::MemoryDiagnostics;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    impl DeliveryTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&mut self, body: Bytes) -> Result<u16, ContractError> {
            self.bodies
                .lock()
                .unwrap()
                .push(serde_json::from_slice(&body).unwrap());
            Ok(200)
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    fn client(config: ClientConfig) -> (Client, RecordingTransport, Arc<MemoryDiagnostics>) {
        let transport = RecordingTransport::default();
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let client =
            Client::with_transport(config, transport.clone(), diagnostics.clone()).unwrap();
        (client, transport, diagnostics)
    }

    #[tokio::test]
    async fn test_message_payload() {
        let config = ClientConfig {
            environment: "production".to_string(),
            ..ClientConfig::with_token("tok")
        };
        let (client, transport, _) = client(config);
        client.set_server_host("web-1");

        let mut extras = Extras::new();
        extras.insert("job".to_string(), json!("nightly"));
        client.message_with_extras(Level::Info, "backup done", extras);
        client.wait().await;

        let bodies = transport.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["access_token"], "tok");
        assert_eq!(body["data"]["level"], "info");
        assert_eq!(body["data"]["title"], "backup done");
        assert_eq!(body["data"]["environment"], "production");
        assert_eq!(body["data"]["server"]["host"], "web-1");
        assert_eq!(body["data"]["job"], "nightly");
        assert_eq!(body["data"]["body"]["message"]["body"], "backup done");
    }

    #[tokio::test]
    async fn test_error_payload_has_trace_chain_and_fingerprint() {
        let (client, transport, _) = client(ClientConfig::with_token("tok"));

        let err = "abc".parse::<i32>().unwrap_err();
        client.error(Level::Critical, &err);
        client.wait().await;

        let bodies = transport.bodies.lock().unwrap();
        let data = &bodies[0]["data"];
        assert_eq!(data["level"], "critical");
        assert_eq!(data["title"], err.to_string());
        assert_eq!(
            data["body"]["trace_chain"][0]["exception"]["class"],
            "ParseIntError"
        );
        assert_eq!(data["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_request_error_is_redacted() {
        let (client, transport, _) = client(ClientConfig::with_token("tok"));

        let request = RequestInfo::new("POST", "/session?token=abc&page=2")
            .with_header("authorization", "Bearer xyz")
            .with_form_field("password", "hunter2");
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        client.request_error(Level::Error, &request, &err);
        client.wait().await;

        let bodies = transport.bodies.lock().unwrap();
        let req = &bodies[0]["data"]["request"];
        assert_eq!(req["headers"]["authorization"], crate::FILTERED);
        assert_eq!(req["GET"]["token"], crate::FILTERED);
        assert_eq!(req["GET"]["page"], "2");
        assert_eq!(req["POST"]["password"], crate::FILTERED);
        // the caller's request is untouched
        assert_eq!(request.form["password"], vec!["hunter2"]);
    }

    #[tokio::test]
    async fn test_missing_token_reports_and_drains() {
        let (client, transport, diagnostics) = client(ClientConfig::default());

        for i in 0..5 {
            client.message(Level::Debug, &format!("tick {i}"));
        }
        client.wait().await;

        assert_eq!(client.metrics().accepted, 5);
        assert_eq!(diagnostics.count("missing_credential"), 5);
        assert!(transport.bodies.lock().unwrap().is_empty());

        client.set_token("late");
        client.message(Level::Info, "after token");
        client.wait().await;
        assert_eq!(transport.bodies.lock().unwrap()[0]["access_token"], "late");
    }

    #[tokio::test]
    async fn test_full_queue_drops_newest() {
        let config = ClientConfig {
            capacity: 2,
            ..ClientConfig::with_token("tok")
        };
        let (client, transport, diagnostics) = client(config);

        client.message(Level::Info, "A");
        client.message(Level::Info, "B");
        client.message(Level::Info, "C");
        client.wait().await;

        assert_eq!(diagnostics.count("queue_full"), 1);
        let titles: Vec<_> = transport
            .bodies
            .lock()
            .unwrap()
            .iter()
            .map(|b| b["data"]["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_later_reports() {
        let (client, _transport, diagnostics) = client(ClientConfig::with_token("tok"));
        client.message(Level::Info, "before");
        client.shutdown().await;
        client.message(Level::Info, "after");

        assert_eq!(client.metrics().delivered, 1);
        assert_eq!(diagnostics.count("shut_down"), 1);
    }

    #[tokio::test]
    async fn test_invalid_pattern_rejected() {
        let config = ClientConfig {
            filter_fields: "(".to_string(),
            ..ClientConfig::default()
        };
        let result = Client::with_transport(
            config,
            RecordingTransport::default(),
            Arc::new(MemoryDiagnostics::new()),
        );
        assert!(matches!(
            result,
            Err(ReporterError::InvalidPattern {
                field: "filter_fields",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_new_validates_config() {
        let config = ClientConfig {
            endpoint: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            Client::new(config),
            Err(ReporterError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_capacity_is_an_error() {
        let config = ClientConfig {
            capacity: usize::MAX / 2,
            ..ClientConfig::with_token("tok")
        };

        let result = Client::with_transport(
            config.clone(),
            RecordingTransport::default(),
            Arc::new(MemoryDiagnostics::new()),
        );
        assert!(matches!(
            result,
            Err(ReporterError::Contract(ContractError::ConfigValidation { ref field, .. }))
                if field == "capacity"
        ));
        assert!(Client::new(config).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_wait_blocking_from_sync_thread() {
        let (client, transport, _) = client(ClientConfig::with_token("tok"));
        let client = Arc::new(client);

        for i in 0..10 {
            client.message(Level::Info, &format!("event {i}"));
        }

        let waiter = {
            let client = Arc::clone(&client);
            tokio::task::spawn_blocking(move || client.wait_blocking())
        };
        tokio::time::timeout(std::time::Duration::from_secs(2), waiter)
            .await
            .expect("blocking wait should return")
            .unwrap();

        assert_eq!(transport.bodies.lock().unwrap().len(), 10);
        assert_eq!(client.metrics().in_flight, 0);
    }
}
