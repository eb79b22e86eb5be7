//! Payload builder
//!
//! Produces the `{ "access_token", "data" }` envelope the ingestion API expects.

use std::error::Error;

use chrono::Utc;
use contracts::{EventRecord, Level};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Extra custom fields merged into `data`
pub type Extras = Map<String, Value>;

const NOTIFIER_NAME: &str = env!("CARGO_PKG_NAME");
const NOTIFIER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client-wide metadata stamped on every payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub environment: String,
    pub code_version: String,
    pub server_host: String,
    /// Application code root, without the trailing slash
    pub server_root: String,
}

/// Build the envelope shared by errors and messages
///
/// Extras are merged last and win on key collisions.
pub fn build_body(
    access_token: &str,
    settings: &Settings,
    level: Level,
    title: &str,
    extras: Extras,
) -> Map<String, Value> {
    let mut data = json!({
        "environment": settings.environment,
        "title": title,
        "level": level,
        "timestamp": Utc::now().timestamp(),
        "platform": std::env::consts::OS,
        "language": "rust",
        "code_version": settings.code_version,
        "server": {
            "host": settings.server_host,
            "root": settings.server_root,
        },
        "notifier": {
            "name": NOTIFIER_NAME,
            "version": NOTIFIER_VERSION,
        },
    });

    if let Value::Object(fields) = &mut data {
        fields.extend(extras);
    }

    let mut body = Map::new();
    body.insert("access_token".to_string(), Value::from(access_token));
    body.insert("data".to_string(), data);
    body
}

/// Insert a key into the `data` object of an envelope
pub fn set_data_field(body: &mut Map<String, Value>, key: &str, value: Value) {
    if let Some(Value::Object(data)) = body.get_mut("data") {
        data.insert(key.to_string(), value);
    }
}

/// Seal an envelope into an immutable record
pub fn into_record(body: Map<String, Value>) -> EventRecord {
    EventRecord::from(body)
}

/// `{"message": {"body": msg}}`
pub fn message_body(message: &str) -> Value {
    json!({ "message": { "body": message } })
}

/// Error body plus fingerprint
///
/// The body is a `trace_chain`, outermost error first, followed by each
/// `source()`. The fingerprint is stable for the same chain of
/// class/message pairs.
pub fn error_body<E>(err: &E) -> (Value, String)
where
    E: Error + ?Sized + 'static,
{
    let mut links = vec![(top_class(err), err.to_string())];

    let mut source = err.source();
    while let Some(cause) = source {
        links.push((debug_class(cause), cause.to_string()));
        source = cause.source();
    }

    let mut hasher = Sha256::new();
    for (class, message) in &links {
        hasher.update(class.as_bytes());
        hasher.update(b":");
        hasher.update(message.as_bytes());
        hasher.update(b"\n");
    }
    let fingerprint = format!("{:x}", hasher.finalize());

    let chain: Vec<Value> = links
        .into_iter()
        .map(|(class, message)| {
            json!({
                "exception": { "class": class, "message": message },
                "frames": [],
            })
        })
        .collect();

    (json!({ "trace_chain": chain }), fingerprint)
}

/// Class name of the outermost error: its type name when statically known
fn top_class<E: Error + ?Sized>(err: &E) -> String {
    let full = std::any::type_name::<E>();
    if full.starts_with("dyn ") {
        return debug_class(err);
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Leading identifier of the Debug rendering, e.g. `ParseIntError` or `Custom`
fn debug_class<E: Error + ?Sized>(err: &E) -> String {
    let rendered = format!("{err:?}");
    let ident: String = rendered
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() {
        "Error".to_string()
    } else {
        ident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer {
        inner: std::num::ParseIntError,
    }

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failed to read port")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.inner)
        }
    }

    fn outer() -> Outer {
        Outer {
            inner: "x".parse::<u16>().unwrap_err(),
        }
    }

    #[test]
    fn test_build_body_envelope() {
        let settings = Settings {
            environment: "production".to_string(),
            code_version: "abc123".to_string(),
            server_host: "web-1".to_string(),
            server_root: "/srv/app".to_string(),
        };
        let mut extras = Extras::new();
        extras.insert("user_id".to_string(), json!(42));
        extras.insert("language".to_string(), json!("rust-async"));

        let body = build_body("tok", &settings, Level::Warning, "disk full", extras);

        assert_eq!(body["access_token"], "tok");
        let data = &body["data"];
        assert_eq!(data["environment"], "production");
        assert_eq!(data["level"], "warning");
        assert_eq!(data["title"], "disk full");
        assert_eq!(data["server"]["host"], "web-1");
        assert_eq!(data["notifier"]["name"], NOTIFIER_NAME);
        assert_eq!(data["user_id"], 42);
        // extras override defaults
        assert_eq!(data["language"], "rust-async");
        assert!(data["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_error_body_walks_source_chain() {
        let (body, fingerprint) = error_body(&outer());

        let chain = body["trace_chain"].as_array().unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0]["exception"]["class"], "Outer");
        assert_eq!(chain[0]["exception"]["message"], "failed to read port");
        assert_eq!(chain[1]["exception"]["class"], "ParseIntError");
        assert_eq!(fingerprint.len(), 64);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let (_, first) = error_body(&outer());
        let (_, second) = error_body(&outer());
        assert_eq!(first, second);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let (_, other) = error_body(&io);
        assert_ne!(first, other);
    }

    #[test]
    fn test_dyn_error_class_from_debug() {
        let boxed: Box<dyn Error> = Box::new(outer());
        let (body, _) = error_body(boxed.as_ref());
        assert_eq!(body["trace_chain"][0]["exception"]["class"], "Outer");
    }

    #[test]
    fn test_message_body() {
        assert_eq!(message_body("hello"), json!({ "message": { "body": "hello" } }));
    }
}
