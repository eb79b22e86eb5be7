//! Request extraction
//!
//! Turns an incoming HTTP request into the redacted `request` object of a payload.

use regex::Regex;
use serde_json::{json, Value};

use crate::redact::{encode_query, filter_params, flatten_values, Params};

/// The parts of an HTTP request that end up in a payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    /// Full URL or origin-form target (`/path?query`)
    pub url: String,
    pub headers: Params,
    /// Parsed form body (POST/PUT params); the body itself is never read here
    pub form: Params,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Query parameters parsed from the URL
    pub fn query(&self) -> Params {
        let Some((_, rest)) = self.url.split_once('?') else {
            return Params::new();
        };
        let query = rest.split_once('#').map_or(rest, |(q, _)| q);

        let mut params = Params::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        params
    }

    /// Build the redacted `request` object
    pub fn to_payload(&self, filter_headers: &Regex, filter_fields: &Regex) -> Value {
        let clean_query = filter_params(filter_fields, &self.query());

        json!({
            "url": self.url,
            "method": self.method,
            "headers": flatten_values(&filter_params(filter_headers, &self.headers)),
            "query_string": encode_query(&clean_query),
            "GET": flatten_values(&clean_query),
            "POST": flatten_values(&filter_params(filter_fields, &self.form)),
        })
    }
}

impl<B> From<&http::Request<B>> for RequestInfo {
    fn from(request: &http::Request<B>) -> Self {
        let mut headers = Params::new();
        for (name, value) in request.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            method: request.method().as_str().to_string(),
            url: request.uri().to_string(),
            headers,
            form: Params::new(),
        }
    }
}
