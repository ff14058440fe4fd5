use std::collections::BTreeMap;

use serde_json::Value;

/// Metadata field carrying the session token
pub const AUTHORIZATION: &str = "Authorization";

/// Per-call metadata, sent as request headers.
///
/// Keys compare case-insensitively, like the headers they become.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any existing entry that differs only in case
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.retain(|k, _| !k.eq_ignore_ascii_case(key));
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An outbound unary call on its way through the interceptor pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryCall {
    pub service: String,
    pub method: String,
    pub input: Value,
    pub metadata: Metadata,
}

impl UnaryCall {
    pub fn new(service: &str, method: &str, input: Value) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
            input,
            metadata: Metadata::new(),
        }
    }

    /// `service/method`, used in logs and URLs
    pub fn path(&self) -> String {
        format!("{}/{}", self.service, self.method)
    }
}
