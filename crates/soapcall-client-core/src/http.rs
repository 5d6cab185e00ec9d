use serde_json::{Map, Value};

pub const SOAP_ACTION_HEADER: &str = "SOAPAction";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Ordered header mapping.
///
/// Names compare case-insensitively; inserting an existing name replaces the
/// previous entry in place (the new spelling wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            *entry = (name, value);
            return;
        }
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Right-biased union: a fresh mapping holding `self` overlaid with
    /// `overrides`. Neither input is modified.
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        merged.extend(overrides.iter());
        merged
    }
}

impl<N: Into<String>, V: Into<String>> Extend<(N, V)> for Headers {
    fn extend<T: IntoIterator<Item = (N, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

/// Transport options contributed by security schemes (timeouts, TLS knobs).
/// Transports ignore the keys they do not understand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions(Map<String, Value>);

impl RequestOptions {
    pub const TIMEOUT_MS: &'static str = "timeout_ms";
    pub const ACCEPT_INVALID_CERTS: &'static str = "accept_invalid_certs";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.get(Self::TIMEOUT_MS)
            .and_then(Value::as_u64)
            .map(std::time::Duration::from_millis)
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.get(Self::ACCEPT_INVALID_CERTS)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One SOAP POST, ready for a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Headers,
    pub body: String,
    pub options: RequestOptions,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_an_idempotent_upsert() {
        let mut once = Headers::new();
        once.insert("X-Trace", "1");

        let mut twice = once.clone();
        twice.insert("X-Trace", "1");

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_names_compare_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/xml");
        headers.insert("content-type", "application/xml");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/xml"));
    }

    #[test]
    fn test_merge_is_right_biased_and_non_destructive() {
        let protocol: Headers = [
            (SOAP_ACTION_HEADER, "\"urn:a/Get\""),
            (CONTENT_TYPE_HEADER, SOAP_CONTENT_TYPE),
        ]
        .into_iter()
        .collect();
        let user: Headers = [(CONTENT_TYPE_HEADER, "text/plain"), ("X-Trace", "1")]
            .into_iter()
            .collect();

        let merged = protocol.merged(&user);

        assert_eq!(merged.get(SOAP_ACTION_HEADER), Some("\"urn:a/Get\""));
        assert_eq!(merged.get(CONTENT_TYPE_HEADER), Some("text/plain"));
        assert_eq!(merged.get("X-Trace"), Some("1"));
        assert_eq!(protocol.get(CONTENT_TYPE_HEADER), Some(SOAP_CONTENT_TYPE));
        assert_eq!(protocol.len(), 2);
        assert_eq!(user.len(), 2);
    }

    #[test]
    fn test_request_options_accessors() {
        let mut options = RequestOptions::new();
        assert!(options.timeout().is_none());
        assert!(!options.accept_invalid_certs());

        options.insert(RequestOptions::TIMEOUT_MS, 1500);
        options.insert(RequestOptions::ACCEPT_INVALID_CERTS, true);

        assert_eq!(options.timeout(), Some(std::time::Duration::from_millis(1500)));
        assert!(options.accept_invalid_certs());
    }
}
