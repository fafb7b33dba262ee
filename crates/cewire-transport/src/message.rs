//! The [`Message`] abstraction: headers plus body, for both directions.

use std::collections::HashMap;

/// A case-insensitive header mapping.
///
/// HTTP header names are case-insensitive, so names are normalized to
/// lowercase on insert and lookup. Setting a name that already exists
/// replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    /// Creates an empty header mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header, replacing any existing value for the same name.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.map
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(&name.to_ascii_lowercase())
    }

    /// Returns `true` if a header with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterates over `(name, value)` pairs. Names are lowercase; order is
    /// unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One HTTP message as the transcoding engine sees it: a header mapping and
/// a byte-sequence body.
///
/// The same type models requests and responses. A `Message` is exclusively
/// owned by whoever is currently reading or writing it — it is never shared
/// across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    headers: Headers,
    body: Vec<u8>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// The message headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the message headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The message body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replaces the message body.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Takes the body out of the message, leaving it empty.
    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Ce-Id", "abc");
        assert_eq!(headers.get("ce-id"), Some("abc"));
        assert_eq!(headers.get("CE-ID"), Some("abc"));
        assert!(headers.contains("cE-iD"));
    }

    #[test]
    fn test_headers_set_replaces_existing_value() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("content-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.set("ce-source", "/test");
        assert_eq!(headers.remove("CE-Source"), Some("/test".to_string()));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("ce-source"), None);
    }

    #[test]
    fn test_headers_iter_yields_lowercase_names() {
        let mut headers = Headers::new();
        headers.set("Ce-Type", "example");
        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("ce-type", "example")]);
    }

    #[test]
    fn test_message_body_round_trip() {
        let mut message = Message::new();
        assert!(message.body().is_empty());
        message.set_body(b"payload".to_vec());
        assert_eq!(message.body(), b"payload");
        assert_eq!(message.take_body(), b"payload");
        assert!(message.body().is_empty());
    }
}
