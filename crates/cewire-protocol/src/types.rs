//! Core types: the in-memory event, its payload, the wire mode, and the
//! transient attribute map used during conversion.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// The binding version tag written into `specversion` by [`Event::new`].
pub const SPEC_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which of the two wire encodings a message uses.
///
/// Binary mode carries exactly one event (attributes as headers, payload as
/// raw body). Structured mode carries an envelope of one-or-more events as a
/// single JSON body; singleton and batch envelopes share this mode and are
/// told apart by content-type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attributes in `ce-*` headers, payload in the body. One event.
    Binary,
    /// Attributes and payload in one JSON envelope. One or more events.
    Structured,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Binary => write!(f, "binary"),
            Mode::Structured => write!(f, "structured"),
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An event payload: either opaque bytes or a structured JSON value.
///
/// Which one a consumer gets depends on `datacontenttype` — a JSON content
/// type decodes into `Json`, anything else stays `Binary`. In the JSON
/// envelope, `Json` travels under the `data` key and `Binary` under
/// `data_base64`.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Raw bytes, interpreted by the consumer via `datacontenttype`.
    Binary(Vec<u8>),
    /// A structured value, already parsed from JSON.
    Json(Value),
}

/// One occurrence notification.
///
/// An event is valid only if `id`, `source`, `specversion`, and `ty` are
/// non-empty — [`DefaultConverter`](crate::DefaultConverter) enforces this
/// when decoding. The remaining fields are optional, and anything beyond the
/// fixed attribute set lands in `extensions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Producer-assigned unique identifier.
    pub id: String,
    /// Origin identifier.
    pub source: String,
    /// Binding version tag.
    pub specversion: String,
    /// Event type identifier. Named `ty` because `type` is reserved; the
    /// wire attribute is `type`.
    pub ty: String,
    /// Occurrence timestamp.
    pub time: Option<DateTime<Utc>>,
    /// MIME type describing `data`.
    pub datacontenttype: Option<String>,
    /// Schema URI for `data`.
    pub dataschema: Option<String>,
    /// Subject of the event within the source.
    pub subject: Option<String>,
    /// Optional payload.
    pub data: Option<EventData>,
    /// Caller-defined attributes beyond the fixed set.
    pub extensions: HashMap<String, Value>,
}

impl Event {
    /// Creates an event with the required attributes set and
    /// `specversion` pinned to [`SPEC_VERSION`].
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            specversion: SPEC_VERSION.to_string(),
            ty: ty.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// AttributeMap
// ---------------------------------------------------------------------------

/// The transient attribute form used during conversion.
///
/// The codec parses wire bytes into this map, and an
/// [`EventConverter`](crate::EventConverter) turns it into a typed [`Event`]
/// (and back). It lives for exactly one conversion call — it is never
/// persisted and never shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    map: Map<String, Value>,
}

impl AttributeMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.map.insert(name.into(), value);
    }

    /// Inserts a string attribute.
    pub fn insert_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), Value::String(value.into()));
    }

    /// Removes an attribute, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.map.remove(name)
    }

    /// Looks up an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Looks up an attribute as a string, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(Value::as_str)
    }

    /// Returns `true` if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Unwraps into the underlying JSON object map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.map
    }
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl From<AttributeMap> for Value {
    fn from(map: AttributeMap) -> Self {
        Value::Object(map.map)
    }
}

// =========================================================================
// Tests
// =========================================================================
