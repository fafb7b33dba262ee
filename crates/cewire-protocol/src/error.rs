//! Error types for the protocol layer.

/// Errors that can occur while detecting a wire mode, validating
/// attributes, or transcoding between messages and events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A required attribute (`id`, `source`, `specversion`, `type`) is
    /// missing, empty, or not a string.
    #[error("required attribute {0:?} is missing or empty")]
    Validation(String),

    /// The message carries neither a structured content type nor any
    /// `ce-*` header, so no wire mode can be selected.
    #[error("cannot determine wire mode (content-type: {content_type:?})")]
    ModeDetection { content_type: Option<String> },

    /// Binary mode carries exactly one event per message; the caller
    /// supplied a different count on encode.
    #[error("binary mode carries exactly one event, got {0}")]
    ModeCardinality(usize),

    /// A structured batch decoded to zero events. Empty batches are legal
    /// on encode only.
    #[error("structured batch contains no events")]
    EmptyBatch,

    /// The envelope body is not well-formed JSON, or a payload could not
    /// be serialized.
    #[error("malformed JSON envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope parsed as JSON but has the wrong shape (e.g. a batch
    /// content type over a non-array body).
    #[error("structured envelope must be a JSON {expected}, got {found}")]
    Envelope {
        expected: &'static str,
        found: &'static str,
    },

    /// One element of a batch failed to convert. The index localizes the
    /// offending element.
    #[error("event {index} failed to convert: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ProtocolError>,
    },

    /// A `data_base64` payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The `time` attribute is not a valid RFC 3339 timestamp.
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
