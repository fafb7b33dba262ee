//! The transcoding engine: wire message ⇄ attribute map ⇄ typed events.
//!
//! Two independent directions, each mode-specific. Decode is conservative
//! (a batch that decodes to zero events is an error — a consumer never has
//! to special-case "zero events received successfully") while encode is
//! permissive (a producer may legitimately send an empty batch, e.g. a poll
//! reply with nothing new).

use serde_json::Value;

use cewire_transport::Message;

use crate::{AttributeMap, Event, EventConverter, Mode, ProtocolError};

/// Reserved header prefix marking binary-mode attributes (`ce-id`,
/// `ce-source`, …, `ce-<extension>`). Matched case-insensitively.
pub const HEADER_PREFIX: &str = "ce-";

/// Content type of a structured singleton envelope.
pub const CONTENT_TYPE_STRUCTURED: &str = "application/cloudevents+json";

/// Content type of a structured batch envelope.
pub const CONTENT_TYPE_BATCH: &str = "application/cloudevents-batch+json";

const CONTENT_TYPE_HEADER: &str = "content-type";

/// Body content type written when an event carries data without a declared
/// `datacontenttype`.
const CONTENT_TYPE_OPAQUE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Mode detection
// ---------------------------------------------------------------------------

/// Picks the wire mode of an inbound message.
///
/// A structured content type (singleton or batch) selects structured mode
/// and takes precedence over any `ce-*` headers also present. Otherwise, at
/// least one `ce-*` header selects binary mode. A message with neither
/// signal fails with [`ProtocolError::ModeDetection`].
pub fn detect_mode(message: &Message) -> Result<Mode, ProtocolError> {
    let content_type = message.headers().get(CONTENT_TYPE_HEADER);
    if let Some(raw) = content_type {
        if is_structured_content(raw) {
            return Ok(Mode::Structured);
        }
    }
    let has_prefixed = message
        .headers()
        .iter()
        .any(|(name, _)| name.starts_with(HEADER_PREFIX));
    if has_prefixed {
        return Ok(Mode::Binary);
    }
    Err(ProtocolError::ModeDetection {
        content_type: content_type.map(str::to_string),
    })
}

/// Strips content-type parameters (`; charset=...`) and surrounding space.
fn media_type(raw: &str) -> &str {
    raw.split(';').next().unwrap_or(raw).trim()
}

fn is_structured_content(raw: &str) -> bool {
    let token = media_type(raw);
    token.eq_ignore_ascii_case(CONTENT_TYPE_STRUCTURED)
        || token.eq_ignore_ascii_case(CONTENT_TYPE_BATCH)
}

fn is_batch_content(raw: &str) -> bool {
    media_type(raw).eq_ignore_ascii_case(CONTENT_TYPE_BATCH)
}

/// JSON-like body content types decode into structured payload values in
/// binary mode; everything else stays opaque bytes.
fn is_json_content(raw: &str) -> bool {
    let token = media_type(raw);
    token.eq_ignore_ascii_case("application/json")
        || token.eq_ignore_ascii_case("text/json")
        || token.to_ascii_lowercase().ends_with("+json")
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decodes a message into events, reporting which mode was detected.
///
/// Binary mode yields exactly one event. Structured mode yields every
/// envelope element, failing on the first element that does not convert and
/// rejecting empty batches.
pub fn decode_message<C>(
    converter: &C,
    message: &Message,
) -> Result<(Vec<Event>, Mode), ProtocolError>
where
    C: EventConverter + ?Sized,
{
    match detect_mode(message)? {
        Mode::Binary => {
            let event = decode_binary(converter, message)?;
            Ok((vec![event], Mode::Binary))
        }
        Mode::Structured => {
            let events = decode_structured(converter, message)?;
            Ok((events, Mode::Structured))
        }
    }
}

fn decode_binary<C>(converter: &C, message: &Message) -> Result<Event, ProtocolError>
where
    C: EventConverter + ?Sized,
{
    let mut map = AttributeMap::new();
    for (name, value) in message.headers().iter() {
        if let Some(attribute) = name.strip_prefix(HEADER_PREFIX) {
            if !attribute.is_empty() {
                map.insert_string(attribute, value);
            }
        }
    }

    let content_type = message.headers().get(CONTENT_TYPE_HEADER);
    if let Some(content_type) = content_type {
        map.insert_string("datacontenttype", content_type);
    }

    let body = message.body();
    if !body.is_empty() {
        if content_type.is_some_and(is_json_content) {
            let value: Value = serde_json::from_slice(body)?;
            map.insert("data", value);
        } else {
            map.insert(
                "data_base64",
                Value::String(crate::convert::encode_base64(body)),
            );
        }
    }

    converter.map_to_event(map)
}

fn decode_structured<C>(
    converter: &C,
    message: &Message,
) -> Result<Vec<Event>, ProtocolError>
where
    C: EventConverter + ?Sized,
{
    let batch = message
        .headers()
        .get(CONTENT_TYPE_HEADER)
        .is_some_and(is_batch_content);
    let root: Value = serde_json::from_slice(message.body())?;

    if batch {
        let Value::Array(items) = root else {
            return Err(ProtocolError::Envelope {
                expected: "array",
                found: json_kind(&root),
            });
        };
        if items.is_empty() {
            return Err(ProtocolError::EmptyBatch);
        }
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                event_from_value(converter, item).map_err(|source| {
                    ProtocolError::Element {
                        index,
                        source: Box::new(source),
                    }
                })
            })
            .collect()
    } else {
        let event = event_from_value(converter, root)?;
        Ok(vec![event])
    }
}

fn event_from_value<C>(converter: &C, value: Value) -> Result<Event, ProtocolError>
where
    C: EventConverter + ?Sized,
{
    let Value::Object(map) = value else {
        return Err(ProtocolError::Envelope {
            expected: "object",
            found: json_kind(&value),
        });
    };
    converter.map_to_event(AttributeMap::from(map))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encodes events into a message in the requested mode.
///
/// Binary mode requires exactly one event. Structured mode emits a
/// singleton envelope for exactly one event and a batch envelope for any
/// other count — including zero, which is permitted on encode only.
pub fn encode_message<C>(
    converter: &C,
    message: &mut Message,
    events: &[Event],
    mode: Mode,
) -> Result<(), ProtocolError>
where
    C: EventConverter + ?Sized,
{
    match mode {
        Mode::Binary => match events {
            [event] => encode_binary(converter, message, event),
            _ => Err(ProtocolError::ModeCardinality(events.len())),
        },
        Mode::Structured => encode_structured(converter, message, events),
    }
}

fn encode_binary<C>(
    converter: &C,
    message: &mut Message,
    event: &Event,
) -> Result<(), ProtocolError>
where
    C: EventConverter + ?Sized,
{
    let mut map = converter.event_to_map(event);

    let declared_type = match map.remove("datacontenttype") {
        Some(Value::String(value)) => Some(value),
        Some(other) => Some(other.to_string()),
        None => None,
    };
    let json_data = map.remove("data");
    let binary_data = map.remove("data_base64");

    for (name, value) in map.into_inner() {
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        message
            .headers_mut()
            .set(format!("{HEADER_PREFIX}{name}"), text);
    }

    match (binary_data, json_data) {
        (Some(Value::String(encoded)), _) => {
            let bytes = crate::convert::decode_base64(&encoded)?;
            message.set_body(bytes);
            set_content_type(message, declared_type);
        }
        (_, Some(value)) => {
            message.set_body(serde_json::to_vec(&value)?);
            set_content_type(message, declared_type);
        }
        (None, None) => {
            if let Some(declared) = declared_type {
                message.headers_mut().set(CONTENT_TYPE_HEADER, declared);
            }
        }
        (Some(_), None) => {
            return Err(ProtocolError::Validation("data_base64".into()));
        }
    }

    Ok(())
}

fn set_content_type(message: &mut Message, declared: Option<String>) {
    let content_type =
        declared.unwrap_or_else(|| CONTENT_TYPE_OPAQUE.to_string());
    message.headers_mut().set(CONTENT_TYPE_HEADER, content_type);
}

fn encode_structured<C>(
    converter: &C,
    message: &mut Message,
    events: &[Event],
) -> Result<(), ProtocolError>
where
    C: EventConverter + ?Sized,
{
    let (envelope, content_type) = match events {
        [event] => (
            Value::from(converter.event_to_map(event)),
            CONTENT_TYPE_STRUCTURED,
        ),
        _ => (
            Value::Array(
                events
                    .iter()
                    .map(|event| Value::from(converter.event_to_map(event)))
                    .collect(),
            ),
            CONTENT_TYPE_BATCH,
        ),
    };
    message.set_body(serde_json::to_vec(&envelope)?);
    message.headers_mut().set(CONTENT_TYPE_HEADER, content_type);
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
