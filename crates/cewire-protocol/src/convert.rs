//! The conversion strategy between attribute maps and typed events.
//!
//! The codec never constructs an [`Event`] itself — it hands an
//! [`AttributeMap`] to whatever [`EventConverter`] the caller supplied.
//! This is the seam for custom policy: a converter may default missing
//! attributes (say, auto-generate `id`) and then delegate to
//! [`DefaultConverter`] so the required-field validation still runs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::{AttributeMap, Event, EventData, ProtocolError};

/// Converts between the transient attribute form and typed events.
///
/// Implementations are supplied per call site. Both directions are required
/// so one strategy value covers a whole conversation (send and receive).
pub trait EventConverter: Send + Sync + 'static {
    /// Builds a typed event from an attribute map.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] when the map violates the event
    /// invariants (missing/empty required attribute, malformed timestamp
    /// or payload).
    fn map_to_event(&self, map: AttributeMap) -> Result<Event, ProtocolError>;

    /// Flattens a typed event into an attribute map. Always succeeds.
    fn event_to_map(&self, event: &Event) -> AttributeMap;
}

/// The standard conversion pair.
///
/// `map_to_event` rejects any map whose `id`, `source`, `specversion`, or
/// `type` is missing or empty; recognized optional attributes are copied
/// into their typed fields and everything else lands in
/// [`Event::extensions`]. `event_to_map` emits all non-empty fixed
/// attributes plus all extensions, flattened into one mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl EventConverter for DefaultConverter {
    fn map_to_event(&self, mut map: AttributeMap) -> Result<Event, ProtocolError> {
        let id = required(&mut map, "id")?;
        let source = required(&mut map, "source")?;
        let specversion = required(&mut map, "specversion")?;
        let ty = required(&mut map, "type")?;

        let time = match map.remove("time") {
            Some(Value::String(raw)) => Some(parse_time(&raw)?),
            Some(_) => return Err(ProtocolError::Validation("time".into())),
            None => None,
        };

        let datacontenttype = optional(&mut map, "datacontenttype")?;
        let dataschema = optional(&mut map, "dataschema")?;
        let subject = optional(&mut map, "subject")?;

        // data_base64 wins over data when both are present; a well-formed
        // envelope never carries both.
        let data = match map.remove("data_base64") {
            Some(Value::String(encoded)) => {
                Some(EventData::Binary(BASE64.decode(encoded.as_bytes())?))
            }
            Some(_) => return Err(ProtocolError::Validation("data_base64".into())),
            None => map.remove("data").map(EventData::Json),
        };

        let extensions = map.into_inner().into_iter().collect();

        Ok(Event {
            id,
            source,
            specversion,
            ty,
            time,
            datacontenttype,
            dataschema,
            subject,
            data,
            extensions,
        })
    }

    fn event_to_map(&self, event: &Event) -> AttributeMap {
        let mut map = AttributeMap::new();
        for (name, value) in [
            ("id", &event.id),
            ("source", &event.source),
            ("specversion", &event.specversion),
            ("type", &event.ty),
        ] {
            if !value.is_empty() {
                map.insert_string(name, value.clone());
            }
        }
        if let Some(time) = event.time {
            map.insert_string("time", format_time(time));
        }
        for (name, value) in [
            ("datacontenttype", &event.datacontenttype),
            ("dataschema", &event.dataschema),
            ("subject", &event.subject),
        ] {
            if let Some(value) = value {
                if !value.is_empty() {
                    map.insert_string(name, value.clone());
                }
            }
        }
        match &event.data {
            Some(EventData::Json(value)) => map.insert("data", value.clone()),
            Some(EventData::Binary(bytes)) => {
                map.insert_string("data_base64", BASE64.encode(bytes));
            }
            None => {}
        }
        for (name, value) in &event.extensions {
            map.insert(name.clone(), value.clone());
        }
        map
    }
}

/// Removes a required attribute; fails unless it is a non-empty string.
fn required(map: &mut AttributeMap, name: &str) -> Result<String, ProtocolError> {
    match map.remove(name) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value),
        _ => Err(ProtocolError::Validation(name.to_string())),
    }
}

/// Removes an optional string attribute. Empty strings count as absent;
/// a present non-string value is a validation failure.
fn optional(map: &mut AttributeMap, name: &str) -> Result<Option<String>, ProtocolError> {
    match map.remove(name) {
        Some(Value::String(value)) => {
            Ok(if value.is_empty() { None } else { Some(value) })
        }
        Some(_) => Err(ProtocolError::Validation(name.to_string())),
        None => Ok(None),
    }
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>, ProtocolError> {
    Ok(BASE64.decode(encoded.as_bytes())?)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, ProtocolError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ProtocolError::InvalidTimestamp {
            value: raw.to_string(),
            source,
        })
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// =========================================================================
// Tests
// =========================================================================
