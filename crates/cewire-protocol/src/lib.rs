//! Wire protocol for Cewire.
//!
//! This crate defines everything between raw HTTP messages and typed
//! events:
//!
//! - **Types** ([`Event`], [`EventData`], [`Mode`], [`AttributeMap`]) —
//!   the in-memory event representation and the transient attribute form
//!   used during conversion.
//! - **Conversion** ([`EventConverter`], [`DefaultConverter`]) — the
//!   pluggable strategy that turns an attribute map into a typed event and
//!   back. Callers supply it per call site, never via global state.
//! - **Codec** ([`detect_mode`], [`decode_message`], [`encode_message`]) —
//!   the transcoding engine for the two wire encodings: binary (attributes
//!   as `ce-*` headers, payload as raw body, exactly one event) and
//!   structured (one JSON envelope, singleton or batch).
//! - **Errors** ([`ProtocolError`]) — what can go wrong while detecting,
//!   validating, or transcoding.
//!
//! # Architecture
//!
//! ```text
//! Message (headers + body) ⇄ AttributeMap ⇄ Event
//!            codec              converter
//! ```
//!
//! The attribute map never escapes a single decode/encode call; the typed
//! [`Event`] is the only representation that crosses this crate's boundary.

mod codec;
mod convert;
mod error;
mod types;

pub use codec::{
    CONTENT_TYPE_BATCH, CONTENT_TYPE_STRUCTURED, HEADER_PREFIX, decode_message,
    detect_mode, encode_message,
};
pub use convert::{DefaultConverter, EventConverter};
pub use error::ProtocolError;
pub use types::{AttributeMap, Event, EventData, Mode, SPEC_VERSION};
