//! Transport abstraction layer for Cewire.
//!
//! The transcoding engine never touches sockets. Everything it needs from
//! HTTP — in either direction — is a [`Message`]: a case-insensitive header
//! mapping plus a byte-sequence body. Requests and responses are both
//! `Message`s; the engine treats them identically.
//!
//! This crate also carries the glue between `Message` and the `http` types
//! axum/hyper speak ([`Message::from_http`], [`Message::to_http_headers`]),
//! and [`HttpListener`], a bound TCP listener with ephemeral-port support
//! that the server crate hands to axum.

mod error;
mod http;
mod message;

pub use error::TransportError;
pub use http::HttpListener;
pub use message::{Headers, Message};
