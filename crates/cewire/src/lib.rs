//! # Cewire
//!
//! A CloudEvents-over-HTTP wire binding.
//!
//! Cewire converts between an in-memory event representation and the two
//! HTTP wire encodings — binary (attributes as `ce-*` headers, payload as
//! raw body) and structured (one JSON envelope, singleton or batch) — and
//! builds the client/server event-exchange protocol on top: `send`/`recv`
//! on the client side, `get`/`set` on the server side, plus a ready-to-run
//! event server.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cewire::prelude::*;
//!
//! # async fn run() -> Result<(), CewireError> {
//! let server = listen_and_serve_ce(
//!     "127.0.0.1:0",
//!     DefaultConverter,
//!     |events: Vec<Event>| Ok::<_, BoxError>(events),
//! )
//! .await?;
//! println!("listening on http://{}", server.local_addr());
//! server.join().await
//! # }
//! ```
//!
//! Conversion between attribute maps and events is a strategy supplied per
//! call ([`EventConverter`]), so callers can default missing attributes and
//! still delegate to [`DefaultConverter`](cewire_protocol::DefaultConverter)
//! for the required-field validation.

mod client;
mod error;
mod handler;
mod server;

pub use client::ClientExchange;
pub use error::{BoxError, CewireError};
pub use handler::EventHandler;
pub use server::{ServerHandle, get_events, listen_and_serve_ce, set_events};

/// One-stop imports for binding users.
pub mod prelude {
    pub use cewire_protocol::{
        AttributeMap, DefaultConverter, Event, EventConverter, EventData, Mode,
        ProtocolError,
    };
    pub use cewire_transport::{Headers, HttpListener, Message, TransportError};

    pub use crate::{
        BoxError, CewireError, ClientExchange, EventHandler, ServerHandle,
        get_events, listen_and_serve_ce, set_events,
    };
}
