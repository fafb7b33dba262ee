//! Client side of one request/response conversation.

use cewire_protocol::{Event, EventConverter, Mode, decode_message, encode_message};
use cewire_transport::Message;

use crate::CewireError;

/// A client exchange: one outbound message, one (eventual) inbound reply.
///
/// The exchange owns its outbound [`Message`] exclusively for the duration
/// of one conversation. After the transport round-trip, the reply message
/// is handed in with [`attach_reply`](Self::attach_reply) and decoded with
/// [`recv_events`](Self::recv_events).
///
/// In a loopback setup (no network), [`take_request`](Self::take_request)
/// moves the outbound message directly to the server side and the server's
/// freshly written reply moves back via `attach_reply` — explicit ownership
/// transfer instead of shared aliasing.
///
/// [`release`](Self::release) drops both messages and is idempotent;
/// dropping the exchange releases them as well, so every exit path —
/// including error paths — cleans up.
#[derive(Debug)]
pub struct ClientExchange {
    outbound: Option<Message>,
    inbound: Option<Message>,
    sent: bool,
}

impl Default for ClientExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientExchange {
    /// Creates an exchange with a fresh outbound message.
    pub fn new() -> Self {
        Self {
            outbound: Some(Message::new()),
            inbound: None,
            sent: false,
        }
    }

    /// Encodes `events` into the outbound message in the given mode.
    ///
    /// # Errors
    /// Fails with [`CewireError::AlreadySent`] if events were already sent
    /// on this exchange (or it was released), and propagates any encode
    /// failure from the engine.
    pub fn send_events<C>(
        &mut self,
        converter: &C,
        events: &[Event],
        mode: Mode,
    ) -> Result<(), CewireError>
    where
        C: EventConverter + ?Sized,
    {
        if self.sent {
            return Err(CewireError::AlreadySent);
        }
        let outbound = self.outbound.as_mut().ok_or(CewireError::AlreadySent)?;
        encode_message(converter, outbound, events, mode)?;
        self.sent = true;
        Ok(())
    }

    /// The encoded outbound message, if still held.
    pub fn request(&self) -> Option<&Message> {
        self.outbound.as_ref()
    }

    /// Moves the outbound message out, toward a transport or — in loopback
    /// setups — directly to the server exchange.
    pub fn take_request(&mut self) -> Option<Message> {
        self.outbound.take()
    }

    /// Attaches the reply message received from the transport.
    pub fn attach_reply(&mut self, reply: Message) {
        self.inbound = Some(reply);
    }

    /// Decodes the attached reply into events.
    ///
    /// # Errors
    /// Fails with [`CewireError::NoReply`] if no reply has been attached,
    /// and propagates any decode failure from the engine.
    pub fn recv_events<C>(
        &mut self,
        converter: &C,
    ) -> Result<(Vec<Event>, Mode), CewireError>
    where
        C: EventConverter + ?Sized,
    {
        let inbound = self.inbound.as_ref().ok_or(CewireError::NoReply)?;
        Ok(decode_message(converter, inbound)?)
    }

    /// Releases both messages. Safe to call any number of times.
    pub fn release(&mut self) {
        self.outbound = None;
        self.inbound = None;
    }
}

// =========================================================================
// Tests
// =========================================================================
