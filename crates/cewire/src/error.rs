//! Unified error type for the Cewire binding.

use cewire_protocol::ProtocolError;
use cewire_transport::TransportError;

/// Boxed error returned by user [`EventHandler`](crate::EventHandler)s.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `cewire` meta-crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attributes
/// let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CewireError {
    /// A protocol-level error (mode detection, validation, transcoding).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A transport-level error (bind, serve, header representation).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The client exchange already encoded events into its outbound
    /// message this conversation (or the conversation was released).
    #[error("events were already sent on this exchange")]
    AlreadySent,

    /// `recv_events` was called before a reply message was attached.
    #[error("no reply has been attached to this exchange")]
    NoReply,

    /// The user handler failed; the server maps this to a server-error
    /// response.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}
