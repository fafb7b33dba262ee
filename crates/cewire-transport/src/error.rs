/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The server loop terminated abnormally.
    #[error("serve failed: {0}")]
    Serve(#[source] std::io::Error),

    /// A header name in a [`Message`](crate::Message) is not a legal HTTP
    /// header name (e.g. an extension attribute containing whitespace).
    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },

    /// A header value cannot be carried on the wire (control characters
    /// or non-ASCII bytes).
    #[error("invalid value for header {name:?}")]
    InvalidHeaderValue { name: String },
}
