//! Glue between [`Message`] and the `http` types axum/hyper speak.

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tokio::net::TcpListener;

use crate::{Message, TransportError};

/// Address used when the caller passes an empty listen address.
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:0";

impl Message {
    /// Builds a message from HTTP parts.
    ///
    /// Header values that are not valid UTF-8 visible-ASCII are skipped —
    /// event attributes are textual by definition, so such values cannot
    /// belong to this binding.
    pub fn from_http(headers: &HeaderMap, body: Vec<u8>) -> Self {
        let mut message = Message::new();
        for (name, value) in headers {
            match value.to_str() {
                Ok(value) => message.headers_mut().set(name.as_str(), value),
                Err(_) => {
                    tracing::debug!(name = %name, "skipping non-text header");
                }
            }
        }
        message.set_body(body);
        message
    }

    /// Converts the message headers into an `http` header map.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidHeaderName`] or
    /// [`TransportError::InvalidHeaderValue`] if a header cannot be
    /// represented on the wire (e.g. an extension attribute whose name
    /// contains whitespace).
    pub fn to_http_headers(&self) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(self.headers().len());
        for (name, value) in self.headers().iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeaderName {
                    name: name.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                TransportError::InvalidHeaderValue {
                    name: name.to_string(),
                }
            })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// A bound TCP listener for the HTTP server.
///
/// Wraps `tokio::net::TcpListener` so the caller learns the concrete bound
/// address before the server starts — binding `"127.0.0.1:0"` (or an empty
/// string) picks a free ephemeral port.
pub struct HttpListener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Binds to `addr` (an `interface:port` string). An empty string binds
    /// to a free port on the loopback interface.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let addr = if addr.is_empty() {
            DEFAULT_LISTEN_ADDR
        } else {
            addr
        };
        let inner = TcpListener::bind(addr).await.map_err(TransportError::Bind)?;
        let local_addr = inner.local_addr().map_err(TransportError::Bind)?;
        tracing::info!(%local_addr, "HTTP transport listening");
        Ok(Self { inner, local_addr })
    }

    /// The concrete bound address (useful when the requested port was 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Unwraps the underlying listener for handing to the server loop.
    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
