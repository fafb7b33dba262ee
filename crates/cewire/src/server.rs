//! Server-side exchange operations and the event server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use tokio::sync::oneshot;

use cewire_protocol::{Event, EventConverter, Mode, decode_message, encode_message};
use cewire_transport::{HttpListener, Message, TransportError};

use crate::handler::{handle_request, info};
use crate::{CewireError, EventHandler};

/// Decodes the events carried by an inbound request message.
///
/// Thin wrapper over the engine's decode path, for servers embedded in an
/// existing HTTP stack that only want the transcoding.
pub fn get_events<C>(
    converter: &C,
    request: &Message,
) -> Result<(Vec<Event>, Mode), CewireError>
where
    C: EventConverter + ?Sized,
{
    Ok(decode_message(converter, request)?)
}

/// Encodes reply events into a caller-supplied outbound message.
///
/// The server never owns the message lifetime — the transport layer does.
pub fn set_events<C>(
    converter: &C,
    response: &mut Message,
    events: &[Event],
    mode: Mode,
) -> Result<(), CewireError>
where
    C: EventConverter + ?Sized,
{
    Ok(encode_message(converter, response, events, mode)?)
}

/// Immutable per-server configuration, shared by every request task.
pub(crate) struct ServerState<C, H> {
    pub(crate) converter: C,
    pub(crate) handler: H,
}

/// Binds `addr` and serves CloudEvents until told to stop.
///
/// `addr` is an `interface:port` string; an empty string or a zero port
/// binds a free ephemeral port — the concrete bound address is available on
/// the returned handle. Every request (any method, any path except `/info`)
/// is decoded, handed to `handler`, and answered in the request's own mode;
/// decode/validation failures answer 400 without invoking the handler,
/// handler and reply-encode failures answer 500.
///
/// The server runs on a background task. Use
/// [`ServerHandle::shutdown`] to stop accepting (in-flight requests finish)
/// and [`ServerHandle::join`] to await the terminal result.
///
/// # Errors
/// Returns a bind failure immediately; later failures surface through
/// [`ServerHandle::join`].
pub async fn listen_and_serve_ce<C, H>(
    addr: &str,
    converter: C,
    handler: H,
) -> Result<ServerHandle, CewireError>
where
    C: EventConverter,
    H: EventHandler,
{
    let listener = HttpListener::bind(addr).await?;
    let local_addr = listener.local_addr();

    let state = Arc::new(ServerState { converter, handler });
    let app = Router::new()
        .route("/info", any(info))
        .fallback(handle_request::<C, H>)
        .with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = oneshot::channel();

    let serve = axum::serve(listener.into_inner(), app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
    tokio::spawn(async move {
        let result = serve
            .await
            .map_err(|e| CewireError::Transport(TransportError::Serve(e)));
        let _ = done_tx.send(result);
    });

    tracing::info!(%local_addr, "event server running");
    Ok(ServerHandle {
        local_addr,
        shutdown: Some(shutdown_tx),
        done: done_rx,
    })
}

/// Handle to a running event server.
///
/// Dropping the handle releases the listening resource and stops the
/// server the same way [`shutdown`](Self::shutdown) does.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    done: oneshot::Receiver<Result<(), CewireError>>,
}

impl ServerHandle {
    /// The concrete bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections; in-flight requests complete their
    /// encode/write step. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(trigger) = self.shutdown.take() {
            let _ = trigger.send(());
        }
    }

    /// Waits for the server to terminate and yields the terminal result:
    /// `Ok(())` after a graceful stop, the serve error otherwise.
    pub async fn join(self) -> Result<(), CewireError> {
        match self.done.await {
            Ok(result) => result,
            // The serve task was cancelled outright (runtime teardown).
            Err(_) => Ok(()),
        }
    }
}
