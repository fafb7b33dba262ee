//! Per-request handling: decode the request, invoke the user handler,
//! encode the reply.
//!
//! Each inbound request runs on its own task. The flow is:
//!   1. Read the full body, build a [`Message`]
//!   2. `get_events` — decode/validation failure → 400, no handler call
//!   3. `handler.handle(events)` — failure → 500
//!   4. `set_events` into a fresh reply message, same mode — failure → 500

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use cewire_protocol::{Event, EventConverter};
use cewire_transport::{Message, TransportError};

use crate::server::ServerState;
use crate::{BoxError, get_events, set_events};

/// Produces the reply events for one decoded request.
///
/// Implemented for any matching closure, so an echo server is just
/// `|events| Ok(events)`. The handler runs on the request task; if it
/// blocks, that request blocks — other requests are unaffected.
pub trait EventHandler: Send + Sync + 'static {
    /// Turns the request events into reply events.
    ///
    /// # Errors
    /// Any error is mapped to a server-error response.
    fn handle(&self, events: Vec<Event>) -> Result<Vec<Event>, BoxError>;
}

impl<F> EventHandler for F
where
    F: Fn(Vec<Event>) -> Result<Vec<Event>, BoxError> + Send + Sync + 'static,
{
    fn handle(&self, events: Vec<Event>) -> Result<Vec<Event>, BoxError> {
        self(events)
    }
}

/// Upper bound on a buffered request body. Events are notifications, not
/// bulk transfers.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Handles one CloudEvents request end to end.
pub(crate) async fn handle_request<C, H>(
    State(state): State<Arc<ServerState<C, H>>>,
    request: Request,
) -> Response
where
    C: EventConverter,
    H: EventHandler,
{
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request body");
            return plain_response(
                StatusCode::BAD_REQUEST,
                format!("failed to read request body: {e}"),
            );
        }
    };
    let inbound = Message::from_http(&parts.headers, body.to_vec());

    let (events, mode) = match get_events(&state.converter, &inbound) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, "request rejected");
            return plain_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };
    tracing::debug!(count = events.len(), %mode, "events received");

    let reply = match state.handler.handle(events) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "handler failed");
            return plain_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            );
        }
    };

    // The reply goes out in the mode the request came in.
    let mut outbound = Message::new();
    if let Err(e) = set_events(&state.converter, &mut outbound, &reply, mode) {
        tracing::error!(error = %e, "reply encode failed");
        return plain_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    match message_response(outbound) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "reply not representable as HTTP");
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Fixed banner for the `/info` route.
pub(crate) async fn info() -> &'static str {
    "cewire event server"
}

fn message_response(mut message: Message) -> Result<Response, TransportError> {
    let headers = message.to_http_headers()?;
    let mut response = Response::new(Body::from(message.take_body()));
    *response.headers_mut() = headers;
    Ok(response)
}

fn plain_response(status: StatusCode, body: String) -> Response {
    (status, body).into_response()
}
