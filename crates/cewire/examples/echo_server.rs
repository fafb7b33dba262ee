//! A CloudEvents echo server with a custom conversion strategy.
//!
//! Events that arrive without an `id` get one generated before the standard
//! validation runs. Try it:
//!
//! ```text
//! cargo run --example echo_server
//! curl -i http://127.0.0.1:8080/ \
//!     -H 'ce-source: /demo' \
//!     -H 'ce-specversion: 1.0' \
//!     -H 'ce-type: com.example.demo' \
//!     -d 'hello'
//! ```

use cewire::prelude::*;
use tracing_subscriber::EnvFilter;

/// Generates an id for events that arrive without one, then delegates to
/// the standard validation — the other required attributes still have to
/// be present.
#[derive(Clone, Copy)]
struct GeneratedId;

impl EventConverter for GeneratedId {
    fn map_to_event(&self, mut map: AttributeMap) -> Result<Event, ProtocolError> {
        if map.get_str("id").is_none_or(str::is_empty) {
            map.insert_string("id", uuid::Uuid::new_v4().to_string());
        }
        DefaultConverter.map_to_event(map)
    }

    fn event_to_map(&self, event: &Event) -> AttributeMap {
        DefaultConverter.event_to_map(event)
    }
}

#[tokio::main]
async fn main() -> Result<(), CewireError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let server = listen_and_serve_ce(
        "127.0.0.1:8080",
        GeneratedId,
        |events: Vec<Event>| Ok::<_, BoxError>(events),
    )
    .await?;

    println!("listening on http://{}", server.local_addr());
    server.join().await
}
