//! Server-sent event stream of stored incidents.
//!
//! Polling the incident list remains the primary consumer interface; this
//! stream is layered on top of the in-process feed for consumers that want
//! push delivery. Slow consumers lag the broadcast buffer and skip ahead
//! rather than slowing ingestion down.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

/// GET /live
async fn live_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.feed.subscribe();

    let initial = stream::iter([Ok::<_, Infallible>(
        Event::default().event("connected").data("{}"),
    )]);

    let updates = BroadcastStream::new(receiver).filter_map(|message| async move {
        match message {
            Ok(event) => Event::default()
                .event("incident")
                .json_data(&event)
                .ok()
                .map(Ok),
            // Lagged receivers drop missed events and catch up.
            Err(_) => None,
        }
    });

    Sse::new(initial.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/live", get(live_stream))
}
