use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::banner::BannerState;
use crate::AppState;

/// GET /events — server-sent-events fallback for clients that cannot hold a
/// full-duplex connection. Same contract as /ws: current snapshot first, then
/// one `banner` event per accepted mutation. Keep-alive comments hold the
/// connection open through proxies.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let viewer_id = Uuid::new_v4();

    // Subscribe-then-snapshot, same ordering as the WebSocket path.
    let feed = state.broadcaster.subscribe();
    let snapshot = state.store.get();
    info!("SSE viewer {viewer_id} connected");

    let initial = stream::iter(banner_event(&snapshot).map(Ok));
    let updates = BroadcastStream::new(feed).filter_map(move |update| async move {
        match update {
            Ok(banner) => banner_event(&banner).map(Ok),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                debug!("SSE viewer {viewer_id} lagged {missed} updates");
                None
            }
        }
    });

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default())
}

fn banner_event(banner: &BannerState) -> Option<Event> {
    let json = serde_json::to_string(banner).ok()?;
    Some(Event::default().event("banner").data(json))
}
