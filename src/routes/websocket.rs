use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::AppState;

/// GET /ws — live banner feed. The server pushes the current snapshot
/// immediately on connect, then one frame per accepted mutation.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let viewer_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the snapshot so a mutation landing in between
    // is still delivered.
    let mut feed = state.broadcaster.subscribe();
    let snapshot = state.store.get();
    info!("WebSocket viewer {viewer_id} connected");

    let initial = match serde_json::to_string(&snapshot) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize banner snapshot: {e}");
            return;
        }
    };
    if sender.send(Message::Text(initial.into())).await.is_err() {
        return;
    }

    // Broadcast feed → socket
    let mut push_task = tokio::spawn(async move {
        loop {
            let banner = match feed.recv().await {
                Ok(banner) => banner,
                Err(RecvError::Lagged(missed)) => {
                    // Skip the backlog; the next frame is the current state,
                    // and the client can always re-pull /banner.
                    debug!("Viewer {viewer_id} lagged {missed} updates");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let json = match serde_json::to_string(&banner) {
                Ok(json) => json,
                Err(_) => continue,
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain client frames; viewers have nothing to say, but Close must tear
    // the connection down.
    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                Message::Text(text) => {
                    debug!("Ignoring WS message from viewer {viewer_id}: {text}");
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut push_task) => client_task.abort(),
        _ = (&mut client_task) => push_task.abort(),
    }

    info!("WebSocket viewer {viewer_id} disconnected");
}
