//! Per-connection handler: welcome, intent dispatch and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Open a session → new `PlayerId`
//!   2. Spawn the writer task and send `welcome`
//!   3. Loop: receive frames → decode `ClientIntent` → registry or room
//!   4. On exit the session guard closes the session and leaves the room

use std::sync::Arc;

use galaxy_protocol::{ClientIntent, Codec, PlayerId, ServerEvent};
use galaxy_room::{PlayerSender, RoomError};
use galaxy_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::GalaxyError;

/// Reply to a frame that does not decode to a known intent.
pub const MALFORMED_MESSAGE: &str = "malformed message";

/// Drop guard that runs the disconnect path when the handler exits.
///
/// `Drop` is synchronous, so the async cleanup is spawned. The session
/// closes at most once, and only the call that closes it touches rooms.
struct SessionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if state.sessions.lock().await.close(player_id).is_err() {
                return;
            }
            match state.rooms.lock().await.leave(player_id).await {
                Ok(()) | Err(RoomError::NotInRoom) => {}
                Err(e) => tracing::debug!(%player_id, error = %e, "leave on disconnect failed"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GalaxyError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = state.sessions.lock().await.open().player_id;
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, peer = %conn.peer_addr(), "player connected");

    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(Arc::clone(&conn), Arc::clone(&state), rx));
    let _ = tx.send(ServerEvent::welcome(player_id));

    let result = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break Ok(());
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break Err(GalaxyError::Transport(e));
            }
        };

        let intent: ClientIntent = match state.codec.decode(&data) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode intent");
                let _ = tx.send(ServerEvent::error(MALFORMED_MESSAGE));
                continue;
            }
        };

        dispatch(&state, player_id, intent, &tx).await;
    };

    writer.abort();
    result
}

/// Encodes queued events and writes them to the socket, in order.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, writer stopping");
            break;
        }
    }
}

/// Routes one intent. Registry intents run under the registry lock;
/// everything else is forwarded to the player's room actor, which reports
/// its own rejections.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    intent: ClientIntent,
    tx: &PlayerSender,
) {
    tracing::debug!(%player_id, intent = intent.kind(), "intent received");

    let result = match intent {
        ClientIntent::CreateRoom { name } => {
            let mut rooms = state.rooms.lock().await;
            rooms.create_room(player_id, &name, tx.clone()).await.map(|_| ())
        }
        ClientIntent::JoinRoom { name, code } => {
            let mut rooms = state.rooms.lock().await;
            rooms.join_room(player_id, &name, &code, tx.clone()).await
        }
        ClientIntent::LeaveRoom => {
            let result = state.rooms.lock().await.leave(player_id).await;
            let _ = tx.send(ServerEvent::left_room(None));
            match result {
                Err(RoomError::NotInRoom) => Ok(()),
                other => other,
            }
        }
        ClientIntent::DisbandRoom => state.rooms.lock().await.disband(player_id).await.map(|_| ()),
        other => state.rooms.lock().await.route_intent(player_id, other).await,
    };

    if let Err(e) = result {
        tracing::debug!(%player_id, error = %e, "intent rejected");
        let _ = tx.send(ServerEvent::error(e.to_string()));
    }
}
