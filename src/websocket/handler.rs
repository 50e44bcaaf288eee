//! WebSocket Handler
//!
//! Accepts upgrade requests and runs one channel session per peer.

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;

use super::adapter::WsTransport;
use crate::api::AppState;
use crate::session::ChannelSession;

/// WebSocket upgrade handler
///
/// A failed handshake is logged and dropped; it never reaches the server loop.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.max_message_size(state.read_limit)
        .on_failed_upgrade(|e| {
            tracing::warn!(error = %e, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run a session over an established WebSocket
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session = ChannelSession::new(state.session, Arc::clone(&state.payload));
    let active = state.session_opened();
    tracing::debug!(session_id = %session.id(), active, "WebSocket connected");

    let outcome = session.start(WsTransport::new(socket)).await;

    let active = state.session_closed();
    if outcome.reason.is_error() {
        tracing::info!(
            session_id = %outcome.session_id,
            reason = %outcome.reason,
            active,
            "WebSocket session failed"
        );
    } else {
        tracing::debug!(session_id = %outcome.session_id, active, "WebSocket disconnected");
    }
}
