use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    response::Response,
};
use std::net::SocketAddr;

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. There is no authentication: any client that
/// completes the upgrade becomes a session. Spawns an actor per connection.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    tracing::debug!(peer = %addr, "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
