//! JSON wire protocol: inbound client messages and outbound server events.

use axum::extract::ws::Message;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::ws::broadcast::broadcast_to_all;
use crate::ws::registry::SessionId;
use crate::ws::ConnectionSender;

/// Messages a client may send, tagged by `type`. Anything that fails to
/// decode (bad JSON, unknown type) is dropped by the dispatcher.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Click,
    Ping,
}

/// Messages the server emits, tagged by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Init {
        total_clicks: u64,
    },
    ClickResponse {
        client_clicks: u64,
        total_clicks: u64,
        timestamp: String,
    },
    GlobalUpdate {
        total_clicks: u64,
    },
    Pong,
}

/// Handle an incoming text frame.
/// Decodes the client message, dispatches based on type, sends responses.
pub fn handle_text_message(
    text: &str,
    session_id: SessionId,
    tx: &ConnectionSender,
    state: &AppState,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(
                session_id = %session_id,
                error = %e,
                "Ignoring malformed client message"
            );
            return;
        }
    };

    match message {
        ClientMessage::Click => handle_click(session_id, tx, state),
        ClientMessage::Ping => send_message(tx, &ServerMessage::Pong),
    }
}

/// Handle a click: bump the session's own count and the shared total,
/// answer the clicking client, then fan the new total out to everyone.
fn handle_click(session_id: SessionId, tx: &ConnectionSender, state: &AppState) {
    // The session can only be missing if disconnect cleanup raced this
    // message; the click is dropped along with the session.
    let Some(client_clicks) = state.sessions.record_click(session_id) else {
        tracing::debug!(
            session_id = %session_id,
            "Click from a session no longer registered"
        );
        return;
    };
    let total_clicks = state.counter.increment();

    send_message(
        tx,
        &ServerMessage::ClickResponse {
            client_clicks,
            total_clicks,
            timestamp: Utc::now().to_rfc3339(),
        },
    );

    // The clicking session receives this as well, on top of its
    // click_response. Clients count on both arriving.
    broadcast_to_all(&state.sessions, &ServerMessage::GlobalUpdate { total_clicks });
}

/// Serialize a message and push it to one client's writer task.
pub fn send_message(tx: &ConnectionSender, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_decodes_by_type() {
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"click"}"#).unwrap(),
            ClientMessage::Click
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"ping"}"#).unwrap(),
            ClientMessage::Ping
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"frobnicate"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json at all").is_err());
    }

    #[test]
    fn test_server_message_wire_shape() {
        let init = serde_json::to_value(ServerMessage::Init { total_clicks: 7 }).unwrap();
        assert_eq!(init, serde_json::json!({"type": "init", "total_clicks": 7}));

        let pong = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(pong, serde_json::json!({"type": "pong"}));

        let update = serde_json::to_value(ServerMessage::GlobalUpdate { total_clicks: 3 }).unwrap();
        assert_eq!(
            update,
            serde_json::json!({"type": "global_update", "total_clicks": 3})
        );
    }
}
