use axum::extract::ws::Message;

use super::protocol::ServerMessage;
use super::registry::SessionRegistry;

/// Broadcast a server message to every registered session.
///
/// The message is serialized once and pushed to each session's writer task,
/// so one slow or dead recipient never blocks the others. A session whose
/// channel is closed has lost its writer task and can never be delivered to
/// again; it is evicted from the registry here.
pub fn broadcast_to_all(registry: &SessionRegistry, message: &ServerMessage) {
    if registry.is_empty() {
        return;
    }

    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize broadcast message");
            return;
        }
    };
    let msg = Message::Text(json.into());

    for (session_id, sender) in registry.snapshot() {
        if sender.send(msg.clone()).is_err() {
            registry.remove(session_id);
            tracing::debug!(
                session_id = %session_id,
                "Evicted session with closed channel during broadcast"
            );
        }
    }
}
