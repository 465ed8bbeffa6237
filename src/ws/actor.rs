use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use crate::state::AppState;
use crate::ws::protocol::{self, ServerMessage};

/// Ping interval: server sends a WebSocket ping every 30 seconds so dead
/// transports are noticed even while nobody is clicking.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Pong timeout: if pong not received within 10 seconds after ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the actor-per-connection pattern for a WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from an mpsc channel
/// - Reader loop: processes incoming messages, dispatches to the protocol
///
/// The mpsc channel allows any part of the system — direct replies and
/// broadcasts alike — to send messages to this client by cloning the sender.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Register this connection; the registry owns its state from here on.
    let session_id = match state.sessions.add(tx.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Registry rejected connection");
            return;
        }
    };

    // Tell the new client where the shared counter stands right now.
    // A point-in-time read: broadcasts may overtake it in flight.
    protocol::send_message(
        &tx,
        &ServerMessage::Init {
            total_clicks: state.counter.current(),
        },
    );

    tracing::info!(
        session_id = %session_id,
        connected = state.sessions.len(),
        "Client connected"
    );

    // Spawn writer task: forwards mpsc messages to WebSocket sink
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    // Spawn ping task: sends periodic pings and monitors pong responses
    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
                // Writer task has died — connection is gone
                break;
            }

            // Wait for pong within timeout
            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {
                    // Pong received, continue
                }
                _ => {
                    // Pong timeout or channel closed — close connection
                    tracing::warn!("Pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "Pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // Reader loop: process incoming WebSocket messages one at a time, in
    // receipt order. Suspends only this session's task.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    protocol::handle_text_message(text.as_str(), session_id, &tx, &state);
                }
                Message::Binary(_) => {
                    tracing::debug!(
                        session_id = %session_id,
                        "Ignoring binary frame (protocol is JSON text)"
                    );
                }
                Message::Pong(_) => {
                    // Pong received — notify the ping task
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::info!(
                        session_id = %session_id,
                        reason = ?frame,
                        "Client initiated close"
                    );
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "WebSocket receive error"
                );
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(session_id = %session_id, "WebSocket stream ended");
                break;
            }
        }
    }

    // Cleanup runs on every way out of the loop: abort the side tasks and
    // drop this session's registry state. Removal is idempotent with the
    // broadcast eviction path.
    writer_handle.abort();
    ping_handle.abort();
    state.sessions.remove(session_id);

    tracing::info!(
        session_id = %session_id,
        connected = state.sessions.len(),
        "Client removed"
    );
}

/// Writer task: receives messages from mpsc channel and forwards them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}
