use std::sync::Arc;

use crate::counter::ClickCounter;
use crate::ws::{new_session_registry, SharedRegistry};

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Live WebSocket sessions
    pub sessions: SharedRegistry,
    /// Process-wide total-clicks counter
    pub counter: Arc<ClickCounter>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sessions: new_session_registry(),
            counter: Arc::new(ClickCounter::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
