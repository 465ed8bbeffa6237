use axum::{extract::State, Json, Router};

use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// GET /api/stats — Public endpoint returning a point-in-time snapshot of
/// the shared counter and the number of connected sessions.
async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "total_clicks": state.counter.current(),
        "connected": state.sessions.len(),
    }))
}

/// Build the full axum Router with all routes.
pub fn build_router(state: AppState) -> Router {
    // WebSocket endpoint (no auth)
    let ws_routes = Router::new().route("/ws", axum::routing::get(ws_handler::ws_upgrade));

    // Public routes (no auth required)
    let public_routes = Router::new().route("/api/stats", axum::routing::get(stats));

    // Health check
    let health = Router::new().route("/health", axum::routing::get(health_check));

    Router::new()
        .merge(ws_routes)
        .merge(public_routes)
        .merge(health)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
