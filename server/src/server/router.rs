use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::app::SharedState;
use super::{api, websocket};

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Settings ---
        .route("/api/settings", get(api::settings::get_settings))
        // --- Toasts ---
        .route("/api/toasts", get(api::toasts::list_toasts).post(api::toasts::send_toast))
        .route("/api/toasts/{id}", put(api::toasts::update_toast).delete(api::toasts::remove_toast))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler(State(state): State<SharedState>) -> Json<Value> {
    let live = state.with_toasts(|registry| registry.live_count());
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at().to_rfc3339(),
        "liveToasts": live,
    }))
}
