//! Read-only view of the effective configuration.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::app::SharedState;
use crate::config::defaults;

/// GET /api/settings
pub async fn get_settings(State(state): State<SharedState>) -> Json<Value> {
    let (toast_defaults, style) = state.with_toasts(|registry| {
        (*registry.defaults(), registry.container_style().clone())
    });
    let config = state.config();
    Json(json!({
        "settings": defaults::all_settings(),
        "effective": {
            "serverPort": config.server_port,
            "fadeMs": config.fade_ms,
            "defaults": toast_defaults,
            "style": style,
        },
    }))
}
