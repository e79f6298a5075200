//! Toast API: send, update, remove, list.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use toasty_core::{SendOptions, UpdateOptions};

use crate::app::SharedState;

use super::{err_json, ok_json, ApiResult};

/// GET /api/toasts
pub async fn list_toasts(State(state): State<SharedState>) -> Json<Value> {
    let toasts = state.with_toasts(|registry| registry.live_toasts());
    ok_json(json!(toasts))
}

/// POST /api/toasts
///
/// Unknown keys are ignored; a missing title or body is logged and rendered
/// empty.
pub async fn send_toast(State(state): State<SharedState>, Json(body): Json<Value>) -> ApiResult {
    if !body.is_object() {
        return Err(err_json(400, "body must be a JSON object"));
    }
    let options = SendOptions::from_value(&body);
    let id = state.with_toasts(|registry| registry.send(options));
    Ok(Json(json!({ "status": "ok", "id": id })))
}

/// PUT /api/toasts/{id}
pub async fn update_toast(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let options = UpdateOptions::from_value(&body);
    if !state.with_toasts(|registry| registry.update(&id, &options)) {
        return Err(err_json(404, &format!("toast not found: {id}")));
    }
    Ok(Json(json!({ "status": "ok", "id": id })))
}

/// DELETE /api/toasts/{id}
pub async fn remove_toast(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult {
    if !state.with_toasts(|registry| registry.remove(&id)) {
        return Err(err_json(404, &format!("toast not found: {id}")));
    }
    Ok(Json(json!({ "status": "ok", "id": id })))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use toasty_core::{RegistryConfig, RegistrySlot};

    use super::*;
    use crate::config::AppConfig;

    fn state_with(toasts: RegistryConfig) -> SharedState {
        let config = AppConfig {
            fade_ms: 10,
            toasts,
            ..AppConfig::default()
        };
        SharedState::new(config, &RegistrySlot::new())
    }

    async fn wait_until_empty(state: &SharedState) -> bool {
        for _ in 0..100 {
            if state.with_toasts(|registry| registry.live_count()) == 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn send_returns_id_and_lists_toast() {
        let state = state_with(RegistryConfig::new().autohide(false));

        let Json(sent) = send_toast(
            State(state.clone()),
            Json(json!({ "title": "Hi", "body": "World", "id": "api1", "bogus": 1 })),
        )
        .await
        .unwrap();
        assert_eq!(sent["id"], "api1");

        let Json(listed) = list_toasts(State(state)).await;
        let data = listed["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], "api1");
        assert_eq!(data[0]["title"], "Hi");
        assert_eq!(data[0]["state"], "visible");
    }

    #[tokio::test]
    async fn send_rejects_non_object_body() {
        let state = state_with(RegistryConfig::new());
        let (status, _) = send_toast(State(state), Json(json!("hello"))).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_unknown_toast_is_not_found() {
        let state = state_with(RegistryConfig::new());
        let (status, Json(body)) = update_toast(
            State(state),
            Path("ghost".to_string()),
            Json(json!({ "title": "x" })),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn update_changes_listed_title() {
        let state = state_with(RegistryConfig::new().autohide(false));
        send_toast(State(state.clone()), Json(json!({ "title": "A", "body": "B", "id": "u1" })))
            .await
            .unwrap();

        update_toast(State(state.clone()), Path("u1".to_string()), Json(json!({ "title": "C" })))
            .await
            .unwrap();

        let Json(listed) = list_toasts(State(state)).await;
        assert_eq!(listed["data"][0]["title"], "C");
        assert_eq!(listed["data"][0]["body"], "B");
    }

    #[tokio::test]
    async fn remove_deletes_after_fade() {
        let state = state_with(RegistryConfig::new().autohide(false));
        send_toast(State(state.clone()), Json(json!({ "title": "A", "body": "B", "id": "r1" })))
            .await
            .unwrap();

        remove_toast(State(state.clone()), Path("r1".to_string())).await.unwrap();
        assert!(wait_until_empty(&state).await);

        let (status, _) = remove_toast(State(state), Path("r1".to_string())).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn autohide_removes_toast_without_client_action() {
        let state = state_with(RegistryConfig::new().delay_ms(20));
        send_toast(State(state.clone()), Json(json!({ "title": "A", "body": "B" })))
            .await
            .unwrap();

        assert!(wait_until_empty(&state).await);
    }
}
