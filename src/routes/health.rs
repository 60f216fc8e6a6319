use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let shadow = state.store.shadow_path();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "shadow_file": shadow.display().to_string(),
            "shadow_present": shadow.exists(),
            "viewers": state.broadcaster.subscriber_count(),
        })),
    )
}
