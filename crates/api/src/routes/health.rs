use axum::{Json, extract::State};

use crate::state::AppState;

pub async fn check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": bson::DateTime::now().try_to_rfc3339_string().unwrap_or_default(),
        "environment": state.settings.app.environment,
    }))
}
