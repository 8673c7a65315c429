//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "porc-server",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "farms": state.dataset.farms.len(),
        "subscribers": state.hub.subscriber_count(),
        "timestamp": shared::util::now_millis(),
    }))
}
