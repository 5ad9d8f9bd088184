use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness: siempre 200, informando si la base responde
async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = if state.workflow.database_ready().await {
        "up"
    } else {
        "down"
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
