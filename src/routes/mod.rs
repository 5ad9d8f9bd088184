pub mod health_routes;
pub mod vehicle_routes;

use axum::{extract::DefaultBodyLimit, Router};

use crate::state::AppState;

/// Router completo de la API, sin las capas de CORS ni de tracing
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(health_routes::create_health_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
