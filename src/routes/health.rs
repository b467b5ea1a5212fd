use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Ready once the default world has countries to resolve visits against.
async fn ready(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.catalog.default_world().is_empty() {
        "empty"
    } else {
        "ok"
    };
    Json(HealthResponse { status })
}
