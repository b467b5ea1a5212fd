use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use passport_core::WorldDocument;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/world", get(list_worlds))
        .route("/world/{world_name}", get(get_world))
}

#[derive(Serialize)]
struct WorldListResponse {
    worlds: Vec<String>,
    default: String,
}

async fn list_worlds(State(state): State<AppState>) -> Json<WorldListResponse> {
    let default = state
        .catalog
        .default_world()
        .name()
        .unwrap_or_default()
        .to_lowercase();

    Json(WorldListResponse {
        worlds: state.catalog.names().into_iter().map(String::from).collect(),
        default,
    })
}

async fn get_world(
    State(state): State<AppState>,
    Path(world_name): Path<String>,
) -> Result<Json<WorldDocument>, ApiError> {
    let world = state
        .catalog
        .get(&world_name)
        .ok_or_else(|| ApiError::NotFound(format!("world {}", world_name)))?;

    Ok(Json(WorldDocument::from(world.as_ref())))
}
