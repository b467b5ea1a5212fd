use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;

use passport_core::{
    decode_collector, decode_visit, encode_collector, Badge, CollectorDocument, CountryCollector,
    Statistics, Username, Visit, VisitDocument, WorldResolver,
};

use crate::error::ApiError;
use crate::middleware::rate_limit::limit_writes;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/countryCollector/{username}", get(get_collector))
        .route("/countryCollector/{username}/stats", get(get_stats));

    let writes = Router::new()
        .route(
            "/countryCollector/{username}",
            put(put_collector).delete(delete_collector),
        )
        .route(
            "/countryCollector/{username}/rename/{new_name}",
            post(rename_collector),
        )
        .route(
            "/countryCollector/{username}/visit/register",
            put(register_visit),
        )
        .route("/countryCollector/{username}/visit/remove", put(remove_visit))
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_writes));

    reads.merge(writes)
}

/// Persist `collector`, turning a failed save into a 500.
fn save(state: &AppState, user: &Username, collector: &CountryCollector) -> Result<(), ApiError> {
    if state.gateway.save(user, collector) {
        Ok(())
    } else {
        Err(ApiError::Storage(format!("failed to save collector for {}", user)))
    }
}

/// The user's collector to mutate. New users start on the default world;
/// a stored document that fails to load is reported, never replaced.
fn load_for_update(state: &AppState, user: &Username) -> Result<CountryCollector, ApiError> {
    state
        .gateway
        .load_or_default(user)
        .map_err(|e| ApiError::Storage(format!("failed to load collector for {}: {}", user, e)))
}

fn resolve_visit(doc: &VisitDocument, collector: &CountryCollector) -> Result<Visit, ApiError> {
    Ok(decode_visit(doc, collector.world())?)
}

/// GET /countryCollector/{username}
async fn get_collector(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let user = Username::parse(&username)?;

    Ok(match state.gateway.load(&user) {
        Some(collector) => Json(encode_collector(&collector, true)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// PUT /countryCollector/{username}
///
/// A document without an embedded world is bound to the user's current
/// world, or the default world for new users.
async fn put_collector(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(doc): Json<CollectorDocument>,
) -> Result<Json<bool>, ApiError> {
    let user = Username::parse(&username)?;

    let collector = if doc.world.is_some() {
        state.gateway.decode(doc)?
    } else {
        let world = state
            .gateway
            .load(&user)
            .map(|existing| existing.world().clone())
            .unwrap_or_else(|| state.catalog.default_world());
        decode_collector(doc, &WorldResolver::Fixed(world))?
    };

    save(&state, &user, &collector)?;
    tracing::info!(%user, visits = collector.visits().len(), "Stored collector");
    Ok(Json(true))
}

/// DELETE /countryCollector/{username}
async fn delete_collector(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let user = Username::parse(&username)?;
    Ok(Json(state.gateway.delete(&user)))
}

/// POST /countryCollector/{username}/rename/{new_name}
async fn rename_collector(
    State(state): State<AppState>,
    Path((username, new_name)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    let from = Username::parse(&username)?;
    let to = Username::parse(&new_name)?;

    state.gateway.rename(&from, &to)?;
    Ok(Json(true))
}

/// PUT /countryCollector/{username}/visit/register
async fn register_visit(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(doc): Json<VisitDocument>,
) -> Result<Json<bool>, ApiError> {
    let user = Username::parse(&username)?;
    let mut collector = load_for_update(&state, &user)?;

    let visit = resolve_visit(&doc, &collector)?;
    let registered = collector.register_visit(visit)?;

    save(&state, &user, &collector)?;
    Ok(Json(registered))
}

/// PUT /countryCollector/{username}/visit/remove
async fn remove_visit(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(doc): Json<VisitDocument>,
) -> Result<Json<bool>, ApiError> {
    let user = Username::parse(&username)?;
    let mut collector = load_for_update(&state, &user)?;

    let visit = resolve_visit(&doc, &collector)?;
    let removed = collector.remove_visit(&visit)?;

    if removed {
        save(&state, &user, &collector)?;
    }
    Ok(Json(removed))
}

#[derive(Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    statistics: Statistics,
    badges: Vec<Badge>,
}

/// GET /countryCollector/{username}/stats
async fn get_stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let user = Username::parse(&username)?;

    let Some(collector) = state.gateway.load(&user) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let statistics = Statistics::of(&collector);
    let badges = Badge::earned(&statistics);
    Ok(Json(StatsResponse { statistics, badges }).into_response())
}
