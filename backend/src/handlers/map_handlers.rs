use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::handlers::member_session::MemberSession;
use crate::models::geo_models::MapView;
use crate::models::profile_models::Location;
use crate::utils::location_lookup::{run_lookup, LookupState};
use crate::AppState;

/// Same three parameters the profile page puts in its map link.
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

impl From<MapQuery> for Location {
    fn from(q: MapQuery) -> Self {
        Location {
            city: q.city,
            state: q.state,
            country: q.country,
        }
    }
}

#[derive(Serialize)]
pub struct MapResponse {
    pub location_label: String,
    pub map: MapView,
}

#[derive(Serialize)]
pub struct LookupStateResponse {
    pub input: Option<Location>,
    pub location_label: String,
    #[serde(flatten)]
    pub state: LookupState,
}

pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Result<Json<MapResponse>, AppError> {
    let location = Location::from(query);
    let result = state.resolver.resolve(&location).await.map_err(|e| {
        tracing::warn!(location = %location.label(), "Map lookup failed: {}", e);
        e
    })?;
    let map = MapView::new(&result, &location, state.config.tile_layer.clone());
    Ok(Json(MapResponse {
        location_label: location.label(),
        map,
    }))
}

/// Starts a debounced lookup for the member's map page. Returns at once with
/// the `loading` state; poll `/api/map/state` for the outcome.
pub async fn set_lookup_location(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
    Json(location): Json<Location>,
) -> Result<(StatusCode, Json<LookupStateResponse>), AppError> {
    let lookup = state.lookup_for(&member.member_id)?;
    let mut guard = lookup.lock().await;
    if let Some(ticket) = guard.begin(location.clone()) {
        tracing::debug!(member_id = %member.member_id, location = %location.label(), "Queued location lookup");
        tokio::spawn(run_lookup(
            lookup.clone(),
            state.resolver.clone(),
            ticket,
            location,
            state.config.lookup_debounce,
        ));
    }
    Ok((StatusCode::ACCEPTED, Json(state_response(guard.input(), guard.state()))))
}

pub async fn get_lookup_state(
    State(state): State<Arc<AppState>>,
    member: MemberSession,
) -> Result<Json<LookupStateResponse>, AppError> {
    let lookup = state.lookup_for(&member.member_id)?;
    let guard = lookup.lock().await;
    Ok(Json(state_response(guard.input(), guard.state())))
}

fn state_response(input: Option<&Location>, state: &LookupState) -> LookupStateResponse {
    LookupStateResponse {
        input: input.cloned(),
        location_label: input.map(Location::label).unwrap_or_default(),
        state: state.clone(),
    }
}
