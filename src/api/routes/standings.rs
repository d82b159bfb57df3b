use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{StandingsTable, StandingsView};
use crate::models::{PlayoffStatus, Team};
use crate::service::StandingsSnapshot;

#[derive(Debug, Deserialize)]
pub struct StandingsParams {
    pub league: Option<String>,
    pub view: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub league: String,
    pub view: StandingsView,
    pub computed_at: DateTime<Utc>,
    pub teams_loaded: bool,
    pub games_loaded: bool,
    pub tables: Vec<StandingsTable>,
}

impl StandingsResponse {
    fn new(snapshot: StandingsSnapshot, view: StandingsView) -> Self {
        let tables = snapshot.tables(view);
        Self {
            league: snapshot.league,
            view,
            computed_at: snapshot.computed_at,
            teams_loaded: snapshot.teams_loaded,
            games_loaded: snapshot.games_loaded,
            tables,
        }
    }
}

fn resolve_league(state: &AppState, league: Option<&str>) -> String {
    match league.map(str::trim) {
        Some(league) if !league.is_empty() => league.to_string(),
        _ => state.default_league().to_string(),
    }
}

fn resolve_view(view: Option<&str>) -> Result<StandingsView, ApiError> {
    match view {
        Some(v) => v.parse().map_err(ApiError::BadRequest),
        None => Ok(StandingsView::default()),
    }
}

pub async fn get_standings(
    State(state): State<AppState>,
    Query(params): Query<StandingsParams>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let view = resolve_view(params.view.as_deref())?;
    let league = resolve_league(&state, params.league.as_deref());
    let snapshot = state.standings.load(&league).await?;
    Ok(Json(StandingsResponse::new(snapshot, view)))
}

pub async fn refresh_standings(
    State(state): State<AppState>,
    Query(params): Query<StandingsParams>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let view = resolve_view(params.view.as_deref())?;
    let league = resolve_league(&state, params.league.as_deref());
    let snapshot = state.standings.refresh(&league).await?;
    Ok(Json(StandingsResponse::new(snapshot, view)))
}

#[derive(Debug, Deserialize)]
pub struct PlayoffStatusBody {
    /// Status name, or null / "none" to clear
    pub status: Option<String>,
}

pub async fn set_playoff_status(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(body): Json<PlayoffStatusBody>,
) -> Result<Json<Team>, ApiError> {
    let status = match body.status.as_deref() {
        Some(s) => PlayoffStatus::parse_optional(s).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => None,
    };
    let team = state
        .standings
        .set_playoff_status(&team_id.into(), status)
        .await?;
    Ok(Json(team))
}
