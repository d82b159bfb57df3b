use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::draft::DraftBoard;
use crate::models::{DraftClass, DraftPick, Player, PlayerId};

/// Where the draft stands.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSlot {
    pub round: u32,
    pub pick: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub draft_class: DraftClass,
    pub rounds: u32,
    pub current: Option<CurrentSlot>,
    pub complete: bool,
    pub picks: Vec<DraftPick>,
}

impl BoardResponse {
    fn new(draft_class: DraftClass, board: DraftBoard) -> Self {
        Self {
            draft_class,
            rounds: board.rounds(),
            current: board
                .current_position()
                .map(|(round, pick)| CurrentSlot { round, pick }),
            complete: board.is_complete(),
            picks: board.into_picks(),
        }
    }
}

pub async fn get_board(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<BoardResponse>, ApiError> {
    let (class, board) = state.drafts.board(&class_id.into()).await?;
    Ok(Json(BoardResponse::new(class, board)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakePickBody {
    pub player_id: String,
}

pub async fn make_pick(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(body): Json<MakePickBody>,
) -> Result<(StatusCode, Json<DraftPick>), ApiError> {
    let player = PlayerId::from(body.player_id);
    if player.is_empty() {
        return Err(ApiError::BadRequest("playerId must not be empty".to_string()));
    }
    let pick = state.drafts.make_pick(&class_id.into(), player).await?;
    Ok((StatusCode::CREATED, Json(pick)))
}

pub async fn get_available_players(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = state.drafts.available_players(&class_id.into()).await?;
    Ok(Json(players))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub league: Option<String>,
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<BoardResponse>>, ApiError> {
    let league = match params.league.as_deref().map(str::trim) {
        Some(league) if !league.is_empty() => league.to_string(),
        _ => state.default_league().to_string(),
    };
    let history = state.drafts.history(&league).await?;
    Ok(Json(
        history
            .into_iter()
            .map(|(class, board)| BoardResponse::new(class, board))
            .collect(),
    ))
}
