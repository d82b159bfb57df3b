//! REST API endpoints.
//!
//! Axum-based HTTP API for standings tables, playoff status
//! assignment and the draft board.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::draft::DraftError;
use crate::service::StandingsError;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StandingsError> for ApiError {
    fn from(e: StandingsError) -> Self {
        match e {
            StandingsError::Storage(e) => e.into(),
            StandingsError::Aggregate(e) => ApiError::Unprocessable(e.to_string()),
        }
    }
}

impl From<DraftError> for ApiError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::Storage(e) => e.into(),
            DraftError::EmptyOrder | DraftError::NoRounds => ApiError::BadRequest(e.to_string()),
            DraftError::UnknownPlayer(_) => ApiError::Unprocessable(e.to_string()),
            DraftError::NotActive(_)
            | DraftError::InvalidTransition { .. }
            | DraftError::DraftComplete
            | DraftError::PlayerAlreadyDrafted(_)
            | DraftError::PlayerNotEligible { .. }
            | DraftError::PicksExist(_) => ApiError::Conflict(e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                error!("Invalid CORS origin {:?}, allowing any", origin);
                layer.allow_origin(Any)
            }
        },
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(health))
        .route("/api/standings", get(routes::standings::get_standings))
        .route("/api/standings/refresh", post(routes::standings::refresh_standings))
        .route(
            "/api/teams/:team_id/playoff-status",
            put(routes::standings::set_playoff_status),
        )
        .route("/api/draft/:class_id", get(routes::draft::get_board))
        .route("/api/draft/:class_id/picks", post(routes::draft::make_pick))
        .route("/api/draft/:class_id/players", get(routes::draft::get_available_players))
        .route("/api/draft-history", get(routes::draft::get_history))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
