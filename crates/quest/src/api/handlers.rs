//! API request handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use quest_protocol::{PlayAction, PlayRequest, PlayResponse, StartQuestRequest, StartQuestResponse};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::player::PlayerSession;
use crate::program::make_uid;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Register a team and hand back a session cookie.
///
/// An existing valid cookie keeps its session id and uid so a player who
/// re-registers mid-game still rejoins the same run.
#[instrument(skip_all)]
pub async fn start_quest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StartQuestRequest>,
) -> ApiResult<impl IntoResponse> {
    let team = request.team.trim();
    let players = request.players.trim();
    if team.is_empty() || players.is_empty() {
        return Err(ApiError::bad_request("Team and players are required"));
    }

    let previous = state.players.session_from_headers(&headers).ok();
    let (sid, uid) = match previous {
        Some(session) => (session.sid, session.uid),
        None => (uuid::Uuid::new_v4().to_string(), make_uid(team, players)),
    };

    let session = PlayerSession {
        sid,
        uid,
        team: team.to_string(),
        players: players.to_string(),
    };
    let token = state.players.issue(&session)?;
    info!(uid = %session.uid, team = %session.team, "Team registered");

    Ok((
        AppendHeaders([(SET_COOKIE, state.players.set_cookie(&token))]),
        Json(StartQuestResponse {
            uid: session.uid,
            team: session.team,
            players: session.players,
        }),
    ))
}

/// One poll cycle: start or rejoin the game, or submit an answer.
#[instrument(skip_all)]
pub async fn play(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PlayRequest>,
) -> ApiResult<Json<PlayResponse>> {
    debug!(action = ?request.action, "Play request");
    let response = match request.action {
        PlayAction::Start => {
            let session = state.players.session_from_headers(&headers)?;
            let bridge = state.bridge.clone();
            tokio::task::spawn_blocking(move || bridge.start(&session.sid, session.params()))
                .await
                .map_err(|e| ApiError::internal(format!("Bridge task failed: {e}")))?
        }
        PlayAction::Answer => match state.players.session_from_headers(&headers) {
            Ok(session) => {
                let bridge = state.bridge.clone();
                let answer = request.answer;
                tokio::task::spawn_blocking(move || bridge.answer(&session.sid, &answer))
                    .await
                    .map_err(|e| ApiError::internal(format!("Bridge task failed: {e}")))?
            }
            Err(err) => {
                debug!("Answer without a usable session: {}", err);
                PlayResponse::no_game()
            }
        },
        PlayAction::Unknown => PlayResponse::unknown_action(),
    };

    Ok(Json(response))
}
