//! REST API endpoint handlers for the game server.
//!
//! Reads of the current game come from the shared snapshot. Everything
//! else is a [`Command`] to the game actor.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Game page |
//! | `GET` | `/api/state` | Current session and round |
//! | `GET` | `/api/leaderboard` | Ranked wins (`?scope=global` or `channel:x`) |
//! | `DELETE` | `/api/leaderboard` | Reset a leaderboard |
//! | `POST` | `/api/load` | Load a channel's 7TV emotes |
//! | `POST` | `/api/manual` | Load pasted emote JSON |
//! | `POST` | `/api/guess` | Submit a local guess |
//! | `POST` | `/api/skip` | Give up on the current round |
//! | `POST` | `/api/next` | Open the next round |
//! | `POST` | `/api/reshuffle` | Reshuffle and start over |
//! | `PUT` | `/api/announcer` | Set announce-bot credentials |
//! | `DELETE` | `/api/announcer` | Remove announce-bot credentials |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use emoteguess_core::Verdict;
use emoteguess_ledger::AnnouncerCredentials;
use emoteguess_types::{RejectionReason, Scope, SessionId};

use crate::actor::Command;
use crate::error::ApiError;
use crate::page::GAME_PAGE;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the leaderboard endpoints.
#[derive(Debug, serde::Deserialize)]
pub struct LeaderboardQuery {
    /// Scope key (`global`, `channel:forsen`, or a bare channel name).
    /// Defaults to the current session's scope.
    pub scope: Option<String>,
}

impl LeaderboardQuery {
    fn scope(&self) -> Option<Scope> {
        self.scope
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Scope::from_key)
    }
}

/// Request body for `POST /api/load`.
#[derive(Debug, serde::Deserialize)]
pub struct LoadRequest {
    /// Channel name as typed.
    pub channel: String,
}

/// Request body for `POST /api/guess`.
#[derive(Debug, serde::Deserialize)]
pub struct GuessRequest {
    /// Guess text.
    pub text: String,
}

/// Request body for `PUT /api/announcer`.
#[derive(Debug, serde::Deserialize)]
pub struct AnnouncerRequest {
    /// Bot account login.
    pub login: String,
    /// OAuth token, with or without `oauth:`.
    pub oauth_token: String,
}

/// Response for `POST /api/guess`.
#[derive(Debug, serde::Serialize)]
pub struct GuessResponse {
    /// Whether the guess won the round.
    pub accepted: bool,
    /// Why it did not, when it did not.
    pub reason: Option<RejectionReason>,
}

impl From<Verdict> for GuessResponse {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => Self {
                accepted: true,
                reason: None,
            },
            Verdict::Rejected(reason) => Self {
                accepted: false,
                reason: Some(reason),
            },
        }
    }
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OkResponse {
    ok: bool,
    message: String,
}

/// Response for endpoints that start a new session.
#[derive(Debug, serde::Serialize)]
struct SessionResponse {
    ok: bool,
    session_id: SessionId,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Serve the game page.
pub async fn index() -> impl IntoResponse {
    Html(GAME_PAGE)
}

/// Current session and round. The answer is only included once the round
/// is locked.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await.clone();
    Json(snapshot)
}

/// Ranked leaderboard.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = query.scope();
    let view = state
        .request(|reply| Command::Leaderboard { scope, reply })
        .await?;
    Ok(Json(view))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Reset a leaderboard.
pub async fn clear_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = query.scope();
    let cleared = state
        .request(|reply| Command::ClearLeaderboard { scope, reply })
        .await?;
    Ok(Json(OkResponse {
        ok: true,
        message: format!("Cleared {cleared} leaderboard"),
    }))
}

/// Start loading a channel. Progress arrives as status events.
pub async fn load_channel(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let generation = state
        .request(|reply| Command::LoadChannel {
            channel: body.channel,
            reply,
        })
        .await??;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "ok": true, "generation": generation })),
    ))
}

/// Load pasted emote JSON. The body is the raw JSON text.
pub async fn load_manual(
    State(state): State<Arc<AppState>>,
    payload: String,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = state
        .request(|reply| Command::LoadManual { payload, reply })
        .await??;
    Ok(Json(SessionResponse {
        ok: true,
        session_id,
    }))
}

/// Submit a guess typed on the game page.
pub async fn guess(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GuessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let verdict = state
        .request(|reply| Command::Guess {
            text: body.text,
            reply,
        })
        .await?;
    Ok(Json(GuessResponse::from(verdict)))
}

/// Give up on the current round.
pub async fn skip(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let skipped = state.request(|reply| Command::Skip { reply }).await?;
    Ok(Json(OkResponse {
        ok: skipped,
        message: if skipped {
            "Round skipped".to_owned()
        } else {
            "No open round".to_owned()
        },
    }))
}

/// Open the next round immediately.
pub async fn next(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let advanced = state.request(|reply| Command::Next { reply }).await?;
    if !advanced {
        return Err(ApiError::NotFound("no session loaded".to_owned()));
    }
    Ok(Json(OkResponse {
        ok: true,
        message: "Advanced".to_owned(),
    }))
}

/// Reshuffle the loaded emotes and start over.
pub async fn reshuffle(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let session_id = state
        .request(|reply| Command::Reshuffle { reply })
        .await??;
    Ok(Json(SessionResponse {
        ok: true,
        session_id,
    }))
}

/// Store announce-bot credentials.
pub async fn set_announcer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnnouncerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = AnnouncerCredentials::new(&body.login, &body.oauth_token)
        .ok_or_else(|| ApiError::BadRequest("login and oauth_token are required".to_owned()))?;
    let login = credentials.login.clone();
    state
        .request(|reply| Command::SetAnnouncer { credentials, reply })
        .await??;
    Ok(Json(OkResponse {
        ok: true,
        message: format!("Announcing as {login}"),
    }))
}

/// Remove announce-bot credentials.
pub async fn clear_announcer(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .request(|reply| Command::ClearAnnouncer { reply })
        .await??;
    Ok(Json(OkResponse {
        ok: true,
        message: "Announce-bot removed".to_owned(),
    }))
}
