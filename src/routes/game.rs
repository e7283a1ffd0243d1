use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::game::{
        CompatibilityReport, CreateGameRequest, GameView, JoinGameRequest, LeaveGameRequest,
        ReadyRequest, StartGameRequest,
    },
    error::AppError,
    services::{compatibility, session_service},
    state::SharedState,
};

/// Routes handling the room lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/join", post(join_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/ready", post(set_ready))
        .route("/games/{id}/start", post(start_game))
        .route("/games/{id}/leave", post(leave_game))
        .route("/games/{id}/compatibility", get(compatibility))
}

/// Open a new room and install the requester as host.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameView)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = session_service::create_game(&state, payload).await?;
    Ok(Json(view))
}

/// Join a waiting room by its shareable code.
#[utoipa::path(
    post,
    path = "/games/join",
    tag = "game",
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Joined the game", body = GameView),
        (status = 404, description = "No joinable game for this code"),
        (status = 409, description = "Room is full or the profile already joined")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Json(payload): Json<JoinGameRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = session_service::join_game(&state, payload).await?;
    Ok(Json(view))
}

/// Fetch the current document view of a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current game document", body = GameView),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameView>, AppError> {
    let view = session_service::get_game(&state, id).await?;
    Ok(Json(view))
}

/// Flip a player's ready flag in the waiting room.
#[utoipa::path(
    post,
    path = "/games/{id}/ready",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = ReadyRequest,
    responses(
        (status = 200, description = "Ready flag updated", body = GameView)
    )
)]
pub async fn set_ready(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReadyRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = session_service::set_ready(&state, id, payload).await?;
    Ok(Json(view))
}

/// Start the session; host-only, requires two ready players.
#[utoipa::path(
    post,
    path = "/games/{id}/start",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = GameView),
        (status = 401, description = "Requester is not the host"),
        (status = 409, description = "Not enough players or not everyone is ready")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = session_service::start_game(&state, id, payload).await?;
    Ok(Json(view))
}

/// Leave the game; the last player out deletes it.
#[utoipa::path(
    post,
    path = "/games/{id}/leave",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = LeaveGameRequest,
    responses(
        (status = 204, description = "Player removed")
    )
)]
pub async fn leave_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveGameRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    session_service::leave_game(&state, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Compute the compatibility breakdown for a game.
#[utoipa::path(
    get,
    path = "/games/{id}/compatibility",
    tag = "game",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Compatibility breakdown", body = CompatibilityReport),
        (status = 404, description = "Game not found")
    )
)]
pub async fn compatibility(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompatibilityReport>, AppError> {
    let report = compatibility::report(&state, id).await?;
    Ok(Json(report))
}
