use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, GameError},
    services::sse_service,
    state::SharedState,
};

/// Stream every committed write of a game document to a subscribed client.
#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game document stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_stream(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = state
        .store()
        .subscribe(id)
        .await
        .map_err(GameError::from)?
        .ok_or_else(|| GameError::NotFound(format!("game `{id}` not found")))?;
    let initial = state.find_game(id).await?.into();

    info!(game_id = %id, "new game SSE connection");
    Ok(sse_service::to_game_stream(initial, receiver))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{id}/events", get(game_stream))
}
