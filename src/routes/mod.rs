use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Room lifecycle routes.
pub mod game;
/// Health check routes.
pub mod health;
/// Gameplay routes.
pub mod play;
/// Per-game document streams.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(game::router())
        .merge(play::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
