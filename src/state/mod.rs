pub mod game;
pub mod state_machine;

use std::sync::Arc;

use uuid::Uuid;

use crate::{config::AppConfig, dao::game_store::GameStore, error::GameError, state::game::Game};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the injected document store plus the immutable
/// runtime configuration. Holding the store behind the trait keeps the engine
/// testable against in-memory doubles.
pub struct AppState {
    store: Arc<dyn GameStore>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply across handlers and background tasks.
    pub fn new(store: Arc<dyn GameStore>, config: AppConfig) -> SharedState {
        Arc::new(Self { store, config })
    }

    /// Handle to the game document store.
    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetch a game document or fail with `NotFound`.
    pub async fn find_game(&self, id: Uuid) -> Result<Game, GameError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("game `{id}` not found")))
    }

    /// Run a mutation as one store transaction and return the committed
    /// document.
    ///
    /// Every engine write funnels through here: the previous ephemeral notice
    /// is cleared before the mutation runs, and a rejection leaves the
    /// document untouched.
    pub async fn mutate<F>(&self, id: Uuid, mutation: F) -> Result<Game, GameError>
    where
        F: FnOnce(&mut Game) -> Result<(), GameError> + Send + 'static,
    {
        Ok(self
            .store
            .transact(
                id,
                Box::new(move |game| {
                    game.notice = None;
                    mutation(game)
                }),
            )
            .await??)
    }
}
