//! In-process game store. Documents live in a [`DashMap`]; the per-entry lock
//! serializes transactions on a document, which is what makes concurrent
//! submissions from the two players safe.

use std::time::SystemTime;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::game_store::{GameStore, Mutation, TransactOutcome};
use crate::dao::storage::StorageResult;
use crate::error::GameError;
use crate::state::game::Game;
use crate::state::state_machine::GameStatus;

/// Buffered committed writes per subscriber before a slow consumer lags.
const UPDATES_CHANNEL_CAPACITY: usize = 16;

struct Document {
    game: Game,
    updates: broadcast::Sender<Game>,
}

/// In-memory [`GameStore`] backend.
#[derive(Default)]
pub struct MemoryGameStore {
    documents: DashMap<Uuid, Document>,
}

impl MemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn create(&self, game: Game) -> BoxFuture<'static, StorageResult<()>> {
        let (updates, _) = broadcast::channel(UPDATES_CHANNEL_CAPACITY);
        self.documents.insert(game.id, Document { game, updates });
        Box::pin(async { Ok(()) })
    }

    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>> {
        let found = self.documents.get(&id).map(|doc| doc.game.clone());
        Box::pin(async move { Ok(found) })
    }

    fn find_active_by_code(&self, code: &str) -> BoxFuture<'static, StorageResult<Option<Game>>> {
        let found = self
            .documents
            .iter()
            .find(|doc| doc.game.room_code == code && doc.game.status != GameStatus::Finished)
            .map(|doc| doc.game.clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<Game>>> {
        let games: Vec<Game> = self.documents.iter().map(|doc| doc.game.clone()).collect();
        Box::pin(async move { Ok(games) })
    }

    fn transact(
        &self,
        id: Uuid,
        mutation: Mutation,
    ) -> BoxFuture<'static, StorageResult<TransactOutcome>> {
        // The DashMap entry guard is held for the whole read-decide-write,
        // so transactions on one document never interleave.
        let outcome = match self.documents.get_mut(&id) {
            None => Err(GameError::NotFound(format!("game `{id}` not found"))),
            Some(mut doc) => {
                let mut scratch = doc.game.clone();
                match mutation(&mut scratch) {
                    Ok(()) => {
                        scratch.updated_at = SystemTime::now();
                        doc.game = scratch.clone();
                        let _ = doc.updates.send(scratch.clone());
                        Ok(scratch)
                    }
                    Err(err) => Err(err),
                }
            }
        };
        Box::pin(async move { Ok(outcome) })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        // Dropping the document drops its sender, closing subscriber streams.
        self.documents.remove(&id);
        Box::pin(async { Ok(()) })
    }

    fn subscribe(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<broadcast::Receiver<Game>>>> {
        let receiver = self.documents.get(&id).map(|doc| doc.updates.subscribe());
        Box::pin(async move { Ok(receiver) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{GameMode, Player};

    fn sample_game(code: &str) -> Game {
        let host = Player::new(Uuid::new_v4(), "ana".into(), None);
        Game::new(code.into(), host, GameMode::Competitive, Vec::new())
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_document_unchanged() {
        let store = MemoryGameStore::new();
        let game = sample_game("ABCDEF");
        let id = game.id;
        store.create(game).await.unwrap();

        let outcome = store
            .transact(
                id,
                Box::new(|game| {
                    game.room_code = "MUTATE".into();
                    Err(GameError::InvalidState("abort".into()))
                }),
            )
            .await
            .unwrap();
        assert!(outcome.is_err());

        let stored = store.find(id).await.unwrap().unwrap();
        assert_eq!(stored.room_code, "ABCDEF");
    }

    #[tokio::test]
    async fn committed_mutation_reaches_subscribers() {
        let store = MemoryGameStore::new();
        let game = sample_game("ABCDEF");
        let id = game.id;
        store.create(game).await.unwrap();

        let mut receiver = store.subscribe(id).await.unwrap().unwrap();
        store
            .transact(
                id,
                Box::new(|game| {
                    game.players[0].is_ready = true;
                    Ok(())
                }),
            )
            .await
            .unwrap()
            .unwrap();

        let pushed = receiver.recv().await.unwrap();
        assert!(pushed.players[0].is_ready);
    }

    #[tokio::test]
    async fn transact_on_missing_document_is_not_found() {
        let store = MemoryGameStore::new();
        let outcome = store
            .transact(Uuid::new_v4(), Box::new(|_| Ok(())))
            .await
            .unwrap();
        assert!(matches!(outcome, Err(GameError::NotFound(_))));
    }

    #[tokio::test]
    async fn finished_games_do_not_hold_their_code() {
        let store = MemoryGameStore::new();
        let mut game = sample_game("ABCDEF");
        game.status = GameStatus::Finished;
        store.create(game).await.unwrap();

        assert!(
            store
                .find_active_by_code("ABCDEF")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_closes_subscriber_streams() {
        let store = MemoryGameStore::new();
        let game = sample_game("ABCDEF");
        let id = game.id;
        store.create(game).await.unwrap();

        let mut receiver = store.subscribe(id).await.unwrap().unwrap();
        store.delete(id).await.unwrap();
        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
