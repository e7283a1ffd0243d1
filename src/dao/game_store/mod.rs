pub mod memory;

use futures::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::storage::StorageResult;
use crate::error::GameError;
use crate::state::game::Game;

/// A mutation applied to a game document inside one transaction.
///
/// Runs on a scratch copy of the document; returning an error discards the
/// copy, so rejected operations never leave a partial write behind.
pub type Mutation = Box<dyn FnOnce(&mut Game) -> Result<(), GameError> + Send>;

/// Outcome of a transaction: the committed document, or the engine rejection
/// that aborted it.
pub type TransactOutcome = Result<Game, GameError>;

/// Abstraction over the shared game-document store.
///
/// The store's transaction primitive is the engine's only synchronization
/// point: the two submitting clients are separate processes, so every
/// read-decide-write on a document must go through [`GameStore::transact`].
/// Every committed write is fanned out to the document's subscribers.
pub trait GameStore: Send + Sync {
    /// Insert a freshly created game document.
    fn create(&self, game: Game) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a game document by id.
    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>>;
    /// Fetch the non-finished game currently bound to a room code, if any.
    fn find_active_by_code(&self, code: &str) -> BoxFuture<'static, StorageResult<Option<Game>>>;
    /// List every stored game document.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<Game>>>;
    /// Atomically read-modify-write one document. The mutation either commits
    /// in full or leaves the document untouched.
    fn transact(&self, id: Uuid, mutation: Mutation)
    -> BoxFuture<'static, StorageResult<TransactOutcome>>;
    /// Delete a game document, releasing its room code.
    fn delete(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Subscribe to committed writes of one document. `None` when the
    /// document does not exist; the channel closes when it is deleted.
    fn subscribe(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<broadcast::Receiver<Game>>>>;
    /// Probe backend liveness.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
