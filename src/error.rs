use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{game::GameMode, state_machine::InvalidTransition},
};

/// Errors raised by the game engine.
///
/// Every variant except `Storage` is a synchronous validation rejection: the
/// operation is refused and the game document is left untouched (mutations
/// are all-or-nothing). `Storage` is transient and retryable by the caller.
#[derive(Debug, Error)]
pub enum GameError {
    /// Requested game, player, question, or option does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The room already holds two players.
    #[error("game is full")]
    GameFull,
    /// The joining profile is already a participant.
    #[error("player already joined this game")]
    AlreadyJoined,
    /// Only the host may start the game.
    #[error("only the host can start the game")]
    NotHost,
    /// Starting requires exactly two players.
    #[error("game needs two players to start")]
    InsufficientPlayers,
    /// Starting requires every player to be ready.
    #[error("all players must be ready to start")]
    NotAllReady,
    /// A mode-specific operation was called against a game in another mode.
    #[error("operation is not available in {actual:?} mode")]
    WrongGameMode {
        /// The mode the target game is actually in.
        actual: GameMode,
    },
    /// The player already acted on the current question.
    #[error("already submitted for this question")]
    DuplicateSubmission,
    /// A prediction was submitted before the partner's original answer.
    #[error("partner has not answered yet")]
    PartnerNotAnsweredYet,
    /// The targeted answer slot is already filled.
    #[error("already answered")]
    AlreadyAnswered,
    /// The targeted custom question already carries a judgment.
    #[error("already judged")]
    AlreadyJudged,
    /// A role-bound action was attempted by the wrong player.
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    /// Payload content that survived DTO validation but is still unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The operation cannot be performed in the current game state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Storage backend failure; transient and retryable.
    #[error("storage unavailable")]
    Storage(#[from] StorageError),
}

impl From<InvalidTransition> for GameError {
    fn from(err: InvalidTransition) -> Self {
        GameError::InvalidState(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NotFound(message) => AppError::NotFound(message),
            GameError::NotHost | GameError::NotAuthorized(_) => {
                AppError::Unauthorized(err.to_string())
            }
            GameError::InvalidInput(message) => AppError::BadRequest(message),
            GameError::Storage(source) => AppError::ServiceUnavailable(source.to_string()),
            GameError::GameFull
            | GameError::AlreadyJoined
            | GameError::InsufficientPlayers
            | GameError::NotAllReady
            | GameError::WrongGameMode { .. }
            | GameError::DuplicateSubmission
            | GameError::PartnerNotAnsweredYet
            | GameError::AlreadyAnswered
            | GameError::AlreadyJudged
            | GameError::InvalidState(_) => AppError::Conflict(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejections_map_to_conflict() {
        for err in [
            GameError::GameFull,
            GameError::AlreadyJoined,
            GameError::DuplicateSubmission,
            GameError::AlreadyJudged,
            GameError::InvalidState("nope".into()),
        ] {
            assert!(matches!(AppError::from(err), AppError::Conflict(_)));
        }
    }

    #[test]
    fn role_violations_map_to_unauthorized() {
        assert!(matches!(
            AppError::from(GameError::NotHost),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(GameError::NotAuthorized("judge".into())),
            AppError::Unauthorized(_)
        ));
    }

    #[test]
    fn missing_resources_map_to_not_found() {
        assert!(matches!(
            AppError::from(GameError::NotFound("game".into())),
            AppError::NotFound(_)
        ));
    }
}
