use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a game session.
///
/// The lifecycle is strictly forward-only: `Waiting` → `Playing` →
/// `Finished`. Every status change in the engine goes through
/// [`GameStatus::advance`] so a backwards or skipping move is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Room is open; players can join and flag themselves ready.
    Waiting,
    /// Both players are in and the session is live.
    Playing,
    /// Terminal state; scores and winner are final.
    Finished,
}

/// Events that move the session lifecycle forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// The host starts the session from the waiting room.
    Start,
    /// The session ran out of material or ended early.
    Finish,
}

/// Error returned when attempting to apply an invalid lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// Status the session was in when the invalid event was received.
    pub from: GameStatus,
    /// Event that cannot be applied from this status.
    pub event: StatusEvent,
}

impl GameStatus {
    /// Compute the next status for an event.
    pub fn advance(self, event: StatusEvent) -> Result<GameStatus, InvalidTransition> {
        match (self, event) {
            (GameStatus::Waiting, StatusEvent::Start) => Ok(GameStatus::Playing),
            (GameStatus::Playing, StatusEvent::Finish) => Ok(GameStatus::Finished),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}

/// Explicit per-question state.
///
/// Stored on the game document, one entry per question, so clients never have
/// to re-derive "who are we waiting on" from a combination of boolean and
/// nullable fields. The `AnsweredPendingPartner` → `Scored` transition is the
/// single trigger for the scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoundPhase {
    /// Nobody has acted on this question yet.
    Unanswered,
    /// One submission is in; the round is waiting on the other player.
    AnsweredPendingPartner {
        /// Player whose action the round is waiting on.
        waiting_on: Uuid,
    },
    /// Both players acted and the scoring pass ran. Final.
    Scored,
}

impl RoundPhase {
    /// Whether the scoring pass already ran for this round.
    pub fn is_scored(self) -> bool {
        matches!(self, RoundPhase::Scored)
    }
}
