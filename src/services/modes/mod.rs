//! Per-mode gameplay protocols behind one strategy seam.
//!
//! The strategy is selected from the game document on every operation, so the
//! lifecycle and the answer coordinator never branch on the mode themselves.

/// Agreement-scored shared questions.
pub mod competitive;
/// Live-authored free-text questions.
pub mod custom;
/// Answer-and-predict role play.
pub mod prediction;

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    error::GameError,
    state::{
        game::{Answer, AnswerOutcome, Game, GameMode, Notice, NoticeKind},
        state_machine::{GameStatus, RoundPhase},
    },
};

/// Mode-specific behaviour invoked uniformly by the session lifecycle and the
/// answer coordinator. Implementations are stateless; all state lives on the
/// game document.
pub trait ModeStrategy: Send + Sync {
    /// Mode-specific setup performed when the session leaves the waiting
    /// state (e.g. building the prediction pairings).
    fn on_game_start(&self, game: &mut Game) -> Result<(), GameError>;
    /// Whether both players have acted on the current question, under this
    /// mode's definition of "acted".
    fn both_acted(&self, game: &Game) -> bool;
    /// Apply the scoring pass for the current question. The coordinator
    /// guarantees this runs at most once per question.
    fn score_current(&self, game: &mut Game) -> Result<(), GameError>;
    /// Whether the session spent all its material and should finalize now,
    /// without an explicit turn-advance call.
    fn auto_finish(&self, game: &Game) -> bool;
}

/// Resolve the strategy for a mode.
pub fn strategy_for(mode: GameMode) -> &'static dyn ModeStrategy {
    match mode {
        GameMode::Competitive => &competitive::CompetitiveStrategy,
        GameMode::Prediction => &prediction::PredictionStrategy,
        GameMode::Custom => &custom::CustomStrategy,
    }
}

pub(crate) fn ensure_playing(game: &Game) -> Result<(), GameError> {
    if game.status == GameStatus::Playing {
        Ok(())
    } else {
        Err(GameError::InvalidState(format!(
            "game is {:?}, not playing",
            game.status
        )))
    }
}

pub(crate) fn ensure_mode(game: &Game, required: GameMode) -> Result<(), GameError> {
    if game.mode_kind() == required {
        Ok(())
    } else {
        Err(GameError::WrongGameMode {
            actual: game.mode_kind(),
        })
    }
}

pub(crate) fn ensure_current_index(game: &Game, question_index: usize) -> Result<(), GameError> {
    if game.current_question_index == question_index {
        Ok(())
    } else {
        Err(GameError::InvalidState(format!(
            "question {} is not in play (current is {})",
            question_index, game.current_question_index
        )))
    }
}

/// Record a choice on the current question for timed modes.
///
/// Validates the option, enforces single submission, appends the answer as
/// provisionally unscored, and moves the round to `AnsweredPendingPartner`
/// (raising the partner notice) when this is the first action of the pair.
pub(crate) fn record_answer(
    game: &mut Game,
    player_id: Uuid,
    option_id: u32,
    time_spent_secs: Option<f32>,
) -> Result<(), GameError> {
    let index = game.current_question_index;
    let question = game
        .current_question()
        .ok_or_else(|| GameError::InvalidState("no question is in play".into()))?;
    if !question.options.iter().any(|option| option.id == option_id) {
        return Err(GameError::NotFound(format!(
            "option `{option_id}` does not exist on the current question"
        )));
    }
    let question_id = question.id;
    let partner = game.partner_id(player_id);

    let player = game
        .player_mut(player_id)
        .ok_or_else(|| GameError::NotFound(format!("player `{player_id}` is not in this game")))?;
    if player.has_answered_current {
        return Err(GameError::DuplicateSubmission);
    }
    player
        .push_answer(Answer {
            question_id,
            question_index: index,
            choice: option_id,
            time_spent_secs,
            outcome: AnswerOutcome::Pending,
            submitted_at: SystemTime::now(),
        })
        .map_err(GameError::InvalidState)?;
    player.has_answered_current = true;

    if let Some(partner_id) = partner {
        if matches!(game.rounds.get(index), Some(RoundPhase::Unanswered)) {
            game.rounds[index] = RoundPhase::AnsweredPendingPartner {
                waiting_on: partner_id,
            };
            game.notice = Some(Notice {
                recipient: partner_id,
                kind: NoticeKind::PartnerAnswered {
                    question_index: index,
                },
            });
        }
    }

    Ok(())
}
