//! Answer coordination: the one place that decides "both players have acted"
//! and triggers the scoring pass.
//!
//! `settle` only ever runs inside a store transaction, and the
//! `AnsweredPendingPartner` → `Scored` round transition it performs is the
//! sole scoring trigger. Two racing submissions therefore cannot both observe
//! an unscored round: the store serializes them, the first to see both
//! answers scores, the second finds the round already `Scored`.

use crate::{
    error::GameError,
    services::{modes::strategy_for, turn},
    state::{game::Game, state_machine::GameStatus, state_machine::RoundPhase},
};

/// What a settlement pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Whether the scoring pass ran for the current question.
    pub scored: bool,
    /// Whether the game finalized (custom-mode exhaustion).
    pub finished: bool,
}

/// Run the both-acted check and, at most once per question, the scoring pass.
/// Afterwards finalizes the game if the mode reports its material exhausted.
pub fn settle(game: &mut Game) -> Result<Settlement, GameError> {
    let strategy = strategy_for(game.mode_kind());
    let mut settlement = Settlement {
        scored: false,
        finished: false,
    };

    let index = game.current_question_index;
    if let Some(phase) = game.rounds.get(index).copied() {
        if !phase.is_scored() && strategy.both_acted(game) {
            strategy.score_current(game)?;
            game.rounds[index] = RoundPhase::Scored;
            settlement.scored = true;
        }
    }

    if game.status == GameStatus::Playing && strategy.auto_finish(game) {
        turn::finish(game)?;
        settlement.finished = true;
    }

    Ok(settlement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::modes::record_answer;
    use crate::services::testing::{started_game, test_state};
    use crate::state::game::GameMode;

    #[tokio::test]
    async fn settle_is_idempotent_once_scored() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        let mut game = state.find_game(game_id).await.unwrap();
        record_answer(&mut game, host_id, 0, Some(2.0)).unwrap();
        record_answer(&mut game, guest_id, 0, Some(2.0)).unwrap();

        let first = settle(&mut game).unwrap();
        assert!(first.scored);
        let score_after_first: u32 = game.players.iter().map(|player| player.score).sum();

        let second = settle(&mut game).unwrap();
        assert!(!second.scored);
        let score_after_second: u32 = game.players.iter().map(|player| player.score).sum();
        assert_eq!(score_after_first, score_after_second);
    }

    #[tokio::test]
    async fn settle_waits_for_both_answers() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Competitive).await;

        let mut game = state.find_game(game_id).await.unwrap();
        record_answer(&mut game, host_id, 0, Some(2.0)).unwrap();

        let settlement = settle(&mut game).unwrap();
        assert!(!settlement.scored);
        assert!(!game.rounds[0].is_scored());
    }
}
