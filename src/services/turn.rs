//! Turn advancement and finalization.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::game::{GameView, NextQuestionRequest},
    error::GameError,
    services::modes::ensure_playing,
    state::{
        SharedState,
        game::{Game, GameMode, Player},
        state_machine::{RoundPhase, StatusEvent},
    },
};

/// Advance to the next question, or finalize when the list is exhausted.
///
/// The stored index must equal `expected_index`: a stale call (e.g. both
/// clients racing to advance after the reveal) fails without moving the
/// index, so the turn can never advance twice for one question. Advancing
/// requires the current round to be scored.
pub async fn next_question(
    state: &SharedState,
    game_id: Uuid,
    request: NextQuestionRequest,
) -> Result<GameView, GameError> {
    let NextQuestionRequest { expected_index } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            if game.mode_kind() == GameMode::Custom {
                return Err(GameError::WrongGameMode {
                    actual: GameMode::Custom,
                });
            }
            if game.current_question_index != expected_index {
                return Err(GameError::InvalidState(format!(
                    "question index is {}, not {expected_index}",
                    game.current_question_index
                )));
            }
            let scored = game
                .rounds
                .get(expected_index)
                .copied()
                .map(RoundPhase::is_scored)
                .unwrap_or(false);
            if !scored {
                return Err(GameError::InvalidState(
                    "current question has not been scored yet".into(),
                ));
            }

            if expected_index + 1 == game.questions.len() {
                finish(game)?;
            } else {
                game.current_question_index += 1;
                for player in &mut game.players {
                    player.has_answered_current = false;
                }
            }
            Ok(())
        })
        .await?;

    info!(
        game_id = %game_id,
        index = game.current_question_index,
        finished = game.completed_at.is_some(),
        "advanced turn"
    );
    Ok(game.into())
}

/// Finalize a game: terminal status, completion timestamp, winner by score.
///
/// With a single remaining player (mid-game leave) that player wins by
/// walkover; with two players a score tie leaves the winner unset.
pub fn finish(game: &mut Game) -> Result<(), GameError> {
    game.status = game.status.advance(StatusEvent::Finish)?;
    game.completed_at = Some(SystemTime::now());
    game.winner_id = decide_winner(&game.players);
    Ok(())
}

fn decide_winner(players: &[Player]) -> Option<Uuid> {
    match players {
        [only] => Some(only.id),
        [first, second] => {
            if first.score > second.score {
                Some(first.id)
            } else if second.score > first.score {
                Some(second.id)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::game::SubmitAnswerRequest;
    use crate::services::modes::competitive::submit_answer;
    use crate::services::testing::{started_game, test_state};
    use crate::state::state_machine::GameStatus;

    async fn answer_current(
        state: &SharedState,
        game_id: Uuid,
        index: usize,
        submissions: [(Uuid, u32, f32); 2],
    ) {
        for (player_id, option_id, time_spent_secs) in submissions {
            submit_answer(
                state,
                game_id,
                SubmitAnswerRequest {
                    player_id,
                    question_index: index,
                    option_id,
                    time_spent_secs,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn cannot_advance_before_the_round_is_scored() {
        let state = test_state();
        let (game_id, _, _) = started_game(&state, GameMode::Competitive).await;

        let err = next_question(&state, game_id, NextQuestionRequest { expected_index: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[tokio::test]
    async fn advancing_resets_the_answered_flags_once() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        answer_current(&state, game_id, 0, [(host_id, 0, 3.0), (guest_id, 0, 5.0)]).await;

        let view = next_question(&state, game_id, NextQuestionRequest { expected_index: 0 })
            .await
            .unwrap();
        assert_eq!(view.current_question_index, 1);

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.players.iter().all(|player| !player.has_answered_current));

        // The stale second call must not advance again.
        let err = next_question(&state, game_id, NextQuestionRequest { expected_index: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
        assert_eq!(
            state.find_game(game_id).await.unwrap().current_question_index,
            1
        );
    }

    #[tokio::test]
    async fn next_question_is_not_a_custom_mode_operation() {
        let state = test_state();
        let (game_id, _, _) = started_game(&state, GameMode::Custom).await;

        let err = next_question(&state, game_id, NextQuestionRequest { expected_index: 0 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::WrongGameMode {
                actual: GameMode::Custom
            }
        ));
    }

    #[tokio::test]
    async fn exhausting_the_questions_finalizes_with_the_faster_player_winning() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;
        let total = state.find_game(game_id).await.unwrap().questions.len();

        for index in 0..total {
            // Same option so every round matches; the host is always faster.
            answer_current(
                &state,
                game_id,
                index,
                [(host_id, 0, 2.0), (guest_id, 0, 14.0)],
            )
            .await;
            next_question(
                &state,
                game_id,
                NextQuestionRequest {
                    expected_index: index,
                },
            )
            .await
            .unwrap();
        }

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        assert!(game.completed_at.is_some());
        assert_eq!(game.winner_id, Some(host_id));
        // The index never moves past the last question.
        assert_eq!(game.current_question_index, total - 1);
    }

    #[tokio::test]
    async fn equal_scores_leave_the_winner_unset() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;
        let total = state.find_game(game_id).await.unwrap().questions.len();

        for index in 0..total {
            answer_current(
                &state,
                game_id,
                index,
                [(host_id, 0, 4.0), (guest_id, 0, 4.0)],
            )
            .await;
            next_question(
                &state,
                game_id,
                NextQuestionRequest {
                    expected_index: index,
                },
            )
            .await
            .unwrap();
        }

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner_id, None);
    }
}
