//! Competitive mode: both players answer the same question and points reward
//! agreement, not trivia accuracy — the product measures compatibility.

use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::game::{GameView, SubmitAnswerRequest},
    error::GameError,
    services::{
        coordinator,
        modes::{ModeStrategy, ensure_current_index, ensure_mode, ensure_playing, record_answer},
        scoring,
    },
    state::{
        SharedState,
        game::{AnswerOutcome, Game, GameMode, MAX_PLAYERS},
    },
};

/// Strategy implementation for competitive games.
pub struct CompetitiveStrategy;

impl ModeStrategy for CompetitiveStrategy {
    fn on_game_start(&self, _game: &mut Game) -> Result<(), GameError> {
        Ok(())
    }

    fn both_acted(&self, game: &Game) -> bool {
        let index = game.current_question_index;
        game.players.len() == MAX_PLAYERS
            && game
                .players
                .iter()
                .all(|player| player.answer_at(index).is_some())
    }

    fn score_current(&self, game: &mut Game) -> Result<(), GameError> {
        let index = game.current_question_index;
        let question = game
            .current_question()
            .cloned()
            .ok_or_else(|| GameError::InvalidState("no question is in play".into()))?;
        let window = game.time_per_question_secs as f32;

        let choices: Vec<u32> = game
            .players
            .iter()
            .filter_map(|player| player.answer_at(index))
            .map(|answer| answer.choice)
            .collect();
        if choices.len() != MAX_PLAYERS {
            return Err(GameError::InvalidState(
                "scoring requires both answers to be in".into(),
            ));
        }
        let matched = choices[0] == choices[1];

        for player in &mut game.players {
            let Some(answer) = player.answer_at_mut(index) else {
                continue;
            };
            let points = if matched {
                scoring::timed_points(
                    question.difficulty,
                    answer.time_spent_secs.unwrap_or(window),
                    window,
                )
            } else {
                0
            };
            answer.outcome = AnswerOutcome::Scored { matched, points };
            if matched {
                player.score += points;
                player.correct_answers_count += 1;
            }
        }

        Ok(())
    }

    fn auto_finish(&self, _game: &Game) -> bool {
        false
    }
}

/// Submit a competitive answer for the current question.
///
/// The answer is recorded provisionally unscored; once both players are in,
/// the coordinator applies the one-and-only scoring pass in the same
/// transaction.
pub async fn submit_answer(
    state: &SharedState,
    game_id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<GameView, GameError> {
    let SubmitAnswerRequest {
        player_id,
        question_index,
        option_id,
        time_spent_secs,
    } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Competitive)?;
            ensure_current_index(game, question_index)?;
            record_answer(game, player_id, option_id, Some(time_spent_secs))?;
            coordinator::settle(game)?;
            Ok(())
        })
        .await?;

    debug!(
        game_id = %game_id,
        player_id = %player_id,
        question_index,
        "recorded competitive answer"
    );
    Ok(game.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{started_game, test_state};
    use crate::state::state_machine::RoundPhase;

    fn request(player_id: Uuid, option_id: u32, time_spent_secs: f32) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            player_id,
            question_index: 0,
            option_id,
            time_spent_secs,
        }
    }

    #[tokio::test]
    async fn matching_answers_score_both_players_with_speed_bonus() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;
        let difficulty = state
            .find_game(game_id)
            .await
            .unwrap()
            .current_question()
            .unwrap()
            .difficulty;

        submit_answer(&state, game_id, request(host_id, 0, 3.0))
            .await
            .unwrap();
        submit_answer(&state, game_id, request(guest_id, 0, 5.0))
            .await
            .unwrap();

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.rounds[0].is_scored());

        let host = game.player(host_id).unwrap();
        let guest = game.player(guest_id).unwrap();
        assert_eq!(host.score, scoring::timed_points(difficulty, 3.0, 15.0));
        assert_eq!(guest.score, scoring::timed_points(difficulty, 5.0, 15.0));
        assert_eq!(host.correct_answers_count, 1);
        assert_eq!(guest.correct_answers_count, 1);
    }

    #[tokio::test]
    async fn mismatched_answers_score_nothing() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        submit_answer(&state, game_id, request(host_id, 0, 4.0))
            .await
            .unwrap();
        submit_answer(&state, game_id, request(guest_id, 1, 4.0))
            .await
            .unwrap();

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.rounds[0].is_scored());
        for player in &game.players {
            assert_eq!(player.score, 0);
            assert_eq!(player.correct_answers_count, 0);
            assert_eq!(
                player.answers[0].outcome,
                AnswerOutcome::Scored {
                    matched: false,
                    points: 0
                }
            );
        }
    }

    #[tokio::test]
    async fn first_submission_flags_the_waiting_partner() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        let view = submit_answer(&state, game_id, request(host_id, 0, 4.0))
            .await
            .unwrap();
        assert_eq!(
            view.rounds[0],
            RoundPhase::AnsweredPendingPartner {
                waiting_on: guest_id
            }
        );
        let notice = view.notice.unwrap();
        assert_eq!(notice.recipient, guest_id);
    }

    #[tokio::test]
    async fn duplicate_submission_is_rejected() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Competitive).await;

        submit_answer(&state, game_id, request(host_id, 0, 4.0))
            .await
            .unwrap();
        let err = submit_answer(&state, game_id, request(host_id, 1, 5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::DuplicateSubmission));

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.player(host_id).unwrap().answers.len(), 1);
    }

    #[tokio::test]
    async fn stale_question_index_is_rejected() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Competitive).await;

        let err = submit_answer(
            &state,
            game_id,
            SubmitAnswerRequest {
                player_id: host_id,
                question_index: 3,
                option_id: 0,
                time_spent_secs: 2.0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_option_is_rejected() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Competitive).await;

        let err = submit_answer(&state, game_id, request(host_id, 99, 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn wrong_mode_is_rejected() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Prediction).await;

        let err = submit_answer(&state, game_id, request(host_id, 0, 2.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::WrongGameMode {
                actual: GameMode::Prediction
            }
        ));
    }

    #[tokio::test]
    async fn concurrent_submissions_score_exactly_once() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;
        let difficulty = state
            .find_game(game_id)
            .await
            .unwrap()
            .current_question()
            .unwrap()
            .difficulty;

        let mut handles = Vec::new();
        for (player_id, secs) in [(host_id, 3.0_f32), (guest_id, 5.0_f32)] {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                submit_answer(&state, game_id, request(player_id, 0, secs)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.rounds[0].is_scored());

        // One scoring pass: each player holds exactly one scored answer and
        // exactly the points of their own submission.
        let host = game.player(host_id).unwrap();
        let guest = game.player(guest_id).unwrap();
        assert_eq!(host.answers.len(), 1);
        assert_eq!(guest.answers.len(), 1);
        assert_eq!(host.score, scoring::timed_points(difficulty, 3.0, 15.0));
        assert_eq!(guest.score, scoring::timed_points(difficulty, 5.0, 15.0));
        assert_eq!(host.correct_answers_count, 1);
        assert_eq!(guest.correct_answers_count, 1);
    }
}
