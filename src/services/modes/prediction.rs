//! Prediction mode: for each question one player answers for themselves and
//! the other predicts that choice. Roles alternate by question-index parity
//! so each player answers exactly half the questions.

use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::game::{GameView, OriginalAnswerRequest, PredictionGuessRequest, PredictionOutcome},
    error::GameError,
    services::{
        coordinator,
        modes::{ModeStrategy, ensure_current_index, ensure_mode, ensure_playing, record_answer},
        scoring,
    },
    state::{
        SharedState,
        game::{AnswerOutcome, Game, GameMode, MAX_PLAYERS, ModeState, PredictionPairing},
    },
};

/// Strategy implementation for prediction games.
pub struct PredictionStrategy;

impl ModeStrategy for PredictionStrategy {
    fn on_game_start(&self, game: &mut Game) -> Result<(), GameError> {
        let player_ids: Vec<Uuid> = game.players.iter().map(|player| player.id).collect();
        if player_ids.len() != MAX_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }
        let total = game.questions.len();
        let kind = game.mode_kind();
        let ModeState::Prediction { pairings } = &mut game.mode else {
            return Err(GameError::WrongGameMode { actual: kind });
        };
        *pairings = (0..total)
            .map(|index| PredictionPairing {
                question_index: index,
                answering_player_id: player_ids[index % 2],
                guessing_player_id: player_ids[(index + 1) % 2],
                answering_choice: None,
            })
            .collect();
        Ok(())
    }

    fn both_acted(&self, game: &Game) -> bool {
        let index = game.current_question_index;
        let ModeState::Prediction { pairings } = &game.mode else {
            return false;
        };
        let Some(pairing) = pairings.get(index) else {
            return false;
        };
        pairing.answering_choice.is_some()
            && game
                .player(pairing.guessing_player_id)
                .and_then(|player| player.answer_at(index))
                .is_some()
    }

    fn score_current(&self, game: &mut Game) -> Result<(), GameError> {
        let index = game.current_question_index;
        let question = game
            .current_question()
            .cloned()
            .ok_or_else(|| GameError::InvalidState("no question is in play".into()))?;
        let window = game.time_per_question_secs as f32;

        let kind = game.mode_kind();
        let (answerer_id, guesser_id, actual) = {
            let ModeState::Prediction { pairings } = &game.mode else {
                return Err(GameError::WrongGameMode { actual: kind });
            };
            let pairing = pairings.get(index).ok_or_else(|| {
                GameError::InvalidState("no pairing for the current question".into())
            })?;
            let actual = pairing
                .answering_choice
                .ok_or(GameError::PartnerNotAnsweredYet)?;
            (
                pairing.answering_player_id,
                pairing.guessing_player_id,
                actual,
            )
        };

        // Only the guessing player can earn points on this question.
        let guesser = game
            .player_mut(guesser_id)
            .ok_or_else(|| GameError::NotFound(format!("player `{guesser_id}` is not in this game")))?;
        let answer = guesser
            .answer_at_mut(index)
            .ok_or_else(|| GameError::InvalidState("guess has not been recorded".into()))?;
        let correct = answer.choice == actual;
        let points = if correct {
            scoring::timed_points(
                question.difficulty,
                answer.time_spent_secs.unwrap_or(window),
                window,
            )
        } else {
            0
        };
        answer.outcome = AnswerOutcome::Scored {
            matched: correct,
            points,
        };
        if correct {
            guesser.score += points;
            guesser.correct_answers_count += 1;
        }

        // Close out the original answer; it never awards points.
        if let Some(answerer) = game.player_mut(answerer_id) {
            if let Some(original) = answerer.answer_at_mut(index) {
                original.outcome = AnswerOutcome::Scored {
                    matched: correct,
                    points: 0,
                };
            }
        }

        Ok(())
    }

    fn auto_finish(&self, _game: &Game) -> bool {
        false
    }
}

/// Submit the answering player's own choice for the current question.
///
/// Awards no points; raises a notice so the guessing player knows the
/// prediction window is open.
pub async fn submit_original_answer(
    state: &SharedState,
    game_id: Uuid,
    request: OriginalAnswerRequest,
) -> Result<GameView, GameError> {
    let OriginalAnswerRequest {
        player_id,
        question_index,
        option_id,
    } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Prediction)?;
            ensure_current_index(game, question_index)?;

            {
                let ModeState::Prediction { pairings } = &game.mode else {
                    return Err(GameError::WrongGameMode {
                        actual: game.mode_kind(),
                    });
                };
                let pairing = pairings.get(question_index).ok_or_else(|| {
                    GameError::InvalidState("no pairing for the current question".into())
                })?;
                if pairing.answering_player_id != player_id {
                    return Err(GameError::NotAuthorized(
                        "only the assigned answering player may answer this question".into(),
                    ));
                }
                if pairing.answering_choice.is_some() {
                    return Err(GameError::AlreadyAnswered);
                }
            }

            record_answer(game, player_id, option_id, None)?;
            if let ModeState::Prediction { pairings } = &mut game.mode {
                pairings[question_index].answering_choice = Some(option_id);
            }
            coordinator::settle(game)?;
            Ok(())
        })
        .await?;

    debug!(
        game_id = %game_id,
        player_id = %player_id,
        question_index,
        "recorded prediction original answer"
    );
    Ok(game.into())
}

/// Submit the guessing player's prediction for the current question.
///
/// Returns the correctness and awarded points immediately so the client can
/// show feedback without waiting for the next document push.
pub async fn submit_prediction(
    state: &SharedState,
    game_id: Uuid,
    request: PredictionGuessRequest,
) -> Result<PredictionOutcome, GameError> {
    let PredictionGuessRequest {
        player_id,
        question_index,
        option_id,
        time_spent_secs,
    } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Prediction)?;
            ensure_current_index(game, question_index)?;

            {
                let ModeState::Prediction { pairings } = &game.mode else {
                    return Err(GameError::WrongGameMode {
                        actual: game.mode_kind(),
                    });
                };
                let pairing = pairings.get(question_index).ok_or_else(|| {
                    GameError::InvalidState("no pairing for the current question".into())
                })?;
                if pairing.guessing_player_id != player_id {
                    return Err(GameError::NotAuthorized(
                        "only the assigned guessing player may predict on this question".into(),
                    ));
                }
                if pairing.answering_choice.is_none() {
                    return Err(GameError::PartnerNotAnsweredYet);
                }
            }

            record_answer(game, player_id, option_id, Some(time_spent_secs))?;
            coordinator::settle(game)?;
            Ok(())
        })
        .await?;

    let actual_choice = {
        let ModeState::Prediction { pairings } = &game.mode else {
            return Err(GameError::WrongGameMode {
                actual: game.mode_kind(),
            });
        };
        pairings
            .get(question_index)
            .and_then(|pairing| pairing.answering_choice)
            .ok_or_else(|| GameError::InvalidState("pairing lost its answer".into()))?
    };
    let answer = game
        .player(player_id)
        .and_then(|player| player.answer_at(question_index))
        .ok_or_else(|| GameError::InvalidState("guess was not recorded".into()))?;
    let AnswerOutcome::Scored { matched, points } = answer.outcome else {
        return Err(GameError::InvalidState("guess was not scored".into()));
    };

    debug!(
        game_id = %game_id,
        player_id = %player_id,
        question_index,
        correct = matched,
        "scored prediction"
    );
    Ok(PredictionOutcome {
        correct: matched,
        points,
        actual_choice,
    })
}
