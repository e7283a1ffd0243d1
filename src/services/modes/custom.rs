//! Custom mode: no fixed question bank. Players author free-text questions
//! for each other live, through a strictly ordered asked → answered → judged
//! protocol, each step bound to a specific player.

use std::time::SystemTime;

use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::game::{AnswerQuestionRequest, AskQuestionRequest, GameView, JudgeAnswerRequest},
    error::GameError,
    services::{
        coordinator,
        modes::{ModeStrategy, ensure_mode, ensure_playing},
        scoring,
    },
    state::{
        SharedState,
        game::{
            ASK_FAIRNESS_WINDOW, CustomQuestion, Game, GameMode, Judgment, MAX_CUSTOM_QUESTIONS,
            MAX_QUESTIONS_PER_PLAYER, ModeState, Notice, NoticeKind,
        },
    },
};

/// Strategy implementation for custom games.
pub struct CustomStrategy;

impl ModeStrategy for CustomStrategy {
    fn on_game_start(&self, _game: &mut Game) -> Result<(), GameError> {
        Ok(())
    }

    fn both_acted(&self, _game: &Game) -> bool {
        // Custom mode has no shared turn; each authored question settles
        // through its own judgment.
        false
    }

    fn score_current(&self, _game: &mut Game) -> Result<(), GameError> {
        Ok(())
    }

    fn auto_finish(&self, game: &Game) -> bool {
        let ModeState::Custom { questions } = &game.mode else {
            return false;
        };
        questions.len() == MAX_CUSTOM_QUESTIONS
            && questions.iter().all(|question| question.judgment.is_some())
    }
}

/// Author a new question for the other player.
///
/// Gated by the per-game and per-player caps, by the requirement that none of
/// the asker's previous questions are still outstanding, and by the fairness
/// window that keeps one player from racing ahead of the other.
pub async fn ask_question(
    state: &SharedState,
    game_id: Uuid,
    request: AskQuestionRequest,
) -> Result<GameView, GameError> {
    let AskQuestionRequest { player_id, text } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Custom)?;

            let text = text.trim().to_owned();
            if text.is_empty() {
                return Err(GameError::InvalidInput(
                    "question text must not be empty".into(),
                ));
            }
            if game.player(player_id).is_none() {
                return Err(GameError::NotFound(format!(
                    "player `{player_id}` is not in this game"
                )));
            }
            let responder = game
                .partner_id(player_id)
                .ok_or_else(|| GameError::InvalidState("no partner to ask".into()))?;

            let kind = game.mode_kind();
            let ModeState::Custom { questions } = &mut game.mode else {
                return Err(GameError::WrongGameMode { actual: kind });
            };
            if questions.len() >= MAX_CUSTOM_QUESTIONS {
                return Err(GameError::InvalidState(format!(
                    "the game already holds {MAX_CUSTOM_QUESTIONS} questions"
                )));
            }
            let mine = questions
                .iter()
                .filter(|question| question.asked_by == player_id)
                .count();
            if mine >= MAX_QUESTIONS_PER_PLAYER {
                return Err(GameError::InvalidState(format!(
                    "you already authored {MAX_QUESTIONS_PER_PLAYER} questions"
                )));
            }
            if questions
                .iter()
                .any(|question| question.asked_by == player_id && question.is_outstanding())
            {
                return Err(GameError::InvalidState(
                    "your previous question is still awaiting an answer or a judgment".into(),
                ));
            }
            let theirs = questions
                .iter()
                .filter(|question| question.asked_by == responder)
                .count();
            if mine.saturating_sub(theirs) >= ASK_FAIRNESS_WINDOW {
                return Err(GameError::InvalidState(
                    "wait for your partner to ask a question before authoring more".into(),
                ));
            }

            questions.push(CustomQuestion {
                id: Uuid::new_v4(),
                text,
                asked_by: player_id,
                must_answer: responder,
                free_text_answer: None,
                judgment: None,
                points_awarded: 0,
                asked_at: SystemTime::now(),
            });
            Ok(())
        })
        .await?;

    debug!(game_id = %game_id, player_id = %player_id, "authored custom question");
    Ok(game.into())
}

/// Answer an authored question as the bound responder.
pub async fn answer_question(
    state: &SharedState,
    game_id: Uuid,
    question_id: Uuid,
    request: AnswerQuestionRequest,
) -> Result<GameView, GameError> {
    let AnswerQuestionRequest { player_id, text } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Custom)?;

            let text = text.trim().to_owned();
            if text.is_empty() {
                return Err(GameError::InvalidInput(
                    "answer text must not be empty".into(),
                ));
            }

            let kind = game.mode_kind();
            let ModeState::Custom { questions } = &mut game.mode else {
                return Err(GameError::WrongGameMode { actual: kind });
            };
            let question = questions
                .iter_mut()
                .find(|question| question.id == question_id)
                .ok_or_else(|| GameError::NotFound(format!("question `{question_id}` not found")))?;
            if question.must_answer != player_id {
                return Err(GameError::NotAuthorized(
                    "only the bound responder may answer this question".into(),
                ));
            }
            if question.free_text_answer.is_some() {
                return Err(GameError::AlreadyAnswered);
            }
            question.free_text_answer = Some(text);
            let asker = question.asked_by;

            game.notice = Some(Notice {
                recipient: asker,
                kind: NoticeKind::QuestionAnswered { question_id },
            });
            Ok(())
        })
        .await?;

    debug!(game_id = %game_id, question_id = %question_id, "answered custom question");
    Ok(game.into())
}

/// Judge an answered question as its original asker.
///
/// The judgment is the custom-mode scoring pass: it credits the responder and
/// freezes the question. A fully judged, fully authored game finalizes here.
pub async fn judge_answer(
    state: &SharedState,
    game_id: Uuid,
    question_id: Uuid,
    request: JudgeAnswerRequest,
) -> Result<GameView, GameError> {
    let JudgeAnswerRequest {
        player_id,
        judgment,
    } = request;

    let game = state
        .mutate(game_id, move |game| {
            ensure_playing(game)?;
            ensure_mode(game, GameMode::Custom)?;

            let kind = game.mode_kind();
            let ModeState::Custom { questions } = &mut game.mode else {
                return Err(GameError::WrongGameMode { actual: kind });
            };
            let question = questions
                .iter_mut()
                .find(|question| question.id == question_id)
                .ok_or_else(|| GameError::NotFound(format!("question `{question_id}` not found")))?;
            if question.asked_by != player_id {
                return Err(GameError::NotAuthorized(
                    "only the asker may judge the answer".into(),
                ));
            }
            if question.free_text_answer.is_none() {
                return Err(GameError::InvalidState(
                    "the question has not been answered yet".into(),
                ));
            }
            if question.judgment.is_some() {
                return Err(GameError::AlreadyJudged);
            }

            let points = scoring::judgment_points(judgment);
            question.judgment = Some(judgment);
            question.points_awarded = points;
            let responder_id = question.must_answer;

            let responder = game.player_mut(responder_id).ok_or_else(|| {
                GameError::NotFound(format!("player `{responder_id}` is not in this game"))
            })?;
            responder.score += points;
            if judgment == Judgment::Correct {
                responder.correct_answers_count += 1;
            }

            game.notice = Some(Notice {
                recipient: responder_id,
                kind: NoticeKind::JudgmentReceived {
                    question_id,
                    judgment,
                },
            });

            coordinator::settle(game)?;
            Ok(())
        })
        .await?;

    debug!(
        game_id = %game_id,
        question_id = %question_id,
        ?judgment,
        "judged custom answer"
    );
    Ok(game.into())
}
