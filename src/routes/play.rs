use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::game::{
        AnswerQuestionRequest, AskQuestionRequest, GameView, JudgeAnswerRequest,
        NextQuestionRequest, OriginalAnswerRequest, PredictionGuessRequest, PredictionOutcome,
        SubmitAnswerRequest,
    },
    error::AppError,
    services::{
        modes::{competitive, custom, prediction},
        turn,
    },
    state::SharedState,
};

/// Routes handling gameplay submissions and turn advancement.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}/answers", post(submit_answer))
        .route("/games/{id}/prediction/answers", post(submit_original_answer))
        .route("/games/{id}/prediction/guesses", post(submit_prediction))
        .route("/games/{id}/custom/questions", post(ask_question))
        .route(
            "/games/{id}/custom/questions/{question_id}/answer",
            post(answer_question),
        )
        .route(
            "/games/{id}/custom/questions/{question_id}/judgment",
            post(judge_answer),
        )
        .route("/games/{id}/next", post(next_question))
}

/// Submit a competitive answer for the current question.
#[utoipa::path(
    post,
    path = "/games/{id}/answers",
    tag = "play",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = GameView),
        (status = 409, description = "Duplicate submission or question not in play")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = competitive::submit_answer(&state, id, payload).await?;
    Ok(Json(view))
}

/// Submit the answering player's own choice in prediction mode.
#[utoipa::path(
    post,
    path = "/games/{id}/prediction/answers",
    tag = "play",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = OriginalAnswerRequest,
    responses(
        (status = 200, description = "Original answer recorded", body = GameView),
        (status = 401, description = "Player does not hold the answering role"),
        (status = 409, description = "Choice already set")
    )
)]
pub async fn submit_original_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OriginalAnswerRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = prediction::submit_original_answer(&state, id, payload).await?;
    Ok(Json(view))
}

/// Submit a prediction of the partner's choice.
#[utoipa::path(
    post,
    path = "/games/{id}/prediction/guesses",
    tag = "play",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = PredictionGuessRequest,
    responses(
        (status = 200, description = "Prediction scored", body = PredictionOutcome),
        (status = 401, description = "Player does not hold the guessing role"),
        (status = 409, description = "Partner has not answered yet")
    )
)]
pub async fn submit_prediction(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PredictionGuessRequest>,
) -> Result<Json<PredictionOutcome>, AppError> {
    payload.validate()?;
    let outcome = prediction::submit_prediction(&state, id, payload).await?;
    Ok(Json(outcome))
}

/// Author a custom question for the other player.
#[utoipa::path(
    post,
    path = "/games/{id}/custom/questions",
    tag = "play",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = AskQuestionRequest,
    responses(
        (status = 200, description = "Question authored", body = GameView),
        (status = 409, description = "Caps or turn gating forbid asking now")
    )
)]
pub async fn ask_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskQuestionRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = custom::ask_question(&state, id, payload).await?;
    Ok(Json(view))
}

/// Answer an authored question as the bound responder.
#[utoipa::path(
    post,
    path = "/games/{id}/custom/questions/{question_id}/answer",
    tag = "play",
    params(
        ("id" = Uuid, Path, description = "Identifier of the game"),
        ("question_id" = Uuid, Path, description = "Identifier of the authored question")
    ),
    request_body = AnswerQuestionRequest,
    responses(
        (status = 200, description = "Answer recorded", body = GameView),
        (status = 401, description = "Player is not the bound responder"),
        (status = 409, description = "Question already answered")
    )
)]
pub async fn answer_question(
    State(state): State<SharedState>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AnswerQuestionRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = custom::answer_question(&state, id, question_id, payload).await?;
    Ok(Json(view))
}

/// Judge an answered question as its original asker.
#[utoipa::path(
    post,
    path = "/games/{id}/custom/questions/{question_id}/judgment",
    tag = "play",
    params(
        ("id" = Uuid, Path, description = "Identifier of the game"),
        ("question_id" = Uuid, Path, description = "Identifier of the authored question")
    ),
    request_body = JudgeAnswerRequest,
    responses(
        (status = 200, description = "Judgment recorded", body = GameView),
        (status = 401, description = "Player is not the asker"),
        (status = 409, description = "No answer yet or already judged")
    )
)]
pub async fn judge_answer(
    State(state): State<SharedState>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<JudgeAnswerRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = custom::judge_answer(&state, id, question_id, payload).await?;
    Ok(Json(view))
}

/// Advance to the next question, or finalize on the last one.
#[utoipa::path(
    post,
    path = "/games/{id}/next",
    tag = "play",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = NextQuestionRequest,
    responses(
        (status = 200, description = "Turn advanced or game finished", body = GameView),
        (status = 409, description = "Index is stale or the round is not scored")
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NextQuestionRequest>,
) -> Result<Json<GameView>, AppError> {
    payload.validate()?;
    let view = turn::next_question(&state, id, payload).await?;
    Ok(Json(view))
}
