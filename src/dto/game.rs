use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_room_code},
    state::{
        game::{
            Answer, AnswerOutcome, CustomQuestion, Game, GameMode, Judgment, ModeState, Notice,
            Player, PredictionPairing, Question,
        },
        state_machine::{GameStatus, RoundPhase},
    },
};

/// Profile data a client supplies for its player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ProfileInput {
    /// Stable client-side profile id.
    pub id: Uuid,
    /// Display name.
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    /// Opaque avatar reference.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub avatar: Option<String>,
}

/// Payload used to open a brand-new room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Gameplay protocol for the session.
    pub mode: GameMode,
    /// The creating player, installed as host.
    #[validate(nested)]
    pub host: ProfileInput,
}

/// Payload used to join a waiting room by code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// Shareable room code.
    #[validate(custom(function = validate_room_code))]
    pub code: String,
    /// The joining player.
    #[validate(nested)]
    pub player: ProfileInput,
}

/// Payload used to flip a ready flag in the waiting room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReadyRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Desired ready state.
    pub ready: bool,
}

/// Payload used by the host to start the session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartGameRequest {
    /// Acting player; must be the host.
    pub player_id: Uuid,
}

/// Payload used to leave a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LeaveGameRequest {
    /// Departing player.
    pub player_id: Uuid,
}

/// Competitive answer submission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Acting player.
    pub player_id: Uuid,
    /// Index of the question being answered; must be the current one.
    pub question_index: usize,
    /// Chosen option id.
    pub option_id: u32,
    /// Seconds spent answering, as measured by the client timer.
    #[validate(range(min = 0.0, max = 600.0))]
    pub time_spent_secs: f32,
}

/// Prediction-mode original answer (the answering player's own choice).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct OriginalAnswerRequest {
    /// Acting player; must hold the answering role for the question.
    pub player_id: Uuid,
    /// Index of the question being answered; must be the current one.
    pub question_index: usize,
    /// Chosen option id.
    pub option_id: u32,
}

/// Prediction-mode guess submission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PredictionGuessRequest {
    /// Acting player; must hold the guessing role for the question.
    pub player_id: Uuid,
    /// Index of the question being predicted; must be the current one.
    pub question_index: usize,
    /// Predicted option id.
    pub option_id: u32,
    /// Seconds spent predicting.
    #[validate(range(min = 0.0, max = 600.0))]
    pub time_spent_secs: f32,
}

/// Custom-mode question authoring payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AskQuestionRequest {
    /// Authoring player.
    pub player_id: Uuid,
    /// Question text for the other player.
    #[validate(length(min = 1, max = 240))]
    pub text: String,
}

/// Custom-mode free-text answer payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerQuestionRequest {
    /// Responding player; must be the bound responder.
    pub player_id: Uuid,
    /// Free-text answer.
    #[validate(length(min = 1, max = 240))]
    pub text: String,
}

/// Custom-mode judgment payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JudgeAnswerRequest {
    /// Judging player; must be the original asker.
    pub player_id: Uuid,
    /// The verdict.
    pub judgment: Judgment,
}

/// Turn-advance payload carrying the caller's view of the index.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NextQuestionRequest {
    /// Index the caller believes is current; a stale value is rejected.
    pub expected_index: usize,
}

/// Immediate feedback returned to the guessing player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionOutcome {
    /// Whether the guess matched the partner's actual choice.
    pub correct: bool,
    /// Points awarded to the guesser.
    pub points: u32,
    /// The partner's actual choice, for the reveal.
    pub actual_choice: u32,
}

/// Projection of a recorded answer exposed to REST/SSE clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerView {
    /// Bank id of the answered question.
    pub question_id: u32,
    /// Position of the question in the game's list.
    pub question_index: usize,
    /// Chosen option id.
    pub choice: u32,
    /// Seconds spent, when the submission was timed.
    pub time_spent_secs: Option<f32>,
    /// Scoring state.
    pub outcome: AnswerOutcome,
    /// Submission time (RFC3339).
    pub submitted_at: String,
}

/// Projection of a participant exposed to REST/SSE clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerView {
    /// Stable profile id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Opaque avatar reference.
    pub avatar: Option<String>,
    /// Ready flag (waiting room only).
    pub is_ready: bool,
    /// Total score.
    pub score: u32,
    /// Recorded answers ordered by question index.
    pub answers: Vec<AnswerView>,
    /// Whether the player already acted on the current question.
    pub has_answered_current: bool,
    /// Matched/correct answers across the session.
    pub correct_answers_count: u32,
    /// Mean time over timed answers, in seconds.
    pub average_time_secs: f32,
}

/// Projection of a custom-mode authored question.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomQuestionView {
    /// Identifier of the authored question.
    pub id: Uuid,
    /// Question text.
    pub text: String,
    /// Authoring player.
    pub asked_by: Uuid,
    /// Bound responder.
    pub must_answer: Uuid,
    /// Free-text answer, once submitted.
    pub free_text_answer: Option<String>,
    /// The asker's verdict, once judged.
    pub judgment: Option<Judgment>,
    /// Points credited to the responder.
    pub points_awarded: u32,
    /// Authoring time (RFC3339).
    pub asked_at: String,
}

/// Full document view pushed to clients over REST and SSE.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameView {
    /// Primary key of the game.
    pub id: Uuid,
    /// Shareable room code.
    pub room_code: String,
    /// Current host.
    pub host_id: Uuid,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Gameplay protocol.
    pub mode: GameMode,
    /// Participants in join order.
    pub players: Vec<PlayerView>,
    /// Server-assigned question list; empty in custom mode.
    pub questions: Vec<Question>,
    /// Number of questions the session plays.
    pub total_questions: usize,
    /// Index of the question currently in play.
    pub current_question_index: usize,
    /// Advisory per-question answer window in seconds.
    pub time_per_question_secs: u32,
    /// Tagged per-question phases; empty in custom mode.
    pub rounds: Vec<RoundPhase>,
    /// Prediction pairings, present in prediction mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairings: Option<Vec<PredictionPairing>>,
    /// Authored questions, present in custom mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_questions: Option<Vec<CustomQuestionView>>,
    /// Winner once finished; absent on ties.
    pub winner_id: Option<Uuid>,
    /// Ephemeral notification for the subscribing clients.
    pub notice: Option<Notice>,
    /// Creation time (RFC3339).
    pub created_at: String,
    /// Start time (RFC3339), once started.
    pub started_at: Option<String>,
    /// Completion time (RFC3339), once finished.
    pub completed_at: Option<String>,
    /// Last committed write (RFC3339).
    pub updated_at: String,
}

/// Per-category slice of the compatibility breakdown.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCompatibility {
    /// Question category.
    pub category: String,
    /// Questions in this category where both chose the same option.
    pub matched: usize,
    /// Questions in this category both players answered.
    pub compared: usize,
    /// `100 * matched / compared`.
    pub percent: f32,
}

/// Compatibility statistics over the two players' answer sets.
#[derive(Debug, Serialize, ToSchema)]
pub struct CompatibilityReport {
    /// Overall match percentage over the common answer prefix.
    pub overall_percent: f32,
    /// Questions where both players chose the same option.
    pub matched: usize,
    /// Questions both players answered.
    pub compared: usize,
    /// Breakdown by category, in question-encounter order.
    pub per_category: Vec<CategoryCompatibility>,
    /// Highest-matching category (first encountered wins ties).
    pub best_category: Option<String>,
    /// Lowest-matching category (first encountered wins ties).
    pub worst_category: Option<String>,
}

impl CompatibilityReport {
    /// Report for a game without comparable answers.
    pub fn empty() -> Self {
        Self {
            overall_percent: 0.0,
            matched: 0,
            compared: 0,
            per_category: Vec::new(),
            best_category: None,
            worst_category: None,
        }
    }
}

impl From<Answer> for AnswerView {
    fn from(answer: Answer) -> Self {
        Self {
            question_id: answer.question_id,
            question_index: answer.question_index,
            choice: answer.choice,
            time_spent_secs: answer.time_spent_secs,
            outcome: answer.outcome,
            submitted_at: format_system_time(answer.submitted_at),
        }
    }
}

impl From<Player> for PlayerView {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            avatar: player.avatar,
            is_ready: player.is_ready,
            score: player.score,
            answers: player.answers.into_iter().map(Into::into).collect(),
            has_answered_current: player.has_answered_current,
            correct_answers_count: player.correct_answers_count,
            average_time_secs: player.average_time_secs,
        }
    }
}

impl From<CustomQuestion> for CustomQuestionView {
    fn from(question: CustomQuestion) -> Self {
        Self {
            id: question.id,
            text: question.text,
            asked_by: question.asked_by,
            must_answer: question.must_answer,
            free_text_answer: question.free_text_answer,
            judgment: question.judgment,
            points_awarded: question.points_awarded,
            asked_at: format_system_time(question.asked_at),
        }
    }
}

impl From<Game> for GameView {
    fn from(game: Game) -> Self {
        let mode = game.mode_kind();
        let (pairings, custom_questions) = match game.mode {
            ModeState::Competitive => (None, None),
            ModeState::Prediction { pairings } => (Some(pairings), None),
            ModeState::Custom { questions } => (
                None,
                Some(questions.into_iter().map(Into::into).collect()),
            ),
        };

        Self {
            id: game.id,
            room_code: game.room_code,
            host_id: game.host_id,
            status: game.status,
            mode,
            players: game.players.into_iter().map(Into::into).collect(),
            total_questions: game.questions.len(),
            questions: game.questions,
            current_question_index: game.current_question_index,
            time_per_question_secs: game.time_per_question_secs,
            rounds: game.rounds,
            pairings,
            custom_questions,
            winner_id: game.winner_id,
            notice: game.notice,
            created_at: format_system_time(game.created_at),
            started_at: game.started_at.map(format_system_time),
            completed_at: game.completed_at.map(format_system_time),
            updated_at: format_system_time(game.updated_at),
        }
    }
}
