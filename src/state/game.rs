use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::state_machine::{GameStatus, RoundPhase};

/// Hard cap on participants; the whole product is built around pairs.
pub const MAX_PLAYERS: usize = 2;
/// Number of questions drawn from the bank for competitive and prediction games.
pub const TOTAL_QUESTIONS: usize = 10;
/// Advisory answer window in seconds. The engine never enforces expiry;
/// clients drive the countdown and may force a forfeit submission.
pub const TIME_PER_QUESTION_SECS: u32 = 15;
/// Cap on authored questions per custom-mode game.
pub const MAX_CUSTOM_QUESTIONS: usize = 20;
/// Cap on questions a single player may author in a custom-mode game.
pub const MAX_QUESTIONS_PER_PLAYER: usize = 10;
/// A player may author at most this many questions more than their partner.
pub const ASK_FAIRNESS_WINDOW: usize = 2;

/// Discriminant of the three gameplay protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Both players answer the same question; agreement scores.
    Competitive,
    /// One player answers, the other predicts their choice.
    Prediction,
    /// Players author free-text questions for each other live.
    Custom,
}

/// Difficulty tier of a bank question, driving base points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Base 10 points.
    Easy,
    /// Base 15 points.
    Medium,
    /// Base 20 points.
    Hard,
}

/// The asker's verdict on a free-text answer in custom mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    /// Full credit (10 points).
    Correct,
    /// Partial credit (5 points).
    Almost,
    /// No credit.
    Incorrect,
}

/// One selectable option of a bank question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    /// Identifier unique within the question.
    pub id: u32,
    /// Display text.
    pub text: String,
}

/// A server-assigned question. Fixed at game creation, never client-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    /// Identifier unique within the configured bank.
    pub id: u32,
    /// Question text shown to both players.
    pub text: String,
    /// Category used by the compatibility breakdown.
    pub category: String,
    /// Difficulty tier driving base points.
    pub difficulty: Difficulty,
    /// Option set, fixed at creation.
    pub options: Vec<QuestionOption>,
}

/// Scoring state of a recorded answer.
///
/// Answers are created `Pending` and back-filled to `Scored` exactly once by
/// the coordinator; a scored answer is never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Recorded but not yet scored.
    Pending,
    /// Scoring pass ran.
    Scored {
        /// Whether the answer matched (agreement, or a correct prediction).
        matched: bool,
        /// Points credited to the owning player for this answer.
        points: u32,
    },
}

/// A single recorded answer. Created once; only `outcome` is back-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Bank id of the question this answers.
    pub question_id: u32,
    /// Position of the question in the game's question list.
    pub question_index: usize,
    /// Chosen option id.
    pub choice: u32,
    /// Seconds the player spent, `None` for untimed submissions
    /// (prediction originals).
    pub time_spent_secs: Option<f32>,
    /// Scoring state, back-filled from `Pending` exactly once.
    pub outcome: AnswerOutcome,
    /// Wall-clock submission time.
    pub submitted_at: SystemTime,
}

/// Per-question role assignment for prediction mode.
///
/// Built once at game start; `answering_choice` is set exactly once by the
/// answering player and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionPairing {
    /// Index of the question this pairing covers.
    pub question_index: usize,
    /// Player who answers for themselves.
    pub answering_player_id: Uuid,
    /// Player who predicts the answering player's choice.
    pub guessing_player_id: Uuid,
    /// The answering player's actual choice, `None` until submitted.
    pub answering_choice: Option<u32>,
}

/// A live-authored question in custom mode.
///
/// Three-phase lifecycle: asked → answered → judged, strictly sequential,
/// each step performed by the specific bound player. Immutable once judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuestion {
    /// Identifier of this authored question.
    pub id: Uuid,
    /// Question text written by the asker.
    pub text: String,
    /// Player who authored the question and later judges the answer.
    pub asked_by: Uuid,
    /// The other player, bound as the mandatory responder.
    pub must_answer: Uuid,
    /// Free-text answer, `None` until the responder submits.
    pub free_text_answer: Option<String>,
    /// The asker's verdict, `None` until judged.
    pub judgment: Option<Judgment>,
    /// Points credited to the responder by the judgment.
    pub points_awarded: u32,
    /// Wall-clock time the question was asked.
    pub asked_at: SystemTime,
}

impl CustomQuestion {
    /// Whether this question still awaits an answer or a judgment.
    pub fn is_outstanding(&self) -> bool {
        self.free_text_answer.is_none() || self.judgment.is_none()
    }
}

/// Mode-specific slice of the game document, tagged by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeState {
    /// Competitive carries no extra state beyond the shared rounds.
    Competitive,
    /// Prediction carries the per-question role pairings.
    Prediction {
        /// One pairing per question, built at game start.
        pairings: Vec<PredictionPairing>,
    },
    /// Custom carries the live-authored question list.
    Custom {
        /// Authored questions, capped at [`MAX_CUSTOM_QUESTIONS`].
        questions: Vec<CustomQuestion>,
    },
}

impl ModeState {
    /// Fresh mode state for a newly created game.
    pub fn new(mode: GameMode) -> Self {
        match mode {
            GameMode::Competitive => ModeState::Competitive,
            GameMode::Prediction => ModeState::Prediction {
                pairings: Vec::new(),
            },
            GameMode::Custom => ModeState::Custom {
                questions: Vec::new(),
            },
        }
    }

    /// The mode discriminant of this state.
    pub fn kind(&self) -> GameMode {
        match self {
            ModeState::Competitive => GameMode::Competitive,
            ModeState::Prediction { .. } => GameMode::Prediction,
            ModeState::Custom { .. } => GameMode::Custom,
        }
    }
}

/// Kind of an ephemeral notification attached to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    /// The partner submitted on the current question.
    PartnerAnswered {
        /// Question the partner acted on.
        question_index: usize,
    },
    /// A custom question authored by the recipient received an answer.
    QuestionAnswered {
        /// The authored question that was answered.
        question_id: Uuid,
    },
    /// The recipient's free-text answer was judged.
    JudgmentReceived {
        /// The authored question that was judged.
        question_id: Uuid,
        /// The verdict.
        judgment: Judgment,
    },
}

/// Fire-and-forget notification event attached to the game document.
///
/// Replaced on each emission and cleared at the start of every mutation;
/// rendering and delivery are the subscribing client's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    /// Player the notice is addressed to.
    pub recipient: Uuid,
    /// What happened.
    pub kind: NoticeKind,
}

/// A participant in a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Client-supplied stable profile id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Opaque avatar reference, if the profile carries one.
    pub avatar: Option<String>,
    /// Ready flag, meaningful only while the game is waiting.
    pub is_ready: bool,
    /// Total score; monotonically non-decreasing once playing.
    pub score: u32,
    /// Recorded answers ordered by question index. Never skips an index,
    /// never holds two entries for the same index.
    pub answers: Vec<Answer>,
    /// Whether this player already acted on the current question.
    pub has_answered_current: bool,
    /// Number of matched/correct answers across the session.
    pub correct_answers_count: u32,
    /// Mean time over timed answers, in seconds.
    pub average_time_secs: f32,
}

impl Player {
    /// Build a fresh participant from profile data.
    pub fn new(id: Uuid, name: String, avatar: Option<String>) -> Self {
        Self {
            id,
            name,
            avatar,
            is_ready: false,
            score: 0,
            answers: Vec::new(),
            has_answered_current: false,
            correct_answers_count: 0,
            average_time_secs: 0.0,
        }
    }

    /// Append an answer, enforcing the no-skip/no-duplicate ordering
    /// invariant and refreshing the running average time.
    pub fn push_answer(&mut self, answer: Answer) -> Result<(), String> {
        if answer.question_index != self.answers.len() {
            return Err(format!(
                "answer for question {} would break ordering (expected {})",
                answer.question_index,
                self.answers.len()
            ));
        }
        self.answers.push(answer);
        self.refresh_average_time();
        Ok(())
    }

    /// The answer recorded at a question index, if any.
    pub fn answer_at(&self, question_index: usize) -> Option<&Answer> {
        self.answers.get(question_index)
    }

    /// Mutable access to the answer recorded at a question index.
    pub fn answer_at_mut(&mut self, question_index: usize) -> Option<&mut Answer> {
        self.answers.get_mut(question_index)
    }

    fn refresh_average_time(&mut self) {
        let timed: Vec<f32> = self
            .answers
            .iter()
            .filter_map(|answer| answer.time_spent_secs)
            .collect();
        self.average_time_secs = if timed.is_empty() {
            0.0
        } else {
            timed.iter().sum::<f32>() / timed.len() as f32
        };
    }
}

/// The root aggregate: one shared document per session, the single source of
/// truth both clients mirror. No component keeps a private mutable copy that
/// outlives one store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Primary key of the game document.
    pub id: Uuid,
    /// Human-shareable 6-character room code, unique among active games.
    pub room_code: String,
    /// Player allowed to start the game; reassigned if the host leaves.
    pub host_id: Uuid,
    /// Lifecycle status, forward-only.
    pub status: GameStatus,
    /// Participants in join order, at most [`MAX_PLAYERS`].
    pub players: Vec<Player>,
    /// Server-assigned question list; empty in custom mode.
    pub questions: Vec<Question>,
    /// Index of the question currently in play. Only ever increases.
    pub current_question_index: usize,
    /// Advisory per-question answer window in seconds (unused in custom).
    pub time_per_question_secs: u32,
    /// Tagged per-question phases; empty in custom mode.
    pub rounds: Vec<RoundPhase>,
    /// Mode-specific state.
    pub mode: ModeState,
    /// Winner once finished; `None` on a tie or before finishing.
    pub winner_id: Option<Uuid>,
    /// Ephemeral notification for the subscribing clients.
    pub notice: Option<Notice>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Set when the host starts the game.
    pub started_at: Option<SystemTime>,
    /// Set when the game finishes.
    pub completed_at: Option<SystemTime>,
    /// Bumped by the store on every committed write.
    pub updated_at: SystemTime,
}

impl Game {
    /// Build a fresh waiting-room document with the host as sole player.
    pub fn new(room_code: String, host: Player, mode: GameMode, questions: Vec<Question>) -> Self {
        let timestamp = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            room_code,
            host_id: host.id,
            status: GameStatus::Waiting,
            players: vec![host],
            questions,
            current_question_index: 0,
            time_per_question_secs: TIME_PER_QUESTION_SECS,
            rounds: Vec::new(),
            mode: ModeState::new(mode),
            winner_id: None,
            notice: None,
            created_at: timestamp,
            started_at: None,
            completed_at: None,
            updated_at: timestamp,
        }
    }

    /// The mode discriminant of this game.
    pub fn mode_kind(&self) -> GameMode {
        self.mode.kind()
    }

    /// Whether the room already holds the maximum number of players.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Look up a participant by id.
    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Mutable lookup of a participant by id.
    pub fn player_mut(&mut self, player_id: Uuid) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id == player_id)
    }

    /// The id of the other participant, if both players are present.
    pub fn partner_id(&self, player_id: Uuid) -> Option<Uuid> {
        self.players
            .iter()
            .map(|player| player.id)
            .find(|id| *id != player_id)
    }

    /// The question currently in play, if the mode has a fixed list.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }
}
