use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Duo Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::join_game,
        crate::routes::game::set_ready,
        crate::routes::game::start_game,
        crate::routes::game::leave_game,
        crate::routes::game::get_game,
        crate::routes::game::compatibility,
        crate::routes::play::submit_answer,
        crate::routes::play::submit_original_answer,
        crate::routes::play::submit_prediction,
        crate::routes::play::ask_question,
        crate::routes::play::answer_question,
        crate::routes::play::judge_answer,
        crate::routes::play::next_question,
        crate::routes::sse::game_stream,
    ),
    components(
        schemas(
            crate::dto::game::ProfileInput,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::ReadyRequest,
            crate::dto::game::StartGameRequest,
            crate::dto::game::LeaveGameRequest,
            crate::dto::game::SubmitAnswerRequest,
            crate::dto::game::OriginalAnswerRequest,
            crate::dto::game::PredictionGuessRequest,
            crate::dto::game::AskQuestionRequest,
            crate::dto::game::AnswerQuestionRequest,
            crate::dto::game::JudgeAnswerRequest,
            crate::dto::game::NextQuestionRequest,
            crate::dto::game::PredictionOutcome,
            crate::dto::game::GameView,
            crate::dto::game::PlayerView,
            crate::dto::game::AnswerView,
            crate::dto::game::CustomQuestionView,
            crate::dto::game::CompatibilityReport,
            crate::dto::game::CategoryCompatibility,
            crate::dto::health::HealthResponse,
            crate::state::game::GameMode,
            crate::state::game::Difficulty,
            crate::state::game::Judgment,
            crate::state::game::Question,
            crate::state::game::QuestionOption,
            crate::state::game::AnswerOutcome,
            crate::state::game::PredictionPairing,
            crate::state::game::Notice,
            crate::state::game::NoticeKind,
            crate::state::state_machine::GameStatus,
            crate::state::state_machine::RoundPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Room lifecycle operations"),
        (name = "play", description = "Gameplay operations"),
        (name = "sse", description = "Per-game document streams"),
    )
)]
pub struct ApiDoc;
