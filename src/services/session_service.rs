//! Room lifecycle: create, join, ready, start, leave.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::game::{
        CreateGameRequest, GameView, JoinGameRequest, LeaveGameRequest, ProfileInput,
        ReadyRequest, StartGameRequest,
    },
    error::GameError,
    services::{modes::strategy_for, room_code, turn},
    state::{
        SharedState,
        game::{Game, GameMode, MAX_PLAYERS, Player, TOTAL_QUESTIONS},
        state_machine::{GameStatus, RoundPhase, StatusEvent},
    },
};

/// Create a fresh waiting room with the requester as host.
///
/// Competitive and prediction games get ten questions sampled from the
/// configured bank; custom games author their own material live.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameView, GameError> {
    let CreateGameRequest { mode, host } = request;

    let room_code = room_code::allocate(state.store()).await?;
    let questions = match mode {
        GameMode::Custom => Vec::new(),
        GameMode::Competitive | GameMode::Prediction => {
            state.config().sample_questions(TOTAL_QUESTIONS)
        }
    };

    let game = Game::new(room_code, build_player(host)?, mode, questions);
    state.store().create(game.clone()).await?;

    info!(game_id = %game.id, code = %game.room_code, ?mode, "created game");
    Ok(game.into())
}

/// Join a waiting room by its shareable code.
pub async fn join_game(
    state: &SharedState,
    request: JoinGameRequest,
) -> Result<GameView, GameError> {
    let JoinGameRequest { code, player } = request;
    let code = code.trim().to_ascii_uppercase();

    let not_found = || GameError::NotFound(format!("no joinable game with code `{code}`"));
    let Some(game) = state.store().find_active_by_code(&code).await? else {
        return Err(not_found());
    };
    if game.status != GameStatus::Waiting {
        return Err(not_found());
    }

    let joining = build_player(player)?;
    let game = state
        .mutate(game.id, move |game| {
            if game.status != GameStatus::Waiting {
                return Err(GameError::NotFound("game is no longer joinable".into()));
            }
            if game.is_full() {
                return Err(GameError::GameFull);
            }
            if game.players.iter().any(|player| player.id == joining.id) {
                return Err(GameError::AlreadyJoined);
            }
            game.players.push(joining);
            Ok(())
        })
        .await?;

    info!(game_id = %game.id, code = %game.room_code, "player joined");
    Ok(game.into())
}

/// Flip a player's ready flag while the room is waiting.
pub async fn set_ready(
    state: &SharedState,
    game_id: Uuid,
    request: ReadyRequest,
) -> Result<GameView, GameError> {
    let ReadyRequest { player_id, ready } = request;

    let game = state
        .mutate(game_id, move |game| {
            if game.status != GameStatus::Waiting {
                return Err(GameError::InvalidState(
                    "ready flags only apply while waiting".into(),
                ));
            }
            let player = game.player_mut(player_id).ok_or_else(|| {
                GameError::NotFound(format!("player `{player_id}` is not in this game"))
            })?;
            player.is_ready = ready;
            Ok(())
        })
        .await?;

    Ok(game.into())
}

/// Start the session. Host-only, both players present and ready.
pub async fn start_game(
    state: &SharedState,
    game_id: Uuid,
    request: StartGameRequest,
) -> Result<GameView, GameError> {
    let StartGameRequest { player_id } = request;

    let game = state
        .mutate(game_id, move |game| {
            if game.host_id != player_id {
                return Err(GameError::NotHost);
            }
            if game.players.len() != MAX_PLAYERS {
                return Err(GameError::InsufficientPlayers);
            }
            if !game.players.iter().all(|player| player.is_ready) {
                return Err(GameError::NotAllReady);
            }

            game.status = game.status.advance(StatusEvent::Start)?;
            game.started_at = Some(std::time::SystemTime::now());
            game.current_question_index = 0;
            game.rounds = vec![RoundPhase::Unanswered; game.questions.len()];
            strategy_for(game.mode_kind()).on_game_start(game)?;
            Ok(())
        })
        .await?;

    info!(game_id = %game.id, code = %game.room_code, "game started");
    Ok(game.into())
}

/// Remove a player from the game.
///
/// The host role moves to the remaining player when the host leaves; a
/// playing game finalizes with the remaining player winning by walkover; an
/// emptied game is deleted, which frees its room code.
pub async fn leave_game(
    state: &SharedState,
    game_id: Uuid,
    request: LeaveGameRequest,
) -> Result<(), GameError> {
    let LeaveGameRequest { player_id } = request;

    let game = state
        .mutate(game_id, move |game| {
            let before = game.players.len();
            game.players.retain(|player| player.id != player_id);
            if game.players.len() == before {
                return Err(GameError::NotFound(format!(
                    "player `{player_id}` is not in this game"
                )));
            }

            if let Some(remaining) = game.players.first() {
                if game.host_id == player_id {
                    game.host_id = remaining.id;
                }
                if game.status == GameStatus::Playing {
                    turn::finish(game)?;
                }
            }
            Ok(())
        })
        .await?;

    if game.players.is_empty() {
        state.store().delete(game_id).await?;
        info!(game_id = %game_id, code = %game.room_code, "deleted empty game");
    } else {
        info!(game_id = %game_id, "player left");
    }
    Ok(())
}

/// Fetch the current document view of a game.
pub async fn get_game(state: &SharedState, game_id: Uuid) -> Result<GameView, GameError> {
    Ok(state.find_game(game_id).await?.into())
}

fn build_player(profile: ProfileInput) -> Result<Player, GameError> {
    let name = profile.name.trim().to_owned();
    if name.is_empty() {
        return Err(GameError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }
    Ok(Player::new(profile.id, name, profile.avatar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{profile, started_game, test_state};
    use crate::state::game::ModeState;

    async fn waiting_game(state: &SharedState, mode: GameMode) -> (Uuid, String, Uuid) {
        let host = profile("ana");
        let view = create_game(
            state,
            CreateGameRequest {
                mode,
                host: host.clone(),
            },
        )
        .await
        .unwrap();
        (view.id, view.room_code, host.id)
    }

    #[tokio::test]
    async fn create_builds_a_waiting_room_with_questions() {
        let state = test_state();
        let (game_id, code, host_id) = waiting_game(&state, GameMode::Competitive).await;

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.host_id, host_id);
        assert_eq!(game.players.len(), 1);
        assert_eq!(game.questions.len(), TOTAL_QUESTIONS);
        assert!(room_code::is_valid_code(&code));
    }

    #[tokio::test]
    async fn custom_games_start_without_a_question_bank() {
        let state = test_state();
        let (game_id, _, _) = waiting_game(&state, GameMode::Custom).await;

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.questions.is_empty());
        assert!(matches!(game.mode, ModeState::Custom { .. }));
    }

    #[tokio::test]
    async fn join_rejects_unknown_codes() {
        let state = test_state();
        let err = join_game(
            &state,
            JoinGameRequest {
                code: "ABCDEF".into(),
                player: profile("bo"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn join_rejects_full_rooms_and_rejoins() {
        let state = test_state();
        let (_, code, host_id) = waiting_game(&state, GameMode::Competitive).await;

        // The host rejoining their own room is a duplicate.
        let err = join_game(
            &state,
            JoinGameRequest {
                code: code.clone(),
                player: ProfileInput {
                    id: host_id,
                    name: "ana again".into(),
                    avatar: None,
                },
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::AlreadyJoined));

        join_game(
            &state,
            JoinGameRequest {
                code: code.clone(),
                player: profile("bo"),
            },
        )
        .await
        .unwrap();

        let err = join_game(
            &state,
            JoinGameRequest {
                code,
                player: profile("chris"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::GameFull));
    }

    #[tokio::test]
    async fn start_requires_host_two_players_and_readiness() {
        let state = test_state();
        let (game_id, code, host_id) = waiting_game(&state, GameMode::Competitive).await;

        let err = start_game(
            &state,
            game_id,
            StartGameRequest {
                player_id: host_id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::InsufficientPlayers));

        let guest = profile("bo");
        join_game(
            &state,
            JoinGameRequest {
                code,
                player: guest.clone(),
            },
        )
        .await
        .unwrap();

        let err = start_game(
            &state,
            game_id,
            StartGameRequest {
                player_id: guest.id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::NotHost));

        let err = start_game(
            &state,
            game_id,
            StartGameRequest {
                player_id: host_id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::NotAllReady));

        for id in [host_id, guest.id] {
            set_ready(
                &state,
                game_id,
                ReadyRequest {
                    player_id: id,
                    ready: true,
                },
            )
            .await
            .unwrap();
        }
        let view = start_game(
            &state,
            game_id,
            StartGameRequest {
                player_id: host_id,
            },
        )
        .await
        .unwrap();
        assert_eq!(view.status, GameStatus::Playing);
        assert_eq!(view.current_question_index, 0);

        let game = state.find_game(game_id).await.unwrap();
        assert!(game.started_at.is_some());
        assert_eq!(game.rounds.len(), game.questions.len());
        assert!(game.rounds.iter().all(|phase| !phase.is_scored()));
    }

    #[tokio::test]
    async fn leaving_reassigns_the_host() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        leave_game(
            &state,
            game_id,
            LeaveGameRequest {
                player_id: host_id,
            },
        )
        .await
        .unwrap();

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.host_id, guest_id);
        assert_eq!(game.players.len(), 1);
    }

    #[tokio::test]
    async fn leaving_mid_game_hands_the_win_to_the_remaining_player() {
        let state = test_state();
        let (game_id, host_id, guest_id) = started_game(&state, GameMode::Competitive).await;

        leave_game(
            &state,
            game_id,
            LeaveGameRequest {
                player_id: guest_id,
            },
        )
        .await
        .unwrap();

        let game = state.find_game(game_id).await.unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.winner_id, Some(host_id));
    }

    #[tokio::test]
    async fn last_player_leaving_deletes_the_game_and_frees_the_code() {
        let state = test_state();
        let (game_id, code, host_id) = waiting_game(&state, GameMode::Competitive).await;

        leave_game(
            &state,
            game_id,
            LeaveGameRequest {
                player_id: host_id,
            },
        )
        .await
        .unwrap();

        assert!(state.find_game(game_id).await.is_err());
        assert!(
            state
                .store()
                .find_active_by_code(&code)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn ready_flags_are_waiting_room_only() {
        let state = test_state();
        let (game_id, host_id, _) = started_game(&state, GameMode::Competitive).await;

        let err = set_ready(
            &state,
            game_id,
            ReadyRequest {
                player_id: host_id,
                ready: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }
}
