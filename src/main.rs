//! Duo Quiz Back binary entrypoint wiring REST and SSE layers over the
//! in-memory game store.

use std::{
    env,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, SystemTime},
};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duo_quiz_back::{
    config::AppConfig,
    dao::game_store::{GameStore, memory::MemoryGameStore},
    routes,
    state::{AppState, SharedState, state_machine::GameStatus},
};

/// How often the sweeper scans for stale games.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Finished games are kept this long so clients can fetch final scores.
const FINISHED_TTL: Duration = Duration::from_secs(60 * 60);
/// Waiting rooms nobody touched for this long are reclaimed.
const ABANDONED_WAITING_TTL: Duration = Duration::from_secs(60 * 60);
/// Playing games with no writes for this long are considered abandoned.
const ABANDONED_PLAYING_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store: Arc<dyn GameStore> = Arc::new(MemoryGameStore::new());
    let app_state = AppState::new(store, config);

    tokio::spawn(run_store_sweeper(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Periodically delete finished and abandoned games so the store does not
/// grow without bound and their room codes return to the pool.
async fn run_store_sweeper(state: SharedState) {
    loop {
        sleep(SWEEP_INTERVAL).await;

        let games = match state.store().list_games().await {
            Ok(games) => games,
            Err(err) => {
                warn!(error = %err, "sweep listing failed");
                continue;
            }
        };

        let now = SystemTime::now();
        for game in games {
            let stale = match game.status {
                GameStatus::Finished => older_than(
                    game.completed_at.unwrap_or(game.updated_at),
                    FINISHED_TTL,
                    now,
                ),
                GameStatus::Waiting => older_than(game.updated_at, ABANDONED_WAITING_TTL, now),
                GameStatus::Playing => older_than(game.updated_at, ABANDONED_PLAYING_TTL, now),
            };
            if !stale {
                continue;
            }

            match state.store().delete(game.id).await {
                Ok(()) => info!(
                    game_id = %game.id,
                    code = %game.room_code,
                    status = ?game.status,
                    "swept stale game"
                ),
                Err(err) => warn!(game_id = %game.id, error = %err, "failed to sweep game"),
            }
        }
    }
}

fn older_than(timestamp: SystemTime, ttl: Duration, now: SystemTime) -> bool {
    now.duration_since(timestamp)
        .map(|elapsed| elapsed > ttl)
        .unwrap_or(false)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
