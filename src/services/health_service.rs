use tracing::warn;

use crate::{
    dto::health::HealthResponse,
    state::{SharedState, state_machine::GameStatus},
};

/// Probe the store and report liveness plus the active game count.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if let Err(err) = state.store().health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded();
    }

    match state.store().list_games().await {
        Ok(games) => {
            let active = games
                .iter()
                .filter(|game| game.status != GameStatus::Finished)
                .count();
            HealthResponse::ok(active)
        }
        Err(err) => {
            warn!(error = %err, "failed to list games for health report");
            HealthResponse::degraded()
        }
    }
}
