use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of non-finished games currently held by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_games: Option<usize>,
}

impl HealthResponse {
    /// Health response for an operational system.
    pub fn ok(active_games: usize) -> Self {
        Self {
            status: "ok".to_string(),
            active_games: Some(active_games),
        }
    }

    /// Health response for a system whose storage probe failed.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            active_games: None,
        }
    }
}
