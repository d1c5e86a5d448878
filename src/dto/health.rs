//! Health check payload.

use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the last save of the league failed.
    pub status: String,
    /// Number of registered teams.
    pub groups: usize,
}

impl HealthResponse {
    /// Last save succeeded.
    pub fn ok(groups: usize) -> Self {
        Self {
            status: "ok".to_string(),
            groups,
        }
    }

    /// Last save failed.
    pub fn degraded(groups: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            groups,
        }
    }
}
