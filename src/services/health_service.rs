//! Health reporting.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the league store is keeping up with in-memory changes.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let groups = state.league().group_count();

    if state.is_degraded() {
        warn!("last league save failed; reporting degraded");
        HealthResponse::degraded(groups)
    } else {
        HealthResponse::ok(groups)
    }
}
