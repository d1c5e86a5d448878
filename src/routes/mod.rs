//! HTTP route trees.

use axum::Router;

use crate::state::SharedState;

/// Chat transport webhook.
pub mod chat;
/// Swagger UI.
pub mod docs;
/// Team, membership, workout and leaderboard endpoints.
pub mod groups;
/// Health check.
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(groups::router())
        .merge(chat::router())
        .merge(docs::router())
        .with_state(state)
}
