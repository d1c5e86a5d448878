//! Operations sitting between the routes and the league state.

/// Chat command parsing and reply rendering.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Team, membership, workout and leaderboard operations for the REST routes.
pub mod league_service;
