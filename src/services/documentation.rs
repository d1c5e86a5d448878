//! OpenAPI description of the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the workout tally service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::groups::register_group,
        crate::routes::groups::get_group,
        crate::routes::groups::unregister_group,
        crate::routes::groups::join_group,
        crate::routes::groups::remove_member,
        crate::routes::groups::record_workout,
        crate::routes::groups::get_leaderboard,
        crate::routes::chat::chat_update,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::league::RegisterGroupRequest,
            crate::dto::league::GroupStatus,
            crate::dto::league::JoinGroupRequest,
            crate::dto::league::MemberSummary,
            crate::dto::league::RemoveMemberResponse,
            crate::dto::league::WorkoutRequest,
            crate::dto::league::WorkoutResponse,
            crate::dto::league::LeaderboardResponse,
            crate::dto::chat::ChatUpdate,
            crate::dto::chat::ChatReply,
            crate::state::leaderboard::LeaderboardEntry,
            crate::state::member::WorkoutCategory,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "groups", description = "Team registration, membership, workouts and leaderboards"),
        (name = "chat", description = "Chat transport webhook"),
    )
)]
pub struct ApiDoc;
