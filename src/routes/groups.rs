//! Group endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use time::OffsetDateTime;

use crate::{
    dto::league::{
        GroupStatus, JoinGroupRequest, LeaderboardResponse, MemberSummary, RegisterGroupRequest,
        RemoveMemberResponse, WorkoutRequest, WorkoutResponse,
    },
    error::AppError,
    services::league_service,
    state::{SharedState, member::MemberId},
};

/// Team registration, membership, workout and leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/groups", post(register_group))
        .route("/groups/{name}", get(get_group).delete(unregister_group))
        .route("/groups/{name}/members", post(join_group))
        .route("/groups/{name}/members/{member_id}", delete(remove_member))
        .route("/groups/{name}/workouts", post(record_workout))
        .route("/groups/{name}/leaderboard", get(get_leaderboard))
}

/// Register a team name for a transport group.
#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    request_body = RegisterGroupRequest,
    responses(
        (status = 201, description = "Group registered", body = GroupStatus),
        (status = 409, description = "Name or identifier already registered")
    )
)]
pub async fn register_group(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<RegisterGroupRequest>>,
) -> Result<(StatusCode, Json<GroupStatus>), AppError> {
    let status = league_service::register_group(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

/// Registration status of a team.
#[utoipa::path(
    get,
    path = "/groups/{name}",
    tag = "groups",
    params(("name" = String, Path, description = "Team name")),
    responses(
        (status = 200, description = "Group registered", body = GroupStatus),
        (status = 404, description = "Group not registered")
    )
)]
pub async fn get_group(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<GroupStatus>, AppError> {
    Ok(Json(league_service::group_status(&state, &name)?))
}

/// Forget a team and all its members.
#[utoipa::path(
    delete,
    path = "/groups/{name}",
    tag = "groups",
    params(("name" = String, Path, description = "Team name")),
    responses(
        (status = 204, description = "Group removed"),
        (status = 404, description = "Group not registered")
    )
)]
pub async fn unregister_group(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    league_service::unregister_group(&state, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to a team.
#[utoipa::path(
    post,
    path = "/groups/{name}/members",
    tag = "groups",
    params(("name" = String, Path, description = "Team name")),
    request_body = JoinGroupRequest,
    responses(
        (status = 201, description = "Member joined", body = MemberSummary),
        (status = 404, description = "Group not registered"),
        (status = 409, description = "Member already joined")
    )
)]
pub async fn join_group(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinGroupRequest>>,
) -> Result<(StatusCode, Json<MemberSummary>), AppError> {
    let summary =
        league_service::join_group(&state, &name, payload, OffsetDateTime::now_utc()).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Remove a member from a team.
#[utoipa::path(
    delete,
    path = "/groups/{name}/members/{member_id}",
    tag = "groups",
    params(
        ("name" = String, Path, description = "Team name"),
        ("member_id" = String, Path, description = "Member identifier")
    ),
    responses(
        (status = 200, description = "Member removed", body = RemoveMemberResponse),
        (status = 404, description = "Group or member not registered")
    )
)]
pub async fn remove_member(
    State(state): State<SharedState>,
    Path((name, member_id)): Path<(String, String)>,
) -> Result<Json<RemoveMemberResponse>, AppError> {
    let removed = league_service::remove_member(&state, &name, MemberId::from(member_id)).await?;
    Ok(Json(removed))
}

/// Record a workout for a member, subject to the cooldown.
#[utoipa::path(
    post,
    path = "/groups/{name}/workouts",
    tag = "groups",
    params(("name" = String, Path, description = "Team name")),
    request_body = WorkoutRequest,
    responses(
        (status = 200, description = "Workout recorded", body = WorkoutResponse),
        (status = 404, description = "Group or member not registered"),
        (status = 429, description = "Member still cooling down")
    )
)]
pub async fn record_workout(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Valid(Json(payload)): Valid<Json<WorkoutRequest>>,
) -> Result<Json<WorkoutResponse>, AppError> {
    let recorded =
        league_service::record_workout(&state, &name, payload, OffsetDateTime::now_utc()).await?;
    Ok(Json(recorded))
}

/// Ranked members of a team.
#[utoipa::path(
    get,
    path = "/groups/{name}/leaderboard",
    tag = "groups",
    params(("name" = String, Path, description = "Team name")),
    responses(
        (status = 200, description = "Current leaderboard", body = LeaderboardResponse),
        (status = 404, description = "Group not registered")
    )
)]
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(league_service::leaderboard(&state, &name)?))
}
