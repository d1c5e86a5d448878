//! Business logic behind the REST routes: translate league outcomes into DTOs or
//! [`ServiceError`]s.

use time::OffsetDateTime;

use crate::{
    dto::league::{
        GroupStatus, JoinGroupRequest, LeaderboardResponse, MemberSummary, RegisterGroupRequest,
        RemoveMemberResponse, WorkoutRequest, WorkoutResponse,
    },
    error::ServiceError,
    state::{
        SharedState,
        league::{AwardOutcome, JoinOutcome, RegisterOutcome},
        member::{GroupId, MemberId},
    },
};

fn group_not_registered(name: &str) -> ServiceError {
    ServiceError::NotRegistered(format!("group `{name}` is not registered"))
}

fn require_group(state: &SharedState, name: &str) -> Result<GroupId, ServiceError> {
    state
        .league()
        .group_id(name)
        .ok_or_else(|| group_not_registered(name))
}

/// Register a team name against a transport group identifier.
pub async fn register_group(
    state: &SharedState,
    request: RegisterGroupRequest,
) -> Result<GroupStatus, ServiceError> {
    let RegisterGroupRequest { name, id } = request;
    match state.league().register_group(&name, id.clone()).await? {
        RegisterOutcome::Registered => Ok(GroupStatus {
            name,
            id,
            members: 0,
        }),
        RegisterOutcome::AlreadyRegistered { id } => Err(ServiceError::AlreadyRegistered(
            format!("group `{name}` is already registered with id `{id}`"),
        )),
        RegisterOutcome::IdentifierInUse { name: bound } => Err(ServiceError::AlreadyRegistered(
            format!("group id `{id}` is already registered as `{bound}`"),
        )),
    }
}

/// Report whether a team is registered and how many members it has.
pub fn group_status(state: &SharedState, name: &str) -> Result<GroupStatus, ServiceError> {
    let id = require_group(state, name)?;
    let members = state.league().snapshot(&id).len();
    Ok(GroupStatus {
        name: name.to_owned(),
        id,
        members,
    })
}

/// Forget a team and all of its members.
pub async fn unregister_group(state: &SharedState, name: &str) -> Result<(), ServiceError> {
    if state.league().unregister_group(name).await? {
        Ok(())
    } else {
        Err(group_not_registered(name))
    }
}

/// Add a member to a team.
pub async fn join_group(
    state: &SharedState,
    name: &str,
    request: JoinGroupRequest,
    now: OffsetDateTime,
) -> Result<MemberSummary, ServiceError> {
    let JoinGroupRequest {
        member_id,
        display_name,
    } = request;

    match state
        .league()
        .join_group(name, &member_id, &display_name, now)
        .await?
    {
        JoinOutcome::Joined => member_summary(state, name, member_id),
        JoinOutcome::AlreadyMember => Err(ServiceError::AlreadyRegistered(format!(
            "member `{member_id}` already joined `{name}`"
        ))),
        JoinOutcome::GroupNotRegistered => Err(group_not_registered(name)),
    }
}

/// Current state of one member.
pub fn member_summary(
    state: &SharedState,
    name: &str,
    member_id: MemberId,
) -> Result<MemberSummary, ServiceError> {
    let id = require_group(state, name)?;
    let member = state.league().member(&id, &member_id).ok_or_else(|| {
        ServiceError::NotRegistered(format!("member `{member_id}` has not joined `{name}`"))
    })?;
    Ok(MemberSummary::new(member_id, &member))
}

/// Remove a member from a team, reporting the points they held.
pub async fn remove_member(
    state: &SharedState,
    name: &str,
    member_id: MemberId,
) -> Result<RemoveMemberResponse, ServiceError> {
    let Some(removal) = state.league().remove_member(name, &member_id).await? else {
        return Err(group_not_registered(name));
    };

    if !removal.removed {
        return Err(ServiceError::NotRegistered(format!(
            "member `{member_id}` has not joined `{name}`"
        )));
    }

    Ok(RemoveMemberResponse {
        member_id,
        points_at_removal: removal.points_at_removal,
    })
}

/// Record a workout, honouring the per-member cooldown.
pub async fn record_workout(
    state: &SharedState,
    name: &str,
    request: WorkoutRequest,
    now: OffsetDateTime,
) -> Result<WorkoutResponse, ServiceError> {
    let WorkoutRequest {
        member_id,
        category,
    } = request;

    match state
        .league()
        .try_award_points(name, &member_id, category, now)
        .await?
    {
        AwardOutcome::Awarded { points, total } => Ok(WorkoutResponse {
            member_id,
            category,
            points,
            total,
        }),
        AwardOutcome::RateLimited { retry_after } => Err(ServiceError::RateLimited { retry_after }),
        AwardOutcome::GroupNotRegistered => Err(group_not_registered(name)),
        AwardOutcome::NotAMember => Err(ServiceError::NotRegistered(format!(
            "member `{member_id}` has not joined `{name}`"
        ))),
    }
}

/// Ranked members of a team.
pub fn leaderboard(state: &SharedState, name: &str) -> Result<LeaderboardResponse, ServiceError> {
    let entries = state
        .league()
        .leaderboard(name)
        .ok_or_else(|| group_not_registered(name))?;
    Ok(LeaderboardResponse {
        group: name.to_owned(),
        entries,
    })
}
