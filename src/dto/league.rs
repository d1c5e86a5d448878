//! DTO definitions for the group, membership, workout and leaderboard routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::format_timestamp,
    state::{
        leaderboard::LeaderboardEntry,
        member::{GroupId, Member, MemberId, Points, WorkoutCategory},
    },
};

/// Payload registering a team name against a transport group identifier.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterGroupRequest {
    /// Team name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Chat identifier; strings and integers are both accepted.
    #[schema(value_type = String)]
    pub id: GroupId,
}

/// Registration status of a team.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupStatus {
    /// Team name.
    pub name: String,
    /// Chat identifier bound to the name.
    #[schema(value_type = String)]
    pub id: GroupId,
    /// Number of joined members.
    pub members: usize,
}

/// Payload adding a member to a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGroupRequest {
    /// Member identifier, unique within the team.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Name shown on the leaderboard.
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
}

/// Member state as exposed over HTTP.
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberSummary {
    /// Member identifier.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Name shown on the leaderboard.
    pub display_name: String,
    /// Points held.
    pub points: Points,
    /// Minute-granularity UTC timestamp, e.g. `Oct 16 2026 03:05PM`.
    pub last_update: String,
}

impl MemberSummary {
    /// Summarise `member`.
    pub fn new(member_id: MemberId, member: &Member) -> Self {
        Self {
            member_id,
            display_name: member.display_name.clone(),
            points: member.points,
            last_update: format_timestamp(member.last_update),
        }
    }
}

/// Result of removing a member.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveMemberResponse {
    /// Removed member.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Points held when removed.
    pub points_at_removal: Points,
}

/// Workout declared by a member.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct WorkoutRequest {
    /// Member declaring the workout.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Kind of workout.
    pub category: WorkoutCategory,
}

/// Points granted for a workout and the member's new balance.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkoutResponse {
    /// Member who scored.
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Kind of workout.
    pub category: WorkoutCategory,
    /// Points granted.
    pub points: Points,
    /// Balance after the award.
    pub total: Points,
}

/// Ranked members of a team.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Team name.
    pub group: String,
    /// Rows, best first.
    pub entries: Vec<LeaderboardEntry>,
}
