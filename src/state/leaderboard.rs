//! Deterministic ranking of a group's members.

use std::cmp::Reverse;

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::member::{MemberId, Points};

/// Read-only view of one member, as produced by a ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberStanding {
    /// Member the row belongs to.
    pub member_id: MemberId,
    /// Name shown on the board.
    pub display_name: String,
    /// Points held.
    pub points: Points,
}

/// Ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position; ties still get distinct ranks.
    pub rank: usize,
    #[schema(value_type = String)]
    pub member_id: MemberId,
    /// Name shown on the board.
    pub display_name: String,
    /// Points held.
    pub points: Points,
}

/// Order members by points (descending) then member id (ascending) and number them from 1.
pub fn rank(mut snapshot: Vec<MemberStanding>) -> Vec<LeaderboardEntry> {
    snapshot.sort_by(|a, b| {
        (Reverse(a.points), a.member_id.as_str()).cmp(&(Reverse(b.points), b.member_id.as_str()))
    });

    snapshot
        .into_iter()
        .enumerate()
        .map(|(index, standing)| LeaderboardEntry {
            rank: index + 1,
            member_id: standing.member_id,
            display_name: standing.display_name,
            points: standing.points,
        })
        .collect()
}
