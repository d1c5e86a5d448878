//! Runtime representation of league members and the identifiers used to address them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};
use utoipa::ToSchema;

use crate::dao::models::MemberRecord;

/// Accumulated workout points.
pub type Points = u64;

/// Raw identifier as it may appear on the wire: chat platforms hand out integers,
/// older documents stored them as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawIdentifier> for String {
    fn from(value: RawIdentifier) -> Self {
        match value {
            RawIdentifier::Text(text) => text,
            RawIdentifier::Signed(number) => number.to_string(),
            RawIdentifier::Unsigned(number) => number.to_string(),
        }
    }
}

macro_rules! opaque_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the string form of the identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawIdentifier::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

opaque_identifier!(
    /// Opaque identifier assigned to a group by the transport (e.g. a chat id).
    GroupId
);

opaque_identifier!(
    /// Opaque identifier of a member, unique within a group only.
    MemberId
);

/// Member state tracked inside a group's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Informational name shown on leaderboards.
    pub display_name: String,
    /// Points accumulated since joining.
    pub points: Points,
    /// Last time points were awarded, truncated to the minute (UTC).
    pub last_update: OffsetDateTime,
}

impl Member {
    /// Fresh member with no points whose cooldown already elapsed.
    pub fn new(display_name: String, now: OffsetDateTime) -> Self {
        Self {
            display_name,
            points: 0,
            last_update: minute_floor(now) - Duration::DAY,
        }
    }

    /// Add `delta` points and move the cooldown anchor to `now`.
    pub fn record_workout(&mut self, delta: Points, now: OffsetDateTime) -> Points {
        self.points = self.points.saturating_add(delta);
        self.last_update = minute_floor(now);
        self.points
    }
}

/// Normalise a timestamp to UTC with seconds dropped, the precision kept on disk.
pub fn minute_floor(value: OffsetDateTime) -> OffsetDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    utc - Duration::seconds(i64::from(utc.second()))
        - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

/// Fixed workout categories and the points each one is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    /// Field session, 5 points.
    Field,
    /// Track session, 2 points.
    Track,
    /// Gym session, 1 point.
    Gym,
}

impl WorkoutCategory {
    /// Every category, in decreasing value.
    pub const ALL: [WorkoutCategory; 3] = [
        WorkoutCategory::Field,
        WorkoutCategory::Track,
        WorkoutCategory::Gym,
    ];

    /// Points granted for one workout of this category.
    pub fn points(self) -> Points {
        match self {
            WorkoutCategory::Field => 5,
            WorkoutCategory::Track => 2,
            WorkoutCategory::Gym => 1,
        }
    }

    /// Lowercase name, identical to the chat command without its slash.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutCategory::Field => "field",
            WorkoutCategory::Track => "track",
            WorkoutCategory::Gym => "gym",
        }
    }

    /// Look a category up by its command name.
    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == command)
    }
}

impl From<MemberRecord> for Member {
    fn from(MemberRecord(display_name, points, last_update): MemberRecord) -> Self {
        Self {
            display_name,
            points,
            last_update: minute_floor(last_update),
        }
    }
}

impl From<&Member> for MemberRecord {
    fn from(value: &Member) -> Self {
        MemberRecord(value.display_name.clone(), value.points, value.last_update)
    }
}
