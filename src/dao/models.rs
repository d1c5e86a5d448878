//! Persisted league document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::state::member::{GroupId, MemberId, Points};

/// Whole persisted league: both tables always travel together.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeagueDocument {
    /// Group registry (team name to group identifier).
    #[serde(default)]
    pub groups: HashMap<String, GroupId>,
    /// Score ledger (group identifier to member identifier to record).
    #[serde(default)]
    pub scores: HashMap<GroupId, HashMap<MemberId, MemberRecord>>,
}

impl LeagueDocument {
    /// Whether both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.scores.is_empty()
    }
}

/// Persisted member entry, stored as `[display_name, points, last_update]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberRecord(
    pub String,
    pub Points,
    #[serde(with = "minute_timestamp")] pub OffsetDateTime,
);

/// Minute-granularity timestamps such as `Oct 16 2026 03:05PM`, always in UTC.
///
/// Seconds are not stored; a value read back equals the written one truncated to the minute.
pub mod minute_timestamp {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset, macros::format_description};

    /// Render a timestamp in the persisted format.
    pub fn format(value: OffsetDateTime) -> Result<String, time::error::Format> {
        value.to_offset(UtcOffset::UTC).format(format_description!(
            "[month repr:short] [day] [year] [hour repr:12]:[minute][period]"
        ))
    }

    /// Parse a timestamp written by [`format`].
    pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
        PrimitiveDateTime::parse(
            value,
            format_description!("[month repr:short] [day] [year] [hour repr:12]:[minute][period]"),
        )
        .map(PrimitiveDateTime::assume_utc)
    }

    /// Serde hook writing [`format`] output.
    pub fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = format(*value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Serde hook reading [`format`] output.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(|err| D::Error::custom(format!("invalid timestamp `{text}`: {err}")))
    }
}
