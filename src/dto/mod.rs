//! Request and response payloads.

use time::OffsetDateTime;

use crate::dao::models::minute_timestamp;

pub mod chat;
pub mod health;
pub mod league;

fn format_timestamp(time: OffsetDateTime) -> String {
    minute_timestamp::format(time).unwrap_or_else(|_| "invalid-timestamp".into())
}
