//! Per-member scoring cooldown, derived statelessly from the stored last-update time.

use time::{Duration, OffsetDateTime};

/// Default wait between two scoring events of the same member.
pub const DEFAULT_COOLDOWN: Duration = Duration::HOUR;

/// Whether a member whose points last changed at `last_update` may score again at `now`.
///
/// The boundary is inclusive: exactly one full cooldown after the last update is eligible.
pub fn is_eligible(last_update: OffsetDateTime, now: OffsetDateTime, cooldown: Duration) -> bool {
    now - last_update >= cooldown
}

/// Remaining wait before the member becomes eligible, or `None` when already eligible.
pub fn retry_after(
    last_update: OffsetDateTime,
    now: OffsetDateTime,
    cooldown: Duration,
) -> Option<Duration> {
    let elapsed = now - last_update;
    (elapsed < cooldown).then(|| cooldown - elapsed)
}
