//! Cooldown arithmetic.
//!
//! A cooldown is a plain timestamp comparison: a user may claim again once
//! `now >= last_claim + cooldown`. Remaining time is reported in whole hours
//! and whole minutes with seconds truncated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time left until a target instant, truncated to whole minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WaitTime {
    pub hours: i64,
    pub minutes: i64,
}

impl WaitTime {
    /// No wait.
    pub const NONE: WaitTime = WaitTime { hours: 0, minutes: 0 };

    /// Wait from `now` until `target`. Zero if `target` is not in the future.
    #[must_use]
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if target <= now {
            return Self::NONE;
        }
        Self::from_duration(target - now)
    }

    /// Split a duration into whole hours and minutes.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let total_minutes = duration.num_minutes().max(0);
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    /// Is there nothing left to wait?
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.hours == 0 && self.minutes == 0
    }

    /// Total wait in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl std::fmt::Display for WaitTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// When a user who last claimed at `last_claim` may claim again.
///
/// `None` means the user has never claimed and is eligible immediately.
#[must_use]
pub fn next_eligible(last_claim: Option<DateTime<Utc>>, cooldown: Duration) -> Option<DateTime<Utc>> {
    last_claim.map(|t| t.checked_add_signed(cooldown).unwrap_or(DateTime::<Utc>::MAX_UTC))
}
