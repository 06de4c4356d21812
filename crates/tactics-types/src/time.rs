//! Game time as seen by every manager.
//!
//! A [`GameTime`] is a snapshot produced by the clock: whole minutes since
//! the campaign epoch plus the calendar fields derived from them. Managers
//! receive it by value and never construct one from scratch.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BoundaryKind, TimeOfDay, Weekday};

/// Minutes in one hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u64 = 1_440;

/// Minutes in one week.
pub const MINUTES_PER_WEEK: u64 = 10_080;

/// A calendar date on the fixed 365-day calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameDate {
    /// Calendar year.
    pub year: u32,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
}

impl core::fmt::Display for GameDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// The current game time.
///
/// `total_minutes` is the source of truth; every other field is derived
/// from it by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameTime {
    /// Whole minutes elapsed since the campaign epoch.
    pub total_minutes: u64,
    /// Calendar date.
    pub date: GameDate,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute of hour, 0-59.
    pub minute: u8,
    /// Day of the week.
    pub weekday: Weekday,
    /// Coarse time of day.
    pub time_of_day: TimeOfDay,
}

impl GameTime {
    /// Hours elapsed since the epoch as a float, for display and rates.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_hours_elapsed(&self) -> f64 {
        // Exact for any campaign shorter than 2^53 minutes.
        self.total_minutes as f64 / 60.0
    }

    /// Whole hours elapsed since the epoch.
    pub const fn whole_hours(&self) -> u64 {
        self.total_minutes / MINUTES_PER_HOUR
    }

    /// Whole days elapsed since the epoch.
    pub const fn day_index(&self) -> u64 {
        self.total_minutes / MINUTES_PER_DAY
    }

    /// Whether the date falls on a Saturday or Sunday.
    pub const fn is_weekend(&self) -> bool {
        self.weekday.is_weekend()
    }
}

impl PartialOrd for GameTime {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameTime {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.total_minutes.cmp(&other.total_minutes)
    }
}

impl core::fmt::Display for GameTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.hour, self.minute)
    }
}

/// A single boundary crossing, stamped with the instant it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeEvent {
    /// Which boundary was crossed.
    pub kind: BoundaryKind,
    /// Game time at the boundary instant (not the end of the advance).
    pub time: GameTime,
}
