//! Game clock and calendar arithmetic for the world simulation.
//!
//! The clock is the single source of truth for "now". Internally it counts
//! whole minutes since the campaign epoch (2025-01-01 00:00, a Wednesday)
//! so that long sessions never accumulate floating-point drift. Every
//! calendar field on [`GameTime`] is derived from that counter.
//!
//! # Design Principles
//!
//! - All derivations use checked or saturating arithmetic.
//! - Boundary detection is exact: a 73-hour jump yields 73 hour
//!   boundaries, each stamped with its own instant.
//! - Nothing in this module has side effects beyond the [`Clock`] value
//!   it is called on.

use tactics_types::{
    BoundaryKind, GameDate, GameTime, MINUTES_PER_DAY, MINUTES_PER_HOUR, TimeEvent, TimeOfDay,
    Weekday,
};

/// First calendar year of the campaign.
pub const EPOCH_YEAR: u32 = 2025;

/// Days in a calendar year. The calendar has no leap years.
const DAYS_PER_YEAR: u64 = 365;

/// Month lengths on the fixed calendar.
const MONTH_LENGTHS: [u64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Index of the epoch's weekday in [`Weekday::ALL`] (Wednesday).
const EPOCH_WEEKDAY: u64 = 2;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The requested delta is negative, NaN, or infinite.
    #[error("invalid time delta: {reason}")]
    InvalidArgument {
        /// Explanation of what is wrong with the input.
        reason: String,
    },

    /// Minute counter would overflow.
    #[error("game clock overflow: cannot advance beyond u64::MAX minutes")]
    Overflow,
}

/// Convert a fractional hour delta into whole minutes, rounding to the
/// nearest minute.
///
/// # Errors
///
/// Returns [`ClockError::InvalidArgument`] for negative, NaN or infinite
/// input and [`ClockError::Overflow`] when the result does not fit in `u64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn hours_to_minutes(hours: f64) -> Result<u64, ClockError> {
    if hours.is_nan() || hours.is_infinite() {
        return Err(ClockError::InvalidArgument {
            reason: format!("{hours} is not a finite number of hours"),
        });
    }
    if hours < 0.0 {
        return Err(ClockError::InvalidArgument {
            reason: format!("cannot advance by {hours} hours; time only moves forward"),
        });
    }
    let minutes = (hours * 60.0).round();
    if minutes >= u64::MAX as f64 {
        return Err(ClockError::Overflow);
    }
    // Finite, non-negative and below u64::MAX after the checks above.
    Ok(minutes as u64)
}

/// Build the full [`GameTime`] snapshot for a minute counter.
pub fn game_time_at(total_minutes: u64) -> GameTime {
    let day_index = total_minutes / MINUTES_PER_DAY;
    let minute_of_day = total_minutes % MINUTES_PER_DAY;

    let years = u32::try_from(day_index / DAYS_PER_YEAR).unwrap_or(u32::MAX);
    let mut day_of_year = day_index % DAYS_PER_YEAR;

    let mut month: u8 = 1;
    for length in MONTH_LENGTHS {
        if day_of_year < length {
            break;
        }
        day_of_year = day_of_year.saturating_sub(length);
        month = month.saturating_add(1);
    }

    let hour = u8::try_from(minute_of_day / MINUTES_PER_HOUR).unwrap_or(0);
    let weekday_index = usize::try_from(day_index.wrapping_add(EPOCH_WEEKDAY) % 7).unwrap_or(0);

    GameTime {
        total_minutes,
        date: GameDate {
            year: EPOCH_YEAR.saturating_add(years),
            month,
            day: u8::try_from(day_of_year.saturating_add(1)).unwrap_or(1),
        },
        hour,
        minute: u8::try_from(minute_of_day % MINUTES_PER_HOUR).unwrap_or(0),
        weekday: Weekday::ALL
            .get(weekday_index)
            .copied()
            .unwrap_or(Weekday::Wednesday),
        time_of_day: TimeOfDay::from_hour(hour),
    }
}

/// Compute the time reached by advancing `current` by `delta_hours`.
///
/// # Errors
///
/// Returns [`ClockError::InvalidArgument`] for a negative or non-finite
/// delta and [`ClockError::Overflow`] if the result is unrepresentable.
pub fn advance(current: &GameTime, delta_hours: f64) -> Result<GameTime, ClockError> {
    let minutes = hours_to_minutes(delta_hours)?;
    advance_minutes(current, minutes)
}

/// Compute the time reached by advancing `current` by whole minutes.
///
/// # Errors
///
/// Returns [`ClockError::Overflow`] if the result is unrepresentable.
pub fn advance_minutes(current: &GameTime, minutes: u64) -> Result<GameTime, ClockError> {
    let total = current
        .total_minutes
        .checked_add(minutes)
        .ok_or(ClockError::Overflow)?;
    Ok(game_time_at(total))
}

/// Every boundary strictly after `old` and at or before `new`, in
/// chronological order. Boundaries sharing an instant come finest first.
pub fn boundaries_crossed(old: &GameTime, new: &GameTime) -> Vec<TimeEvent> {
    Boundaries::between(old.total_minutes, new.total_minutes).collect()
}

/// Lazy iterator over the boundaries inside a half-open minute window.
///
/// Every boundary kind falls on the top of an hour, so the iterator walks
/// hour instants and expands each into the kinds it completes.
#[derive(Debug, Clone)]
pub struct Boundaries {
    /// Next hour index (minutes / 60) to inspect.
    next_hour: u64,
    /// Last hour index inside the window.
    last_hour: u64,
    /// Boundaries at the current instant not yet yielded, finest first.
    pending: Vec<TimeEvent>,
}

impl Boundaries {
    /// Boundaries in the window `(from_minutes, to_minutes]`.
    pub fn between(from_minutes: u64, to_minutes: u64) -> Self {
        Self {
            next_hour: (from_minutes / MINUTES_PER_HOUR).saturating_add(1),
            last_hour: to_minutes / MINUTES_PER_HOUR,
            pending: Vec::new(),
        }
    }

    /// Number of hour instants remaining, which bounds the iterator.
    pub const fn remaining_hours(&self) -> u64 {
        self.last_hour.saturating_add(1).saturating_sub(self.next_hour)
    }
}

impl Iterator for Boundaries {
    type Item = TimeEvent;

    fn next(&mut self) -> Option<TimeEvent> {
        if self.pending.is_empty() {
            if self.next_hour > self.last_hour {
                return None;
            }
            let minute = self.next_hour.checked_mul(MINUTES_PER_HOUR)?;
            self.next_hour = self.next_hour.saturating_add(1);
            // Stored reversed so pop() yields the finest kind first.
            self.pending = kinds_at(minute)
                .into_iter()
                .rev()
                .map(|kind| TimeEvent {
                    kind,
                    time: game_time_at(minute),
                })
                .collect();
        }
        self.pending.pop()
    }
}

/// Boundary kinds completed at an instant that lies on the top of an hour.
fn kinds_at(minute: u64) -> Vec<BoundaryKind> {
    let mut kinds = vec![BoundaryKind::Hour];
    if minute % MINUTES_PER_DAY != 0 {
        return kinds;
    }
    kinds.push(BoundaryKind::Day);

    let day_index = minute / MINUTES_PER_DAY;
    if day_index % 7 == 0 {
        kinds.push(BoundaryKind::Week);
    }
    let date = game_time_at(minute).date;
    if date.day == 1 {
        kinds.push(BoundaryKind::Month);
        if date.month == 1 {
            kinds.push(BoundaryKind::Year);
        }
    }
    kinds
}

/// The game clock owned by the time engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    /// Current game time.
    now: GameTime,
}

impl Clock {
    /// A clock at the campaign epoch.
    pub fn new() -> Self {
        Self::from_minutes(0)
    }

    /// A clock at an explicit minute counter (state restoration, tests).
    pub fn from_minutes(total_minutes: u64) -> Self {
        Self {
            now: game_time_at(total_minutes),
        }
    }

    /// Current game time.
    pub const fn now(&self) -> GameTime {
        self.now
    }

    /// Move the clock forward by whole minutes, returning the boundaries
    /// crossed. The clock is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the counter would overflow.
    pub fn advance_minutes(&mut self, minutes: u64) -> Result<Boundaries, ClockError> {
        let next = advance_minutes(&self.now, minutes)?;
        let crossed = Boundaries::between(self.now.total_minutes, next.total_minutes);
        self.now = next;
        Ok(crossed)
    }

    /// Move the clock forward by fractional hours, rounded to the minute.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidArgument`] for negative or non-finite
    /// input, or [`ClockError::Overflow`].
    pub fn advance_hours(&mut self, hours: f64) -> Result<Boundaries, ClockError> {
        let minutes = hours_to_minutes(hours)?;
        self.advance_minutes(minutes)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Street crime multiplier for a time of day.
pub const fn crime_modifier(time_of_day: TimeOfDay) -> f64 {
    match time_of_day {
        TimeOfDay::Night => 1.5,
        TimeOfDay::Evening => 1.2,
        TimeOfDay::Morning => 0.8,
        TimeOfDay::Afternoon => 1.0,
    }
}

/// Encounter difficulty multiplier for a time of day.
pub const fn encounter_modifier(time_of_day: TimeOfDay) -> f64 {
    match time_of_day {
        TimeOfDay::Night => 1.3,
        TimeOfDay::Evening => 1.1,
        TimeOfDay::Morning => 0.9,
        TimeOfDay::Afternoon => 1.0,
    }
}

/// Visibility multiplier for a time of day.
pub const fn visibility_modifier(time_of_day: TimeOfDay) -> f64 {
    match time_of_day {
        TimeOfDay::Night => 0.6,
        TimeOfDay::Evening => 0.85,
        TimeOfDay::Morning => 0.95,
        TimeOfDay::Afternoon => 1.0,
    }
}

/// Kind of shop, for opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopKind {
    /// Fences and smugglers.
    BlackMarket,
    /// Groceries and hardware.
    General,
    /// Licensed arms dealers.
    Military,
    /// Electronics.
    Tech,
    /// Police surplus and impound sales.
    Police,
    /// Pharmacies and clinics.
    Medical,
    /// Anyone else; keeps no fixed hours.
    Independent,
}

/// Whether a kind of shop is trading at a time of day. Legitimate shops
/// keep daylight hours and the black market only deals after dark.
pub const fn are_shops_open(time_of_day: TimeOfDay, kind: ShopKind) -> bool {
    match kind {
        ShopKind::BlackMarket => matches!(time_of_day, TimeOfDay::Evening | TimeOfDay::Night),
        ShopKind::General
        | ShopKind::Military
        | ShopKind::Tech
        | ShopKind::Police
        | ShopKind::Medical => matches!(time_of_day, TimeOfDay::Morning | TimeOfDay::Afternoon),
        ShopKind::Independent => true,
    }
}

/// Game minutes per hit point recovered away from the action.
///
/// Eight hours of every day are spent asleep healing a point an hour; the
/// other sixteen heal half a point an hour.
pub const MINUTES_PER_HEALED_POINT: u64 = 90;

/// Hit points recovered over a span of game minutes, rounded down.
pub const fn healing_for_minutes(minutes: u64) -> u64 {
    minutes.saturating_div(MINUTES_PER_HEALED_POINT)
}

/// Hit points recovered over a span of game hours, rounded down.
///
/// # Errors
///
/// Rejects the same input as [`hours_to_minutes`].
pub fn healing_for_hours(hours: f64) -> Result<u64, ClockError> {
    Ok(healing_for_minutes(hours_to_minutes(hours)?))
}
