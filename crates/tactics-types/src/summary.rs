//! While-you-were-gone summaries produced by catch-up advances.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BoundaryKind, Severity, SummaryCategory};
use crate::time::GameTime;

/// One representative thing that happened during a catch-up window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Highlight {
    /// Name of the manager that reported it.
    pub source: String,
    /// Summary bucket.
    pub category: SummaryCategory,
    /// How important it is.
    pub severity: Severity,
    /// One-line headline.
    pub headline: String,
    /// When it happened.
    pub at: GameTime,
}

/// Count of boundaries crossed, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundaryTally {
    /// Hour boundaries.
    pub hours: u64,
    /// Day boundaries.
    pub days: u64,
    /// Week boundaries.
    pub weeks: u64,
    /// Month boundaries.
    pub months: u64,
    /// Year boundaries.
    pub years: u64,
}

impl BoundaryTally {
    /// Count one more boundary of the given kind.
    pub const fn record(&mut self, kind: BoundaryKind) {
        let slot = match kind {
            BoundaryKind::Hour => &mut self.hours,
            BoundaryKind::Day => &mut self.days,
            BoundaryKind::Week => &mut self.weeks,
            BoundaryKind::Month => &mut self.months,
            BoundaryKind::Year => &mut self.years,
        };
        *slot = slot.saturating_add(1);
    }

    /// Number of boundaries of the given kind.
    pub const fn get(&self, kind: BoundaryKind) -> u64 {
        match kind {
            BoundaryKind::Hour => self.hours,
            BoundaryKind::Day => self.days,
            BoundaryKind::Week => self.weeks,
            BoundaryKind::Month => self.months,
            BoundaryKind::Year => self.years,
        }
    }
}

/// Representative summary of a catch-up window.
///
/// Produced once per catch-up, never once per simulated boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WhileYouWereGone {
    /// Game hours covered by the window.
    pub hours_elapsed: f64,
    /// Whole game days covered by the window.
    pub days_elapsed: u64,
    /// Time when the window started.
    pub from: GameTime,
    /// Time when the window ended.
    pub to: GameTime,
    /// Boundaries crossed inside the window.
    pub boundaries: BoundaryTally,
    /// Hour events dispatched to managers but left out of the event list.
    pub suppressed_hour_events: u64,
    /// Hit points recovered while away.
    pub healing_applied: u64,
    /// Highlights, most severe first.
    pub highlights: Vec<Highlight>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_per_kind() {
        let mut tally = BoundaryTally::default();
        tally.record(BoundaryKind::Hour);
        tally.record(BoundaryKind::Hour);
        tally.record(BoundaryKind::Day);
        assert_eq!(tally.get(BoundaryKind::Hour), 2);
        assert_eq!(tally.get(BoundaryKind::Day), 1);
        assert_eq!(tally.get(BoundaryKind::Week), 0);
    }
}
