//! While-you-were-gone summaries.
//!
//! A catch-up advance dispatches every boundary to managers exactly as
//! sequential ticking would, but reports the window as one
//! [`WhileYouWereGone`] instead of a per-hour event list. Highlights are
//! the union of each manager's contributions, trimmed to the top N per
//! category by severity and then ordered critical-first, oldest-first.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tactics_types::{
    BoundaryTally, GameTime, Highlight, MINUTES_PER_DAY, SimEvent, SummaryCategory, TimeEvent,
    WhileYouWereGone,
};

use crate::clock;

/// Bookkeeping for one catch-up window while its boundaries run.
#[derive(Debug)]
pub(crate) struct CatchUpWindow {
    /// Time when the window started.
    pub(crate) from: GameTime,
    /// Boundaries crossed so far.
    pub(crate) tally: BoundaryTally,
    /// Hour events dispatched but not reported.
    pub(crate) suppressed: u64,
    /// Events each manager emitted during the window.
    pub(crate) emitted: BTreeMap<&'static str, Vec<SimEvent>>,
}

impl CatchUpWindow {
    pub(crate) const fn open(from: GameTime) -> Self {
        Self {
            from,
            tally: BoundaryTally {
                hours: 0,
                days: 0,
                weeks: 0,
                months: 0,
                years: 0,
            },
            suppressed: 0,
            emitted: BTreeMap::new(),
        }
    }

    pub(crate) fn record_boundary(&mut self, event: &TimeEvent, reported: bool) {
        self.tally.record(event.kind);
        if !reported {
            self.suppressed = self.suppressed.saturating_add(1);
        }
    }

    pub(crate) fn record_emitted(&mut self, source: &'static str, event: SimEvent) {
        self.emitted.entry(source).or_default().push(event);
    }

    /// Events a manager emitted during the window.
    pub(crate) fn emitted_by(&self, source: &str) -> &[SimEvent] {
        self.emitted.get(source).map_or(&[], Vec::as_slice)
    }
}

/// Keep the top `per_category` highlights of each category and order the
/// result critical-first, then chronologically.
pub fn select_highlights(candidates: Vec<Highlight>, per_category: usize) -> Vec<Highlight> {
    let mut by_category: BTreeMap<SummaryCategory, Vec<Highlight>> = BTreeMap::new();
    for highlight in candidates {
        by_category
            .entry(highlight.category)
            .or_default()
            .push(highlight);
    }

    let mut selected: Vec<Highlight> = by_category
        .into_values()
        .flat_map(|mut group| {
            group.sort_by_key(rank);
            group.truncate(per_category);
            group
        })
        .collect();
    selected.sort_by_key(rank);
    selected
}

/// Most severe first; ties go to the earlier event, then the headline.
fn rank(highlight: &Highlight) -> (Reverse<tactics_types::Severity>, u64, String) {
    (
        Reverse(highlight.severity),
        highlight.at.total_minutes,
        highlight.headline.clone(),
    )
}

/// Assemble the summary for a finished window.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn summarize(
    window: CatchUpWindow,
    to: GameTime,
    highlights: Vec<Highlight>,
) -> WhileYouWereGone {
    let minutes = to.total_minutes.saturating_sub(window.from.total_minutes);
    WhileYouWereGone {
        hours_elapsed: minutes as f64 / 60.0,
        days_elapsed: minutes / MINUTES_PER_DAY,
        from: window.from,
        to,
        boundaries: window.tally,
        suppressed_hour_events: window.suppressed,
        healing_applied: clock::healing_for_minutes(minutes),
        highlights,
    }
}

#[cfg(test)]
mod tests {
    use tactics_types::Severity;

    use super::*;
    use crate::clock::game_time_at;

    fn highlight(category: SummaryCategory, severity: Severity, minute: u64) -> Highlight {
        Highlight {
            source: "test".to_owned(),
            category,
            severity,
            headline: format!("{category:?} at {minute}"),
            at: game_time_at(minute),
        }
    }

    #[test]
    fn keeps_top_n_per_category() {
        let candidates = vec![
            highlight(SummaryCategory::Crime, Severity::Minor, 10),
            highlight(SummaryCategory::Crime, Severity::Major, 20),
            highlight(SummaryCategory::Crime, Severity::Normal, 30),
            highlight(SummaryCategory::Economy, Severity::Minor, 40),
        ];
        let selected = select_highlights(candidates, 2);
        assert_eq!(selected.len(), 3);
        let crime: Vec<Severity> = selected
            .iter()
            .filter(|h| h.category == SummaryCategory::Crime)
            .map(|h| h.severity)
            .collect();
        assert_eq!(crime, vec![Severity::Major, Severity::Normal]);
    }

    #[test]
    fn orders_critical_first_then_chronologically() {
        let candidates = vec![
            highlight(SummaryCategory::World, Severity::Normal, 10),
            highlight(SummaryCategory::Npc, Severity::Critical, 50),
            highlight(SummaryCategory::Economy, Severity::Critical, 20),
        ];
        let selected = select_highlights(candidates, 3);
        let order: Vec<u64> = selected.iter().map(|h| h.at.total_minutes).collect();
        assert_eq!(order, vec![20, 50, 10]);
    }

    #[test]
    fn summary_counts_elapsed_time() {
        let mut window = CatchUpWindow::open(game_time_at(0));
        window.record_boundary(
            &TimeEvent {
                kind: tactics_types::BoundaryKind::Hour,
                time: game_time_at(60),
            },
            false,
        );
        let summary = summarize(window, game_time_at(36 * 60), Vec::new());
        assert!((summary.hours_elapsed - 36.0).abs() < f64::EPSILON);
        assert_eq!(summary.days_elapsed, 1);
        assert_eq!(summary.suppressed_hour_events, 1);
        assert_eq!(summary.healing_applied, 24);
        assert_eq!(summary.boundaries.hours, 1);
    }
}
