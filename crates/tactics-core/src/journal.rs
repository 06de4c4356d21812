//! Sequenced log of events emitted by managers.
//!
//! Every [`SimEvent`] a manager emits is appended with a sequence number
//! and its source. Each started manager keeps a cursor into the journal;
//! on its next invocation it sees everything other managers emitted since.
//! Entries every started manager has moved past are compacted away.

use std::collections::VecDeque;

use tactics_types::SimEvent;

/// One journaled event.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Monotonic sequence number.
    pub seq: u64,
    /// Name of the manager that emitted the event.
    pub source: &'static str,
    /// The event itself.
    pub event: SimEvent,
}

/// Append-only event log with cursor-based compaction.
#[derive(Debug, Default)]
pub struct Journal {
    /// Retained entries, oldest first, with contiguous sequence numbers.
    entries: VecDeque<JournalEntry>,
    /// Sequence number the next appended entry will get.
    next_seq: u64,
}

impl Journal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number one past the newest entry.
    pub const fn end(&self) -> u64 {
        self.next_seq
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, source: &'static str, event: SimEvent) -> u64 {
        let seq = self.next_seq;
        self.entries.push_back(JournalEntry { seq, source, event });
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }

    /// Entries at or after `cursor`, oldest first.
    pub fn since(&self, cursor: u64) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().skip_while(move |entry| entry.seq < cursor)
    }

    /// Drop every entry below `cursor`.
    pub fn compact(&mut self, cursor: u64) {
        while self
            .entries
            .front()
            .is_some_and(|entry| entry.seq < cursor)
        {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tactics_types::{FactionType, HeatLevel, HeatShift};

    use super::*;

    fn shift() -> SimEvent {
        SimEvent::Heat(Arc::new(HeatShift {
            country_code: "US".to_owned(),
            hottest_faction: FactionType::Police,
            faction_heat: 45.0,
            from: HeatLevel::Warm,
            to: HeatLevel::Hot,
            at: crate::clock::game_time_at(60),
        }))
    }

    #[test]
    fn since_returns_entries_from_cursor() {
        let mut journal = Journal::new();
        journal.append("heat", shift());
        let cursor = journal.end();
        journal.append("heat", shift());
        journal.append("fame", shift());
        let seen: Vec<_> = journal.since(cursor).map(|e| e.source).collect();
        assert_eq!(seen, vec!["heat", "fame"]);
    }

    #[test]
    fn compaction_keeps_unread_entries() {
        let mut journal = Journal::new();
        for _ in 0..5 {
            journal.append("heat", shift());
        }
        journal.compact(3);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.since(0).count(), 2);
        assert_eq!(journal.end(), 5);
    }
}
