//! The time engine: sole owner of game time and the manager registry.
//!
//! [`TimeEngine::advance_hours`] moves the clock, then walks every boundary
//! crossed in chronological order and hands it to each started manager in
//! registration order. A manager that fails is logged and skipped for that
//! boundary; the clock itself failing is the only terminal error.
//!
//! Catch-up advances dispatch exactly the same boundaries (hour boundaries
//! included, so numeric state matches sequential ticking) but leave hour
//! events out of the returned list and attach one [`WhileYouWereGone`].

use chrono::{DateTime, Utc};
use tactics_types::{BoundaryKind, GameTime, SimEvent, TimeEvent, WhileYouWereGone};
use tracing::{debug, error, info, trace, warn};

use crate::catch_up::{self, CatchUpWindow};
use crate::clock::{self, Clock, ClockError};
use crate::config::{SimulationConfig, TimeConfig};
use crate::journal::Journal;
use crate::manager::{
    BoundaryContext, DynManager, ManagerError, Registration, SimulationManager, StartContext,
    SummaryWindow,
};
use crate::rng;

/// Errors surfaced by the time engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Clock arithmetic failed; time was not advanced.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A wall-clock catch-up window ends before it starts.
    #[error("invalid catch-up window: {reason}")]
    InvalidCatchUpWindow {
        /// Explanation of what is wrong with the window.
        reason: String,
    },

    /// No manager with this name is registered.
    #[error("unknown manager: {name}")]
    UnknownManager {
        /// The requested name.
        name: String,
    },

    /// A manager with this name is already registered.
    #[error("manager already registered: {name}")]
    DuplicateManager {
        /// The conflicting name.
        name: &'static str,
    },

    /// A manager failed to start.
    #[error("manager failed to start: {source}")]
    Start {
        /// The manager's error.
        #[from]
        source: ManagerError,
    },
}

/// A manager's handler failed while processing a boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Name of the failing manager.
    pub manager: &'static str,
    /// Boundary it was handling.
    pub boundary: TimeEvent,
    /// The manager's error.
    pub error: ManagerError,
}

/// Result of one advance.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    /// Game time after the advance.
    pub time: GameTime,
    /// Boundaries fired, in order. Hour boundaries are left out of
    /// catch-up advances.
    pub events: Vec<TimeEvent>,
    /// Summary, present only for catch-up advances.
    pub summary: Option<WhileYouWereGone>,
    /// Handlers that failed during the advance.
    pub failures: Vec<HandlerFailure>,
}

/// Registration status of one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerStatus {
    /// Manager name.
    pub name: &'static str,
    /// Position in registration order.
    pub order: usize,
    /// Whether boundaries are currently delivered to it.
    pub started: bool,
}

/// Owner of the game clock and the ordered manager registry.
pub struct TimeEngine {
    clock: Clock,
    seed: u64,
    time: TimeConfig,
    registrations: Vec<Registration>,
    journal: Journal,
    next_order: usize,
    paused: bool,
}

impl TimeEngine {
    /// Create an engine at the campaign epoch.
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_clock(config, Clock::new())
    }

    /// Create an engine with an explicit clock (state restoration, tests).
    pub fn with_clock(config: &SimulationConfig, clock: Clock) -> Self {
        Self {
            clock,
            seed: config.world.seed,
            time: config.time.clone(),
            registrations: Vec::new(),
            journal: Journal::new(),
            next_order: 0,
            paused: false,
        }
    }

    /// Current game time.
    pub const fn now(&self) -> GameTime {
        self.clock.now()
    }

    /// Tick cadence and catch-up settings.
    pub const fn time_config(&self) -> &TimeConfig {
        &self.time
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Register a manager at the end of the notification order.
    ///
    /// The manager receives no boundaries until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateManager`] if a manager with the same
    /// name is already registered.
    pub fn subscribe<M: SimulationManager>(&mut self, manager: M) -> Result<(), EngineError> {
        self.subscribe_boxed(Box::new(manager))
    }

    /// Register an already boxed manager.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateManager`] on a repeated name.
    pub fn subscribe_boxed(&mut self, manager: Box<dyn DynManager>) -> Result<(), EngineError> {
        let name = manager.name();
        if self.position(name).is_some() {
            return Err(EngineError::DuplicateManager { name });
        }
        self.registrations.push(Registration {
            manager,
            order: self.next_order,
            started: false,
            cursor: self.journal.end(),
        });
        self.next_order = self.next_order.saturating_add(1);
        debug!(manager = name, "Manager subscribed");
        Ok(())
    }

    /// Remove a manager from the registry, stopping it first.
    pub fn unsubscribe(&mut self, name: &str) -> Option<Box<dyn DynManager>> {
        let index = self.position(name)?;
        if let Err(err) = self.stop(name) {
            warn!(manager = name, error = %err, "Failed to stop manager before unsubscribing");
        }
        let registration = self.registrations.remove(index);
        debug!(manager = name, "Manager unsubscribed");
        self.compact_journal();
        Some(registration.manager)
    }

    /// Start delivering boundaries to a manager. Returns `false` when it was
    /// already started.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownManager`] for an unregistered name, or
    /// [`EngineError::Start`] if the manager's own start-up fails (it then
    /// stays stopped).
    pub fn start(&mut self, name: &str) -> Result<bool, EngineError> {
        let now = self.clock.now();
        let seed = self.seed;
        let cursor = self.journal.end();
        let registration = self.registration_mut(name)?;
        if registration.started {
            info!(manager = name, "Manager already started");
            return Ok(false);
        }
        let mut ctx = StartContext {
            now,
            rng: rng::start_rng(seed, registration.manager.name()),
        };
        registration.manager.start(&mut ctx)?;
        registration.started = true;
        registration.cursor = cursor;
        info!(manager = name, "Manager started");
        Ok(true)
    }

    /// Stop delivering boundaries to a manager. Returns `false` when it was
    /// not running.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownManager`] for an unregistered name.
    pub fn stop(&mut self, name: &str) -> Result<bool, EngineError> {
        let registration = self.registration_mut(name)?;
        if !registration.started {
            return Ok(false);
        }
        registration.manager.stop();
        registration.started = false;
        info!(manager = name, "Manager stopped");
        self.compact_journal();
        Ok(true)
    }

    /// Whether a manager is registered and started.
    pub fn is_started(&self, name: &str) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.started && registration.manager.name() == name)
    }

    /// Registered managers in notification order.
    pub fn managers(&self) -> Vec<ManagerStatus> {
        self.registrations
            .iter()
            .map(|registration| ManagerStatus {
                name: registration.manager.name(),
                order: registration.order,
                started: registration.started,
            })
            .collect()
    }

    /// Read-only access to a registered manager by type.
    pub fn manager<T: SimulationManager>(&self) -> Option<&T> {
        self.registrations
            .iter()
            .find_map(|registration| registration.manager.as_any().downcast_ref::<T>())
    }

    /// Mutable access to a registered manager by type, for player-driven
    /// actions between advances.
    pub fn manager_mut<T: SimulationManager>(&mut self) -> Option<&mut T> {
        self.registrations
            .iter_mut()
            .find_map(|registration| registration.manager.as_any_mut().downcast_mut::<T>())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.registrations
            .iter()
            .position(|registration| registration.manager.name() == name)
    }

    fn registration_mut(&mut self, name: &str) -> Result<&mut Registration, EngineError> {
        self.registrations
            .iter_mut()
            .find(|registration| registration.manager.name() == name)
            .ok_or_else(|| EngineError::UnknownManager {
                name: name.to_owned(),
            })
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    /// Pause auto-ticking. Explicit advances still run.
    pub const fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume auto-ticking.
    pub const fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether auto-ticking is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------------
    // Advancing
    // -----------------------------------------------------------------------

    /// Advance by fractional hours, rounded to the nearest minute.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] for a negative or non-finite delta or
    /// an overflow. Time is unchanged in that case.
    pub fn advance_hours(&mut self, hours: f64) -> Result<AdvanceOutcome, EngineError> {
        let minutes = clock::hours_to_minutes(hours)?;
        self.advance_minutes(minutes)
    }

    /// Advance by whole minutes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] on overflow.
    pub fn advance_minutes(&mut self, minutes: u64) -> Result<AdvanceOutcome, EngineError> {
        self.run(minutes, None)
    }

    /// Advance by one default tick (`time.tick_minutes`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] on overflow.
    pub fn tick(&mut self) -> Result<AdvanceOutcome, EngineError> {
        self.advance_minutes(self.time.tick_minutes)
    }

    /// Collapse a gap of `hours` into one advance with a summary.
    ///
    /// Gaps shorter than `time.catch_up_threshold_hours` are advanced
    /// normally and carry no summary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] for invalid input or overflow.
    pub fn catch_up(&mut self, hours: f64) -> Result<AdvanceOutcome, EngineError> {
        let minutes = clock::hours_to_minutes(hours)?;
        self.catch_up_minutes(minutes)
    }

    /// Catch up on the real time elapsed between two wall-clock instants,
    /// converted at the auto-tick rate and capped at
    /// `time.max_catch_up_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCatchUpWindow`] when `now` precedes
    /// `last_seen`.
    pub fn catch_up_between(
        &mut self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let minutes = self.game_minutes_between(last_seen, now)?;
        self.catch_up_minutes(minutes)
    }

    /// Game minutes that auto-ticking would have produced between two
    /// wall-clock instants, capped at `time.max_catch_up_hours`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCatchUpWindow`] when `now` precedes
    /// `last_seen`.
    pub fn game_minutes_between(
        &self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, EngineError> {
        if now < last_seen {
            return Err(EngineError::InvalidCatchUpWindow {
                reason: format!("window ends at {now} before it starts at {last_seen}"),
            });
        }
        let real_ms = u64::try_from(now.signed_duration_since(last_seen).num_milliseconds())
            .unwrap_or(u64::MAX);
        let ticks = real_ms
            .checked_div(self.time.tick_interval_ms)
            .unwrap_or(0);
        let minutes = ticks.saturating_mul(self.time.tick_minutes);
        let cap = self.time.max_catch_up_hours.saturating_mul(60);
        if minutes > cap {
            warn!(
                requested_minutes = minutes,
                cap_minutes = cap,
                "Catch-up window exceeds the cap; truncating"
            );
            return Ok(cap);
        }
        Ok(minutes)
    }

    fn catch_up_minutes(&mut self, minutes: u64) -> Result<AdvanceOutcome, EngineError> {
        let threshold = self.time.catch_up_threshold_hours.saturating_mul(60);
        if minutes < threshold {
            debug!(minutes, threshold, "Gap below catch-up threshold; advancing normally");
            return self.advance_minutes(minutes);
        }
        let window = CatchUpWindow::open(self.clock.now());
        self.run(minutes, Some(window))
    }

    fn run(
        &mut self,
        minutes: u64,
        mut window: Option<CatchUpWindow>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let boundaries = self.clock.advance_minutes(minutes).map_err(|source| {
            error!(minutes, error = %source, "Clock failed to advance");
            EngineError::Clock { source }
        })?;

        let mut events = Vec::new();
        let mut failures = Vec::new();
        for boundary in boundaries {
            let reported = window.is_none() || boundary.kind != BoundaryKind::Hour;
            if let Some(window) = window.as_mut() {
                window.record_boundary(&boundary, reported);
            } else if boundary.kind == BoundaryKind::Hour {
                trace!(minute = boundary.time.total_minutes, "Hour boundary");
            } else {
                debug!(
                    kind = boundary.kind.label(),
                    date = %boundary.time.date,
                    "Boundary crossed"
                );
            }
            self.dispatch(&boundary, &mut window, &mut failures);
            if reported {
                events.push(boundary);
            }
        }

        let time = self.clock.now();
        let summary = window.map(|window| self.summarize(window, time));
        if let Some(summary) = summary.as_ref() {
            info!(
                hours = summary.hours_elapsed,
                days = summary.days_elapsed,
                highlights = summary.highlights.len(),
                failures = failures.len(),
                "Caught up"
            );
        }

        Ok(AdvanceOutcome {
            time,
            events,
            summary,
            failures,
        })
    }

    /// Hand one boundary to every started manager in registration order.
    fn dispatch(
        &mut self,
        boundary: &TimeEvent,
        window: &mut Option<CatchUpWindow>,
        failures: &mut Vec<HandlerFailure>,
    ) {
        let catching_up = window.is_some();
        for index in 0..self.registrations.len() {
            let (before, rest) = self.registrations.split_at_mut(index);
            let Some(registration) = rest.first_mut() else {
                break;
            };
            if !registration.started {
                continue;
            }
            let name = registration.manager.name();
            let mut ctx = BoundaryContext::new(
                *boundary,
                name,
                catching_up,
                rng::boundary_rng(self.seed, name, boundary.kind, boundary.time.total_minutes),
                &self.journal,
                registration.cursor,
                before,
            );

            match registration.manager.handle(&mut ctx) {
                Ok(()) => {
                    let outbox = ctx.into_outbox();
                    for event in outbox {
                        if let Some(window) = window.as_mut() {
                            window.record_emitted(name, event.clone());
                        }
                        self.journal.append(name, event);
                    }
                    registration.cursor = self.journal.end();
                }
                Err(err) => {
                    // The cursor stays put: the unread inbox is redelivered
                    // on the next boundary this manager handles.
                    drop(ctx);
                    warn!(
                        manager = name,
                        kind = boundary.kind.label(),
                        minute = boundary.time.total_minutes,
                        error = %err,
                        "Manager failed to handle boundary; state left unchanged"
                    );
                    failures.push(HandlerFailure {
                        manager: name,
                        boundary: *boundary,
                        error: err,
                    });
                }
            }
        }
        self.compact_journal();
    }

    fn compact_journal(&mut self) {
        let oldest = self
            .registrations
            .iter()
            .filter(|registration| registration.started)
            .map(|registration| registration.cursor)
            .min()
            .unwrap_or_else(|| self.journal.end());
        self.journal.compact(oldest);
    }

    fn summarize(&self, window: CatchUpWindow, to: GameTime) -> WhileYouWereGone {
        let candidates = self
            .registrations
            .iter()
            .filter(|registration| registration.started)
            .flat_map(|registration| {
                let emitted: &[SimEvent] = window.emitted_by(registration.manager.name());
                registration.manager.highlights(&SummaryWindow {
                    from: window.from,
                    to,
                    emitted,
                })
            })
            .collect();
        let highlights = catch_up::select_highlights(candidates, self.time.highlights_per_category);
        catch_up::summarize(window, to, highlights)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct Noop(&'static str);

    impl SimulationManager for Noop {
        type Update = ();

        fn name(&self) -> &'static str {
            self.0
        }

        fn plan(&self, _ctx: &mut BoundaryContext<'_>) -> Result<(), ManagerError> {
            Ok(())
        }

        fn commit(&mut self, _update: ()) {}
    }

    fn engine() -> TimeEngine {
        TimeEngine::new(&SimulationConfig::default())
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut engine = engine();
        engine.subscribe(Noop("a")).unwrap();
        assert!(matches!(
            engine.subscribe(Noop("a")),
            Err(EngineError::DuplicateManager { name: "a" })
        ));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut engine = engine();
        engine.subscribe(Noop("a")).unwrap();
        assert!(engine.start("a").unwrap());
        assert!(!engine.start("a").unwrap());
        assert!(engine.stop("a").unwrap());
        assert!(!engine.stop("a").unwrap());
        assert!(matches!(
            engine.start("missing"),
            Err(EngineError::UnknownManager { .. })
        ));
    }

    #[test]
    fn typed_lookup_finds_manager() {
        let mut engine = engine();
        engine.subscribe(Noop("a")).unwrap();
        assert_eq!(engine.manager::<Noop>().map(|m| m.0), Some("a"));
        assert!(engine.unsubscribe("a").is_some());
        assert!(engine.manager::<Noop>().is_none());
    }

    #[test]
    fn negative_advance_leaves_time_unchanged() {
        let mut engine = engine();
        engine.advance_hours(2.0).unwrap();
        assert!(engine.advance_hours(-1.0).is_err());
        assert_eq!(engine.now().total_minutes, 120);
    }

    #[test]
    fn short_gaps_skip_the_summary() {
        let mut engine = engine();
        let outcome = engine.catch_up(2.0).unwrap();
        assert!(outcome.summary.is_none());
        assert_eq!(outcome.events.len(), 2);
    }

    #[test]
    fn wall_clock_window_uses_tick_rate_and_cap() {
        let engine = engine();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        // 60 real seconds at 10 game minutes per second.
        let minute_later = start + chrono::Duration::seconds(60);
        assert_eq!(engine.game_minutes_between(start, minute_later).unwrap(), 600);
        // A month of real time is capped at 720 game hours.
        let month_later = start + chrono::Duration::days(30);
        assert_eq!(
            engine.game_minutes_between(start, month_later).unwrap(),
            720 * 60
        );
        assert!(matches!(
            engine.game_minutes_between(minute_later, start),
            Err(EngineError::InvalidCatchUpWindow { .. })
        ));
    }

    #[test]
    fn pause_flag_round_trips() {
        let mut engine = engine();
        engine.pause();
        assert!(engine.is_paused());
        // Explicit advances still run while paused.
        assert!(engine.advance_hours(1.0).is_ok());
        engine.resume();
        assert!(!engine.is_paused());
    }
}
