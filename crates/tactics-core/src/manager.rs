//! The contract every simulation manager implements.
//!
//! A manager owns exactly one slice of world state and reacts to time
//! boundaries. Handling a boundary is split into two phases:
//!
//! 1. [`plan`](SimulationManager::plan) reads the manager's own state, the
//!    events other managers emitted, and read-only views of upstream
//!    managers, and computes an update. It may fail; nothing is mutated
//!    and anything it emitted is discarded.
//! 2. [`commit`](SimulationManager::commit) applies the update. It cannot
//!    fail, so a boundary is either applied in full or not at all.
//!
//! Managers never see the engine itself, so a handler cannot re-enter the
//! boundary loop.

use std::any::Any;

use rand::rngs::StdRng;
use tactics_types::{BoundaryKind, GameTime, Highlight, SimEvent, TimeEvent};

use crate::journal::Journal;

/// Errors a manager can report from start-up or boundary handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    /// The manager could not complete the operation.
    #[error("{manager}: {reason}")]
    Failed {
        /// Name of the failing manager.
        manager: &'static str,
        /// Human-readable cause.
        reason: String,
    },

    /// A player-driven action referenced something the manager does not own.
    #[error("{manager}: unknown {target}")]
    UnknownTarget {
        /// Name of the manager.
        manager: &'static str,
        /// Description of the missing target.
        target: String,
    },
}

/// Inputs available to a manager while it starts.
pub struct StartContext {
    /// Game time when the manager is started.
    pub now: GameTime,
    /// Stream derived from the world seed and the manager name.
    pub rng: StdRng,
}

/// A catch-up window, as seen by [`SimulationManager::highlights`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryWindow<'a> {
    /// Start of the window.
    pub from: GameTime,
    /// End of the window.
    pub to: GameTime,
    /// Events this manager emitted during the window, oldest first.
    pub emitted: &'a [SimEvent],
}

/// A subsystem that reacts to time boundaries and owns one slice of state.
pub trait SimulationManager: Any + Send {
    /// Result of the planning phase, applied by [`commit`](Self::commit).
    type Update: Send;

    /// Stable name used for logging, lookups, and seed derivation.
    fn name(&self) -> &'static str;

    /// Called once when the manager is started.
    fn on_start(&mut self, _ctx: &mut StartContext) -> Result<(), ManagerError> {
        Ok(())
    }

    /// Called once when the manager is stopped.
    fn on_stop(&mut self) {}

    /// Compute this manager's reaction to a boundary without mutating state.
    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<Self::Update, ManagerError>;

    /// Apply a planned update.
    fn commit(&mut self, update: Self::Update);

    /// Representative things this manager did during a catch-up window.
    ///
    /// Defaults to one highlight per event it emitted.
    fn highlights(&self, window: &SummaryWindow<'_>) -> Vec<Highlight> {
        window
            .emitted
            .iter()
            .map(|event| Highlight {
                source: self.name().to_owned(),
                category: event.summary_category(),
                severity: event.severity(),
                headline: event.headline(),
                at: event.at(),
            })
            .collect()
    }
}

/// Object-safe view of a [`SimulationManager`] used by the registry.
///
/// Implemented for every manager by a blanket impl.
pub trait DynManager: Send {
    /// See [`SimulationManager::name`].
    fn name(&self) -> &'static str;
    /// See [`SimulationManager::on_start`].
    fn start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError>;
    /// See [`SimulationManager::on_stop`].
    fn stop(&mut self);
    /// Plan then commit one boundary.
    fn handle(&mut self, ctx: &mut BoundaryContext<'_>) -> Result<(), ManagerError>;
    /// See [`SimulationManager::highlights`].
    fn highlights(&self, window: &SummaryWindow<'_>) -> Vec<Highlight>;
    /// Upcast for typed lookups.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for typed mutable lookups.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<M: SimulationManager> DynManager for M {
    fn name(&self) -> &'static str {
        SimulationManager::name(self)
    }

    fn start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.on_start(ctx)
    }

    fn stop(&mut self) {
        self.on_stop();
    }

    fn handle(&mut self, ctx: &mut BoundaryContext<'_>) -> Result<(), ManagerError> {
        let update = self.plan(ctx)?;
        self.commit(update);
        Ok(())
    }

    fn highlights(&self, window: &SummaryWindow<'_>) -> Vec<Highlight> {
        SimulationManager::highlights(self, window)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Registry entry for one manager.
pub(crate) struct Registration {
    /// The manager itself.
    pub(crate) manager: Box<dyn DynManager>,
    /// Position in registration order.
    pub(crate) order: usize,
    /// Whether boundary handlers are currently invoked.
    pub(crate) started: bool,
    /// First journal sequence number not yet delivered.
    pub(crate) cursor: u64,
}

/// Everything a manager may look at while handling one boundary.
pub struct BoundaryContext<'a> {
    event: TimeEvent,
    manager: &'static str,
    catching_up: bool,
    rng: StdRng,
    journal: &'a Journal,
    cursor: u64,
    upstream: &'a [Registration],
    outbox: Vec<SimEvent>,
}

impl<'a> BoundaryContext<'a> {
    pub(crate) const fn new(
        event: TimeEvent,
        manager: &'static str,
        catching_up: bool,
        rng: StdRng,
        journal: &'a Journal,
        cursor: u64,
        upstream: &'a [Registration],
    ) -> Self {
        Self {
            event,
            manager,
            catching_up,
            rng,
            journal,
            cursor,
            upstream,
            outbox: Vec::new(),
        }
    }

    /// The boundary being handled.
    pub const fn event(&self) -> &TimeEvent {
        &self.event
    }

    /// Kind of the boundary being handled.
    pub const fn kind(&self) -> BoundaryKind {
        self.event.kind
    }

    /// Game time at the boundary instant.
    pub const fn now(&self) -> &GameTime {
        &self.event.time
    }

    /// Whether this boundary is part of a catch-up advance.
    pub const fn is_catching_up(&self) -> bool {
        self.catching_up
    }

    /// This manager's random stream for the boundary.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Events other managers emitted since this manager last ran.
    pub fn inbox(&self) -> impl Iterator<Item = &'a SimEvent> + use<'a> {
        let me = self.manager;
        self.journal
            .since(self.cursor)
            .filter(move |entry| entry.source != me)
            .map(|entry| &entry.event)
    }

    /// Read-only view of a started manager registered before this one.
    pub fn upstream<T: SimulationManager>(&self) -> Option<&'a T> {
        self.upstream
            .iter()
            .filter(|registration| registration.started)
            .find_map(|registration| registration.manager.as_any().downcast_ref::<T>())
    }

    /// Emit an event for downstream consumers.
    pub fn emit(&mut self, event: SimEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn into_outbox(self) -> Vec<SimEvent> {
        self.outbox
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::clock::game_time_at;

    struct Counter {
        seen: u32,
    }

    impl SimulationManager for Counter {
        type Update = u32;

        fn name(&self) -> &'static str {
            "counter"
        }

        fn plan(&self, _ctx: &mut BoundaryContext<'_>) -> Result<u32, ManagerError> {
            Ok(self.seen.saturating_add(1))
        }

        fn commit(&mut self, update: u32) {
            self.seen = update;
        }
    }

    #[test]
    fn blanket_impl_plans_then_commits() {
        let journal = Journal::new();
        let event = TimeEvent {
            kind: BoundaryKind::Hour,
            time: game_time_at(60),
        };
        let mut manager: Box<dyn DynManager> = Box::new(Counter { seen: 0 });
        let mut ctx = BoundaryContext::new(
            event,
            "counter",
            false,
            StdRng::seed_from_u64(1),
            &journal,
            0,
            &[],
        );
        manager.handle(&mut ctx).unwrap();
        let counter = manager.as_any().downcast_ref::<Counter>().unwrap();
        assert_eq!(counter.seen, 1);
        assert_eq!(ctx.kind(), BoundaryKind::Hour);
        assert!(ctx.into_outbox().is_empty());
    }
}
