//! The world systems context: one explicit owner for the whole manager
//! graph.
//!
//! [`WorldSystems`] owns the configuration and the [`TimeEngine`], which in
//! turn owns every manager. Initialization walks a [`StartupPlan`] in
//! dependency order, registering and starting each manager. A second
//! initialization is a logged no-op; cleanup stops everything, runs the
//! registered cleanup hooks, and allows a fresh initialization afterwards.
//!
//! # Startup order
//!
//! 1. Character registry
//! 2. Contacts
//! 3. Mercenary pool
//! 4. Life events
//! 5. Death consequences
//! 6. Fame
//! 7. Heat
//! 8. Hunt missions
//! 9. World simulation
//! 10. Economy
//! 11. Price fluctuation
//! 12. World news
//! 13. Economic news
//! 14. NPC news
//!
//! The time engine itself exists before any of them and is never torn
//! down, so game time survives a cleanup.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tactics_agents::{
    CharacterRegistry, ContactNetwork, DeathConsequences, FameTracker, HeatTracker, HuntMissions,
    LifeEvents, MercenaryPool,
};
use tactics_core::{
    AdvanceOutcome, DynManager, EngineError, SimulationConfig, SimulationManager, TickTarget,
    TimeEngine,
};
use tactics_news::{EconomicNews, NpcNews, WorldNews};
use tactics_types::{GameTime, NewsArticle};
use tactics_world::{DynamicEconomy, PriceFluctuation, WorldSimulation};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;

/// Game hours covered by [`WorldSystems::tick`]: ten minutes.
pub const DEFAULT_ADVANCE_HOURS: f64 = 1.0 / 6.0;

/// Builds one manager from the configuration and the current game time.
pub type ManagerFactory = Box<dyn Fn(&SimulationConfig, GameTime) -> Box<dyn DynManager> + Send>;

/// Ordered manager factories run by [`WorldSystems::init_world_systems`].
pub type StartupPlan = Vec<ManagerFactory>;

/// A callback run by [`WorldSystems::cleanup_world_systems`].
pub type CleanupHook = Box<dyn FnOnce(&mut TimeEngine) -> Result<(), EngineError> + Send>;

/// The world systems as shared with the auto-tick driver.
pub type SharedWorld = Arc<Mutex<WorldSystems>>;

fn factory<M, F>(build: F) -> ManagerFactory
where
    M: SimulationManager,
    F: Fn(&SimulationConfig, GameTime) -> M + Send + 'static,
{
    Box::new(move |config: &SimulationConfig, now: GameTime| {
        Box::new(build(config, now)) as Box<dyn DynManager>
    })
}

/// The standard manager graph in dependency order.
pub fn default_startup_plan() -> StartupPlan {
    vec![
        factory(|config, _| CharacterRegistry::new(config)),
        factory(|_, _| ContactNetwork::new()),
        factory(|_, _| MercenaryPool::new()),
        factory(|_, _| LifeEvents::new()),
        factory(|_, _| DeathConsequences::new()),
        factory(|_, _| FameTracker::new()),
        factory(|config, _| HeatTracker::new(config)),
        factory(|config, _| HuntMissions::new(config)),
        factory(|config, _| WorldSimulation::new(config)),
        factory(DynamicEconomy::new),
        factory(|_, _| PriceFluctuation::new()),
        factory(|_, _| WorldNews::new()),
        factory(|_, _| EconomicNews::new()),
        factory(|_, _| NpcNews::new()),
    ]
}

/// Explicit simulation context owning the time engine and every manager.
pub struct WorldSystems {
    config: SimulationConfig,
    engine: TimeEngine,
    plan: StartupPlan,
    cleanups: Vec<(String, CleanupHook)>,
    initialized: bool,
    init_count: u64,
}

impl WorldSystems {
    /// A context with the standard startup plan. Nothing is started yet.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_plan(config, default_startup_plan())
    }

    /// A context with a custom startup plan.
    pub fn with_plan(config: SimulationConfig, plan: StartupPlan) -> Self {
        let engine = TimeEngine::new(&config);
        Self {
            config,
            engine,
            plan,
            cleanups: Vec::new(),
            initialized: false,
            init_count: 0,
        }
    }

    /// Build and start every manager in order.
    ///
    /// Returns `false` without touching anything when already initialized.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::ManagerStart`] naming the first manager
    /// that could not be registered or started. Managers started before it
    /// keep running; calling this again retries from the failed one.
    pub fn init_world_systems(&mut self) -> Result<bool, OrchestratorError> {
        if self.initialized {
            info!("World systems already initialized");
            return Ok(false);
        }

        let now = self.engine.now();
        for build in &self.plan {
            let manager = build(&self.config, now);
            let name = manager.name();
            if self.engine.is_started(name) {
                debug!(manager = name, "Manager left running by an earlier attempt");
                continue;
            }
            match self.engine.subscribe_boxed(manager) {
                Ok(()) | Err(EngineError::DuplicateManager { .. }) => {}
                Err(source) => {
                    return Err(OrchestratorError::ManagerStart {
                        manager: name,
                        source,
                    });
                }
            }
            self.engine
                .start(name)
                .map_err(|source| OrchestratorError::ManagerStart { manager: name, source })?;
            let hook: CleanupHook = Box::new(move |engine: &mut TimeEngine| {
                engine.stop(name)?;
                engine
                    .unsubscribe(name)
                    .map(drop)
                    .ok_or_else(|| EngineError::UnknownManager {
                        name: name.to_owned(),
                    })
            });
            self.cleanups.push((name.to_owned(), hook));
        }

        self.initialized = true;
        self.init_count = self.init_count.saturating_add(1);
        info!(
            managers = self.engine.managers().len(),
            at = %self.engine.now(),
            "World systems initialized"
        );
        Ok(true)
    }

    /// Register an extra callback run on cleanup, before the managers are
    /// stopped.
    pub fn register_cleanup(&mut self, name: &str, hook: CleanupHook) {
        self.cleanups.push((name.to_owned(), hook));
    }

    /// Run every cleanup hook newest first, logging and skipping failures,
    /// then mark the systems uninitialized. Returns how many hooks failed.
    pub fn cleanup_world_systems(&mut self) -> usize {
        let mut failed = 0_usize;
        while let Some((name, hook)) = self.cleanups.pop() {
            if let Err(err) = hook(&mut self.engine) {
                warn!(hook = %name, error = %err, "Cleanup step failed; continuing");
                failed = failed.saturating_add(1);
            }
        }
        self.initialized = false;
        info!(failed, "World systems cleaned up");
        failed
    }

    /// Whether [`init_world_systems`](Self::init_world_systems) completed
    /// and no cleanup has run since.
    pub const fn are_world_systems_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of completed initializations.
    pub const fn init_count(&self) -> u64 {
        self.init_count
    }

    // -----------------------------------------------------------------------
    // Driving time
    // -----------------------------------------------------------------------

    /// Advance game time by `hours`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Engine`] for a negative or non-finite
    /// delta; time is unchanged.
    pub fn advance_game_time(&mut self, hours: f64) -> Result<AdvanceOutcome, OrchestratorError> {
        Ok(self.engine.advance_hours(hours)?)
    }

    /// Advance by [`DEFAULT_ADVANCE_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Engine`] if the clock overflows.
    pub fn tick(&mut self) -> Result<AdvanceOutcome, OrchestratorError> {
        self.advance_game_time(DEFAULT_ADVANCE_HOURS)
    }

    /// Collapse `hours` of absence into one advance with a summary.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Engine`] for invalid input.
    pub fn catch_up(&mut self, hours: f64) -> Result<AdvanceOutcome, OrchestratorError> {
        let outcome = self.engine.catch_up(hours)?;
        if let Some(summary) = &outcome.summary {
            info!(
                hours = summary.hours_elapsed,
                highlights = summary.highlights.len(),
                "Caught up"
            );
        }
        Ok(outcome)
    }

    /// Catch up on the real time between two wall-clock instants.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Engine`] when `now` precedes `last_seen`.
    pub fn catch_up_between(
        &mut self,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, OrchestratorError> {
        Ok(self.engine.catch_up_between(last_seen, now)?)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current game time.
    pub const fn now(&self) -> GameTime {
        self.engine.now()
    }

    /// Configuration the systems were built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The time engine.
    pub const fn engine(&self) -> &TimeEngine {
        &self.engine
    }

    /// Mutable access to the time engine (pause, resume, manual control).
    pub const fn engine_mut(&mut self) -> &mut TimeEngine {
        &mut self.engine
    }

    /// Read-only access to any manager by type.
    pub fn manager<T: SimulationManager>(&self) -> Option<&T> {
        self.engine.manager::<T>()
    }

    /// Mutable access to any manager by type, for player actions between
    /// advances.
    pub fn manager_mut<T: SimulationManager>(&mut self) -> Option<&mut T> {
        self.engine.manager_mut::<T>()
    }

    /// The world simulation.
    pub fn world(&self) -> Option<&WorldSimulation> {
        self.manager()
    }

    /// The dynamic economy.
    pub fn economy(&self) -> Option<&DynamicEconomy> {
        self.manager()
    }

    /// Faction heat.
    pub fn heat(&self) -> Option<&HeatTracker> {
        self.manager()
    }

    /// Fame and reputation.
    pub fn fame(&self) -> Option<&FameTracker> {
        self.manager()
    }

    /// Hunt missions.
    pub fn hunts(&self) -> Option<&HuntMissions> {
        self.manager()
    }

    /// World events coverage.
    pub fn world_news(&self) -> Option<&WorldNews> {
        self.manager()
    }

    /// The `limit` newest articles across every news feed.
    pub fn headlines(&self, limit: usize) -> Vec<&NewsArticle> {
        let world = self
            .manager::<WorldNews>()
            .into_iter()
            .flat_map(|news| news.feed().all());
        let economic = self
            .manager::<EconomicNews>()
            .into_iter()
            .flat_map(|news| news.feed().all());
        let people = self
            .manager::<NpcNews>()
            .into_iter()
            .flat_map(|news| news.feed().all());
        let mut articles: Vec<&NewsArticle> = world.chain(economic).chain(people).collect();
        articles.sort_by_key(|article| Reverse(article.published_at));
        articles.truncate(limit);
        articles
    }

    /// Wrap the context for the auto-tick driver.
    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }
}

impl TickTarget for WorldSystems {
    fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    fn tick(&mut self) -> Result<AdvanceOutcome, EngineError> {
        self.engine.advance_hours(DEFAULT_ADVANCE_HOURS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_plan_builds_managers_in_dependency_order() {
        let config = SimulationConfig::default();
        let now = TimeEngine::new(&config).now();
        let names: Vec<&str> = default_startup_plan()
            .iter()
            .map(|build| build(&config, now).name())
            .collect();
        assert_eq!(
            names,
            vec![
                "character_registry",
                "contacts",
                "mercenary_pool",
                "life_events",
                "death_consequences",
                "fame",
                "heat",
                "hunt_missions",
                "world_simulation",
                "economy",
                "price_fluctuation",
                "world_news",
                "economic_news",
                "npc_news",
            ]
        );
    }

    #[test]
    fn default_tick_is_ten_minutes() {
        let mut systems = WorldSystems::with_plan(SimulationConfig::default(), Vec::new());
        let outcome = systems.tick().unwrap();
        assert_eq!(outcome.time.total_minutes, 10);
    }

    #[test]
    fn empty_plan_still_initializes_once() {
        let mut systems = WorldSystems::with_plan(SimulationConfig::default(), Vec::new());
        assert!(!systems.are_world_systems_initialized());
        assert!(systems.init_world_systems().unwrap());
        assert!(!systems.init_world_systems().unwrap());
        assert_eq!(systems.init_count(), 1);
        assert_eq!(systems.cleanup_world_systems(), 0);
        assert!(!systems.are_world_systems_initialized());
    }
}
