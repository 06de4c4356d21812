//! The player's fame and reputation.
//!
//! Fame (0-100) is how widely the player is known. Reputation (-100 to 100)
//! is whether they are known as a hero or a villain. Both are tracked
//! globally and per country; local standing moves half again as fast as the
//! global figure. Famous players fade a little every day they stay quiet.
//!
//! Big superhuman events keep locally known players in the conversation:
//! a major or critical sighting in a country where the player is at least
//! locally famous raises fame there, and only there.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use tactics_core::clock::game_time_at;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager, StartContext, SummaryWindow};
use tactics_types::{
    BoundaryKind, GameTime, Highlight, Severity, SimEvent, SummaryCategory, WorldEventCategory,
};
use tactics_world::starting_world;
use tracing::{debug, info};

use crate::error::AgentError;

/// Registry name of the fame tracker.
pub const FAME: &str = "fame";

/// Fame at or above which the player fades daily.
pub const DECAY_FLOOR: i32 = 40;

/// Fame at or above which the player fades twice as fast.
pub const FAST_DECAY_FLOOR: i32 = 70;

/// Fame events kept in history.
pub const HISTORY_LIMIT: usize = 50;

/// What the player did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FameEventKind {
    /// Saved lives, stopped a crime.
    HeroicAct,
    /// Hurt innocents, broke the law.
    VillainAct,
    /// Fought in the open.
    PublicBattle,
    /// Made the news.
    MediaCoverage,
    /// Went viral.
    ViralMoment,
    /// Faded from memory.
    TimeDecay,
}

/// How big it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    /// Barely noticed.
    Minor,
    /// Local talk.
    Moderate,
    /// National story.
    Major,
    /// History books.
    Legendary,
}

impl FameEventKind {
    /// Base fame and reputation change.
    pub const fn base_change(self, magnitude: Magnitude) -> (i32, i32) {
        use Magnitude::{Legendary, Major, Minor, Moderate};
        match (self, magnitude) {
            (Self::HeroicAct, Minor) => (2, 5),
            (Self::HeroicAct, Moderate) => (5, 10),
            (Self::HeroicAct, Major) => (10, 20),
            (Self::HeroicAct, Legendary) => (25, 40),
            (Self::VillainAct, Minor) => (1, -5),
            (Self::VillainAct, Moderate) => (3, -10),
            (Self::VillainAct, Major) => (8, -25),
            (Self::VillainAct, Legendary) => (20, -50),
            (Self::PublicBattle, Minor) => (3, 0),
            (Self::PublicBattle, Moderate) => (7, 0),
            (Self::PublicBattle, Major) => (15, 0),
            (Self::PublicBattle, Legendary) => (30, 0),
            (Self::MediaCoverage, Minor) => (5, 0),
            (Self::MediaCoverage, Moderate) => (10, 0),
            (Self::MediaCoverage, Major) => (20, 0),
            (Self::MediaCoverage, Legendary) => (35, 0),
            (Self::ViralMoment, Minor) => (3, 0),
            (Self::ViralMoment, Moderate) => (8, 0),
            (Self::ViralMoment, Major) => (15, 0),
            (Self::ViralMoment, Legendary) => (25, 0),
            (Self::TimeDecay, Minor) => (-1, 0),
            (Self::TimeDecay, Moderate) => (-2, 0),
            (Self::TimeDecay, Major) => (-3, 0),
            (Self::TimeDecay, Legendary) => (-5, 0),
        }
    }
}

/// Fame bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FameLevel {
    /// Nobody knows you.
    Unknown,
    /// Known around the neighborhood.
    Local,
    /// Known across the region.
    Regional,
    /// Household name.
    National,
    /// Known worldwide.
    International,
    /// Myth.
    Legendary,
}

impl FameLevel {
    /// Bracket a fame value.
    pub const fn from_fame(fame: i32) -> Self {
        match fame {
            ..10 => Self::Unknown,
            10..30 => Self::Local,
            30..50 => Self::Regional,
            50..70 => Self::National,
            70..90 => Self::International,
            _ => Self::Legendary,
        }
    }
}

/// How the public reads the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationType {
    /// Reputation of 25 or more.
    Hero,
    /// Reputation of -25 or less.
    Villain,
    /// Everything in between.
    Neutral,
}

impl ReputationType {
    /// Classify a reputation value.
    pub const fn from_reputation(reputation: i32) -> Self {
        if reputation >= 25 {
            Self::Hero
        } else if reputation <= -25 {
            Self::Villain
        } else {
            Self::Neutral
        }
    }
}

/// Something the player did that people noticed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FameEvent {
    /// What happened.
    pub kind: FameEventKind,
    /// How big it was.
    pub magnitude: Magnitude,
    /// Where it happened, if anywhere in particular.
    pub country_code: Option<String>,
    /// Whether it happened in front of the public.
    pub public: bool,
    /// One-line description.
    pub description: String,
}

/// Fame and reputation in one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Fame, 0-100.
    pub fame: i32,
    /// Reputation, -100 to 100.
    pub reputation: i32,
}

/// What an applied event changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FameChange {
    /// The event.
    pub event: FameEvent,
    /// When it was applied.
    pub at: GameTime,
    /// Change to global fame.
    pub fame_change: i32,
    /// Change to global reputation.
    pub reputation_change: i32,
    /// Global fame afterwards.
    pub fame: i32,
    /// Global reputation afterwards.
    pub reputation: i32,
}

impl FameChange {
    /// Whether this counts as a major event.
    pub const fn is_major(&self) -> bool {
        self.fame_change.abs() >= 5 || self.reputation_change.abs() >= 10
    }
}

/// Local fame a superhuman event of this severity adds where the player is
/// already known.
pub const fn superhuman_buzz(severity: Severity) -> i32 {
    match severity {
        Severity::Minor | Severity::Normal => 0,
        Severity::Major => 1,
        Severity::Critical => 3,
    }
}

/// Multiply by 1.5, rounding halves up.
const fn half_again(value: i32) -> i32 {
    value.saturating_mul(3).saturating_add(1).div_euclid(2)
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct FameUpdate {
    now: Option<GameTime>,
    decay: Option<Magnitude>,
    buzz: Vec<(String, i32)>,
}

/// Tracks the player's fame and reputation.
#[derive(Debug, Clone)]
pub struct FameTracker {
    fame: i32,
    reputation: i32,
    regional: BTreeMap<String, Standing>,
    last_major: Option<FameChange>,
    history: VecDeque<FameChange>,
    now: GameTime,
}

impl Default for FameTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FameTracker {
    /// An unknown, neutral player.
    pub fn new() -> Self {
        Self {
            fame: 0,
            reputation: 0,
            regional: BTreeMap::new(),
            last_major: None,
            history: VecDeque::new(),
            now: game_time_at(0),
        }
    }

    /// Global fame.
    pub const fn fame(&self) -> i32 {
        self.fame
    }

    /// Global reputation.
    pub const fn reputation(&self) -> i32 {
        self.reputation
    }

    /// Global fame bracket.
    pub const fn level(&self) -> FameLevel {
        FameLevel::from_fame(self.fame)
    }

    /// Global hero/villain reading.
    pub const fn reputation_type(&self) -> ReputationType {
        ReputationType::from_reputation(self.reputation)
    }

    /// Standing in one country; falls back to the global figures.
    pub fn standing_in(&self, country_code: &str) -> Standing {
        self.regional.get(country_code).copied().unwrap_or(Standing {
            fame: self.fame,
            reputation: self.reputation,
        })
    }

    /// The most recent major event.
    pub const fn last_major_event(&self) -> Option<&FameChange> {
        self.last_major.as_ref()
    }

    /// Applied events, newest first.
    pub fn history(&self) -> impl Iterator<Item = &FameChange> {
        self.history.iter()
    }

    fn decay(&self) -> Option<Magnitude> {
        if self.fame >= FAST_DECAY_FLOOR {
            Some(Magnitude::Moderate)
        } else if self.fame >= DECAY_FLOOR {
            Some(Magnitude::Minor)
        } else {
            None
        }
    }

    /// Apply an event right away.
    pub fn apply_event(&mut self, event: FameEvent) -> Result<FameChange, AgentError> {
        if let Some(code) = &event.country_code {
            if starting_world::country(code).is_none() {
                return Err(AgentError::UnknownCountry(code.clone()));
            }
        }
        let (base_fame, reputation_change) = event.kind.base_change(event.magnitude);
        let fame_change = if event.public { half_again(base_fame) } else { base_fame };

        if let Some(code) = &event.country_code {
            let current = self.standing_in(code);
            self.regional.insert(
                code.clone(),
                Standing {
                    fame: current.fame.saturating_add(half_again(fame_change)).clamp(0, 100),
                    reputation: current
                        .reputation
                        .saturating_add(half_again(reputation_change))
                        .clamp(-100, 100),
                },
            );
        }
        self.fame = self.fame.saturating_add(fame_change).clamp(0, 100);
        self.reputation = self
            .reputation
            .saturating_add(reputation_change)
            .clamp(-100, 100);

        let change = FameChange {
            event,
            at: self.now,
            fame_change,
            reputation_change,
            fame: self.fame,
            reputation: self.reputation,
        };
        if change.is_major() {
            info!(
                fame = self.fame,
                reputation = self.reputation,
                description = %change.event.description,
                "Major fame event"
            );
            self.last_major = Some(change.clone());
        }
        self.history.push_front(change.clone());
        self.history.truncate(HISTORY_LIMIT);
        Ok(change)
    }
}

impl SimulationManager for FameTracker {
    type Update = FameUpdate;

    fn name(&self) -> &'static str {
        FAME
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.now = ctx.now;
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<FameUpdate, ManagerError> {
        let buzz = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::World(world) if world.category == WorldEventCategory::Superhuman => {
                    Some(world.as_ref())
                }
                _ => None,
            })
            .filter(|world| {
                self.regional
                    .get(&world.country_code)
                    .is_some_and(|standing| FameLevel::from_fame(standing.fame) >= FameLevel::Local)
            })
            .map(|world| (world.country_code.clone(), superhuman_buzz(world.severity)))
            .filter(|(_, amount)| *amount > 0)
            .collect();
        Ok(FameUpdate {
            now: Some(*ctx.now()),
            decay: if ctx.kind() == BoundaryKind::Day {
                self.decay()
            } else {
                None
            },
            buzz,
        })
    }

    fn commit(&mut self, update: FameUpdate) {
        if let Some(now) = update.now {
            self.now = now;
        }
        for (code, amount) in update.buzz {
            if let Some(standing) = self.regional.get_mut(&code) {
                standing.fame = standing.fame.saturating_add(amount).clamp(0, 100);
                debug!(country = %code, fame = standing.fame, "Superhuman sighting raised local fame");
            }
        }
        if let Some(magnitude) = update.decay {
            let faded = self.apply_event(FameEvent {
                kind: FameEventKind::TimeDecay,
                magnitude,
                country_code: None,
                public: false,
                description: "Out of the headlines".to_owned(),
            });
            if let Ok(change) = faded {
                debug!(fame = change.fame, "Fame faded");
            }
        }
    }

    fn highlights(&self, window: &SummaryWindow<'_>) -> Vec<Highlight> {
        self.history
            .iter()
            .filter(|change| change.at > window.from && change.at <= window.to)
            .filter(|change| change.is_major())
            .map(|change| Highlight {
                source: FAME.to_owned(),
                category: SummaryCategory::Personal,
                severity: if change.fame_change.abs() >= 20 {
                    Severity::Major
                } else {
                    Severity::Normal
                },
                headline: change.event.description.clone(),
                at: change.at,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use tactics_core::{SimulationConfig, TimeEngine};
    use tactics_world::WorldSimulation;
    use tactics_world::world_sim::WORLD_SIMULATION;

    use super::*;

    fn event(kind: FameEventKind, magnitude: Magnitude, country: Option<&str>, public: bool) -> FameEvent {
        FameEvent {
            kind,
            magnitude,
            country_code: country.map(str::to_owned),
            public,
            description: format!("{kind:?} {magnitude:?}"),
        }
    }

    #[test]
    fn brackets() {
        assert_eq!(FameLevel::from_fame(0), FameLevel::Unknown);
        assert_eq!(FameLevel::from_fame(10), FameLevel::Local);
        assert_eq!(FameLevel::from_fame(69), FameLevel::National);
        assert_eq!(FameLevel::from_fame(90), FameLevel::Legendary);
        assert_eq!(ReputationType::from_reputation(25), ReputationType::Hero);
        assert_eq!(ReputationType::from_reputation(-24), ReputationType::Neutral);
        assert_eq!(ReputationType::from_reputation(-25), ReputationType::Villain);
    }

    #[test]
    fn public_heroics_spread_faster_locally() {
        let mut tracker = FameTracker::new();
        let change = tracker
            .apply_event(event(FameEventKind::HeroicAct, Magnitude::Major, Some("US"), true))
            .unwrap();
        assert_eq!(change.fame_change, 15);
        assert_eq!(change.reputation_change, 20);
        assert!(change.is_major());

        assert_eq!(tracker.fame(), 15);
        assert_eq!(tracker.level(), FameLevel::Local);
        let us = tracker.standing_in("US");
        // 15 * 1.5 = 22.5 rounds up; 20 * 1.5 = 30
        assert_eq!(us, Standing { fame: 23, reputation: 30 });
        assert_eq!(tracker.standing_in("JP"), Standing { fame: 15, reputation: 20 });
        assert!(tracker.last_major_event().is_some());
    }

    #[test]
    fn values_stay_in_range() {
        let mut tracker = FameTracker::new();
        for _ in 0..5 {
            tracker
                .apply_event(event(FameEventKind::VillainAct, Magnitude::Legendary, Some("RU"), true))
                .unwrap();
        }
        assert_eq!(tracker.fame(), 100);
        assert_eq!(tracker.reputation(), -100);
        assert_eq!(tracker.reputation_type(), ReputationType::Villain);
        assert_eq!(tracker.standing_in("RU"), Standing { fame: 100, reputation: -100 });

        assert_eq!(
            tracker
                .apply_event(event(FameEventKind::ViralMoment, Magnitude::Minor, Some("ZZ"), false))
                .map(|change| change.fame),
            Err(AgentError::UnknownCountry("ZZ".to_owned()))
        );
    }

    #[test]
    fn minor_events_are_not_major() {
        let mut tracker = FameTracker::new();
        let change = tracker
            .apply_event(event(FameEventKind::HeroicAct, Magnitude::Minor, None, false))
            .unwrap();
        assert!(!change.is_major());
        assert!(tracker.last_major_event().is_none());
    }

    #[test]
    fn famous_players_fade_daily() {
        let mut engine = TimeEngine::new(&SimulationConfig::default());
        engine.subscribe(FameTracker::new()).unwrap();
        engine.start(FAME).unwrap();

        let tracker = engine.manager_mut::<FameTracker>().unwrap();
        tracker
            .apply_event(event(FameEventKind::MediaCoverage, Magnitude::Legendary, None, false))
            .unwrap();
        tracker
            .apply_event(event(FameEventKind::HeroicAct, Magnitude::Moderate, None, false))
            .unwrap();
        assert_eq!(tracker.fame(), 40);

        engine.advance_hours(24.0).unwrap();
        assert_eq!(engine.manager::<FameTracker>().unwrap().fame(), 39);

        engine.advance_hours(24.0 * 5.0).unwrap();
        assert_eq!(engine.manager::<FameTracker>().unwrap().fame(), 39);

        let tracker = engine.manager_mut::<FameTracker>().unwrap();
        tracker
            .apply_event(event(FameEventKind::MediaCoverage, Magnitude::Legendary, None, false))
            .unwrap();
        assert_eq!(tracker.fame(), 74);
        engine.advance_hours(24.0 * 3.0).unwrap();
        // 74 -> 72 -> 70 -> 68
        assert_eq!(engine.manager::<FameTracker>().unwrap().fame(), 68);
    }

    fn sighting(country: &str, severity: Severity) -> tactics_types::WorldEvent {
        tactics_types::WorldEvent {
            id: tactics_types::WorldEventId::new(),
            category: WorldEventCategory::Superhuman,
            country_code: country.to_owned(),
            city: None,
            severity,
            headline: "Sighting".to_owned(),
            description: String::new(),
            effects: Vec::new(),
            created_at: game_time_at(0),
            expires_at: None,
        }
    }

    #[test]
    fn sightings_raise_fame_only_where_the_player_is_known() {
        let mut config = SimulationConfig::default();
        config.world_events = tactics_core::config::WorldEventRates {
            gang_territory: 0.0,
            political: 0.0,
            economic: 0.0,
            crime_wave: 0.0,
            superhuman: 0.0,
            natural_disaster: 0.0,
            military: 0.0,
            social: 0.0,
        };
        let mut engine = TimeEngine::new(&config);
        engine.subscribe(FameTracker::new()).unwrap();
        engine.subscribe(WorldSimulation::new(&config)).unwrap();
        engine.start(FAME).unwrap();
        engine.start(WORLD_SIMULATION).unwrap();

        // Public heroics: 8 fame globally, 12 in the US.
        engine
            .manager_mut::<FameTracker>()
            .unwrap()
            .apply_event(event(FameEventKind::HeroicAct, Magnitude::Moderate, Some("US"), true))
            .unwrap();
        assert_eq!(engine.manager::<FameTracker>().unwrap().standing_in("US").fame, 12);

        let world = engine.manager_mut::<WorldSimulation>().unwrap();
        world.schedule(sighting("US", Severity::Critical)).unwrap();
        world.schedule(sighting("US", Severity::Normal)).unwrap();
        world.schedule(sighting("JP", Severity::Critical)).unwrap();
        engine.advance_hours(2.0).unwrap();

        let tracker = engine.manager::<FameTracker>().unwrap();
        assert_eq!(tracker.standing_in("US").fame, 15);
        assert_eq!(tracker.fame(), 8);
        assert_eq!(tracker.standing_in("JP").fame, 8);
    }
}
