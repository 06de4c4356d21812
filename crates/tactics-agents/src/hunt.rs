//! Hunt missions: factions sending people after the player.
//!
//! When a country's heat climbs into a hotter bracket and the hottest
//! faction is past the hunt threshold, that faction issues a hunt. The
//! bounty level sets how soon the hunters arrive, how long they keep
//! looking, and what the player can loot from them. The press never hunts.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use tactics_core::{BoundaryContext, ManagerError, SimulationConfig, SimulationManager, SummaryWindow};
use tactics_types::{
    BoundaryKind, FactionType, GameTime, HeatShift, Highlight, MINUTES_PER_HOUR, MissionId,
    Severity, SimEvent, SummaryCategory,
};
use tracing::{debug, info};

use crate::error::AgentError;

/// Registry name of the hunt-mission manager.
pub const HUNT_MISSIONS: &str = "hunt_missions";

/// Finished missions kept for inspection; open missions are never dropped.
pub const CLOSED_HISTORY_LIMIT: usize = 50;

/// How badly a faction wants the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BountyLevel {
    /// Routine.
    Minor,
    /// Priority target.
    Major,
    /// Dead or alive, whatever it takes.
    Extreme,
}

impl BountyLevel {
    /// Bracket a faction's heat.
    pub fn from_heat(heat: f64) -> Self {
        if heat >= 80.0 {
            Self::Extreme
        } else if heat >= 70.0 {
            Self::Major
        } else {
            Self::Minor
        }
    }

    /// Hours between issue and the hunters arriving.
    pub const fn activation_delay_hours(self) -> u64 {
        match self {
            Self::Minor => 48,
            Self::Major => 24,
            Self::Extreme => 12,
        }
    }

    /// Hours the hunters keep looking once active.
    pub const fn duration_hours(self) -> u64 {
        match self {
            Self::Minor => 168,
            Self::Major => 336,
            Self::Extreme => 672,
        }
    }

    /// Price on the player's head.
    pub const fn bounty(self) -> Decimal {
        match self {
            Self::Minor => Decimal::from_parts(5_000, 0, 0, false, 0),
            Self::Major => Decimal::from_parts(25_000, 0, 0, false, 0),
            Self::Extreme => Decimal::from_parts(100_000, 0, 0, false, 0),
        }
    }

    /// What the player can take off defeated hunters: a tenth of the bounty.
    pub const fn reward(self) -> Decimal {
        match self {
            Self::Minor => Decimal::from_parts(500, 0, 0, false, 0),
            Self::Major => Decimal::from_parts(2_500, 0, 0, false, 0),
            Self::Extreme => Decimal::from_parts(10_000, 0, 0, false, 0),
        }
    }
}

/// Who gets sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntType {
    /// Officers with a warrant.
    ArrestSquad,
    /// Soldiers with orders to shoot.
    KillSquad,
    /// Professional assassins.
    HitTeam,
    /// Freelancers after the bounty.
    BountyHunters,
    /// A trap on the player's route.
    Ambush,
}

impl HuntType {
    /// Hunt types a faction can field.
    pub const fn fielded_by(faction: FactionType) -> &'static [Self] {
        match faction {
            FactionType::Police => &[Self::ArrestSquad],
            FactionType::Military => &[Self::KillSquad],
            FactionType::Government => &[Self::ArrestSquad, Self::HitTeam],
            FactionType::Media => &[],
            FactionType::Corporations => &[Self::HitTeam, Self::BountyHunters],
            FactionType::Underworld => &[Self::KillSquad, Self::BountyHunters, Self::Ambush],
        }
    }
}

/// Where a mission stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Issued, hunters not yet in place.
    Pending,
    /// Hunters are looking.
    Active,
    /// The player beat them.
    Defeated,
    /// The player got away.
    Escaped,
    /// The hunters gave up.
    Expired,
    /// The player was taken.
    Captured,
}

impl MissionStatus {
    /// Whether the mission is still running.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

/// How an encounter with hunters ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntOutcome {
    /// The player won the fight.
    Defeated,
    /// The player got away for good.
    PlayerEscaped,
    /// The hunters slipped away and will be back.
    HuntersEscaped,
    /// The player was taken.
    Captured,
}

/// A faction's hunt for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HuntMission {
    /// Identifier.
    pub id: MissionId,
    /// Issuing faction.
    pub faction: FactionType,
    /// Country it runs in.
    pub country_code: String,
    /// Who was sent.
    pub kind: HuntType,
    /// Bounty level.
    pub bounty: BountyLevel,
    /// Price on the player's head.
    pub bounty_amount: Decimal,
    /// Loot if the hunters are defeated.
    pub reward: Decimal,
    /// Current status.
    pub status: MissionStatus,
    /// When it was issued.
    pub issued_at: GameTime,
    /// Game minute the hunters arrive.
    pub activates_at: u64,
    /// Game minute they give up.
    pub expires_at: u64,
    /// Times the player ran into them.
    pub encounters: u32,
}

impl HuntMission {
    fn issue<R: Rng + ?Sized>(rng: &mut R, shift: &HeatShift, now: GameTime) -> Option<Self> {
        let kind = *HuntType::fielded_by(shift.hottest_faction).choose(rng)?;
        let bounty = BountyLevel::from_heat(shift.faction_heat);
        let activates_at = now.total_minutes.saturating_add(
            bounty
                .activation_delay_hours()
                .saturating_mul(MINUTES_PER_HOUR),
        );
        Some(Self {
            id: MissionId::from_rng(rng),
            faction: shift.hottest_faction,
            country_code: shift.country_code.clone(),
            kind,
            bounty,
            bounty_amount: bounty.bounty(),
            reward: bounty.reward(),
            status: MissionStatus::Pending,
            issued_at: now,
            activates_at,
            expires_at: activates_at
                .saturating_add(bounty.duration_hours().saturating_mul(MINUTES_PER_HOUR)),
            encounters: 0,
        })
    }

    fn headline(&self) -> String {
        format!(
            "{:?} put a {:?} bounty on you in {}",
            self.faction, self.bounty, self.country_code
        )
    }
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct HuntUpdate {
    issued: Vec<HuntMission>,
    transitions: Vec<(MissionId, MissionStatus)>,
}

/// Issues hunts and tracks them to their end.
#[derive(Debug, Clone)]
pub struct HuntMissions {
    threshold: f64,
    missions: Vec<HuntMission>,
    standing: BTreeMap<FactionType, i32>,
    loot: Decimal,
}

impl HuntMissions {
    /// No hunts yet; issues them at the configured heat threshold.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            threshold: config.heat.hunt_threshold,
            missions: Vec::new(),
            standing: BTreeMap::new(),
            loot: Decimal::ZERO,
        }
    }

    /// Every mission, oldest first.
    pub fn missions(&self) -> &[HuntMission] {
        &self.missions
    }

    /// A mission by id.
    pub fn mission(&self, id: MissionId) -> Option<&HuntMission> {
        self.missions.iter().find(|mission| mission.id == id)
    }

    /// Missions still running.
    pub fn open(&self) -> impl Iterator<Item = &HuntMission> {
        self.missions.iter().filter(|mission| mission.status.is_open())
    }

    /// Hunters currently looking for the player in a country.
    pub fn active_in<'a>(&'a self, country_code: &'a str) -> impl Iterator<Item = &'a HuntMission> {
        self.missions.iter().filter(move |mission| {
            mission.status == MissionStatus::Active && mission.country_code == country_code
        })
    }

    /// The player's standing with a faction; starts at zero.
    pub fn standing(&self, faction: FactionType) -> i32 {
        self.standing.get(&faction).copied().unwrap_or(0)
    }

    /// Loot taken from defeated hunters.
    pub const fn loot(&self) -> Decimal {
        self.loot
    }

    /// Record how an encounter with hunters ended.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn resolve(&mut self, id: MissionId, outcome: HuntOutcome) -> Result<&HuntMission, AgentError> {
        let index = self
            .missions
            .iter()
            .position(|mission| mission.id == id)
            .ok_or(AgentError::MissionNotFound(id))?;
        let mission = self
            .missions
            .get_mut(index)
            .ok_or(AgentError::MissionNotFound(id))?;
        if !mission.status.is_open() {
            return Err(AgentError::MissionClosed(id));
        }
        let standing = self.standing.entry(mission.faction).or_insert(0);
        match outcome {
            HuntOutcome::Defeated => {
                mission.status = MissionStatus::Defeated;
                *standing = standing.saturating_sub(10);
                self.loot += mission.reward;
            }
            HuntOutcome::PlayerEscaped => {
                mission.status = MissionStatus::Escaped;
                mission.encounters = mission.encounters.saturating_add(1);
                *standing = standing.saturating_sub(2);
            }
            HuntOutcome::HuntersEscaped => {
                mission.status = MissionStatus::Active;
                mission.encounters = mission.encounters.saturating_add(1);
            }
            HuntOutcome::Captured => mission.status = MissionStatus::Captured,
        }
        info!(mission = %id, ?outcome, status = ?mission.status, "Hunt encounter resolved");
        self.missions
            .get(index)
            .ok_or(AgentError::MissionNotFound(id))
    }

    /// Drop the oldest finished missions beyond [`CLOSED_HISTORY_LIMIT`].
    fn prune_closed(&mut self) {
        let closed = self
            .missions
            .iter()
            .filter(|mission| !mission.status.is_open())
            .count();
        let mut excess = closed.saturating_sub(CLOSED_HISTORY_LIMIT);
        if excess == 0 {
            return;
        }
        self.missions.retain(|mission| {
            if excess > 0 && !mission.status.is_open() {
                excess = excess.saturating_sub(1);
                false
            } else {
                true
            }
        });
        debug!(kept = self.missions.len(), "Pruned finished hunt missions");
    }

    fn wants_hunt(&self, shift: &HeatShift) -> bool {
        shift.to > shift.from
            && shift.faction_heat >= self.threshold
            && !HuntType::fielded_by(shift.hottest_faction).is_empty()
            && !self.open().any(|mission| {
                mission.faction == shift.hottest_faction
                    && mission.country_code == shift.country_code
            })
    }
}

impl SimulationManager for HuntMissions {
    type Update = HuntUpdate;

    fn name(&self) -> &'static str {
        HUNT_MISSIONS
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<HuntUpdate, ManagerError> {
        let now = *ctx.now();
        let shifts: Vec<&HeatShift> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Heat(shift) => Some(shift.as_ref()),
                _ => None,
            })
            .filter(|shift| self.wants_hunt(shift))
            .collect();

        let mut issued: Vec<HuntMission> = Vec::new();
        for shift in shifts {
            let duplicate = issued.iter().any(|mission| {
                mission.faction == shift.hottest_faction && mission.country_code == shift.country_code
            });
            if duplicate {
                continue;
            }
            if let Some(mission) = HuntMission::issue(ctx.rng(), shift, now) {
                issued.push(mission);
            }
        }

        let transitions = if ctx.kind() == BoundaryKind::Hour {
            let minute = now.total_minutes;
            self.open()
                .filter_map(|mission| match mission.status {
                    MissionStatus::Active if minute >= mission.expires_at => {
                        Some((mission.id, MissionStatus::Expired))
                    }
                    MissionStatus::Pending if minute >= mission.activates_at => {
                        Some((mission.id, MissionStatus::Active))
                    }
                    _ => None,
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(HuntUpdate {
            issued,
            transitions,
        })
    }

    fn commit(&mut self, update: HuntUpdate) {
        for (id, status) in update.transitions {
            if let Some(mission) = self.missions.iter_mut().find(|mission| mission.id == id) {
                mission.status = status;
                debug!(mission = %id, ?status, "Hunt mission moved on");
            }
        }
        for mission in update.issued {
            info!(
                faction = ?mission.faction,
                country = %mission.country_code,
                kind = ?mission.kind,
                bounty = ?mission.bounty,
                "Hunt mission issued"
            );
            self.missions.push(mission);
        }
        self.prune_closed();
    }

    fn highlights(&self, window: &SummaryWindow<'_>) -> Vec<Highlight> {
        self.missions
            .iter()
            .filter(|mission| mission.issued_at > window.from && mission.issued_at <= window.to)
            .map(|mission| Highlight {
                source: HUNT_MISSIONS.to_owned(),
                category: SummaryCategory::Faction,
                severity: match mission.bounty {
                    BountyLevel::Minor => Severity::Normal,
                    BountyLevel::Major => Severity::Major,
                    BountyLevel::Extreme => Severity::Critical,
                },
                headline: mission.headline(),
                at: mission.issued_at,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use tactics_core::TimeEngine;
    use tactics_types::HeatLevel;
    use tactics_core::clock::game_time_at;

    use super::*;
    use crate::heat::{HEAT, HeatTracker};

    fn engine() -> TimeEngine {
        let config = SimulationConfig::default();
        let mut engine = TimeEngine::new(&config);
        engine.subscribe(HeatTracker::new(&config)).unwrap();
        engine.subscribe(HuntMissions::new(&config)).unwrap();
        engine.start(HEAT).unwrap();
        engine.start(HUNT_MISSIONS).unwrap();
        engine
    }

    fn heat(engine: &mut TimeEngine, country: &str, faction: FactionType, amount: f64) {
        engine
            .manager_mut::<HeatTracker>()
            .unwrap()
            .add_heat(country, faction, amount)
            .unwrap();
    }

    #[test]
    fn bounty_brackets() {
        assert_eq!(BountyLevel::from_heat(65.0), BountyLevel::Minor);
        assert_eq!(BountyLevel::from_heat(70.0), BountyLevel::Major);
        assert_eq!(BountyLevel::from_heat(99.0), BountyLevel::Extreme);
        assert_eq!(BountyLevel::Major.reward(), dec!(2500));
        assert!(HuntType::fielded_by(FactionType::Media).is_empty());
    }

    #[test]
    fn rising_heat_issues_one_hunt_per_faction() {
        let mut engine = engine();
        heat(&mut engine, "NG", FactionType::Military, 75.0);
        engine.advance_hours(1.0).unwrap();

        let hunts = engine.manager::<HuntMissions>().unwrap();
        let mission = hunts.missions().first().unwrap().clone();
        assert_eq!(hunts.missions().len(), 1);
        assert_eq!(mission.kind, HuntType::KillSquad);
        assert_eq!(mission.bounty, BountyLevel::Major);
        assert_eq!(mission.status, MissionStatus::Pending);
        assert_eq!(mission.activates_at, 60 + 24 * 60);

        // Inferno is a hotter bracket but the military is already hunting.
        heat(&mut engine, "NG", FactionType::Military, 15.0);
        engine.advance_hours(1.0).unwrap();
        assert_eq!(engine.manager::<HuntMissions>().unwrap().missions().len(), 1);

        engine.advance_hours(23.0).unwrap();
        let hunts = engine.manager::<HuntMissions>().unwrap();
        assert_eq!(hunts.active_in("NG").count(), 1);
    }

    #[test]
    fn the_press_never_hunts() {
        let mut engine = engine();
        heat(&mut engine, "BR", FactionType::Media, 95.0);
        engine.advance_hours(2.0).unwrap();
        assert!(engine.manager::<HuntMissions>().unwrap().missions().is_empty());
    }

    #[test]
    fn heat_below_threshold_is_ignored() {
        let mut engine = engine();
        heat(&mut engine, "DE", FactionType::Police, 45.0);
        engine.advance_hours(2.0).unwrap();
        assert!(engine.manager::<HuntMissions>().unwrap().missions().is_empty());
    }

    #[test]
    fn resolving_encounters() {
        let mut engine = engine();
        heat(&mut engine, "MX", FactionType::Underworld, 85.0);
        engine.advance_hours(13.0).unwrap();

        let hunts = engine.manager_mut::<HuntMissions>().unwrap();
        let id = hunts.missions().first().unwrap().id;
        assert_eq!(hunts.mission(id).unwrap().status, MissionStatus::Active);

        let mission = hunts.resolve(id, HuntOutcome::HuntersEscaped).unwrap();
        assert_eq!(mission.status, MissionStatus::Active);
        assert_eq!(mission.encounters, 1);

        let mission = hunts.resolve(id, HuntOutcome::Defeated).unwrap();
        assert_eq!(mission.status, MissionStatus::Defeated);
        assert_eq!(hunts.loot(), dec!(10000));
        assert_eq!(hunts.standing(FactionType::Underworld), -10);
        assert_eq!(
            hunts.resolve(id, HuntOutcome::Captured),
            Err(AgentError::MissionClosed(id))
        );
        let unknown = MissionId::new();
        assert_eq!(
            hunts.resolve(unknown, HuntOutcome::Defeated),
            Err(AgentError::MissionNotFound(unknown))
        );
    }

    #[test]
    fn hunters_give_up_eventually() {
        let mut engine = engine();
        heat(&mut engine, "US", FactionType::Police, 62.0);
        engine.advance_hours(1.0).unwrap();
        let id = engine.manager::<HuntMissions>().unwrap().missions().first().unwrap().id;

        engine.advance_hours(48.0 + 168.0).unwrap();
        let mission = engine.manager::<HuntMissions>().unwrap().mission(id).unwrap().clone();
        assert_eq!(mission.status, MissionStatus::Expired);
        assert_eq!(mission.kind, HuntType::ArrestSquad);
    }

    #[test]
    fn finished_missions_are_pruned_oldest_first() {
        let mut hunts = HuntMissions::new(&SimulationConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let shift = HeatShift {
            country_code: "US".to_owned(),
            hottest_faction: FactionType::Police,
            faction_heat: 65.0,
            from: HeatLevel::Cold,
            to: HeatLevel::Blazing,
            at: game_time_at(0),
        };
        for minute in 0..60 {
            let mut mission = HuntMission::issue(&mut rng, &shift, game_time_at(minute)).unwrap();
            mission.status = if minute == 0 {
                MissionStatus::Active
            } else {
                MissionStatus::Expired
            };
            hunts.missions.push(mission);
        }
        hunts.commit(HuntUpdate::default());

        assert_eq!(hunts.missions().len(), CLOSED_HISTORY_LIMIT + 1);
        assert_eq!(hunts.open().count(), 1);
        let oldest_closed = hunts.missions().get(1).unwrap();
        assert_eq!(oldest_closed.issued_at.total_minutes, 10);
    }

    #[test]
    fn highlights_cover_missions_issued_in_the_window() {
        let mut engine = engine();
        heat(&mut engine, "RU", FactionType::Government, 90.0);
        engine.advance_hours(1.0).unwrap();
        let hunts = engine.manager::<HuntMissions>().unwrap();

        let inside = hunts.highlights(&SummaryWindow {
            from: game_time_at(0),
            to: game_time_at(120),
            emitted: &[],
        });
        assert_eq!(inside.len(), 1);
        let highlight = inside.first().unwrap();
        assert_eq!(highlight.category, SummaryCategory::Faction);
        assert_eq!(highlight.severity, Severity::Critical);

        let later = hunts.highlights(&SummaryWindow {
            from: game_time_at(60),
            to: game_time_at(600),
            emitted: &[],
        });
        assert!(later.is_empty());
    }
}
