//! Faction heat: how hard each faction in each country is looking for the
//! player.
//!
//! Heat rises through player actions, directly or from a combat report, and
//! decays every hour at a rate set by the country's surveillance. Decay is
//! held off for a few hours after each increase. World events put the
//! matching faction on alert: crime waves and gang wars bring police
//! crackdowns, superhuman sightings bring the press, and military or
//! political upheaval bring the army and the government. An alert only
//! sharpens heat a faction already holds; nobody starts looking for the
//! player because of the news alone. Whenever a country's heat bracket
//! changes, a [`HeatShift`] goes out so hunt missions can react.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tactics_core::clock::game_time_at;
use tactics_core::config::HeatConfig;
use tactics_core::{BoundaryContext, ManagerError, SimulationConfig, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, FactionType, GameTime, HeatLevel, HeatShift, MINUTES_PER_HOUR, Severity,
    SimEvent, WorldEvent, WorldEventCategory,
};
use tactics_world::starting_world::{self, COUNTRIES};
use tracing::{debug, info};

use crate::error::AgentError;

/// Registry name of the heat tracker.
pub const HEAT: &str = "heat";

/// Shifts kept for inspection.
pub const SHIFT_LOG_LIMIT: usize = 50;

/// Hourly heat decay for a country's surveillance level.
pub const fn decay_rate(surveillance: i32) -> f64 {
    match surveillance {
        80.. => 0.3,
        60..80 => 0.5,
        40..60 => 0.75,
        20..40 => 1.0,
        _ => 1.5,
    }
}

/// Faction put on alert by a world event, and the heat it adds to a
/// player that faction is already after.
pub const fn world_event_alert(
    category: WorldEventCategory,
    severity: Severity,
) -> Option<(FactionType, f64)> {
    let faction = match category {
        WorldEventCategory::GangTerritory | WorldEventCategory::CrimeWave => FactionType::Police,
        WorldEventCategory::Superhuman => FactionType::Media,
        WorldEventCategory::Military => FactionType::Military,
        WorldEventCategory::Political => FactionType::Government,
        WorldEventCategory::Economic
        | WorldEventCategory::NaturalDisaster
        | WorldEventCategory::Social => return None,
    };
    let amount = match severity {
        Severity::Minor => return None,
        Severity::Normal => 2.0,
        Severity::Major => 5.0,
        Severity::Critical => 10.0,
    };
    Some((faction, amount))
}

/// Heat one faction holds in one country.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactionHeat {
    /// 0-100.
    pub heat: f64,
    /// Game minute of the last increase.
    pub last_increased: Option<u64>,
}

impl FactionHeat {
    const COLD: Self = Self {
        heat: 0.0,
        last_increased: None,
    };

    fn decay_blocked(&self, now: u64, block_hours: u64) -> bool {
        self.last_increased.is_some_and(|at| {
            now.saturating_sub(at) < block_hours.saturating_mul(MINUTES_PER_HOUR)
        })
    }
}

/// Heat across every faction in one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryHeat {
    /// Country code.
    pub country_code: String,
    /// Per-faction heat.
    pub factions: BTreeMap<FactionType, FactionHeat>,
    /// Bracket last reported through a shift.
    pub reported: HeatLevel,
}

impl CountryHeat {
    fn new(country_code: &str) -> Self {
        Self {
            country_code: country_code.to_owned(),
            factions: FactionType::ALL
                .iter()
                .map(|faction| (*faction, FactionHeat::COLD))
                .collect(),
            reported: HeatLevel::Cold,
        }
    }

    /// Heat of one faction.
    pub fn heat(&self, faction: FactionType) -> f64 {
        self.factions.get(&faction).map_or(0.0, |entry| entry.heat)
    }

    /// Average heat over all factions.
    #[allow(clippy::cast_precision_loss)]
    pub fn overall(&self) -> f64 {
        if self.factions.is_empty() {
            return 0.0;
        }
        self.factions.values().map(|entry| entry.heat).sum::<f64>() / self.factions.len() as f64
    }

    /// The faction with the most heat.
    pub fn hottest(&self) -> (FactionType, f64) {
        self.factions
            .iter()
            .map(|(faction, entry)| (*faction, entry.heat))
            .fold((FactionType::Police, 0.0), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            })
    }

    /// Current bracket, taken from the hottest faction.
    pub fn level(&self) -> HeatLevel {
        HeatLevel::from_heat(self.hottest().1)
    }
}

/// Property damage done in a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyDamage {
    /// Nothing broken.
    Clean,
    /// Broken windows, dented cars.
    Minor,
    /// Wrecked storefronts.
    Major,
    /// Collapsed buildings.
    Massive,
}

impl PropertyDamage {
    /// Base heat from the damage.
    pub const fn heat(self) -> f64 {
        match self {
            Self::Clean => 0.0,
            Self::Minor => 3.0,
            Self::Major => 10.0,
            Self::Massive => 25.0,
        }
    }
}

/// What happened in a fight, as far as the factions are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatReport {
    /// Where it happened.
    pub country_code: String,
    /// Combatants killed.
    pub kills: u32,
    /// Bystanders killed.
    pub civilians_killed: u32,
    /// Bystanders hurt.
    pub civilians_injured: u32,
    /// Damage done.
    pub property_damage: PropertyDamage,
    /// People who saw it.
    pub witnesses: u32,
    /// Whether cameras caught it.
    pub on_camera: bool,
    /// Whether the player was identified.
    pub identified: bool,
    /// Whether superpowers were used.
    pub used_powers: bool,
    /// Whether explosives were used.
    pub used_explosives: bool,
    /// Whether illegal weapons were used.
    pub used_illegal_weapons: bool,
    /// Faction the enemy belonged to.
    pub enemy_faction: Option<FactionType>,
    /// Whether it happened at night.
    pub at_night: bool,
}

/// Heat a combat report adds per faction.
pub fn combat_heat(report: &CombatReport) -> BTreeMap<FactionType, f64> {
    let kills = f64::from(report.kills);
    let damage = report.property_damage.heat();
    let raw = f64::from(report.civilians_injured).mul_add(
        5.0,
        f64::from(report.civilians_killed).mul_add(15.0, kills * 2.0),
    ) + damage;

    let mut multiplier = 1.0;
    if report.witnesses > 50 {
        multiplier *= 2.0;
    } else if report.witnesses > 10 {
        multiplier *= 1.5;
    }
    if report.on_camera {
        multiplier *= 1.5;
    }
    if report.identified {
        multiplier *= 2.0;
    }
    if report.used_powers {
        multiplier *= 1.3;
    }
    if report.used_explosives {
        multiplier *= 1.5;
    }
    if report.used_illegal_weapons {
        multiplier *= 1.2;
    }
    let base = raw * multiplier;
    let civilians_killed = report.civilians_killed > 0;

    let police = if civilians_killed { base * 1.5 } else { base };
    let military = if report.enemy_faction == Some(FactionType::Military)
        || report.used_explosives
        || base > 20.0
    {
        base * 0.8
    } else {
        0.0
    };
    let government = if report.identified { base * 0.6 * 1.5 } else { base * 0.6 };
    let media = match (report.witnesses > 0, report.used_powers) {
        (false, _) => 0.0,
        (true, false) => base * 0.5,
        (true, true) => base * 0.5 * 2.0,
    };
    let corporations = damage * 2.0;
    let underworld = if report.enemy_faction == Some(FactionType::Underworld) {
        kills * 2.0 * 3.0
    } else if civilians_killed {
        0.0
    } else {
        -(kills * 2.0 * 0.5)
    };

    let night = if report.at_night { 0.7 } else { 1.0 };
    [
        (FactionType::Police, police * night),
        (FactionType::Military, military * night),
        (FactionType::Government, government * night),
        (FactionType::Media, media * night),
        (FactionType::Corporations, corporations * night),
        (FactionType::Underworld, underworld),
    ]
    .into_iter()
    .map(|(faction, heat)| (faction, heat.round()))
    .collect()
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct HeatUpdate {
    now: Option<GameTime>,
    countries: Option<BTreeMap<String, CountryHeat>>,
    global: Option<f64>,
    shifts: Vec<Arc<HeatShift>>,
}

/// Tracks heat for every faction in every roster country.
#[derive(Debug, Clone)]
pub struct HeatTracker {
    config: HeatConfig,
    countries: BTreeMap<String, CountryHeat>,
    global: f64,
    shifts: VecDeque<Arc<HeatShift>>,
    now: GameTime,
}

impl HeatTracker {
    /// Every country cold.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            config: config.heat.clone(),
            countries: COUNTRIES
                .iter()
                .map(|country| (country.code.to_owned(), CountryHeat::new(country.code)))
                .collect(),
            global: 0.0,
            shifts: VecDeque::new(),
            now: game_time_at(0),
        }
    }

    /// Heat in one country.
    pub fn country(&self, country_code: &str) -> Option<&CountryHeat> {
        self.countries.get(country_code)
    }

    /// Every country.
    pub fn countries(&self) -> impl Iterator<Item = &CountryHeat> {
        self.countries.values()
    }

    /// One faction's heat in one country.
    pub fn heat(&self, country_code: &str, faction: FactionType) -> f64 {
        self.country(country_code)
            .map_or(0.0, |country| country.heat(faction))
    }

    /// Worldwide notoriety.
    pub const fn global_heat(&self) -> f64 {
        self.global
    }

    /// Recent bracket changes, newest first.
    pub fn recent_shifts(&self) -> impl Iterator<Item = &HeatShift> {
        self.shifts.iter().map(AsRef::as_ref)
    }

    /// Add (or with a negative amount, remove) heat. Returns the new value.
    pub fn add_heat(
        &mut self,
        country_code: &str,
        faction: FactionType,
        amount: f64,
    ) -> Result<f64, AgentError> {
        if !amount.is_finite() {
            return Err(AgentError::InvalidHeat(amount.to_string()));
        }
        let now = self.now.total_minutes;
        let entry = self
            .countries
            .get_mut(country_code)
            .ok_or_else(|| AgentError::UnknownCountry(country_code.to_owned()))?
            .factions
            .entry(faction)
            .or_insert(FactionHeat::COLD);
        entry.heat = (entry.heat + amount).clamp(0.0, 100.0);
        if amount > 0.0 {
            entry.last_increased = Some(now);
        }
        debug!(country = country_code, ?faction, amount, heat = entry.heat, "Heat changed");
        Ok(entry.heat)
    }

    /// Apply the heat from a fight. Returns the per-faction change.
    pub fn add_combat_heat(
        &mut self,
        report: &CombatReport,
    ) -> Result<BTreeMap<FactionType, f64>, AgentError> {
        if starting_world::country(&report.country_code).is_none() {
            return Err(AgentError::UnknownCountry(report.country_code.clone()));
        }
        let changes = combat_heat(report);
        for (faction, amount) in &changes {
            self.add_heat(&report.country_code, *faction, *amount)?;
        }
        let total: f64 = changes.values().sum();
        if total > 20.0 {
            self.global = total.mul_add(0.1, self.global).clamp(0.0, 100.0);
        }
        info!(country = %report.country_code, total, global = self.global, "Combat heat applied");
        Ok(changes)
    }

    fn decayed(&self, now: u64) -> BTreeMap<String, CountryHeat> {
        let block_hours = self.config.decay_block_hours;
        let mut countries = self.countries.clone();
        for (code, country) in &mut countries {
            let rate = starting_world::country(code).map_or(1.0, |c| decay_rate(c.surveillance));
            for entry in country.factions.values_mut() {
                if entry.heat > 0.0 && !entry.decay_blocked(now, block_hours) {
                    entry.heat = (entry.heat - rate).max(0.0);
                }
            }
        }
        countries
    }
}

/// Raise heat for every alert whose faction is already after the player.
fn apply_alerts(countries: &mut BTreeMap<String, CountryHeat>, events: &[&WorldEvent], now: u64) {
    for event in events {
        let Some((faction, amount)) = world_event_alert(event.category, event.severity) else {
            continue;
        };
        let Some(entry) = countries
            .get_mut(&event.country_code)
            .and_then(|country| country.factions.get_mut(&faction))
        else {
            continue;
        };
        if entry.heat > 0.0 {
            entry.heat = (entry.heat + amount).min(100.0);
            entry.last_increased = Some(now);
            debug!(
                country = %event.country_code,
                ?faction,
                amount,
                heat = entry.heat,
                "World event raised heat"
            );
        }
    }
}

impl SimulationManager for HeatTracker {
    type Update = HeatUpdate;

    fn name(&self) -> &'static str {
        HEAT
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.now = ctx.now;
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<HeatUpdate, ManagerError> {
        let now = *ctx.now();
        let hourly = ctx.kind() == BoundaryKind::Hour;
        let world_events: Vec<&WorldEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::World(world) => Some(world.as_ref()),
                _ => None,
            })
            .collect();
        if !hourly && world_events.is_empty() {
            return Ok(HeatUpdate {
                now: Some(now),
                ..HeatUpdate::default()
            });
        }

        let mut countries = if hourly {
            self.decayed(now.total_minutes)
        } else {
            self.countries.clone()
        };
        apply_alerts(&mut countries, &world_events, now.total_minutes);

        let mut shifts = Vec::new();
        for country in countries.values() {
            let level = country.level();
            if level != country.reported {
                let (hottest_faction, faction_heat) = country.hottest();
                let shift = Arc::new(HeatShift {
                    country_code: country.country_code.clone(),
                    hottest_faction,
                    faction_heat,
                    from: country.reported,
                    to: level,
                    at: now,
                });
                ctx.emit(SimEvent::Heat(Arc::clone(&shift)));
                shifts.push(shift);
            }
        }
        Ok(HeatUpdate {
            now: Some(now),
            countries: Some(countries),
            global: hourly.then(|| (self.global - self.config.global_decay_per_hour).max(0.0)),
            shifts,
        })
    }

    fn commit(&mut self, update: HeatUpdate) {
        if let Some(now) = update.now {
            self.now = now;
        }
        if let Some(countries) = update.countries {
            self.countries = countries;
        }
        if let Some(global) = update.global {
            self.global = global;
        }
        for shift in update.shifts {
            if let Some(country) = self.countries.get_mut(&shift.country_code) {
                country.reported = shift.to;
            }
            info!(country = %shift.country_code, from = ?shift.from, to = ?shift.to, "Heat level changed");
            self.shifts.push_front(shift);
        }
        self.shifts.truncate(SHIFT_LOG_LIMIT);
    }
}
