//! The world simulation: country and city statistics perturbed by events.
//!
//! Every hour the simulation first expires events whose time is up, undoing
//! the deltas they applied, and then rolls each event category once. The
//! configured rates are per day, so each hourly roll uses a 24th of the
//! rate, scaled by time of day:
//!
//! | Category  | Night / evening | Morning / afternoon |
//! |-----------|-----------------|---------------------|
//! | Crime     | x1.5            | x1.0                |
//! | Gang      | x2.0            | x1.0                |
//! | Political | x1.0            | x1.5                |
//! | Economic  | x1.0            | x1.3                |
//!
//! A hit picks a roster country (and city, for local categories) and a
//! template from the category table. Effects are applied once, clamped to
//! the stat's bounds, and keyed by event id so an event is never applied
//! twice.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tactics_core::clock;
use tactics_core::config::WorldEventRates;
use tactics_core::{BoundaryContext, ManagerError, SimulationConfig, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, GameTime, MINUTES_PER_HOUR, Severity, SimEvent, Stat, StatDelta, StatScope,
    TimeOfDay, WorldEvent, WorldEventCategory, WorldEventId,
};
use tracing::{debug, info, trace, warn};

use crate::error::WorldError;
use crate::starting_world::{self, COUNTRIES, CityProfile, CountryProfile};

/// Registry name of the world simulation.
pub const WORLD_SIMULATION: &str = "world_simulation";

/// Number of past events kept for queries.
pub const HISTORY_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Where a category's events land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    City,
    Country,
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    None,
    City(Stat, i32),
    CityRange(Stat, i32, i32),
    Country(Stat, i32),
}

#[derive(Debug, Clone, Copy)]
struct Template {
    headline: &'static str,
    severity: Severity,
    duration_hours: Option<u64>,
    effect: Effect,
}

const fn t(
    headline: &'static str,
    severity: Severity,
    duration_hours: Option<u64>,
    effect: Effect,
) -> Template {
    Template {
        headline,
        severity,
        duration_hours,
        effect,
    }
}

const GANG: &[Template] = &[
    t("Gang war erupts in %city%", Severity::Major, Some(48), Effect::CityRange(Stat::CrimeIndex, 10, 24)),
    t("New gang moves into %city%", Severity::Normal, None, Effect::CityRange(Stat::CrimeIndex, 10, 24)),
    t("Police crackdown clears gang from %city% district", Severity::Normal, Some(72), Effect::CityRange(Stat::CrimeIndex, 10, 24)),
    t("Rival factions clash in %city%", Severity::Minor, Some(24), Effect::CityRange(Stat::CrimeIndex, 10, 24)),
    t("Gang boss assassinated in %city%", Severity::Major, None, Effect::CityRange(Stat::CrimeIndex, 10, 24)),
];

const POLITICAL: &[Template] = &[
    t("Political unrest grows in %country%", Severity::Normal, Some(168), Effect::Country(Stat::Instability, 5)),
    t("Election results contested in %country%", Severity::Major, Some(336), Effect::Country(Stat::Instability, 15)),
    t("Military coup attempted in %country%", Severity::Critical, None, Effect::Country(Stat::Instability, 40)),
    t("New government sworn in at %country%", Severity::Normal, None, Effect::Country(Stat::Instability, -10)),
    t("Parliament dissolved in %country%", Severity::Major, Some(168), Effect::Country(Stat::Instability, 20)),
    t("Constitutional crisis in %country%", Severity::Major, Some(336), Effect::Country(Stat::Corruption, 10)),
];

const ECONOMIC: &[Template] = &[
    t("Stock market tumbles in", Severity::Major, Some(168), Effect::Country(Stat::PriceIndex, 30)),
    t("Economic boom reported in", Severity::Normal, Some(336), Effect::Country(Stat::PriceIndex, -15)),
    t("Currency devaluation hits", Severity::Major, Some(504), Effect::Country(Stat::PriceIndex, 50)),
    t("Trade sanctions imposed on", Severity::Critical, Some(672), Effect::Country(Stat::PriceIndex, 80)),
    t("New trade deal benefits", Severity::Normal, Some(504), Effect::Country(Stat::PriceIndex, -10)),
    t("Inflation concerns grow in", Severity::Minor, Some(168), Effect::Country(Stat::PriceIndex, 15)),
];

const CRIME_WAVE: &[Template] = &[
    t("Crime wave hits", Severity::Major, Some(72), Effect::City(Stat::CrimeIndex, 20)),
    t("Serial burglar active in", Severity::Normal, Some(48), Effect::City(Stat::CrimeIndex, 10)),
    t("Armed robberies surge in", Severity::Major, Some(96), Effect::City(Stat::CrimeIndex, 25)),
    t("Police resources stretched in", Severity::Normal, Some(120), Effect::City(Stat::CrimeIndex, 15)),
    t("Vigilante activity reported in", Severity::Normal, Some(48), Effect::City(Stat::CrimeIndex, -10)),
];

const SUPERHUMAN: &[Template] = &[
    t("Superhuman battle damages %city% downtown", Severity::Major, None, Effect::None),
    t("LSW sighting reported in", Severity::Minor, None, Effect::None),
    t("Villain attack thwarted in", Severity::Normal, None, Effect::None),
    t("Government deploys powered response team to", Severity::Major, Some(72), Effect::None),
    t("Unknown superhuman causes panic in", Severity::Normal, Some(24), Effect::None),
    t("Hero saves civilians in %city% disaster", Severity::Normal, None, Effect::None),
    t("Supervillain escapes from %city% prison", Severity::Critical, Some(168), Effect::None),
];

const DISASTER: &[Template] = &[
    t("Earthquake strikes %city% region", Severity::Critical, Some(336), Effect::City(Stat::SafetyIndex, -30)),
    t("Flooding devastates", Severity::Major, Some(168), Effect::City(Stat::SafetyIndex, -30)),
    t("Hurricane approaches", Severity::Critical, Some(72), Effect::City(Stat::SafetyIndex, -30)),
    t("Wildfire threatens %city% suburbs", Severity::Major, Some(120), Effect::City(Stat::SafetyIndex, -30)),
];

const MILITARY: &[Template] = &[
    t("Military exercises begin in", Severity::Minor, Some(168), Effect::Country(Stat::MilitaryBudget, 10)),
    t("Border tensions rise with", Severity::Major, Some(336), Effect::Country(Stat::MilitaryBudget, 10)),
    t("UN peacekeepers deployed to", Severity::Major, Some(672), Effect::Country(Stat::MilitaryBudget, 10)),
    t("Arms embargo placed on", Severity::Critical, Some(1_344), Effect::Country(Stat::MilitaryBudget, 10)),
];

const SOCIAL: &[Template] = &[
    t("Protests erupt in", Severity::Normal, Some(48), Effect::None),
    t("Celebration fills streets of", Severity::Minor, Some(24), Effect::None),
    t("Strike paralyzes %city% transport", Severity::Major, Some(72), Effect::None),
    t("Festival brings tourists to", Severity::Minor, Some(168), Effect::None),
    t("Riots break out in", Severity::Major, Some(48), Effect::None),
];

const fn templates(category: WorldEventCategory) -> (&'static [Template], Place) {
    match category {
        WorldEventCategory::GangTerritory => (GANG, Place::City),
        WorldEventCategory::Political => (POLITICAL, Place::Country),
        WorldEventCategory::Economic => (ECONOMIC, Place::Country),
        WorldEventCategory::CrimeWave => (CRIME_WAVE, Place::City),
        WorldEventCategory::Superhuman => (SUPERHUMAN, Place::City),
        WorldEventCategory::NaturalDisaster => (DISASTER, Place::City),
        WorldEventCategory::Military => (MILITARY, Place::Country),
        WorldEventCategory::Social => (SOCIAL, Place::City),
    }
}

/// Multiplier on a category's hourly chance for the time of day.
pub const fn time_factor(category: WorldEventCategory, time_of_day: TimeOfDay) -> f64 {
    let dark = time_of_day.is_dark();
    match category {
        WorldEventCategory::CrimeWave if dark => 1.5,
        WorldEventCategory::GangTerritory if dark => 2.0,
        WorldEventCategory::Political if !dark => 1.5,
        WorldEventCategory::Economic if !dark => 1.3,
        _ => 1.0,
    }
}

/// Chance of one event of `category` in a single hour.
///
/// Rates that are not finite, or that multiply out to NaN, never fire.
/// Anything above certainty is capped at one.
pub fn hourly_chance(daily_rate: f64, category: WorldEventCategory, time_of_day: TimeOfDay) -> f64 {
    let chance = daily_rate / 24.0 * time_factor(category, time_of_day);
    if daily_rate.is_finite() && chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn headline(template: &str, place: Place, country: &CountryProfile, city: &CityProfile) -> String {
    if template.contains("%city%") {
        template.replace("%city%", city.name)
    } else if template.contains("%country%") {
        template.replace("%country%", country.name)
    } else if place == Place::City {
        format!("{template} {}", city.name)
    } else {
        format!("{template} {}", country.name)
    }
}

fn generate<R: Rng + ?Sized>(
    category: WorldEventCategory,
    rng: &mut R,
    now: &GameTime,
) -> Result<WorldEvent, ManagerError> {
    let failed = |reason: &str| ManagerError::Failed {
        manager: WORLD_SIMULATION,
        reason: reason.to_owned(),
    };
    let (table, place) = templates(category);
    let (country, city) = starting_world::random_city(rng).ok_or_else(|| failed("empty roster"))?;
    let template = *table.choose(rng).ok_or_else(|| failed("empty template table"))?;

    let effects = match template.effect {
        Effect::None => Vec::new(),
        Effect::City(stat, amount) => vec![city_delta(city, stat, amount)],
        Effect::CityRange(stat, low, high) => {
            vec![city_delta(city, stat, rng.random_range(low..=high))]
        }
        Effect::Country(stat, amount) => vec![StatDelta {
            scope: StatScope::Country {
                code: country.code.to_owned(),
            },
            stat,
            amount,
        }],
    };
    let expires_at = template
        .duration_hours
        .map(|hours| {
            let minutes = hours
                .checked_mul(MINUTES_PER_HOUR)
                .ok_or_else(|| failed("event duration overflow"))?;
            clock::advance_minutes(now, minutes).map_err(|err| failed(&err.to_string()))
        })
        .transpose()?;

    let headline = headline(template.headline, place, country, city);
    let description = match place {
        Place::City => format!("{headline}. Reported from {}, {}.", city.name, country.name),
        Place::Country => format!("{headline}. Reported from {}.", country.name),
    };
    Ok(WorldEvent {
        id: WorldEventId::from_rng(rng),
        category,
        country_code: country.code.to_owned(),
        city: (place == Place::City).then(|| city.name.to_owned()),
        severity: template.severity,
        headline,
        description,
        effects,
        created_at: *now,
        expires_at,
    })
}

fn city_delta(city: &CityProfile, stat: Stat, amount: i32) -> StatDelta {
    StatDelta {
        scope: StatScope::City {
            name: city.name.to_owned(),
        },
        stat,
        amount,
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Live statistics of one country or city.
///
/// `base` is the roster value; `current` includes every active event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionStats {
    base: BTreeMap<Stat, i32>,
    current: BTreeMap<Stat, i32>,
}

impl RegionStats {
    fn new(values: &[(Stat, i32)]) -> Self {
        let base: BTreeMap<Stat, i32> = values
            .iter()
            .map(|&(stat, value)| {
                let (low, high) = stat.bounds();
                (stat, value.clamp(low, high))
            })
            .collect();
        Self {
            current: base.clone(),
            base,
        }
    }

    /// Current value of a stat, if this region tracks it.
    pub fn get(&self, stat: Stat) -> Option<i32> {
        self.current.get(&stat).copied()
    }

    /// Net change events have made to a stat.
    pub fn modifier(&self, stat: Stat) -> i32 {
        match (self.current.get(&stat), self.base.get(&stat)) {
            (Some(current), Some(base)) => current.saturating_sub(*base),
            _ => 0,
        }
    }

    /// Shift a stat, clamped to its bounds. Returns the change actually
    /// made, or `None` when the stat is not tracked here.
    fn shift(&mut self, stat: Stat, amount: i32) -> Option<i32> {
        let value = self.current.get_mut(&stat)?;
        let (low, high) = stat.bounds();
        let next = value.saturating_add(amount).clamp(low, high);
        let applied = next.saturating_sub(*value);
        *value = next;
        Some(applied)
    }
}

fn country_stats(country: &CountryProfile) -> RegionStats {
    let cities = i32::try_from(country.cities.len()).unwrap_or(i32::MAX).max(1);
    let crime = country
        .cities
        .iter()
        .map(|city| city.crime_index)
        .sum::<i32>()
        .checked_div(cities)
        .unwrap_or(50);
    RegionStats::new(&[
        (Stat::CrimeIndex, crime),
        (Stat::SafetyIndex, 100_i32.saturating_sub(crime)),
        (Stat::Corruption, country.corruption),
        (Stat::Instability, 100_i32.saturating_sub(country.political_stability)),
        (Stat::MilitaryBudget, country.military_strength),
        (Stat::PriceIndex, 100),
    ])
}

fn city_stats(city: &CityProfile) -> RegionStats {
    RegionStats::new(&[
        (Stat::CrimeIndex, city.crime_index),
        (Stat::SafetyIndex, city.safety_index),
    ])
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ActiveEvent {
    event: Arc<WorldEvent>,
    applied: Vec<StatDelta>,
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct WorldUpdate {
    expired: Vec<WorldEventId>,
    created: Vec<Arc<WorldEvent>>,
    scheduled_taken: usize,
}

/// Owns country and city statistics and the world event lifecycle.
#[derive(Debug, Clone)]
pub struct WorldSimulation {
    rates: WorldEventRates,
    countries: BTreeMap<String, RegionStats>,
    cities: BTreeMap<String, RegionStats>,
    active: BTreeMap<WorldEventId, ActiveEvent>,
    history: VecDeque<Arc<WorldEvent>>,
    scheduled: Vec<Arc<WorldEvent>>,
}

impl WorldSimulation {
    /// A world at roster values with no events.
    pub fn new(config: &SimulationConfig) -> Self {
        let countries = COUNTRIES
            .iter()
            .map(|country| (country.code.to_owned(), country_stats(country)))
            .collect();
        let cities = starting_world::all_cities()
            .map(|(_, city)| (city.name.to_owned(), city_stats(city)))
            .collect();
        Self {
            rates: config.world_events.clone(),
            countries,
            cities,
            active: BTreeMap::new(),
            history: VecDeque::new(),
            scheduled: Vec::new(),
        }
    }

    /// Queue an externally authored event. It is applied and published on
    /// the next hour boundary.
    pub fn schedule(&mut self, event: WorldEvent) -> Result<(), WorldError> {
        if starting_world::country(&event.country_code).is_none() {
            return Err(WorldError::UnknownCountry(event.country_code));
        }
        if self.is_known(event.id) || self.scheduled.iter().any(|queued| queued.id == event.id) {
            return Err(WorldError::DuplicateEvent(event.id.to_string()));
        }
        self.scheduled.push(Arc::new(event));
        Ok(())
    }

    /// Statistics of a country.
    pub fn country_stats(&self, code: &str) -> Option<&RegionStats> {
        self.countries.get(code)
    }

    /// Statistics of a city.
    pub fn city_stats(&self, name: &str) -> Option<&RegionStats> {
        self.cities.get(name)
    }

    /// Current value of a stat in a country or city.
    pub fn stat(&self, scope: &StatScope, stat: Stat) -> Option<i32> {
        self.region(scope)?.get(stat)
    }

    /// Net change events have made to a stat in a country or city.
    pub fn modifier(&self, scope: &StatScope, stat: Stat) -> i32 {
        self.region(scope).map_or(0, |region| region.modifier(stat))
    }

    /// City crime including national shifts.
    pub fn effective_crime_index(&self, city: &str) -> Option<i32> {
        let (country, _) = starting_world::city_in_roster(city)?;
        let local = self.cities.get(city)?.get(Stat::CrimeIndex)?;
        let national = self
            .countries
            .get(country.code)
            .map_or(0, |stats| stats.modifier(Stat::CrimeIndex));
        let (low, high) = Stat::CrimeIndex.bounds();
        Some(local.saturating_add(national).clamp(low, high))
    }

    /// Past events in a country, newest first.
    pub fn events_for_country<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a WorldEvent> {
        self.history
            .iter()
            .map(AsRef::as_ref)
            .filter(move |event| event.country_code == code)
    }

    /// Past events in a city, newest first.
    pub fn events_for_city<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WorldEvent> {
        self.history
            .iter()
            .map(AsRef::as_ref)
            .filter(move |event| event.city.as_deref() == Some(name))
    }

    /// The `limit` most recent events, newest first.
    pub fn recent_events(&self, limit: usize) -> impl Iterator<Item = &WorldEvent> {
        self.history.iter().take(limit).map(AsRef::as_ref)
    }

    /// Events whose effects are still applied and will lapse.
    pub fn active_events(&self) -> impl Iterator<Item = &WorldEvent> {
        self.active.values().map(|active| active.event.as_ref())
    }

    fn region(&self, scope: &StatScope) -> Option<&RegionStats> {
        match scope {
            StatScope::Country { code } => self.countries.get(code),
            StatScope::City { name } => self.cities.get(name),
        }
    }

    fn region_mut(&mut self, scope: &StatScope) -> Option<&mut RegionStats> {
        match scope {
            StatScope::Country { code } => self.countries.get_mut(code),
            StatScope::City { name } => self.cities.get_mut(name),
        }
    }

    fn is_known(&self, id: WorldEventId) -> bool {
        self.active.contains_key(&id) || self.history.iter().any(|event| event.id == id)
    }

    fn shift(&mut self, delta: &StatDelta) -> Option<StatDelta> {
        let Some(region) = self.region_mut(&delta.scope) else {
            warn!(scope = ?delta.scope, "World event targets an unknown region");
            return None;
        };
        let applied = region.shift(delta.stat, delta.amount)?;
        Some(StatDelta {
            amount: applied,
            ..delta.clone()
        })
    }

    fn apply(&mut self, event: Arc<WorldEvent>) {
        if self.is_known(event.id) {
            return;
        }
        let applied: Vec<StatDelta> = event
            .effects
            .iter()
            .filter_map(|delta| self.shift(delta))
            .collect();
        debug!(
            id = %event.id,
            category = ?event.category,
            severity = ?event.severity,
            headline = %event.headline,
            "World event"
        );
        if event.expires_at.is_some() {
            self.active.insert(
                event.id,
                ActiveEvent {
                    event: Arc::clone(&event),
                    applied,
                },
            );
        }
        self.history.push_front(event);
        self.history.truncate(HISTORY_LIMIT);
    }

    fn revert(&mut self, active: &ActiveEvent) {
        for delta in &active.applied {
            if let Some(region) = self.region_mut(&delta.scope) {
                region.shift(delta.stat, delta.amount.saturating_neg());
            }
        }
        trace!(id = %active.event.id, headline = %active.event.headline, "World event expired");
    }
}

impl SimulationManager for WorldSimulation {
    type Update = WorldUpdate;

    fn name(&self) -> &'static str {
        WORLD_SIMULATION
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        info!(
            countries = self.countries.len(),
            cities = self.cities.len(),
            at = %ctx.now,
            "World simulation started"
        );
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<WorldUpdate, ManagerError> {
        if ctx.kind() != BoundaryKind::Hour {
            return Ok(WorldUpdate::default());
        }
        let now = *ctx.now();

        let expired = self
            .active
            .values()
            .filter(|active| active.event.expires_at.is_some_and(|at| at <= now))
            .map(|active| active.event.id)
            .collect();

        let mut created: Vec<Arc<WorldEvent>> = self
            .scheduled
            .iter()
            .filter(|event| !self.is_known(event.id))
            .cloned()
            .collect();
        for category in WorldEventCategory::ALL {
            let chance =
                hourly_chance(self.rates.for_category(category), category, now.time_of_day);
            if ctx.rng().random_bool(chance) {
                created.push(Arc::new(generate(category, ctx.rng(), &now)?));
            }
        }

        for event in &created {
            ctx.emit(SimEvent::World(Arc::clone(event)));
        }
        Ok(WorldUpdate {
            expired,
            created,
            scheduled_taken: self.scheduled.len(),
        })
    }

    fn commit(&mut self, update: WorldUpdate) {
        let taken = update.scheduled_taken.min(self.scheduled.len());
        self.scheduled.drain(..taken);
        for id in update.expired {
            if let Some(active) = self.active.remove(&id) {
                self.revert(&active);
            }
        }
        for event in update.created {
            self.apply(event);
        }
    }
}
