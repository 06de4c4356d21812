//! Character registry: every tracked NPC in the roster cities.
//!
//! The registry seeds a handful of characters per city when it starts and
//! afterwards only changes them in response to life events. Other managers
//! read it through upstream access; nobody writes to it directly.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tactics_core::{BoundaryContext, ManagerError, SimulationConfig, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, GameTime, LifeEvent, LifeEventId, LifeEventType, NpcId, NpcRole, NpcStatus,
    SimEvent,
};
use tactics_world::starting_world::{self, CityProfile, CountryProfile};
use tracing::{debug, info};

/// Registry name of the character registry.
pub const CHARACTER_REGISTRY: &str = "character_registry";

/// Number of deaths kept in the log.
pub const DEATH_LOG_LIMIT: usize = 100;

const FIRST_NAMES: &[&str] = &[
    "Alex", "Maria", "Kenji", "Olga", "Tunde", "Lucia", "Marcus", "Hana", "Pavel", "Ines",
    "Diego", "Amara", "Felix", "Sofia", "Ivan", "Chidi", "Rosa", "Tomas", "Yuki", "Lena",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Novak", "Tanaka", "Okafor", "Mendez", "Weber", "Petrov", "Clarke", "Santos",
    "Ivanova", "Adeyemi", "Moreno", "Fischer", "Sato", "Reyes", "Hughes", "Costa", "Volkov",
];

/// A tracked character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Npc {
    /// Identifier.
    pub id: NpcId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Occupation.
    pub role: NpcRole,
    /// Current status.
    pub status: NpcStatus,
    /// Country the character comes from.
    pub home_country: String,
    /// Country the character is in now.
    pub country_code: String,
    /// City the character is in now.
    pub city: String,
    /// Whether the character holds a job.
    pub employed: bool,
}

impl Npc {
    /// Whether the character is alive.
    pub fn is_alive(&self) -> bool {
        self.status != NpcStatus::Dead
    }

    /// Apply the state change a life event implies.
    pub fn apply(&mut self, event: &LifeEvent) {
        match event.kind {
            LifeEventType::Relocated | LifeEventType::LeftCountry => {
                if let Some(city) = &event.new_city {
                    if let Some((country, _)) = starting_world::city_in_roster(city) {
                        country.code.clone_into(&mut self.country_code);
                    }
                    city.clone_into(&mut self.city);
                }
            }
            LifeEventType::Arrested => self.status = NpcStatus::Arrested,
            LifeEventType::Injured => self.status = NpcStatus::Hospitalized,
            LifeEventType::Released | LifeEventType::Recovered => self.status = NpcStatus::Active,
            LifeEventType::Retired => {
                self.status = NpcStatus::Retired;
                self.employed = false;
            }
            LifeEventType::Died => self.status = NpcStatus::Dead,
            LifeEventType::Recruited => self.employed = true,
            LifeEventType::Fired => self.employed = false,
            LifeEventType::Promoted
            | LifeEventType::Demoted
            | LifeEventType::Betrayed
            | LifeEventType::Compromised
            | LifeEventType::Married
            | LifeEventType::Divorced => {}
        }
    }
}

/// Create a character in a roster city.
pub fn generate_npc<R: Rng + ?Sized>(
    rng: &mut R,
    role: NpcRole,
    country: &CountryProfile,
    city: &CityProfile,
    ages: RangeInclusive<u32>,
) -> Npc {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Silva");
    let employed = match role {
        NpcRole::Civilian => rng.random_bool(0.6),
        NpcRole::Criminal | NpcRole::Mercenary | NpcRole::Authority | NpcRole::Contact => true,
    };
    Npc {
        id: NpcId::from_rng(rng),
        name: format!("{first} {last}"),
        age: rng.random_range(ages),
        role,
        status: NpcStatus::Active,
        home_country: country.code.to_owned(),
        country_code: country.code.to_owned(),
        city: city.name.to_owned(),
        employed,
    }
}

/// A death recorded by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathEntry {
    /// Who died.
    pub npc_id: NpcId,
    /// Their name.
    pub name: String,
    /// How it was reported.
    pub description: String,
    /// When.
    pub at: GameTime,
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct RegistryUpdate {
    events: Vec<Arc<LifeEvent>>,
    birthdays: bool,
}

/// Owns every tracked NPC.
#[derive(Debug, Clone)]
pub struct CharacterRegistry {
    npcs_per_city: u32,
    npcs: BTreeMap<NpcId, Npc>,
    applied: BTreeSet<LifeEventId>,
    deaths: VecDeque<DeathEntry>,
}

impl CharacterRegistry {
    /// Empty registry; characters are seeded on start.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            npcs_per_city: config.npc.npcs_per_city,
            npcs: BTreeMap::new(),
            applied: BTreeSet::new(),
            deaths: VecDeque::new(),
        }
    }

    fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut roles = NpcRole::SEEDED.iter().cycle();
        for (country, city) in starting_world::all_cities() {
            for _ in 0..self.npcs_per_city {
                let role = roles.next().copied().unwrap_or(NpcRole::Civilian);
                let npc = generate_npc(rng, role, country, city, 22..=65);
                self.npcs.insert(npc.id, npc);
            }
        }
    }

    /// A character by id.
    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id)
    }

    /// Every character, dead ones included.
    pub fn npcs(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.values()
    }

    /// Living characters currently in a city.
    pub fn in_city<'a>(&'a self, city: &'a str) -> impl Iterator<Item = &'a Npc> {
        self.npcs
            .values()
            .filter(move |npc| npc.city == city && npc.is_alive())
    }

    /// Living characters with a role.
    pub fn with_role(&self, role: NpcRole) -> impl Iterator<Item = &Npc> {
        self.npcs
            .values()
            .filter(move |npc| npc.role == role && npc.is_alive())
    }

    /// Recorded deaths, newest first.
    pub fn deaths(&self) -> impl Iterator<Item = &DeathEntry> {
        self.deaths.iter()
    }
}

impl SimulationManager for CharacterRegistry {
    type Update = RegistryUpdate;

    fn name(&self) -> &'static str {
        CHARACTER_REGISTRY
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        if self.npcs.is_empty() {
            self.seed(&mut ctx.rng);
        }
        info!(npcs = self.npcs.len(), "Character registry started");
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<RegistryUpdate, ManagerError> {
        let events = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Life(life) => Some(life),
                _ => None,
            })
            .filter(|life| self.npcs.contains_key(&life.npc_id) && !self.applied.contains(&life.id))
            .cloned()
            .collect();
        Ok(RegistryUpdate {
            events,
            birthdays: ctx.kind() == BoundaryKind::Year,
        })
    }

    fn commit(&mut self, update: RegistryUpdate) {
        for event in update.events {
            if !self.applied.insert(event.id) {
                continue;
            }
            let Some(npc) = self.npcs.get_mut(&event.npc_id) else {
                continue;
            };
            npc.apply(&event);
            if event.kind == LifeEventType::Died {
                self.deaths.push_front(DeathEntry {
                    npc_id: npc.id,
                    name: npc.name.clone(),
                    description: event.description.clone(),
                    at: event.at,
                });
                self.deaths.truncate(DEATH_LOG_LIMIT);
            }
            debug!(npc = %npc.name, kind = ?event.kind, "Life event applied");
        }
        if update.birthdays {
            for npc in self.npcs.values_mut().filter(|npc| npc.is_alive()) {
                npc.age = npc.age.saturating_add(1);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tactics_core::TimeEngine;
    use tactics_core::clock::game_time_at;

    use super::*;

    fn started(engine: &mut TimeEngine) {
        engine
            .subscribe(CharacterRegistry::new(&SimulationConfig::default()))
            .unwrap();
        engine.start(CHARACTER_REGISTRY).unwrap();
    }

    #[test]
    fn seeding_covers_every_city_and_is_deterministic() {
        let config = SimulationConfig::default();
        let mut a = TimeEngine::new(&config);
        let mut b = TimeEngine::new(&config);
        started(&mut a);
        started(&mut b);

        let registry = a.manager::<CharacterRegistry>().unwrap();
        let cities = starting_world::all_cities().count();
        let per_city = usize::try_from(config.npc.npcs_per_city).unwrap();
        assert_eq!(registry.npcs().count(), cities * per_city);
        assert_eq!(registry.in_city("Lagos").count(), per_city);

        let names_a: Vec<_> = registry.npcs().map(|npc| npc.name.clone()).collect();
        let names_b: Vec<_> = b
            .manager::<CharacterRegistry>()
            .unwrap()
            .npcs()
            .map(|npc| npc.name.clone())
            .collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn life_events_change_status_and_location() {
        let mut rng = StdRng::seed_from_u64(3);
        let (country, city) = starting_world::city_in_roster("Tokyo").unwrap();
        let mut npc = generate_npc(&mut rng, NpcRole::Criminal, country, city, 30..=30);
        let event = |kind, new_city: Option<&str>| LifeEvent {
            id: LifeEventId::new(),
            npc_id: NpcId::new(),
            npc_name: String::new(),
            kind,
            at: game_time_at(0),
            description: String::new(),
            country_code: "JP".to_owned(),
            city: "Tokyo".to_owned(),
            new_city: new_city.map(str::to_owned),
            newsworthy: false,
        };

        npc.apply(&event(LifeEventType::LeftCountry, Some("Berlin")));
        assert_eq!(npc.country_code, "DE");
        assert_eq!(npc.city, "Berlin");
        assert_eq!(npc.home_country, "JP");

        npc.apply(&event(LifeEventType::Arrested, None));
        assert_eq!(npc.status, NpcStatus::Arrested);
        npc.apply(&event(LifeEventType::Released, None));
        assert_eq!(npc.status, NpcStatus::Active);
        npc.apply(&event(LifeEventType::Died, None));
        assert!(!npc.is_alive());
    }

    #[test]
    fn birthdays_happen_on_new_year() {
        let config = SimulationConfig::default();
        let mut engine = TimeEngine::new(&config);
        started(&mut engine);
        let before: Vec<u32> = engine
            .manager::<CharacterRegistry>()
            .unwrap()
            .npcs()
            .map(|npc| npc.age)
            .collect();

        engine.advance_hours(24.0 * 364.0).unwrap();
        let after: Vec<u32> = engine
            .manager::<CharacterRegistry>()
            .unwrap()
            .npcs()
            .map(|npc| npc.age)
            .collect();
        assert_eq!(before, after);

        engine.advance_hours(24.0).unwrap();
        let aged: Vec<u32> = engine
            .manager::<CharacterRegistry>()
            .unwrap()
            .npcs()
            .map(|npc| npc.age)
            .collect();
        assert!(before.iter().zip(&aged).all(|(b, a)| a - b == 1));
    }
}
