//! Daily life events for every tracked character.
//!
//! Once per game day each living character rolls against a fixed table of
//! event chances. The first event that fires wins, so a character has at
//! most one life event per day. Arrested characters can only be released.
//! Events are emitted for the registry, the mercenary pool, contacts, and
//! the news desk to apply.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::{
    BoundaryKind, GameTime, LifeEvent, LifeEventId, LifeEventType, NpcId, NpcRole, NpcStatus,
    SimEvent,
};
use tactics_world::starting_world::{self, COUNTRIES};
use tracing::debug;

use crate::mercenary::MercenaryPool;
use crate::registry::{CharacterRegistry, Npc};

/// Registry name of the life-event manager.
pub const LIFE_EVENTS: &str = "life_events";

/// Events kept in history.
pub const HISTORY_LIMIT: usize = 100;

/// Daily chance of each event, in roll order.
pub const DAILY_CHANCES: [(LifeEventType, f64); 16] = [
    (LifeEventType::Relocated, 0.002),
    (LifeEventType::LeftCountry, 0.0005),
    (LifeEventType::Arrested, 0.001),
    (LifeEventType::Released, 0.1),
    (LifeEventType::Injured, 0.001),
    (LifeEventType::Recovered, 0.05),
    (LifeEventType::Promoted, 0.0005),
    (LifeEventType::Demoted, 0.0003),
    (LifeEventType::Betrayed, 0.0001),
    (LifeEventType::Compromised, 0.0005),
    (LifeEventType::Retired, 0.0002),
    (LifeEventType::Died, 0.000_05),
    (LifeEventType::Recruited, 0.0002),
    (LifeEventType::Fired, 0.0001),
    (LifeEventType::Married, 0.0001),
    (LifeEventType::Divorced, 0.000_05),
];

const DEATH_CAUSES: [&str; 3] = ["an accident", "illness", "unknown circumstances"];

/// Whether `kind` can happen to `npc` today.
pub fn eligible(npc: &Npc, kind: LifeEventType) -> bool {
    if matches!(npc.status, NpcStatus::Dead | NpcStatus::Departed) {
        return false;
    }
    if npc.status == NpcStatus::Arrested {
        return kind == LifeEventType::Released;
    }
    match kind {
        LifeEventType::Relocated => starting_world::country(&npc.country_code)
            .is_some_and(|country| country.cities.iter().any(|city| city.name != npc.city)),
        LifeEventType::LeftCountry => npc.role != NpcRole::Authority,
        LifeEventType::Arrested => matches!(npc.role, NpcRole::Criminal | NpcRole::Mercenary),
        LifeEventType::Released => false,
        LifeEventType::Injured => npc.status != NpcStatus::Hospitalized,
        LifeEventType::Recovered => npc.status == NpcStatus::Hospitalized,
        LifeEventType::Promoted => matches!(npc.role, NpcRole::Authority | NpcRole::Mercenary),
        LifeEventType::Demoted => npc.role == NpcRole::Authority,
        LifeEventType::Betrayed => matches!(npc.role, NpcRole::Contact | NpcRole::Criminal),
        LifeEventType::Compromised => npc.role == NpcRole::Contact,
        LifeEventType::Retired => npc.age >= 50 && npc.status != NpcStatus::Retired,
        LifeEventType::Died => npc.age >= 40 || npc.role == NpcRole::Criminal,
        LifeEventType::Recruited => npc.role == NpcRole::Civilian && !npc.employed,
        LifeEventType::Fired => npc.employed,
        LifeEventType::Married => (22..=50).contains(&npc.age),
        LifeEventType::Divorced => npc.age >= 25,
    }
}

fn destination<R: Rng + ?Sized>(rng: &mut R, npc: &Npc, kind: LifeEventType) -> Option<String> {
    match kind {
        LifeEventType::Relocated => {
            let country = starting_world::country(&npc.country_code)?;
            let options: Vec<_> = country
                .cities
                .iter()
                .filter(|city| city.name != npc.city)
                .collect();
            options.choose(rng).map(|city| city.name.to_owned())
        }
        LifeEventType::LeftCountry => {
            let options: Vec<_> = COUNTRIES
                .iter()
                .filter(|country| country.code != npc.country_code)
                .collect();
            let country = options.choose(rng)?;
            country.cities.choose(rng).map(|city| city.name.to_owned())
        }
        _ => None,
    }
}

fn describe<R: Rng + ?Sized>(
    rng: &mut R,
    npc: &Npc,
    kind: LifeEventType,
    new_city: Option<&str>,
) -> String {
    let name = &npc.name;
    let elsewhere = new_city.unwrap_or("parts unknown");
    match kind {
        LifeEventType::Relocated => format!("{name} relocated to {elsewhere}"),
        LifeEventType::LeftCountry => format!("{name} left the country for {elsewhere}"),
        LifeEventType::Arrested => format!("{name} was arrested in {}", npc.city),
        LifeEventType::Released => format!("{name} was released from custody"),
        LifeEventType::Injured => format!("{name} was injured in {}", npc.city),
        LifeEventType::Recovered => format!("{name} recovered from their injuries"),
        LifeEventType::Promoted => format!("{name} was promoted"),
        LifeEventType::Demoted => format!("{name} was demoted"),
        LifeEventType::Betrayed => format!("{name} betrayed their associates"),
        LifeEventType::Compromised => format!("{name} has been compromised"),
        LifeEventType::Retired => format!("{name} retired"),
        LifeEventType::Died => {
            let cause = DEATH_CAUSES.choose(rng).copied().unwrap_or("unknown circumstances");
            format!("{name} died from {cause}")
        }
        LifeEventType::Recruited => format!("{name} found new work"),
        LifeEventType::Fired => format!("{name} lost their job"),
        LifeEventType::Married => format!("{name} got married"),
        LifeEventType::Divorced => format!("{name} got divorced"),
    }
}

/// Roll the daily table for one character.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, npc: &Npc, at: GameTime) -> Option<LifeEvent> {
    for (kind, chance) in DAILY_CHANCES {
        if !eligible(npc, kind) || !rng.random_bool(chance) {
            continue;
        }
        let new_city = destination(rng, npc, kind);
        if matches!(kind, LifeEventType::Relocated | LifeEventType::LeftCountry)
            && new_city.is_none()
        {
            continue;
        }
        return Some(LifeEvent {
            id: LifeEventId::from_rng(rng),
            npc_id: npc.id,
            npc_name: npc.name.clone(),
            kind,
            at,
            description: describe(rng, npc, kind, new_city.as_deref()),
            country_code: npc.country_code.clone(),
            city: npc.city.clone(),
            new_city,
            newsworthy: kind.is_newsworthy(),
        });
    }
    None
}

/// Events produced at one boundary.
#[derive(Debug, Default)]
pub struct LifeEventsUpdate {
    events: Vec<Arc<LifeEvent>>,
}

/// Rolls daily life events and keeps a short history.
#[derive(Debug, Clone, Default)]
pub struct LifeEvents {
    history: VecDeque<Arc<LifeEvent>>,
}

impl LifeEvents {
    /// A manager with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent events, newest first.
    pub fn history(&self) -> impl Iterator<Item = &LifeEvent> {
        self.history.iter().map(AsRef::as_ref)
    }

    /// Recent events for one character.
    pub fn for_npc(&self, id: NpcId) -> impl Iterator<Item = &LifeEvent> {
        self.history().filter(move |event| event.npc_id == id)
    }

    /// Recent events that made the papers.
    pub fn newsworthy(&self) -> impl Iterator<Item = &LifeEvent> {
        self.history().filter(|event| event.newsworthy)
    }
}

impl SimulationManager for LifeEvents {
    type Update = LifeEventsUpdate;

    fn name(&self) -> &'static str {
        LIFE_EVENTS
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<LifeEventsUpdate, ManagerError> {
        if ctx.kind() != BoundaryKind::Day {
            return Ok(LifeEventsUpdate::default());
        }
        let now = *ctx.now();
        let registry = ctx.upstream::<CharacterRegistry>();
        let pool = ctx.upstream::<MercenaryPool>();
        let characters = registry
            .into_iter()
            .flat_map(CharacterRegistry::npcs)
            .chain(pool.into_iter().flat_map(MercenaryPool::mercenaries));

        let mut events = Vec::new();
        for npc in characters {
            if let Some(event) = roll(ctx.rng(), npc, now) {
                let event = Arc::new(event);
                ctx.emit(SimEvent::Life(Arc::clone(&event)));
                events.push(event);
            }
        }
        if !events.is_empty() {
            debug!(count = events.len(), day = %now.date, "Life events rolled");
        }
        Ok(LifeEventsUpdate { events })
    }

    fn commit(&mut self, update: LifeEventsUpdate) {
        for event in update.events {
            self.history.push_front(event);
        }
        self.history.truncate(HISTORY_LIMIT);
    }
}
