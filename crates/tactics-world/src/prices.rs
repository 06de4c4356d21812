//! Event-driven price shocks.
//!
//! The price fluctuation manager watches world events and turns the ones
//! that move markets into [`PriceEvent`]s: a coup floods the streets with
//! surplus weapons, sanctions dry up electronics, a disaster sends medical
//! prices through the roof. The economy manager consumes the emitted
//! events; this manager only tracks which are still running.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::GoodsCategory::{
    Ammunition, Armor, Contraband, Electronics, Explosives, Medical, Vehicles, Weapons,
};
use tactics_types::{
    BoundaryKind, GameTime, GoodsCategory, MINUTES_PER_DAY, MarketCondition, PriceEffect,
    PriceEvent, PriceEventId, PriceEventType, SimEvent, WorldEvent, WorldEventCategory,
};
use tracing::{debug, info};

use crate::error::WorldError;
use crate::starting_world;

/// Registry name of the price fluctuation manager.
pub const PRICE_FLUCTUATION: &str = "price_fluctuation";

/// Number of past price events kept for queries.
pub const HISTORY_LIMIT: usize = 50;

/// Fixed market response to one kind of price event.
#[derive(Debug, Clone, Copy)]
pub struct EffectProfile {
    /// Market condition forced on the country, if any.
    pub market_condition: Option<MarketCondition>,
    /// `(category, multiplier, supply change, demand change)` per goods category.
    pub effects: &'static [(GoodsCategory, f64, f64, f64)],
    /// How long the price modifiers last.
    pub duration_days: u32,
    /// Candidate headlines.
    pub headlines: &'static [&'static str],
}

/// Market response for each kind of price event.
pub const fn profile(kind: PriceEventType) -> EffectProfile {
    match kind {
        PriceEventType::Coup => EffectProfile {
            market_condition: Some(MarketCondition::Flooded),
            effects: &[
                (Weapons, 0.5, 40.0, -10.0),
                (Ammunition, 0.4, 50.0, -10.0),
                (Explosives, 0.6, 30.0, 0.0),
                (Armor, 0.7, 25.0, -5.0),
                (Contraband, 0.6, 30.0, 10.0),
            ],
            duration_days: 30,
            headlines: &[
                "Military Coup Floods Markets with Equipment",
                "Armory Doors Open After Government Falls",
                "Fire Sale: Military Surplus Floods Streets",
            ],
        },
        PriceEventType::CivilWar => EffectProfile {
            market_condition: Some(MarketCondition::Shortage),
            effects: &[
                (Weapons, 1.8, -40.0, 50.0),
                (Ammunition, 2.0, -50.0, 60.0),
                (Medical, 2.5, -60.0, 70.0),
                (Armor, 1.5, -30.0, 40.0),
            ],
            duration_days: 90,
            headlines: &[
                "Civil War Drives Desperate Demand for Supplies",
                "Combat Zones Create Critical Shortages",
                "War Prices: Essentials Skyrocket",
            ],
        },
        PriceEventType::Sanctions => EffectProfile {
            market_condition: Some(MarketCondition::Shortage),
            effects: &[
                (Electronics, 2.0, -60.0, 30.0),
                (Vehicles, 1.8, -50.0, 20.0),
                (Weapons, 1.5, -40.0, 10.0),
                (Medical, 1.3, -30.0, 20.0),
            ],
            duration_days: 180,
            headlines: &[
                "International Sanctions Bite: Imports Dry Up",
                "Embargo Creates Critical Shortages",
                "Sanctions Strangle Supply Chains",
            ],
        },
        PriceEventType::NaturalDisaster => EffectProfile {
            market_condition: Some(MarketCondition::Crisis),
            effects: &[
                (Medical, 2.5, -50.0, 80.0),
                (Vehicles, 1.5, -30.0, 40.0),
                (Electronics, 1.3, -20.0, 30.0),
            ],
            duration_days: 14,
            headlines: &[
                "Disaster Strikes: Medical Supplies Desperately Needed",
                "Emergency Response Drains Resources",
                "Aftermath: Prices Surge as Aid Pours In",
            ],
        },
        PriceEventType::ArmsDeal => EffectProfile {
            market_condition: None,
            effects: &[
                (Weapons, 0.7, 30.0, -20.0),
                (Ammunition, 0.8, 25.0, -15.0),
                (Armor, 0.85, 20.0, -10.0),
            ],
            duration_days: 21,
            headlines: &[
                "Major Arms Deal: Surplus Enters Market",
                "Defense Contractor Offloads Inventory",
                "Military Hardware Floods Local Dealers",
            ],
        },
        PriceEventType::TradeAgreement => EffectProfile {
            market_condition: Some(MarketCondition::Boom),
            effects: &[
                (Electronics, 0.85, 20.0, 10.0),
                (Vehicles, 0.9, 15.0, 5.0),
                (Medical, 0.9, 15.0, 5.0),
            ],
            duration_days: 365,
            headlines: &[
                "Trade Deal Opens Markets",
                "New Agreement Promises Lower Prices",
                "Economic Integration Brings Benefits",
            ],
        },
        PriceEventType::CurrencyCrisis => EffectProfile {
            market_condition: Some(MarketCondition::Crisis),
            effects: &[
                (Weapons, 0.5, 10.0, -30.0),
                (Electronics, 0.6, 10.0, -25.0),
                (Vehicles, 0.5, 10.0, -35.0),
                (Medical, 0.7, 5.0, -15.0),
            ],
            duration_days: 60,
            headlines: &[
                "Currency Collapse: Fire Sales Everywhere",
                "Economic Meltdown: Prices Crash",
                "Devaluation Creates Bargain Prices",
            ],
        },
        PriceEventType::Boom => EffectProfile {
            market_condition: Some(MarketCondition::Boom),
            effects: &[(Electronics, 1.15, 10.0, 25.0), (Vehicles, 1.2, 5.0, 30.0)],
            duration_days: 180,
            headlines: &[
                "Economic Boom: Demand Surges",
                "Growth Drives Consumer Spending",
                "Prosperity Pushes Prices Higher",
            ],
        },
        PriceEventType::Recession => EffectProfile {
            market_condition: Some(MarketCondition::Recession),
            effects: &[
                (Electronics, 0.8, 15.0, -30.0),
                (Vehicles, 0.7, 20.0, -40.0),
                (Weapons, 0.9, 10.0, -15.0),
            ],
            duration_days: 180,
            headlines: &[
                "Recession Hits: Prices Fall",
                "Economic Downturn Reduces Demand",
                "Hard Times Mean Cheaper Goods",
            ],
        },
        PriceEventType::WarNearby => EffectProfile {
            market_condition: None,
            effects: &[
                (Weapons, 1.4, -20.0, 40.0),
                (Ammunition, 1.5, -25.0, 45.0),
                (Armor, 1.3, -15.0, 30.0),
                (Medical, 1.2, -10.0, 25.0),
            ],
            duration_days: 60,
            headlines: &[
                "Neighboring Conflict Drives Demand",
                "War Next Door: Prices Rise",
                "Regional Instability Affects Markets",
            ],
        },
        PriceEventType::Peacetime => EffectProfile {
            market_condition: Some(MarketCondition::Normal),
            effects: &[
                (Weapons, 0.9, 15.0, -20.0),
                (Ammunition, 0.85, 20.0, -25.0),
                (Medical, 0.9, 10.0, -15.0),
            ],
            duration_days: 365,
            headlines: &[
                "Peace Returns: Markets Stabilize",
                "Conflict Ends: Prices Normalize",
                "Stability Brings Relief",
            ],
        },
    }
}

/// The price event a world event triggers, if any.
///
/// Political, economic and military events are matched on headline
/// keywords; every natural disaster moves prices.
pub fn classify(event: &WorldEvent) -> Option<PriceEventType> {
    let headline = event.headline.to_lowercase();
    let has = |needle: &str| headline.contains(needle);
    match event.category {
        WorldEventCategory::NaturalDisaster => Some(PriceEventType::NaturalDisaster),
        WorldEventCategory::Political => {
            if has("coup") {
                Some(PriceEventType::Coup)
            } else if has("sanction") {
                Some(PriceEventType::Sanctions)
            } else if has("peace") {
                Some(PriceEventType::Peacetime)
            } else if has("war") {
                Some(PriceEventType::CivilWar)
            } else {
                None
            }
        }
        WorldEventCategory::Economic => {
            if has("boom") {
                Some(PriceEventType::Boom)
            } else if has("recession") || has("tumbles") {
                Some(PriceEventType::Recession)
            } else if has("crisis") || has("devaluation") {
                Some(PriceEventType::CurrencyCrisis)
            } else if has("sanction") {
                Some(PriceEventType::Sanctions)
            } else if has("trade deal") {
                Some(PriceEventType::TradeAgreement)
            } else {
                None
            }
        }
        WorldEventCategory::Military => {
            if has("arms deal") {
                Some(PriceEventType::ArmsDeal)
            } else if has("embargo") {
                Some(PriceEventType::Sanctions)
            } else if has("peacekeepers") {
                Some(PriceEventType::Peacetime)
            } else if has("conflict") || has("tensions") {
                Some(PriceEventType::WarNearby)
            } else {
                None
            }
        }
        WorldEventCategory::GangTerritory
        | WorldEventCategory::CrimeWave
        | WorldEventCategory::Superhuman
        | WorldEventCategory::Social => None,
    }
}

/// Build a price event of `kind` in `country_code`.
pub fn build<R: Rng + ?Sized>(
    kind: PriceEventType,
    country_code: &str,
    at: GameTime,
    source_event: Option<&WorldEvent>,
    rng: &mut R,
) -> PriceEvent {
    let profile = profile(kind);
    let headline = profile
        .headlines
        .choose(rng)
        .map_or_else(|| format!("{kind:?} in {country_code}"), |h| (*h).to_owned());
    PriceEvent {
        id: PriceEventId::from_rng(rng),
        kind,
        country_code: country_code.to_owned(),
        at,
        duration_days: profile.duration_days,
        market_condition: profile.market_condition,
        effects: profile
            .effects
            .iter()
            .map(|&(category, multiplier, supply_change, demand_change)| PriceEffect {
                category,
                multiplier,
                supply_change,
                demand_change,
            })
            .collect(),
        headline,
        source_event: source_event.map(|event| event.id),
    }
}

/// When a price event stops affecting prices.
pub fn expires_at_minute(event: &PriceEvent) -> u64 {
    u64::from(event.duration_days)
        .saturating_mul(MINUTES_PER_DAY)
        .saturating_add(event.at.total_minutes)
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct PriceUpdate {
    created: Vec<Arc<PriceEvent>>,
    expire_through: Option<u64>,
    triggers_taken: usize,
}

/// Tracks running price events and emits new ones.
#[derive(Debug, Clone, Default)]
pub struct PriceFluctuation {
    active: Vec<Arc<PriceEvent>>,
    history: VecDeque<Arc<PriceEvent>>,
    triggers: Vec<(PriceEventType, String)>,
}

impl PriceFluctuation {
    /// A manager with no running events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a price event in a country. It is published on the next
    /// boundary.
    pub fn trigger(&mut self, kind: PriceEventType, country_code: &str) -> Result<(), WorldError> {
        if starting_world::country(country_code).is_none() {
            return Err(WorldError::UnknownCountry(country_code.to_owned()));
        }
        self.triggers.push((kind, country_code.to_owned()));
        Ok(())
    }

    /// Running events in a country.
    pub fn active_in<'a>(&'a self, country_code: &'a str) -> impl Iterator<Item = &'a PriceEvent> {
        self.active
            .iter()
            .map(AsRef::as_ref)
            .filter(move |event| event.country_code == country_code)
    }

    /// Every running event.
    pub fn active(&self) -> impl Iterator<Item = &PriceEvent> {
        self.active.iter().map(AsRef::as_ref)
    }

    /// The `limit` most recent events, newest first.
    pub fn history(&self, limit: usize) -> impl Iterator<Item = &PriceEvent> {
        self.history.iter().take(limit).map(AsRef::as_ref)
    }
}

impl SimulationManager for PriceFluctuation {
    type Update = PriceUpdate;

    fn name(&self) -> &'static str {
        PRICE_FLUCTUATION
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<PriceUpdate, ManagerError> {
        let now = *ctx.now();
        let mut created = Vec::new();

        let world_events: Vec<&WorldEvent> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::World(world) => Some(world.as_ref()),
                _ => None,
            })
            .collect();
        for world in world_events {
            if let Some(kind) = classify(world) {
                let event = build(kind, &world.country_code, now, Some(world), ctx.rng());
                created.push(Arc::new(event));
            }
        }
        for (kind, country_code) in &self.triggers {
            created.push(Arc::new(build(*kind, country_code, now, None, ctx.rng())));
        }

        let expire_through = (ctx.kind() == BoundaryKind::Day).then_some(now.total_minutes);

        for event in &created {
            ctx.emit(SimEvent::Price(Arc::clone(event)));
        }
        Ok(PriceUpdate {
            created,
            expire_through,
            triggers_taken: self.triggers.len(),
        })
    }

    fn commit(&mut self, update: PriceUpdate) {
        let taken = update.triggers_taken.min(self.triggers.len());
        self.triggers.drain(..taken);

        if let Some(cutoff) = update.expire_through {
            let before = self.active.len();
            self.active.retain(|event| expires_at_minute(event) > cutoff);
            let expired = before.saturating_sub(self.active.len());
            if expired > 0 {
                debug!(expired, "Price events expired");
            }
        }

        for event in update.created {
            info!(
                kind = ?event.kind,
                country = %event.country_code,
                headline = %event.headline,
                "Price event"
            );
            self.active.push(Arc::clone(&event));
            self.history.push_front(event);
        }
        self.history.truncate(HISTORY_LIMIT);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tactics_core::clock::game_time_at;
    use tactics_core::config::WorldEventRates;
    use tactics_core::{SimulationConfig, TimeEngine};
    use tactics_types::{Severity, WorldEventId};

    use super::*;
    use crate::world_sim::{WORLD_SIMULATION, WorldSimulation};

    fn world_event(category: WorldEventCategory, headline: &str) -> WorldEvent {
        WorldEvent {
            id: WorldEventId::new(),
            category,
            country_code: "RU".to_owned(),
            city: None,
            severity: Severity::Critical,
            headline: headline.to_owned(),
            description: String::new(),
            effects: Vec::new(),
            created_at: game_time_at(0),
            expires_at: None,
        }
    }

    fn quiet_engine() -> TimeEngine {
        let mut config = SimulationConfig::default();
        config.world_events = WorldEventRates {
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
        engine.subscribe(WorldSimulation::new(&config)).unwrap();
        engine.subscribe(PriceFluctuation::new()).unwrap();
        engine.start(WORLD_SIMULATION).unwrap();
        engine.start(PRICE_FLUCTUATION).unwrap();
        engine
    }

    #[test]
    fn classifies_by_category_and_keyword() {
        let coup = world_event(WorldEventCategory::Political, "Military coup attempted in Russia");
        assert_eq!(classify(&coup), Some(PriceEventType::Coup));
        let boom = world_event(WorldEventCategory::Economic, "Economic boom reported in Russia");
        assert_eq!(classify(&boom), Some(PriceEventType::Boom));
        let quake = world_event(WorldEventCategory::NaturalDisaster, "Earthquake strikes Moscow region");
        assert_eq!(classify(&quake), Some(PriceEventType::NaturalDisaster));
        let riot = world_event(WorldEventCategory::Social, "Riots break out in Moscow");
        assert_eq!(classify(&riot), None);
        let unrest = world_event(WorldEventCategory::Political, "Political unrest grows in Russia");
        assert_eq!(classify(&unrest), None);
    }

    #[test]
    fn built_event_carries_the_profile() {
        let source = world_event(WorldEventCategory::Political, "Military coup attempted in Russia");
        let mut rng = StdRng::seed_from_u64(3);
        let event = build(PriceEventType::Coup, "RU", game_time_at(60), Some(&source), &mut rng);
        assert_eq!(event.market_condition, Some(MarketCondition::Flooded));
        assert_eq!(event.effects.len(), 5);
        assert_eq!(event.duration_days, 30);
        assert_eq!(event.source_event, Some(source.id));
        assert!(profile(PriceEventType::Coup).headlines.contains(&event.headline.as_str()));
        assert_eq!(expires_at_minute(&event), 60 + 30 * MINUTES_PER_DAY);
    }

    #[test]
    fn world_event_becomes_price_event_on_the_same_boundary() {
        let mut engine = quiet_engine();
        let coup = world_event(WorldEventCategory::Political, "Military coup attempted in Russia");
        engine
            .manager_mut::<WorldSimulation>()
            .unwrap()
            .schedule(coup)
            .unwrap();

        engine.advance_hours(1.0).unwrap();
        let prices = engine.manager::<PriceFluctuation>().unwrap();
        assert_eq!(prices.active_in("RU").count(), 1);
        assert_eq!(prices.history(10).count(), 1);

        engine.advance_hours(24.0 * 31.0).unwrap();
        let prices = engine.manager::<PriceFluctuation>().unwrap();
        assert_eq!(prices.active().count(), 0);
        assert_eq!(prices.history(10).count(), 1);
    }

    #[test]
    fn triggers_are_validated_and_published_once() {
        let mut engine = quiet_engine();
        let prices = engine.manager_mut::<PriceFluctuation>().unwrap();
        assert_eq!(
            prices.trigger(PriceEventType::Sanctions, "ZZ"),
            Err(WorldError::UnknownCountry("ZZ".to_owned()))
        );
        prices.trigger(PriceEventType::Sanctions, "BR").unwrap();

        engine.advance_hours(3.0).unwrap();
        let prices = engine.manager::<PriceFluctuation>().unwrap();
        let active: Vec<&PriceEvent> = prices.active_in("BR").collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().unwrap().kind, PriceEventType::Sanctions);
    }
}
