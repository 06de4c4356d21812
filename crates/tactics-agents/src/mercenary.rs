//! Mercenary pool: hireable guns per country.
//!
//! Every roster country keeps a pool sized from its military, corruption,
//! policing, and wealth. Pools are refilled weekly when fewer than half of
//! the target are available. Hired mercenaries are paid daily and their
//! contracts count down.
//!
//! Mercenaries are full [`Npc`]s owned by the pool; life events reach them
//! the same way they reach registry characters.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use tactics_core::clock::game_time_at;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, GameTime, LifeEvent, LifeEventId, LifeEventType, NpcId, NpcRole, SimEvent,
};
use tactics_world::starting_world::{self, COUNTRIES, CountryProfile};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::registry::{Npc, generate_npc};

/// Registry name of the mercenary pool.
pub const MERCENARY_POOL: &str = "mercenary_pool";

/// Most mercenaries added to one country per refresh.
pub const MAX_REFRESH: usize = 3;

/// What a mercenary is good at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    /// Front-line fighter.
    Assault,
    /// Long-range specialist.
    Sniper,
    /// Combat medic.
    Medic,
    /// Tech and explosives.
    Engineer,
    /// Recon and stealth.
    Scout,
    /// Heavy weapons.
    Heavy,
    /// Vehicles.
    Driver,
    /// Jack of all trades.
    Generalist,
}

const SPECIALTIES: [Specialty; 8] = [
    Specialty::Assault,
    Specialty::Sniper,
    Specialty::Medic,
    Specialty::Engineer,
    Specialty::Scout,
    Specialty::Heavy,
    Specialty::Driver,
    Specialty::Generalist,
];

/// Whether a mercenary can be hired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Free to hire.
    Available,
    /// Working for the player.
    OnContract,
    /// Recovering from an injury.
    Injured,
    /// Dead or out of the business.
    Unavailable,
}

/// A mercenary on offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MercenaryListing {
    /// The mercenary.
    pub npc: Npc,
    /// Specialty.
    pub specialty: Specialty,
    /// Star rating, 1-5.
    pub rating: u8,
    /// Asking rate per day in dollars.
    pub daily_rate: Decimal,
    /// Hiring status.
    pub availability: Availability,
    /// Jobs finished so far.
    pub contracts_completed: u32,
}

impl MercenaryListing {
    /// Word-of-mouth descriptor.
    pub const fn reputation(&self) -> &'static str {
        match self.contracts_completed {
            20.. => "Legendary",
            10..=19 => "Veteran",
            5..=9 => "Experienced",
            1..=4 => "Proven",
            0 => "Unknown",
        }
    }
}

/// How a contract ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Running.
    Active,
    /// Ended by the player.
    Terminated,
    /// Ran out.
    Expired,
    /// The mercenary died on the job.
    Deceased,
}

/// A hiring agreement with the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    /// The mercenary.
    pub mercenary: NpcId,
    /// When the contract started.
    pub started_at: GameTime,
    /// Agreed rate per day.
    pub daily_rate: Decimal,
    /// Days left; `None` runs until terminated.
    pub days_remaining: Option<u32>,
    /// Wages paid so far.
    pub total_paid: Decimal,
    /// Current status.
    pub status: ContractStatus,
}

/// Target pool size for a country, 2-15.
pub fn pool_size(country: &CountryProfile) -> usize {
    let military = country.military_strength / 10;
    let corruption = country.corruption / 20;
    let policing = country.law_enforcement / 25;
    let wealth = (country.gdp_per_capita / 20).min(5);
    let size = military
        .saturating_add(corruption)
        .saturating_sub(policing)
        .saturating_add(wealth)
        .clamp(2, 15);
    usize::try_from(size).unwrap_or(2)
}

/// Local price adjustment: policing adds a premium, corruption a discount.
#[allow(clippy::arithmetic_side_effects)]
fn local_rate(base: Decimal, country: &CountryProfile) -> Decimal {
    let premium = Decimal::new(i64::from(country.law_enforcement), 2);
    let discount = Decimal::new(i64::from(country.corruption), 2) / Decimal::TWO;
    (base * (Decimal::ONE + premium - discount)).round_dp(2)
}

fn new_listing<R: Rng + ?Sized>(
    rng: &mut R,
    country: &CountryProfile,
    veteran: bool,
) -> Option<MercenaryListing> {
    let city = country.cities.choose(rng)?;
    let npc = generate_npc(rng, NpcRole::Mercenary, country, city, 22..=50);
    let rating: u8 = rng.random_range(1..=5);
    let base = Decimal::from(125_u32.saturating_add(u32::from(rating).saturating_mul(75)));
    Some(MercenaryListing {
        npc,
        specialty: SPECIALTIES.choose(rng).copied().unwrap_or(Specialty::Generalist),
        rating,
        daily_rate: local_rate(base, country),
        availability: Availability::Available,
        contracts_completed: if veteran { rng.random_range(0..5) } else { 0 },
    })
}

fn fill_country<R: Rng + ?Sized>(rng: &mut R, country: &CountryProfile) -> Vec<MercenaryListing> {
    (0..pool_size(country))
        .filter_map(|_| new_listing(rng, country, true))
        .collect()
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct PoolUpdate {
    now: Option<GameTime>,
    events: Vec<Arc<LifeEvent>>,
    pay_day: bool,
    refresh: Option<BTreeMap<String, Vec<MercenaryListing>>>,
}

/// Owns every mercenary listing and the player's contracts.
#[derive(Debug, Clone)]
pub struct MercenaryPool {
    pools: BTreeMap<String, Vec<MercenaryListing>>,
    contracts: BTreeMap<NpcId, Contract>,
    applied: BTreeSet<LifeEventId>,
    now: GameTime,
}

impl Default for MercenaryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MercenaryPool {
    /// Empty pool; listings are filled on start.
    pub fn new() -> Self {
        Self {
            pools: BTreeMap::new(),
            contracts: BTreeMap::new(),
            applied: BTreeSet::new(),
            now: game_time_at(0),
        }
    }

    /// Mercenaries free to hire in a country.
    pub fn available_in<'a>(&'a self, country_code: &str) -> impl Iterator<Item = &'a MercenaryListing> {
        self.listings_in(country_code)
            .filter(|listing| listing.availability == Availability::Available)
    }

    /// Every listing in a country.
    pub fn listings_in<'a>(&'a self, country_code: &str) -> impl Iterator<Item = &'a MercenaryListing> {
        self.pools.get(country_code).into_iter().flatten()
    }

    /// Every mercenary across all pools.
    pub fn mercenaries(&self) -> impl Iterator<Item = &Npc> {
        self.pools.values().flatten().map(|listing| &listing.npc)
    }

    /// A listing by mercenary id.
    pub fn listing(&self, id: NpcId) -> Option<&MercenaryListing> {
        self.pools.values().flatten().find(|listing| listing.npc.id == id)
    }

    fn listing_mut(&mut self, id: NpcId) -> Option<&mut MercenaryListing> {
        self.pools
            .values_mut()
            .flatten()
            .find(|listing| listing.npc.id == id)
    }

    /// A contract by mercenary id.
    pub fn contract(&self, id: NpcId) -> Option<&Contract> {
        self.contracts.get(&id)
    }

    /// Mercenaries currently working for the player.
    pub fn hired(&self) -> impl Iterator<Item = &MercenaryListing> {
        self.contracts
            .values()
            .filter(|contract| contract.status == ContractStatus::Active)
            .filter_map(|contract| self.listing(contract.mercenary))
    }

    /// Hire a mercenary at their asking rate.
    pub fn hire(&mut self, id: NpcId, days: Option<u32>) -> Result<&Contract, AgentError> {
        let started_at = self.now;
        let listing = self.listing_mut(id).ok_or(AgentError::NpcNotFound(id))?;
        if listing.availability != Availability::Available {
            return Err(AgentError::MercenaryUnavailable {
                id,
                availability: listing.availability,
            });
        }
        listing.availability = Availability::OnContract;
        let contract = Contract {
            mercenary: id,
            started_at,
            daily_rate: listing.daily_rate,
            days_remaining: days,
            total_paid: Decimal::ZERO,
            status: ContractStatus::Active,
        };
        info!(mercenary = %listing.npc.name, rate = %contract.daily_rate, "Mercenary hired");
        self.contracts.insert(id, contract);
        self.contracts.get(&id).ok_or(AgentError::NoContract(id))
    }

    /// End a contract early.
    pub fn release(&mut self, id: NpcId) -> Result<(), AgentError> {
        let contract = self
            .contracts
            .get_mut(&id)
            .filter(|contract| contract.status == ContractStatus::Active)
            .ok_or(AgentError::NoContract(id))?;
        contract.status = ContractStatus::Terminated;
        if let Some(listing) = self.listing_mut(id) {
            listing.availability = Availability::Available;
            listing.contracts_completed = listing.contracts_completed.saturating_add(1);
        }
        Ok(())
    }

    /// Total wages paid across all contracts.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn total_wages_paid(&self) -> Decimal {
        self.contracts.values().map(|contract| contract.total_paid).sum()
    }

    fn apply_life_event(&mut self, event: &LifeEvent) {
        let Some(listing) = self.listing_mut(event.npc_id) else {
            return;
        };
        listing.npc.apply(event);
        let on_contract = listing.availability == Availability::OnContract;
        match event.kind {
            LifeEventType::Died | LifeEventType::Retired | LifeEventType::Arrested => {
                listing.availability = Availability::Unavailable;
            }
            LifeEventType::Injured if !on_contract => listing.availability = Availability::Injured,
            LifeEventType::Recovered | LifeEventType::Released
                if listing.availability != Availability::OnContract =>
            {
                listing.availability = Availability::Available;
            }
            _ => {}
        }
        if event.kind == LifeEventType::Died {
            if let Some(contract) = self
                .contracts
                .get_mut(&event.npc_id)
                .filter(|contract| contract.status == ContractStatus::Active)
            {
                contract.status = ContractStatus::Deceased;
            }
        }
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn pay_wages(&mut self) {
        let mut finished = Vec::new();
        for contract in self
            .contracts
            .values_mut()
            .filter(|contract| contract.status == ContractStatus::Active)
        {
            contract.total_paid += contract.daily_rate;
            if let Some(days) = contract.days_remaining.as_mut() {
                *days = days.saturating_sub(1);
                if *days == 0 {
                    contract.status = ContractStatus::Expired;
                    finished.push(contract.mercenary);
                }
            }
        }
        for id in finished {
            if let Some(listing) = self.listing_mut(id) {
                listing.availability = Availability::Available;
                listing.contracts_completed = listing.contracts_completed.saturating_add(1);
            }
        }
    }

    fn refreshed<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeMap<String, Vec<MercenaryListing>> {
        let mut pools = BTreeMap::new();
        for (code, pool) in &self.pools {
            let mut kept: Vec<MercenaryListing> = pool
                .iter()
                .filter(|listing| {
                    listing.availability != Availability::Unavailable && listing.npc.is_alive()
                })
                .cloned()
                .collect();
            if let Some(country) = starting_world::country(code) {
                let target = pool_size(country);
                let available = kept
                    .iter()
                    .filter(|listing| listing.availability == Availability::Available)
                    .count();
                if available.saturating_mul(2) < target {
                    let missing = target.saturating_sub(available).min(MAX_REFRESH);
                    kept.extend((0..missing).filter_map(|_| new_listing(rng, country, false)));
                }
            }
            pools.insert(code.clone(), kept);
        }
        pools
    }
}

impl SimulationManager for MercenaryPool {
    type Update = PoolUpdate;

    fn name(&self) -> &'static str {
        MERCENARY_POOL
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.now = ctx.now;
        if self.pools.is_empty() {
            for country in COUNTRIES {
                self.pools
                    .insert(country.code.to_owned(), fill_country(&mut ctx.rng, country));
            }
        }
        info!(mercenaries = self.mercenaries().count(), "Mercenary pool started");
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<PoolUpdate, ManagerError> {
        let events = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Life(life) => Some(life),
                _ => None,
            })
            .filter(|life| !self.applied.contains(&life.id) && self.listing(life.npc_id).is_some())
            .cloned()
            .collect();
        let refresh = (ctx.kind() == BoundaryKind::Week).then(|| self.refreshed(ctx.rng()));
        Ok(PoolUpdate {
            now: Some(*ctx.now()),
            events,
            pay_day: ctx.kind() == BoundaryKind::Day,
            refresh,
        })
    }

    fn commit(&mut self, update: PoolUpdate) {
        if let Some(now) = update.now {
            self.now = now;
        }
        for event in update.events {
            if self.applied.insert(event.id) {
                self.apply_life_event(&event);
            }
        }
        if update.pay_day {
            self.pay_wages();
        }
        if let Some(pools) = update.refresh {
            self.pools = pools;
            debug!(mercenaries = self.mercenaries().count(), "Mercenary pools refreshed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use tactics_core::{SimulationConfig, TimeEngine};

    use super::*;

    fn engine() -> TimeEngine {
        let mut engine = TimeEngine::new(&SimulationConfig::default());
        engine.subscribe(MercenaryPool::new()).unwrap();
        engine.start(MERCENARY_POOL).unwrap();
        engine
    }

    #[test]
    fn pool_sizes_follow_the_country_profile() {
        let us = starting_world::country("US").unwrap();
        let jp = starting_world::country("JP").unwrap();
        // 9 + 1 - 3 + 4
        assert_eq!(pool_size(us), 11);
        // 6 + 0 - 3 + 3
        assert_eq!(pool_size(jp), 6);
        for country in COUNTRIES {
            assert!((2..=15).contains(&pool_size(country)));
        }
    }

    #[test]
    fn local_rate_rewards_corruption_and_taxes_policing() {
        let ng = starting_world::country("NG").unwrap();
        let de = starting_world::country("DE").unwrap();
        assert!(local_rate(dec!(200), ng) < local_rate(dec!(200), de));
        // 1 + 0.30 - 0.40
        assert_eq!(local_rate(dec!(200), ng), dec!(180.00));
    }

    #[test]
    fn hiring_pays_daily_and_expires() {
        let mut engine = engine();
        let pool = engine.manager::<MercenaryPool>().unwrap();
        let id = pool.available_in("US").next().unwrap().npc.id;
        let rate = pool.listing(id).unwrap().daily_rate;

        let pool = engine.manager_mut::<MercenaryPool>().unwrap();
        pool.hire(id, Some(3)).unwrap();
        assert!(matches!(
            pool.hire(id, None),
            Err(AgentError::MercenaryUnavailable { .. })
        ));

        engine.advance_hours(24.0 * 3.0).unwrap();
        let pool = engine.manager::<MercenaryPool>().unwrap();
        let contract = pool.contract(id).unwrap();
        assert_eq!(contract.status, ContractStatus::Expired);
        assert_eq!(contract.total_paid, rate * dec!(3));
        let listing = pool.listing(id).unwrap();
        assert_eq!(listing.availability, Availability::Available);
        assert!(listing.contracts_completed >= 1);
    }

    #[test]
    fn release_ends_an_open_contract() {
        let mut engine = engine();
        let id = engine
            .manager::<MercenaryPool>()
            .unwrap()
            .available_in("MX")
            .next()
            .unwrap()
            .npc
            .id;
        let pool = engine.manager_mut::<MercenaryPool>().unwrap();
        pool.hire(id, None).unwrap();
        assert_eq!(pool.hired().count(), 1);
        pool.release(id).unwrap();
        assert_eq!(pool.hired().count(), 0);
        assert_eq!(pool.release(id), Err(AgentError::NoContract(id)));
    }

    #[test]
    fn death_closes_the_contract_and_weekly_refresh_replaces_the_dead() {
        let mut pool = MercenaryPool::new();
        let mut rng = rand::rngs::StdRng::from_os_rng();
        let br = starting_world::country("BR").unwrap();
        pool.pools.insert("BR".to_owned(), fill_country(&mut rng, br));
        let ids: Vec<NpcId> = pool.listings_in("BR").map(|listing| listing.npc.id).collect();
        pool.hire(ids[0], None).unwrap();

        for id in &ids {
            let listing = pool.listing(*id).unwrap();
            pool.apply_life_event(&LifeEvent {
                id: LifeEventId::new(),
                npc_id: *id,
                npc_name: listing.npc.name.clone(),
                kind: LifeEventType::Died,
                at: game_time_at(0),
                description: String::new(),
                country_code: "BR".to_owned(),
                city: listing.npc.city.clone(),
                new_city: None,
                newsworthy: false,
            });
        }
        assert_eq!(pool.contract(ids[0]).unwrap().status, ContractStatus::Deceased);
        assert_eq!(pool.available_in("BR").count(), 0);

        let refreshed = pool.refreshed(&mut rng);
        let fresh = refreshed.get("BR").unwrap();
        assert_eq!(fresh.len(), MAX_REFRESH.min(pool_size(br)));
        assert!(fresh.iter().all(|listing| listing.contracts_completed == 0));
    }

}
