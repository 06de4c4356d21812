//! The player's contact network.
//!
//! Contacts are registry characters the player has recruited. Each one
//! produces intel on a schedule set by its type and quality, and each one
//! can be burned: by a daily roll against its burn risk or by life events
//! that blow its cover. Purchased intel goes stale after a category-specific
//! validity window.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::Serialize;
use tactics_core::clock::game_time_at;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager, StartContext};
use tactics_types::{
    BoundaryKind, GameTime, IntelId, LifeEvent, LifeEventId, LifeEventType, MINUTES_PER_HOUR,
    NpcId, SimEvent,
};
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::registry::{CharacterRegistry, Npc};

/// Registry name of the contact network.
pub const CONTACTS: &str = "contacts";

/// Most unsold intel a contact holds at once.
pub const MAX_PENDING_INTEL: usize = 3;

/// Loyalty cap reached through purchases.
pub const MAX_LOYALTY: u8 = 30;

/// What a contact does for a living.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    /// Street-level informant.
    Informant,
    /// Someone inside a corporation or agency.
    Insider,
    /// Arranges deals and introductions.
    Fixer,
    /// Niche technical expert.
    Specialist,
    /// Moves goods across borders.
    Smuggler,
    /// Government or police official.
    Official,
    /// Reporter with sources of their own.
    Journalist,
    /// Researcher with lab access.
    Scientist,
}

impl ContactType {
    /// Intel this type of contact can provide.
    pub const fn categories(self) -> &'static [IntelCategory] {
        use IntelCategory as C;
        match self {
            Self::Informant => &[C::GangActivity, C::SmugglingRoutes, C::SafeHouses],
            Self::Insider => &[C::CorporateSecrets, C::PoliticalIntel, C::FinancialIntel],
            Self::Fixer => &[C::EquipmentDealers, C::SmugglingRoutes, C::SafeHouses],
            Self::Specialist => &[C::SuperhumanSightings, C::CorporateSecrets, C::TargetLocations],
            Self::Smuggler => &[C::SmugglingRoutes, C::EquipmentDealers, C::GangActivity],
            Self::Official => &[C::PoliceOperations, C::MilitaryMovements, C::PoliticalIntel],
            Self::Journalist => &[C::PoliticalIntel, C::CorporateSecrets, C::SuperhumanSightings],
            Self::Scientist => &[
                C::SuperhumanSightings,
                C::CorporateSecrets,
                C::MilitaryMovements,
            ],
        }
    }
}

/// Subject of a piece of intel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelCategory {
    /// Gang movements and turf.
    GangActivity,
    /// Raids and patrols.
    PoliceOperations,
    /// Troop deployments.
    MilitaryMovements,
    /// Backroom politics.
    PoliticalIntel,
    /// Corporate projects and security.
    CorporateSecrets,
    /// Superhuman sightings.
    SuperhumanSightings,
    /// Smuggling routes.
    SmugglingRoutes,
    /// Safe houses.
    SafeHouses,
    /// Arms and gear dealers.
    EquipmentDealers,
    /// Whereabouts of a target.
    TargetLocations,
    /// Money trails.
    FinancialIntel,
}

impl IntelCategory {
    /// Hours the intel stays useful before quality adjustments.
    pub const fn validity_hours(self) -> u64 {
        match self {
            Self::SuperhumanSightings => 24,
            Self::PoliceOperations => 48,
            Self::GangActivity => 72,
            Self::TargetLocations => 120,
            Self::MilitaryMovements | Self::SmugglingRoutes | Self::FinancialIntel => 168,
            Self::CorporateSecrets => 240,
            Self::PoliticalIntel | Self::SafeHouses => 336,
            Self::EquipmentDealers => 504,
        }
    }

    /// Price multiplier over the contact's base cost.
    pub const fn price_multiplier(self) -> Decimal {
        match self {
            Self::GangActivity => Decimal::from_parts(8, 0, 0, false, 1),
            Self::PoliceOperations | Self::TargetLocations => Decimal::from_parts(15, 0, 0, false, 1),
            Self::MilitaryMovements | Self::CorporateSecrets => Decimal::TWO,
            Self::PoliticalIntel => Decimal::from_parts(25, 0, 0, false, 1),
            Self::SuperhumanSightings => Decimal::from_parts(12, 0, 0, false, 1),
            Self::SmugglingRoutes => Decimal::ONE,
            Self::SafeHouses => Decimal::from_parts(7, 0, 0, false, 1),
            Self::EquipmentDealers => Decimal::from_parts(6, 0, 0, false, 1),
            Self::FinancialIntel => Decimal::from_parts(18, 0, 0, false, 1),
        }
    }

    const fn subject(self) -> &'static str {
        match self {
            Self::GangActivity => "Gang activity",
            Self::PoliceOperations => "Police operation",
            Self::MilitaryMovements => "Troop movement",
            Self::PoliticalIntel => "Political dealings",
            Self::CorporateSecrets => "Corporate project",
            Self::SuperhumanSightings => "Superhuman sighting",
            Self::SmugglingRoutes => "Smuggling route",
            Self::SafeHouses => "Safe house",
            Self::EquipmentDealers => "Equipment dealer",
            Self::TargetLocations => "Target location",
            Self::FinancialIntel => "Money trail",
        }
    }
}

/// Asking price for intel: base cost times the category multiplier, less a
/// loyalty discount of one percent per point.
#[allow(clippy::arithmetic_side_effects)]
pub fn intel_price(base_cost: Decimal, category: IntelCategory, loyalty: u8) -> Decimal {
    let discount = Decimal::new(i64::from(100_u8.saturating_sub(loyalty)), 2);
    (base_cost * category.price_multiplier() * discount).round_dp(2)
}

/// Whether a contact can still be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    /// Working normally.
    Active,
    /// Under suspicion; no new intel.
    Compromised,
    /// Cover blown.
    Burned,
    /// Dead or gone.
    Lost,
}

/// A piece of intel offered or sold by a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intel {
    /// Identifier.
    pub id: IntelId,
    /// Contact who provided it.
    pub contact: NpcId,
    /// Subject.
    pub category: IntelCategory,
    /// One-line summary.
    pub headline: String,
    /// How reliable it is, 0-100.
    pub accuracy: u8,
    /// Asking price.
    pub price: Decimal,
    /// When it was gathered.
    pub gathered_at: GameTime,
    /// Game minute after which it is stale.
    pub valid_until: u64,
    /// Whether it has gone stale.
    pub stale: bool,
}

/// A recruited contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// The character behind the contact.
    pub npc_id: NpcId,
    /// Display name.
    pub name: String,
    /// What they do.
    pub kind: ContactType,
    /// Country they work in.
    pub country_code: String,
    /// City they work in.
    pub city: String,
    /// Intel quality, 0-100.
    pub quality: u8,
    /// Loyalty to the player, 0-30.
    pub loyalty: u8,
    /// Days between intel drops.
    pub frequency_days: u64,
    /// Base price of their intel.
    pub base_cost: Decimal,
    /// Chance of being burned, 0-100.
    pub burn_risk: u8,
    /// Current status.
    pub status: ContactStatus,
    /// When they were recruited.
    pub recruited_at: GameTime,
    /// When they last produced intel.
    pub last_intel_at: GameTime,
    /// Intel waiting to be bought.
    pub pending: Vec<Intel>,
    /// Everything the player has paid them.
    pub total_paid: Decimal,
}

impl Contact {
    fn recruit<R: Rng + ?Sized>(rng: &mut R, npc: &Npc, kind: ContactType, now: GameTime) -> Self {
        let mut contact = Self {
            npc_id: npc.id,
            name: npc.name.clone(),
            kind,
            country_code: npc.country_code.clone(),
            city: npc.city.clone(),
            quality: rng.random_range(40..=80),
            loyalty: 0,
            frequency_days: rng.random_range(3..=7),
            base_cost: Decimal::from(rng.random_range(100_u32..=400)),
            burn_risk: rng.random_range(0..20),
            status: ContactStatus::Active,
            recruited_at: now,
            last_intel_at: now,
            pending: Vec::new(),
            total_paid: Decimal::ZERO,
        };
        for _ in 0..2 {
            if let Some(intel) = contact.gather(rng, now) {
                contact.pending.push(intel);
            }
        }
        contact
    }

    fn gather<R: Rng + ?Sized>(&self, rng: &mut R, now: GameTime) -> Option<Intel> {
        let category = *self.kind.categories().choose(rng)?;
        let hours = category
            .validity_hours()
            .saturating_add(u64::from(self.quality / 2));
        let accuracy = i32::from(self.quality)
            .saturating_add(rng.random_range(-10..10))
            .clamp(0, 100);
        Some(Intel {
            id: IntelId::from_rng(rng),
            contact: self.npc_id,
            category,
            headline: format!("{} in {}", category.subject(), self.city),
            accuracy: u8::try_from(accuracy).unwrap_or(0),
            price: intel_price(self.base_cost, category, self.loyalty),
            gathered_at: now,
            valid_until: now
                .total_minutes
                .saturating_add(hours.saturating_mul(MINUTES_PER_HOUR)),
            stale: false,
        })
    }

    /// Whether the player can still buy from this contact.
    pub fn is_active(&self) -> bool {
        self.status == ContactStatus::Active
    }
}

#[derive(Debug, Clone, Copy)]
struct RecruitRequest {
    npc: NpcId,
    kind: ContactType,
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct ContactUpdate {
    recruited: Vec<Contact>,
    drained: usize,
    events: Vec<Arc<LifeEvent>>,
    intel: Vec<Intel>,
    burned: Vec<NpcId>,
    stale: Vec<IntelId>,
    intel_day: Option<GameTime>,
}

/// Every contact the player has, plus the intel bought from them.
#[derive(Debug, Clone)]
pub struct ContactNetwork {
    contacts: BTreeMap<NpcId, Contact>,
    purchased: Vec<Intel>,
    queued: Vec<RecruitRequest>,
    applied: BTreeSet<LifeEventId>,
    now: GameTime,
}

impl Default for ContactNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactNetwork {
    /// An empty network.
    pub fn new() -> Self {
        Self {
            contacts: BTreeMap::new(),
            purchased: Vec::new(),
            queued: Vec::new(),
            applied: BTreeSet::new(),
            now: game_time_at(0),
        }
    }

    /// Queue a registry character for recruitment at the next boundary.
    pub fn recruit(&mut self, npc: NpcId, kind: ContactType) {
        self.queued.push(RecruitRequest { npc, kind });
    }

    /// A contact by character id.
    pub fn contact(&self, id: NpcId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// Every contact.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// Contacts in one country.
    pub fn in_country<'a>(&'a self, country_code: &'a str) -> impl Iterator<Item = &'a Contact> {
        self.contacts
            .values()
            .filter(move |contact| contact.country_code == country_code)
    }

    /// Intel the player has bought, oldest first.
    pub fn purchased(&self) -> &[Intel] {
        &self.purchased
    }

    /// Purchased intel that is still fresh.
    pub fn fresh_intel(&self) -> impl Iterator<Item = &Intel> {
        self.purchased.iter().filter(|intel| !intel.stale)
    }

    /// Buy a piece of pending intel.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn purchase_intel(&mut self, contact: NpcId, intel: IntelId) -> Result<Intel, AgentError> {
        let entry = self
            .contacts
            .get_mut(&contact)
            .ok_or(AgentError::ContactNotFound(contact))?;
        if !entry.is_active() {
            return Err(AgentError::ContactUnavailable(contact));
        }
        let index = entry
            .pending
            .iter()
            .position(|pending| pending.id == intel)
            .ok_or(AgentError::IntelNotFound(intel))?;
        let bought = entry.pending.remove(index);
        entry.total_paid += bought.price;
        entry.loyalty = entry.loyalty.saturating_add(2).min(MAX_LOYALTY);
        info!(contact = %entry.name, price = %bought.price, category = ?bought.category, "Intel purchased");
        self.purchased.push(bought.clone());
        Ok(bought)
    }

    fn apply_life_event(&mut self, event: &LifeEvent) {
        let Some(contact) = self.contacts.get_mut(&event.npc_id) else {
            return;
        };
        match event.kind {
            LifeEventType::Died => contact.status = ContactStatus::Lost,
            LifeEventType::Compromised | LifeEventType::Betrayed => {
                contact.status = ContactStatus::Burned;
                contact.pending.clear();
            }
            LifeEventType::Relocated | LifeEventType::LeftCountry => {
                if let Some(city) = &event.new_city {
                    city.clone_into(&mut contact.city);
                    if let Some((country, _)) = tactics_world::starting_world::city_in_roster(city) {
                        country.code.clone_into(&mut contact.country_code);
                    }
                }
            }
            _ => return,
        }
        debug!(contact = %contact.name, kind = ?event.kind, status = ?contact.status, "Contact affected by life event");
    }
}

impl SimulationManager for ContactNetwork {
    type Update = ContactUpdate;

    fn name(&self) -> &'static str {
        CONTACTS
    }

    fn on_start(&mut self, ctx: &mut StartContext) -> Result<(), ManagerError> {
        self.now = ctx.now;
        info!(contacts = self.contacts.len(), "Contact network started");
        Ok(())
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<ContactUpdate, ManagerError> {
        let now = *ctx.now();
        let mut update = ContactUpdate {
            drained: self.queued.len(),
            ..ContactUpdate::default()
        };

        if !self.queued.is_empty() {
            let registry = ctx.upstream::<CharacterRegistry>();
            for request in &self.queued {
                let npc = registry
                    .and_then(|registry| registry.npc(request.npc))
                    .filter(|npc| npc.is_alive());
                match npc {
                    Some(npc) if !self.contacts.contains_key(&npc.id) => {
                        update
                            .recruited
                            .push(Contact::recruit(ctx.rng(), npc, request.kind, now));
                    }
                    Some(_) => debug!(npc = %request.npc, "Already a contact"),
                    None => warn!(npc = %request.npc, "Cannot recruit unknown character"),
                }
            }
        }

        update.events = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Life(life) => Some(life),
                _ => None,
            })
            .filter(|life| {
                self.contacts.contains_key(&life.npc_id) && !self.applied.contains(&life.id)
            })
            .cloned()
            .collect();

        match ctx.kind() {
            BoundaryKind::Hour => {
                update.stale = self
                    .purchased
                    .iter()
                    .filter(|intel| !intel.stale && intel.valid_until <= now.total_minutes)
                    .map(|intel| intel.id)
                    .collect();
            }
            BoundaryKind::Day => {
                update.intel_day = Some(now);
                for contact in self.contacts.values().filter(|contact| contact.is_active()) {
                    let days = now
                        .day_index()
                        .saturating_sub(contact.last_intel_at.day_index());
                    if days >= contact.frequency_days && contact.pending.len() < MAX_PENDING_INTEL {
                        if let Some(intel) = contact.gather(ctx.rng(), now) {
                            update.intel.push(intel);
                        }
                    }
                    let roll: f64 = ctx.rng().random::<f64>() * 100.0;
                    if roll < f64::from(contact.burn_risk) * 0.1 {
                        update.burned.push(contact.npc_id);
                    }
                }
            }
            BoundaryKind::Week | BoundaryKind::Month | BoundaryKind::Year => {}
        }
        Ok(update)
    }

    fn commit(&mut self, update: ContactUpdate) {
        self.queued.drain(..update.drained.min(self.queued.len()));
        for contact in update.recruited {
            info!(contact = %contact.name, kind = ?contact.kind, city = %contact.city, "Contact recruited");
            self.contacts.entry(contact.npc_id).or_insert(contact);
        }
        for event in update.events {
            if self.applied.insert(event.id) {
                self.apply_life_event(&event);
            }
        }
        if let Some(day) = update.intel_day {
            self.now = day;
        }
        for intel in update.intel {
            if let Some(contact) = self.contacts.get_mut(&intel.contact) {
                contact.last_intel_at = intel.gathered_at;
                contact.pending.push(intel);
            }
        }
        for id in update.burned {
            if let Some(contact) = self.contacts.get_mut(&id) {
                contact.status = ContactStatus::Compromised;
                contact.burn_risk = contact.burn_risk.saturating_add(20).min(100);
                warn!(contact = %contact.name, "Contact compromised");
            }
        }
        if !update.stale.is_empty() {
            for intel in self
                .purchased
                .iter_mut()
                .filter(|intel| update.stale.contains(&intel.id))
            {
                intel.stale = true;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;
    use tactics_core::{SimulationConfig, TimeEngine};

    use super::*;
    use crate::registry::CHARACTER_REGISTRY;

    fn engine() -> TimeEngine {
        let mut engine = TimeEngine::new(&SimulationConfig::default());
        engine
            .subscribe(CharacterRegistry::new(&SimulationConfig::default()))
            .unwrap();
        engine.subscribe(ContactNetwork::new()).unwrap();
        engine.start(CHARACTER_REGISTRY).unwrap();
        engine.start(CONTACTS).unwrap();
        engine
    }

    fn recruited(engine: &mut TimeEngine, kind: ContactType) -> NpcId {
        let id = engine
            .manager::<CharacterRegistry>()
            .unwrap()
            .in_city("Lagos")
            .next()
            .unwrap()
            .id;
        engine
            .manager_mut::<ContactNetwork>()
            .unwrap()
            .recruit(id, kind);
        engine.advance_hours(1.0).unwrap();
        id
    }

    #[test]
    fn intel_price_applies_multiplier_and_loyalty() {
        assert_eq!(intel_price(dec!(200), IntelCategory::PoliticalIntel, 10), dec!(450.00));
        assert_eq!(intel_price(dec!(100), IntelCategory::EquipmentDealers, 0), dec!(60.00));
    }

    #[test]
    fn recruiting_resolves_against_the_registry() {
        let mut engine = engine();
        let id = recruited(&mut engine, ContactType::Official);

        let network = engine.manager::<ContactNetwork>().unwrap();
        let contact = network.contact(id).unwrap();
        assert_eq!(contact.country_code, "NG");
        assert!((40..=80).contains(&contact.quality));
        assert!((3..=7).contains(&contact.frequency_days));
        assert_eq!(contact.pending.len(), 2);
        assert!(
            contact
                .pending
                .iter()
                .all(|intel| ContactType::Official.categories().contains(&intel.category))
        );
    }

    #[test]
    fn unknown_recruits_are_dropped() {
        let mut engine = engine();
        let network = engine.manager_mut::<ContactNetwork>().unwrap();
        network.recruit(NpcId::new(), ContactType::Fixer);
        engine.advance_hours(1.0).unwrap();
        let network = engine.manager::<ContactNetwork>().unwrap();
        assert_eq!(network.contacts().count(), 0);
        assert!(network.queued.is_empty());
    }

    #[test]
    fn purchased_intel_builds_loyalty_and_goes_stale() {
        let mut engine = engine();
        let id = recruited(&mut engine, ContactType::Specialist);

        let network = engine.manager_mut::<ContactNetwork>().unwrap();
        let intel = network.contact(id).unwrap().pending[0].clone();
        let bought = network.purchase_intel(id, intel.id).unwrap();
        assert_eq!(bought.price, intel.price);
        let contact = network.contact(id).unwrap();
        assert_eq!(contact.loyalty, 2);
        assert_eq!(contact.total_paid, intel.price);
        assert_eq!(
            network.purchase_intel(id, intel.id),
            Err(AgentError::IntelNotFound(intel.id))
        );

        let hours = u32::try_from(intel.valid_until.div_ceil(MINUTES_PER_HOUR)).unwrap() + 1;
        engine.advance_hours(f64::from(hours)).unwrap();
        let network = engine.manager::<ContactNetwork>().unwrap();
        assert!(network.purchased()[0].stale);
        assert_eq!(network.fresh_intel().count(), 0);
    }

    #[test]
    fn death_and_exposure_end_a_contact() {
        let mut engine = engine();
        let id = recruited(&mut engine, ContactType::Informant);
        let network = engine.manager_mut::<ContactNetwork>().unwrap();
        let contact = network.contact(id).unwrap().clone();
        let event = |kind| LifeEvent {
            id: LifeEventId::new(),
            npc_id: id,
            npc_name: contact.name.clone(),
            kind,
            at: game_time_at(60),
            description: String::new(),
            country_code: contact.country_code.clone(),
            city: contact.city.clone(),
            new_city: None,
            newsworthy: true,
        };

        network.apply_life_event(&event(LifeEventType::Compromised));
        let burned = network.contact(id).unwrap();
        assert_eq!(burned.status, ContactStatus::Burned);
        assert!(burned.pending.is_empty());

        network.apply_life_event(&event(LifeEventType::Died));
        assert_eq!(network.contact(id).unwrap().status, ContactStatus::Lost);
        assert_eq!(
            network.purchase_intel(id, IntelId::new()),
            Err(AgentError::ContactUnavailable(id))
        );
    }
}
