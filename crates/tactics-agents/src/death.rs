//! Consequences of character deaths.
//!
//! Every death reported by the life-event stream gets one [`DeathRecord`].
//! If the player had mercenaries on the payroll, they grieve: the player has
//! 72 game hours to arrange a funeral before the notice lapses and the death
//! is treated as ignored. The funeral choice sets the morale swing the
//! surviving mercenaries carry for the next week.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use tactics_core::{BoundaryContext, ManagerError, SimulationManager};
use tactics_types::{
    BoundaryKind, DeathRecordId, GameTime, LifeEvent, LifeEventType, MINUTES_PER_HOUR, NpcId,
    SimEvent,
};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::mercenary::{ContractStatus, MercenaryPool};

/// Registry name of the death-consequence manager.
pub const DEATH_CONSEQUENCES: &str = "death_consequences";

/// Hours the player has to respond to a death notice.
pub const NOTICE_HOURS: u64 = 72;

/// Hours a grief effect lasts.
pub const GRIEF_HOURS: u32 = 168;

/// Morale hit every surviving mercenary takes.
pub const BASE_GRIEF: i32 = -20;

/// Extra hit when the dead were on the player's payroll.
pub const TEAMMATE_GRIEF: i32 = -10;

/// How the player honors the dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FuneralType {
    /// Full military honors.
    FullHonors,
    /// A standard service.
    Standard,
    /// Body sent to the family.
    SendHome,
    /// Small service.
    Simple,
    /// Cremation only.
    Cremation,
    /// No funeral.
    Skip,
    /// Unmarked grave.
    MassGrave,
}

impl FuneralType {
    /// Cost in dollars.
    pub const fn cost(self) -> Decimal {
        match self {
            Self::FullHonors => Decimal::from_parts(5_000, 0, 0, false, 0),
            Self::Standard => Decimal::from_parts(2_000, 0, 0, false, 0),
            Self::SendHome => Decimal::from_parts(1_000, 0, 0, false, 0),
            Self::Simple => Decimal::from_parts(500, 0, 0, false, 0),
            Self::Cremation => Decimal::from_parts(300, 0, 0, false, 0),
            Self::Skip | Self::MassGrave => Decimal::ZERO,
        }
    }

    /// Morale the survivors win back (or lose further).
    pub const fn morale_recovery(self) -> i32 {
        match self {
            Self::FullHonors => 50,
            Self::Standard => 30,
            Self::SendHome => 20,
            Self::Simple => 10,
            Self::Cremation => 5,
            Self::Skip => -30,
            Self::MassGrave => -50,
        }
    }
}

/// One recorded death.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathRecord {
    /// Identifier.
    pub id: DeathRecordId,
    /// Who died.
    pub npc_id: NpcId,
    /// Their name.
    pub name: String,
    /// How it was reported.
    pub cause: String,
    /// Country of death.
    pub country_code: String,
    /// City of death.
    pub city: String,
    /// When it happened.
    pub at: GameTime,
    /// Whether they were working for the player.
    pub was_player_merc: bool,
    /// Mercenaries on the payroll when it happened.
    pub survivors: Vec<NpcId>,
    /// Funeral chosen, once resolved.
    pub funeral: Option<FuneralType>,
    /// What the funeral cost.
    pub funeral_cost: Option<Decimal>,
    /// Game minute the notice lapses.
    pub notice_expires_at: u64,
}

impl DeathRecord {
    fn from_event<R: Rng + ?Sized>(
        rng: &mut R,
        event: &LifeEvent,
        pool: Option<&MercenaryPool>,
    ) -> Self {
        let was_player_merc = pool
            .and_then(|pool| pool.contract(event.npc_id))
            .is_some_and(|contract| {
                matches!(contract.status, ContractStatus::Active | ContractStatus::Deceased)
            });
        let survivors = pool
            .map(|pool| {
                pool.hired()
                    .map(|listing| listing.npc.id)
                    .filter(|id| *id != event.npc_id)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: DeathRecordId::from_rng(rng),
            npc_id: event.npc_id,
            name: event.npc_name.clone(),
            cause: event.description.clone(),
            country_code: event.country_code.clone(),
            city: event.city.clone(),
            at: event.at,
            was_player_merc,
            survivors,
            funeral: None,
            funeral_cost: None,
            notice_expires_at: event
                .at
                .total_minutes
                .saturating_add(NOTICE_HOURS.saturating_mul(MINUTES_PER_HOUR)),
        }
    }

    /// Whether the player still owes a response.
    pub const fn is_pending(&self) -> bool {
        self.funeral.is_none()
    }

    const fn grief(&self) -> i32 {
        if self.was_player_merc {
            BASE_GRIEF.saturating_add(TEAMMATE_GRIEF)
        } else {
            BASE_GRIEF
        }
    }
}

/// A temporary morale modifier on one mercenary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoraleEffect {
    /// Affected mercenary.
    pub mercenary: NpcId,
    /// Death that caused it.
    pub record: DeathRecordId,
    /// Morale change.
    pub amount: i32,
    /// Hours until it wears off.
    pub hours_remaining: u32,
}

/// Planned changes for one boundary.
#[derive(Debug, Default)]
pub struct DeathUpdate {
    records: Vec<DeathRecord>,
    lapsed: Vec<DeathRecordId>,
    hour_passed: bool,
}

/// Records deaths and tracks the morale fallout among the player's hires.
#[derive(Debug, Clone, Default)]
pub struct DeathConsequences {
    records: Vec<DeathRecord>,
    recorded: BTreeSet<NpcId>,
    morale: Vec<MoraleEffect>,
}

impl DeathConsequences {
    /// Manager with no deaths recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded death, oldest first.
    pub fn records(&self) -> &[DeathRecord] {
        &self.records
    }

    /// A death record by id.
    pub fn record(&self, id: DeathRecordId) -> Option<&DeathRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Deaths still waiting on a funeral decision.
    pub fn pending_notices(&self) -> impl Iterator<Item = &DeathRecord> {
        self.records.iter().filter(|record| record.is_pending())
    }

    /// Active morale effects.
    pub fn morale_effects(&self) -> &[MoraleEffect] {
        &self.morale
    }

    /// Net morale modifier on a mercenary.
    pub fn morale_of(&self, mercenary: NpcId) -> i32 {
        self.morale
            .iter()
            .filter(|effect| effect.mercenary == mercenary)
            .fold(0_i32, |total, effect| total.saturating_add(effect.amount))
    }

    /// Choose a funeral for a pending death. Returns what it costs.
    pub fn arrange_funeral(
        &mut self,
        id: DeathRecordId,
        funeral: FuneralType,
    ) -> Result<Decimal, AgentError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(AgentError::DeathRecordNotFound(id))?;
        if record.funeral.is_some() {
            return Err(AgentError::FuneralAlreadyArranged(id));
        }
        let cost = funeral.cost();
        record.funeral = Some(funeral);
        record.funeral_cost = Some(cost);
        let amount = record.grief().saturating_add(funeral.morale_recovery());
        self.morale
            .extend(record.survivors.iter().map(|mercenary| MoraleEffect {
                mercenary: *mercenary,
                record: id,
                amount,
                hours_remaining: GRIEF_HOURS,
            }));
        info!(name = %record.name, ?funeral, %cost, "Funeral arranged");
        Ok(cost)
    }
}

impl SimulationManager for DeathConsequences {
    type Update = DeathUpdate;

    fn name(&self) -> &'static str {
        DEATH_CONSEQUENCES
    }

    fn plan(&self, ctx: &mut BoundaryContext<'_>) -> Result<DeathUpdate, ManagerError> {
        let pool = ctx.upstream::<MercenaryPool>();
        let deaths: Vec<Arc<LifeEvent>> = ctx
            .inbox()
            .filter_map(|event| match event {
                SimEvent::Life(life) if life.kind == LifeEventType::Died => Some(Arc::clone(life)),
                _ => None,
            })
            .collect();
        let mut seen = BTreeSet::new();
        let mut records = Vec::new();
        for life in deaths {
            if !self.recorded.contains(&life.npc_id) && seen.insert(life.npc_id) {
                records.push(DeathRecord::from_event(ctx.rng(), &life, pool));
            }
        }

        let hour_passed = ctx.kind() == BoundaryKind::Hour;
        let now = ctx.now().total_minutes;
        let lapsed = if hour_passed {
            self.pending_notices()
                .filter(|record| record.notice_expires_at <= now)
                .map(|record| record.id)
                .collect()
        } else {
            Vec::new()
        };
        Ok(DeathUpdate {
            records,
            lapsed,
            hour_passed,
        })
    }

    fn commit(&mut self, update: DeathUpdate) {
        if update.hour_passed {
            for effect in &mut self.morale {
                effect.hours_remaining = effect.hours_remaining.saturating_sub(1);
            }
            self.morale.retain(|effect| effect.hours_remaining > 0);
        }
        for record in update.records {
            if self.recorded.insert(record.npc_id) {
                debug!(name = %record.name, survivors = record.survivors.len(), "Death recorded");
                self.records.push(record);
            }
        }
        for id in update.lapsed {
            if self.arrange_funeral(id, FuneralType::Skip).is_ok() {
                debug!(record = %id, "Death notice lapsed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use tactics_core::StartContext;
    use tactics_core::clock::game_time_at;
    use tactics_types::LifeEventId;

    use super::*;

    fn started_pool() -> MercenaryPool {
        let mut pool = MercenaryPool::new();
        pool.on_start(&mut StartContext {
            now: game_time_at(0),
            rng: StdRng::seed_from_u64(11),
        })
        .unwrap();
        pool
    }

    fn died(npc_id: NpcId, at: u64) -> LifeEvent {
        LifeEvent {
            id: LifeEventId::new(),
            npc_id,
            npc_name: "Ray Okafor".to_owned(),
            kind: LifeEventType::Died,
            at: game_time_at(at),
            description: "Ray Okafor died from illness".to_owned(),
            country_code: "NG".to_owned(),
            city: "Lagos".to_owned(),
            new_city: None,
            newsworthy: true,
        }
    }

    #[test]
    fn funeral_table() {
        assert_eq!(FuneralType::FullHonors.cost(), dec!(5000));
        assert_eq!(FuneralType::Cremation.cost(), dec!(300));
        assert_eq!(FuneralType::MassGrave.cost(), Decimal::ZERO);
        assert_eq!(FuneralType::Standard.morale_recovery(), 30);
        assert_eq!(FuneralType::Skip.morale_recovery(), -30);
    }

    #[test]
    fn fallen_teammate_hits_survivors_harder() {
        let mut pool = started_pool();
        let hires: Vec<NpcId> = pool
            .available_in("US")
            .take(2)
            .map(|listing| listing.npc.id)
            .collect();
        let (fallen, survivor) = (*hires.first().unwrap(), *hires.last().unwrap());
        pool.hire(fallen, None).unwrap();
        pool.hire(survivor, None).unwrap();

        let mut rng = StdRng::seed_from_u64(5);
        let record = DeathRecord::from_event(&mut rng, &died(fallen, 600), Some(&pool));
        assert!(record.was_player_merc);
        assert_eq!(record.survivors, vec![survivor]);
        assert_eq!(record.notice_expires_at, 600 + 72 * 60);

        let id = record.id;
        let mut deaths = DeathConsequences::new();
        deaths.commit(DeathUpdate {
            records: vec![record],
            ..DeathUpdate::default()
        });
        assert_eq!(deaths.pending_notices().count(), 1);

        assert_eq!(deaths.arrange_funeral(id, FuneralType::Simple), Ok(dec!(500)));
        assert_eq!(deaths.morale_of(survivor), -20);
        assert_eq!(
            deaths.arrange_funeral(id, FuneralType::Standard),
            Err(AgentError::FuneralAlreadyArranged(id))
        );

        for _ in 0..GRIEF_HOURS {
            deaths.commit(DeathUpdate {
                hour_passed: true,
                ..DeathUpdate::default()
            });
        }
        assert_eq!(deaths.morale_of(survivor), 0);
        assert!(deaths.morale_effects().is_empty());
    }

    #[test]
    fn lapsed_notice_counts_as_skipped() {
        let mut pool = started_pool();
        let hire = pool.available_in("BR").next().unwrap().npc.id;
        pool.hire(hire, None).unwrap();

        let mut rng = StdRng::seed_from_u64(6);
        let record = DeathRecord::from_event(&mut rng, &died(NpcId::new(), 0), Some(&pool));
        assert!(!record.was_player_merc);
        let id = record.id;

        let mut deaths = DeathConsequences::new();
        deaths.commit(DeathUpdate {
            records: vec![record.clone(), record],
            ..DeathUpdate::default()
        });
        assert_eq!(deaths.records().len(), 1);

        deaths.commit(DeathUpdate {
            lapsed: vec![id],
            hour_passed: true,
            ..DeathUpdate::default()
        });
        let record = deaths.record(id).unwrap();
        assert_eq!(record.funeral, Some(FuneralType::Skip));
        assert_eq!(record.funeral_cost, Some(Decimal::ZERO));
        assert_eq!(deaths.morale_of(hire), -50);
        let unknown = DeathRecordId::new();
        assert_eq!(
            deaths.arrange_funeral(unknown, FuneralType::Simple),
            Err(AgentError::DeathRecordNotFound(unknown))
        );
    }
}
