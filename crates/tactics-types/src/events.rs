//! Event objects that carry effects between managers.
//!
//! Managers never write into each other's state. A manager that wants to
//! influence another emits one of these objects; the engine journals it
//! and hands it to every other started manager on its next invocation.
//! Events are immutable once emitted, which is why [`SimEvent`] shares them
//! behind [`Arc`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    FactionType, GoodsCategory, HeatLevel, LifeEventType, MarketCondition, NewsCategory,
    PriceEventType, Prominence, Severity, Stat, SummaryCategory, WorldEventCategory,
};
use crate::ids::{ArticleId, LifeEventId, NpcId, PriceEventId, WorldEventId};
use crate::time::GameTime;

// ---------------------------------------------------------------------------
// World events
// ---------------------------------------------------------------------------

/// Where a stat delta lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StatScope {
    /// A country-level statistic.
    Country {
        /// ISO country code.
        code: String,
    },
    /// A city-level statistic.
    City {
        /// City name.
        name: String,
    },
}

/// A bounded change to one statistic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatDelta {
    /// Country or city the delta applies to.
    pub scope: StatScope,
    /// Statistic being changed.
    pub stat: Stat,
    /// Signed change, applied once and clamped to [`Stat::bounds`].
    pub amount: i32,
}

/// A discrete perturbation of the world generated by the world simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEvent {
    /// Unique identifier, also the idempotency key for application.
    pub id: WorldEventId,
    /// What kind of event this is.
    pub category: WorldEventCategory,
    /// Country the event happened in.
    pub country_code: String,
    /// City the event is centered on, if any.
    pub city: Option<String>,
    /// How important the event is.
    pub severity: Severity,
    /// One-line headline.
    pub headline: String,
    /// Longer description.
    pub description: String,
    /// Stat changes applied when the event becomes active.
    pub effects: Vec<StatDelta>,
    /// When the event happened.
    pub created_at: GameTime,
    /// When the effects lapse; `None` means permanent.
    pub expires_at: Option<GameTime>,
}

// ---------------------------------------------------------------------------
// Life events
// ---------------------------------------------------------------------------

/// Something that happened to a tracked NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LifeEvent {
    /// Unique identifier, also the idempotency key for application.
    pub id: LifeEventId,
    /// The NPC it happened to.
    pub npc_id: NpcId,
    /// Display name of the NPC.
    pub npc_name: String,
    /// What happened.
    pub kind: LifeEventType,
    /// When it happened.
    pub at: GameTime,
    /// One-line description.
    pub description: String,
    /// Country the NPC was in.
    pub country_code: String,
    /// City the NPC was in.
    pub city: String,
    /// New city for relocations.
    pub new_city: Option<String>,
    /// Whether the news layer should pick this up.
    pub newsworthy: bool,
}

// ---------------------------------------------------------------------------
// Price events
// ---------------------------------------------------------------------------

/// Effect of a price event on one goods category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceEffect {
    /// Affected goods category.
    pub category: GoodsCategory,
    /// Price multiplier while the event is active.
    pub multiplier: f64,
    /// One-off supply shift, -50 to +50.
    pub supply_change: f64,
    /// One-off demand shift, -50 to +50.
    pub demand_change: f64,
}

/// A market-moving event in one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceEvent {
    /// Unique identifier, also the idempotency key for application.
    pub id: PriceEventId,
    /// What kind of market event this is.
    pub kind: PriceEventType,
    /// Affected country.
    pub country_code: String,
    /// When it happened.
    pub at: GameTime,
    /// How many days the price modifiers last.
    pub duration_days: u32,
    /// Market condition forced by the event, if any.
    pub market_condition: Option<MarketCondition>,
    /// Per-category effects.
    pub effects: Vec<PriceEffect>,
    /// One-line headline.
    pub headline: String,
    /// World event that caused this, if any.
    pub source_event: Option<WorldEventId>,
}

impl PriceEvent {
    /// How important this event is for summaries and news.
    pub const fn severity(&self) -> Severity {
        match self.kind {
            PriceEventType::Coup | PriceEventType::CivilWar | PriceEventType::CurrencyCrisis => {
                Severity::Critical
            }
            PriceEventType::Sanctions
            | PriceEventType::NaturalDisaster
            | PriceEventType::Recession => Severity::Major,
            PriceEventType::ArmsDeal
            | PriceEventType::TradeAgreement
            | PriceEventType::Boom
            | PriceEventType::WarNearby
            | PriceEventType::Peacetime => Severity::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// Heat shifts
// ---------------------------------------------------------------------------

/// A country's overall heat moved into a different bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeatShift {
    /// Country whose heat changed.
    pub country_code: String,
    /// Faction with the highest heat in that country.
    pub hottest_faction: FactionType,
    /// Heat of that faction, 0-100.
    pub faction_heat: f64,
    /// Bracket before the change.
    pub from: HeatLevel,
    /// Bracket after the change.
    pub to: HeatLevel,
    /// When the change was observed.
    pub at: GameTime,
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// A user-facing news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewsArticle {
    /// Unique identifier.
    pub id: ArticleId,
    /// Headline.
    pub headline: String,
    /// Article body.
    pub body: String,
    /// Section of the paper.
    pub category: NewsCategory,
    /// How prominently it runs.
    pub severity: Severity,
    /// Country the story is about, if any.
    pub country_code: Option<String>,
    /// NPCs mentioned in the story.
    pub related_npcs: Vec<NpcId>,
    /// When it was published.
    pub published_at: GameTime,
}

impl NewsArticle {
    /// How the feed should display the story.
    pub const fn prominence(&self) -> Prominence {
        Prominence::from_severity(self.severity)
    }

    /// Whether the story runs under a breaking-news banner.
    pub const fn is_breaking(&self) -> bool {
        matches!(self.prominence(), Prominence::Breaking)
    }
}

// ---------------------------------------------------------------------------
// Journal envelope
// ---------------------------------------------------------------------------

/// Any event a manager can emit during a boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Emitted by the world simulation.
    World(Arc<WorldEvent>),
    /// Emitted by the life-event manager.
    Life(Arc<LifeEvent>),
    /// Emitted by the price-fluctuation manager.
    Price(Arc<PriceEvent>),
    /// Emitted by the heat manager.
    Heat(Arc<HeatShift>),
}

impl SimEvent {
    /// How important the event is.
    pub fn severity(&self) -> Severity {
        match self {
            Self::World(event) => event.severity,
            Self::Life(event) => event.kind.severity(),
            Self::Price(event) => event.severity(),
            Self::Heat(shift) => {
                if shift.to >= HeatLevel::Inferno {
                    Severity::Critical
                } else if shift.to >= HeatLevel::Blazing {
                    Severity::Major
                } else if shift.to > shift.from {
                    Severity::Normal
                } else {
                    Severity::Minor
                }
            }
        }
    }

    /// Summary bucket for while-you-were-gone highlights.
    pub fn summary_category(&self) -> SummaryCategory {
        match self {
            Self::World(event) => event.category.summary_category(),
            Self::Life(_) => SummaryCategory::Npc,
            Self::Price(_) => SummaryCategory::Economy,
            Self::Heat(_) => SummaryCategory::Faction,
        }
    }

    /// One-line headline.
    pub fn headline(&self) -> String {
        match self {
            Self::World(event) => event.headline.clone(),
            Self::Life(event) => event.description.clone(),
            Self::Price(event) => event.headline.clone(),
            Self::Heat(shift) => format!(
                "{:?} heat in {} is now {:?}",
                shift.hottest_faction, shift.country_code, shift.to
            ),
        }
    }

    /// When the event happened.
    pub fn at(&self) -> GameTime {
        match self {
            Self::World(event) => event.created_at,
            Self::Life(event) => event.at,
            Self::Price(event) => event.at,
            Self::Heat(shift) => shift.at,
        }
    }
}
