//! Enumeration types for the world simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A calendar boundary crossed while game time advances.
///
/// The declaration order is also the dispatch order for boundaries that
/// fall on the same instant: finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum BoundaryKind {
    /// The top of an hour.
    Hour,
    /// Midnight.
    Day,
    /// Every seventh midnight counted from the campaign epoch.
    Week,
    /// The first minute of a calendar month.
    Month,
    /// The first minute of a calendar year.
    Year,
}

impl BoundaryKind {
    /// Every boundary kind, finest first.
    pub const ALL: [Self; 5] = [Self::Hour, Self::Day, Self::Week, Self::Month, Self::Year];

    /// Stable lowercase label used in logs and seed derivation.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Coarse time of day derived from the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TimeOfDay {
    /// 00:00 to 05:59.
    Night,
    /// 06:00 to 11:59.
    Morning,
    /// 12:00 to 17:59.
    Afternoon,
    /// 18:00 to 23:59.
    Evening,
}

impl TimeOfDay {
    /// Map an hour (0-23) to its time of day.
    pub const fn from_hour(hour: u8) -> Self {
        match hour {
            0..=5 => Self::Night,
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Whether this is one of the dark phases (evening or night).
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Night | Self::Evening)
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Weekday {
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl Weekday {
    /// Weekdays in order starting from Monday.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Whether this day falls on the weekend.
    pub const fn is_weekend(self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }
}

// ---------------------------------------------------------------------------
// Severity and summary grouping
// ---------------------------------------------------------------------------

/// How important an event is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Background noise.
    Minor,
    /// Worth a line in the feed.
    Normal,
    /// Front-page material.
    Major,
    /// Changes the situation on the ground.
    Critical,
}

/// Category used to group while-you-were-gone highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SummaryCategory {
    /// Country-level politics, disasters, superhuman incidents.
    World,
    /// Faction pressure on the player (heat, hunt squads).
    Faction,
    /// Things that happened to tracked characters.
    Npc,
    /// Markets and prices.
    Economy,
    /// Crime waves and gang activity.
    Crime,
    /// Things that happened to the player's own people.
    Personal,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Category of a world event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorldEventCategory {
    /// A faction gains or loses control of a city.
    GangTerritory,
    /// Coups, elections, policy changes.
    Political,
    /// Market crashes, booms, sanctions.
    Economic,
    /// Temporary crime spikes.
    CrimeWave,
    /// Superhuman incidents and villain attacks.
    Superhuman,
    /// Earthquakes, floods, storms.
    NaturalDisaster,
    /// Exercises, border tensions, embargoes.
    Military,
    /// Protests, riots, festivals.
    Social,
}

impl WorldEventCategory {
    /// Every category, in the order rates are rolled.
    pub const ALL: [Self; 8] = [
        Self::GangTerritory,
        Self::Political,
        Self::Economic,
        Self::CrimeWave,
        Self::Superhuman,
        Self::NaturalDisaster,
        Self::Military,
        Self::Social,
    ];

    /// Summary bucket this category falls into.
    pub const fn summary_category(self) -> SummaryCategory {
        match self {
            Self::GangTerritory | Self::CrimeWave => SummaryCategory::Crime,
            Self::Economic => SummaryCategory::Economy,
            Self::Political
            | Self::Superhuman
            | Self::NaturalDisaster
            | Self::Military
            | Self::Social => SummaryCategory::World,
        }
    }
}

/// A numeric statistic a world event can perturb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Stat {
    /// Street crime level, 0-100.
    CrimeIndex,
    /// Public safety, 0-100.
    SafetyIndex,
    /// Government corruption, 0-100.
    Corruption,
    /// Political instability, 0-100.
    Instability,
    /// Military spending pressure, 0-100.
    MilitaryBudget,
    /// Local price level in percent of baseline, 0-400.
    PriceIndex,
}

impl Stat {
    /// Inclusive valid range for this statistic.
    pub const fn bounds(self) -> (i32, i32) {
        match self {
            Self::PriceIndex => (0, 400),
            Self::CrimeIndex
            | Self::SafetyIndex
            | Self::Corruption
            | Self::Instability
            | Self::MilitaryBudget => (0, 100),
        }
    }
}

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// A faction that can track and hunt the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FactionType {
    /// Local law enforcement.
    Police,
    /// Armed forces.
    Military,
    /// Intelligence and civil government.
    Government,
    /// Press and broadcasters.
    Media,
    /// Corporate security.
    Corporations,
    /// Organized crime.
    Underworld,
}

impl FactionType {
    /// Every faction.
    pub const ALL: [Self; 6] = [
        Self::Police,
        Self::Military,
        Self::Government,
        Self::Media,
        Self::Corporations,
        Self::Underworld,
    ];
}

/// Heat bracket derived from a 0-100 heat value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum HeatLevel {
    /// 0-19: no attention.
    Cold,
    /// 20-39: being watched.
    Warm,
    /// 40-59: active interest.
    Hot,
    /// 60-79: manhunt.
    Blazing,
    /// 80-100: kill on sight.
    Inferno,
}

impl HeatLevel {
    /// Bracket a heat value.
    pub fn from_heat(heat: f64) -> Self {
        if heat >= 80.0 {
            Self::Inferno
        } else if heat >= 60.0 {
            Self::Blazing
        } else if heat >= 40.0 {
            Self::Hot
        } else if heat >= 20.0 {
            Self::Warm
        } else {
            Self::Cold
        }
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// A category of goods traded on local markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum GoodsCategory {
    /// Firearms and blades.
    Weapons,
    /// Body armor.
    Armor,
    /// Medical supplies.
    Medical,
    /// Electronics and gadgets.
    Electronics,
    /// Vehicles and parts.
    Vehicles,
    /// Ammunition.
    Ammunition,
    /// Explosives.
    Explosives,
    /// Illegal goods.
    Contraband,
}

impl GoodsCategory {
    /// Every goods category.
    pub const ALL: [Self; 8] = [
        Self::Weapons,
        Self::Armor,
        Self::Medical,
        Self::Electronics,
        Self::Vehicles,
        Self::Ammunition,
        Self::Explosives,
        Self::Contraband,
    ];
}

/// Overall condition of a country's market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum MarketCondition {
    /// Prices +25%.
    Boom,
    /// Baseline.
    Normal,
    /// Prices -15%.
    Recession,
    /// Fire sale, prices -25%.
    Crisis,
    /// Prices +50%.
    Shortage,
    /// Prices -40%.
    Flooded,
}

impl MarketCondition {
    /// Price multiplier applied on top of supply and demand.
    pub const fn price_multiplier(self) -> f64 {
        match self {
            Self::Boom => 1.25,
            Self::Normal => 1.0,
            Self::Recession => 0.85,
            Self::Crisis => 0.75,
            Self::Shortage => 1.5,
            Self::Flooded => 0.6,
        }
    }
}

/// Kind of market-moving event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PriceEventType {
    /// Military takeover.
    Coup,
    /// Internal conflict.
    CivilWar,
    /// International embargo.
    Sanctions,
    /// Earthquake, flood and the like.
    NaturalDisaster,
    /// Large military purchase.
    ArmsDeal,
    /// New trade deal.
    TradeAgreement,
    /// Currency collapse.
    CurrencyCrisis,
    /// Economic growth.
    Boom,
    /// Economic downturn.
    Recession,
    /// Conflict in a neighboring country.
    WarNearby,
    /// A conflict ends.
    Peacetime,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Occupation of a tracked NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NpcRole {
    /// Ordinary resident.
    Civilian,
    /// Member of the underworld.
    Criminal,
    /// Gun for hire.
    Mercenary,
    /// Police, officials, officers.
    Authority,
    /// Informant working with the player.
    Contact,
}

impl NpcRole {
    /// Roles assigned round-robin when seeding a city.
    pub const SEEDED: [Self; 5] = [
        Self::Civilian,
        Self::Criminal,
        Self::Mercenary,
        Self::Authority,
        Self::Contact,
    ];
}

/// Current status of a tracked NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NpcStatus {
    /// Going about their life.
    Active,
    /// In hospital.
    Hospitalized,
    /// In custody.
    Arrested,
    /// Left the country or otherwise out of play.
    Departed,
    /// No longer working.
    Retired,
    /// Dead.
    Dead,
}

/// Something that happened in an NPC's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LifeEventType {
    /// Moved to a different city.
    Relocated,
    /// Left the country entirely.
    LeftCountry,
    /// Taken into custody.
    Arrested,
    /// Released from custody.
    Released,
    /// Hurt outside combat.
    Injured,
    /// Recovered from injury.
    Recovered,
    /// Improved status.
    Promoted,
    /// Lost status.
    Demoted,
    /// Turned on their allies.
    Betrayed,
    /// Cover blown.
    Compromised,
    /// Left their profession.
    Retired,
    /// Natural death, accident, or killed.
    Died,
    /// Joined an organization.
    Recruited,
    /// Kicked out of an organization.
    Fired,
    /// Got married.
    Married,
    /// Got divorced.
    Divorced,
}

impl LifeEventType {
    /// Whether this kind of event makes the papers.
    pub const fn is_newsworthy(self) -> bool {
        matches!(
            self,
            Self::Arrested
                | Self::Released
                | Self::Promoted
                | Self::Betrayed
                | Self::Compromised
                | Self::Died
                | Self::LeftCountry
        )
    }

    /// How much this event matters in a summary.
    pub const fn severity(self) -> Severity {
        match self {
            Self::Died | Self::Betrayed => Severity::Major,
            Self::Arrested | Self::Compromised | Self::LeftCountry | Self::Injured => {
                Severity::Normal
            }
            Self::Relocated
            | Self::Released
            | Self::Recovered
            | Self::Promoted
            | Self::Demoted
            | Self::Retired
            | Self::Recruited
            | Self::Fired
            | Self::Married
            | Self::Divorced => Severity::Minor,
        }
    }
}

/// Category of a published news article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NewsCategory {
    /// Markets, prices, currencies.
    Economy,
    /// Arrests, betrayals, gang news.
    Crime,
    /// Obituaries, promotions, people in the news.
    People,
    /// Careers and world affairs.
    World,
    /// Governments, coups, armed forces.
    Politics,
    /// Superhuman incidents.
    Superhuman,
    /// Disasters and community news.
    Local,
}

/// How an article is displayed in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Prominence {
    /// Small print.
    Minor,
    /// A regular story.
    Standard,
    /// Headline treatment.
    Major,
    /// Breaking-news banner.
    Breaking,
}

impl Prominence {
    /// Display prominence for a story of the given severity.
    pub const fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Minor => Self::Minor,
            Severity::Normal => Self::Standard,
            Severity::Major => Self::Major,
            Severity::Critical => Self::Breaking,
        }
    }
}
