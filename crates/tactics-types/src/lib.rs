//! Shared type definitions for the SuperHero Tactics world simulation.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: game time, the events managers exchange, and the summaries a
//! catch-up produces. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (boundaries, severities, factions, goods)
//! - [`time`] -- Game time snapshots and boundary events
//! - [`events`] -- Events managers emit for each other
//! - [`summary`] -- While-you-were-gone summaries

pub mod enums;
pub mod events;
pub mod ids;
pub mod summary;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use enums::{
    BoundaryKind, FactionType, GoodsCategory, HeatLevel, LifeEventType, MarketCondition,
    NewsCategory, NpcRole, NpcStatus, PriceEventType, Prominence, Severity, Stat, SummaryCategory,
    TimeOfDay, Weekday, WorldEventCategory,
};
pub use events::{
    HeatShift, LifeEvent, NewsArticle, PriceEffect, PriceEvent, SimEvent, StatDelta, StatScope,
    WorldEvent,
};
pub use ids::{
    ArticleId, DeathRecordId, IntelId, LifeEventId, MissionId, NpcId, PriceEventId, WorldEventId,
};
pub use summary::{BoundaryTally, Highlight, WhileYouWereGone};
pub use time::{GameDate, GameTime, MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_WEEK, TimeEvent};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::WorldEventId::export_all();
        let _ = crate::ids::NpcId::export_all();
        let _ = crate::ids::LifeEventId::export_all();
        let _ = crate::ids::PriceEventId::export_all();
        let _ = crate::ids::ArticleId::export_all();
        let _ = crate::ids::MissionId::export_all();
        let _ = crate::ids::DeathRecordId::export_all();
        let _ = crate::ids::IntelId::export_all();

        // Enums
        let _ = crate::enums::BoundaryKind::export_all();
        let _ = crate::enums::TimeOfDay::export_all();
        let _ = crate::enums::Weekday::export_all();
        let _ = crate::enums::Severity::export_all();
        let _ = crate::enums::SummaryCategory::export_all();
        let _ = crate::enums::WorldEventCategory::export_all();
        let _ = crate::enums::Stat::export_all();
        let _ = crate::enums::FactionType::export_all();
        let _ = crate::enums::HeatLevel::export_all();
        let _ = crate::enums::GoodsCategory::export_all();
        let _ = crate::enums::MarketCondition::export_all();
        let _ = crate::enums::PriceEventType::export_all();
        let _ = crate::enums::NpcRole::export_all();
        let _ = crate::enums::NpcStatus::export_all();
        let _ = crate::enums::LifeEventType::export_all();
        let _ = crate::enums::NewsCategory::export_all();
        let _ = crate::enums::Prominence::export_all();

        // Time
        let _ = crate::time::GameDate::export_all();
        let _ = crate::time::GameTime::export_all();
        let _ = crate::time::TimeEvent::export_all();

        // Events
        let _ = crate::events::StatScope::export_all();
        let _ = crate::events::StatDelta::export_all();
        let _ = crate::events::WorldEvent::export_all();
        let _ = crate::events::LifeEvent::export_all();
        let _ = crate::events::PriceEffect::export_all();
        let _ = crate::events::PriceEvent::export_all();
        let _ = crate::events::HeatShift::export_all();
        let _ = crate::events::NewsArticle::export_all();

        // Summaries
        let _ = crate::summary::Highlight::export_all();
        let _ = crate::summary::BoundaryTally::export_all();
        let _ = crate::summary::WhileYouWereGone::export_all();
    }
}
