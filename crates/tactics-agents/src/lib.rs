//! Characters and the factions that react to the player.
//!
//! This crate holds every manager that deals with people: the tracked NPC
//! population and what happens to it day to day, the player's contacts and
//! hired guns, and the player's standing with the public and the factions.
//! Managers here read the world layer (`tactics-world`) for geography and
//! talk to each other only through the time engine's event stream and
//! read-only upstream views.
//!
//! # Modules
//!
//! - [`registry`] -- [`CharacterRegistry`]: every tracked NPC
//! - [`contacts`] -- [`ContactNetwork`]: recruited informants and the intel they sell
//! - [`mercenary`] -- [`MercenaryPool`]: per-country hireable mercenaries and contracts
//! - [`life_events`] -- [`LifeEvents`]: daily life-event rolls for every character
//! - [`death`] -- [`DeathConsequences`]: death records, funerals, and morale
//! - [`fame`] -- [`FameTracker`]: global and regional fame and reputation
//! - [`heat`] -- [`HeatTracker`]: per-country faction heat and bracket shifts
//! - [`hunt`] -- [`HuntMissions`]: faction hunts triggered by heat
//! - [`error`] -- Error types for player-driven operations ([`AgentError`])

pub mod contacts;
pub mod death;
pub mod error;
pub mod fame;
pub mod heat;
pub mod hunt;
pub mod life_events;
pub mod mercenary;
pub mod registry;

// Re-export primary types at crate root for convenience.
pub use contacts::{ContactNetwork, ContactType, IntelCategory};
pub use death::{DeathConsequences, FuneralType};
pub use error::AgentError;
pub use fame::{FameEvent, FameEventKind, FameTracker, Magnitude};
pub use heat::{CombatReport, HeatTracker, PropertyDamage};
pub use hunt::{HuntMissions, HuntOutcome};
pub use life_events::LifeEvents;
pub use mercenary::MercenaryPool;
pub use registry::{CharacterRegistry, Npc};
