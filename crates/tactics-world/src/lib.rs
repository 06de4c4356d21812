//! The world layer of the tactics simulation: geography, world events,
//! and markets.
//!
//! # Modules
//!
//! - [`starting_world`] -- Static roster of countries, cities, and
//!   currencies every other manager draws geography from.
//! - [`world_sim`] -- [`WorldSimulation`]: hourly random world events that
//!   move country and city stats and revert when they expire.
//! - [`prices`] -- [`PriceFluctuation`]: turns world events into price
//!   events with per-category effects.
//! - [`economy`] -- [`DynamicEconomy`]: per-country markets, supply and
//!   demand, exchange rates, and price quotes.
//! - [`error`] -- Errors for player-driven operations.

pub mod economy;
pub mod error;
pub mod prices;
pub mod starting_world;
pub mod world_sim;

pub use economy::{DynamicEconomy, MarketSummary, PriceQuote, TradeSide};
pub use error::WorldError;
pub use prices::PriceFluctuation;
pub use world_sim::{RegionStats, WorldSimulation};
