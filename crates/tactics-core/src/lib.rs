//! Game clock, time engine, and manager registry for the world simulation.
//!
//! This crate owns game time. The [`TimeEngine`] advances the clock, walks
//! every boundary crossed, and hands each one to the registered managers
//! in order. Catch-up advances collapse a long gap into one call that stays
//! numerically identical to sequential ticking.
//!
//! # Modules
//!
//! - [`clock`] -- Minute-precise calendar and boundary detection.
//! - [`config`] -- Configuration loading from `tactics-config.yaml`.
//! - [`manager`] -- The [`SimulationManager`] contract and boundary context.
//! - [`journal`] -- Sequenced log of events exchanged between managers.
//! - [`rng`] -- Deterministic per-boundary random streams.
//! - [`engine`] -- The [`TimeEngine`] itself.
//! - [`catch_up`] -- While-you-were-gone highlight selection.
//! - [`auto_tick`] -- Wall-clock driver for continuous play.
//!
//! [`TimeEngine`]: engine::TimeEngine
//! [`SimulationManager`]: manager::SimulationManager

pub mod auto_tick;
pub mod catch_up;
pub mod clock;
pub mod config;
pub mod engine;
pub mod journal;
pub mod manager;
pub mod rng;

pub use auto_tick::{AutoTick, TickTarget};
pub use clock::{Clock, ClockError};
pub use config::{ConfigError, SimulationConfig};
pub use engine::{AdvanceOutcome, EngineError, HandlerFailure, ManagerStatus, TimeEngine};
pub use manager::{
    BoundaryContext, DynManager, ManagerError, SimulationManager, StartContext, SummaryWindow,
};
