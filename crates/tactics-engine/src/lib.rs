//! Orchestration of the tactics world simulation.
//!
//! [`WorldSystems`] is the single explicit context the game creates at
//! start-up: it owns the configuration and the time engine, brings every
//! manager up in dependency order, and tears them down again. The
//! `tactics-engine` binary drives it in real time.
//!
//! # Modules
//!
//! - [`orchestrator`] -- [`WorldSystems`] and the startup plan
//! - [`error`] -- [`OrchestratorError`] and the binary's [`RunError`]
//!
//! [`OrchestratorError`]: error::OrchestratorError
//! [`RunError`]: error::RunError

pub mod error;
pub mod orchestrator;

pub use orchestrator::{SharedWorld, WorldSystems, default_startup_plan};
