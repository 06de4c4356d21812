//! Error types for the orchestrator and the `tactics-engine` binary.
//!
//! [`OrchestratorError`] covers bringing the manager graph up and driving
//! it. [`RunError`] is the binary's top-level error that `main` propagates
//! with `?`.

use tactics_core::{ConfigError, EngineError};

/// Errors surfaced while initializing or driving the world systems.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A manager could not be registered or started. Managers started
    /// before it are left running.
    #[error("failed to start manager {manager}: {source}")]
    ManagerStart {
        /// Name of the manager that failed.
        manager: &'static str,
        /// The engine's error.
        #[source]
        source: EngineError,
    },

    /// The time engine rejected an advance.
    #[error("time engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },
}

/// Top-level error for the `tactics-engine` binary.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// World systems failed to come up or to advance.
    #[error("orchestrator error: {source}")]
    Orchestrator {
        /// The underlying orchestrator error.
        #[from]
        source: OrchestratorError,
    },

    /// `TACTICS_CATCH_UP_HOURS` is not a non-negative number.
    #[error("invalid TACTICS_CATCH_UP_HOURS value: {value}")]
    CatchUpHours {
        /// The rejected value.
        value: String,
    },
}
