//! Error types for the `tactics-world` crate.
//!
//! Player-driven operations on world managers return [`WorldError`].
//! Boundary handlers report through `ManagerError` instead.

use tactics_types::GoodsCategory;

/// Errors that can occur when acting on world state from outside the
/// boundary loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The country code is not part of the roster.
    #[error("unknown country: {0}")]
    UnknownCountry(String),

    /// The city is not part of the roster.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    /// A trade had no goods in it.
    #[error("trade of {category:?} in {country} has zero quantity")]
    EmptyTrade {
        /// Country of the market.
        country: String,
        /// Goods category traded.
        category: GoodsCategory,
    },

    /// A scheduled world event is already known to the simulation.
    #[error("world event {0} was already applied")]
    DuplicateEvent(String),
}
