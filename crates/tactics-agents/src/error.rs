//! Error types for the tactics-agents crate.
//!
//! Player-driven operations (hiring, buying intel, adding heat, resolving
//! hunts) return [`AgentError`]. Boundary handlers never do; they report
//! through `ManagerError`.

use tactics_types::{DeathRecordId, IntelId, MissionId, NpcId};

use crate::mercenary::Availability;

/// Errors that can occur when acting on agent state from outside the
/// boundary loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// No tracked character has this id.
    #[error("npc not found: {0}")]
    NpcNotFound(NpcId),

    /// The country code is not part of the roster.
    #[error("unknown country: {0}")]
    UnknownCountry(String),

    /// The character is not one of the player's contacts.
    #[error("contact not found: {0}")]
    ContactNotFound(NpcId),

    /// The contact is burned, lost, or compromised.
    #[error("contact {0} is no longer usable")]
    ContactUnavailable(NpcId),

    /// The contact has no pending intel with this id.
    #[error("intel not found: {0}")]
    IntelNotFound(IntelId),

    /// The mercenary cannot be hired right now.
    #[error("mercenary {id} is {availability:?}")]
    MercenaryUnavailable {
        /// The mercenary.
        id: NpcId,
        /// Current availability.
        availability: Availability,
    },

    /// The player has no active contract with this mercenary.
    #[error("no active contract with {0}")]
    NoContract(NpcId),

    /// No hunt mission has this id.
    #[error("hunt mission not found: {0}")]
    MissionNotFound(MissionId),

    /// The hunt mission is already over.
    #[error("hunt mission {0} is closed")]
    MissionClosed(MissionId),

    /// No death record has this id.
    #[error("death record not found: {0}")]
    DeathRecordNotFound(DeathRecordId),

    /// A funeral was already arranged for this death.
    #[error("funeral already arranged for {0}")]
    FuneralAlreadyArranged(DeathRecordId),

    /// A heat amount was not a finite number.
    #[error("invalid heat amount: {0}")]
    InvalidHeat(String),
}
