//! Deterministic random streams for boundary handlers.
//!
//! Each manager gets a fresh [`StdRng`] for every boundary it handles,
//! seeded from the world seed, its own name, the boundary kind, and the
//! boundary instant. A stream therefore depends only on *which* boundary is
//! being handled, never on how the surrounding advance was split, which is
//! what keeps a catch-up run identical to sequential ticking.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tactics_types::BoundaryKind;

/// FNV-1a offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Mixing constant applied to every folded component.
const MIX: u64 = 0x517c_c1b7_2722_0a95;

/// Stable 64-bit hash of a manager name.
fn name_hash(name: &str) -> u64 {
    name.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Fold one component into the running state with an xorshift step.
const fn fold(state: u64, component: u64) -> u64 {
    let mut s = state.wrapping_add(component.wrapping_mul(MIX));
    if s == 0 {
        s = 0xdead_beef_cafe_babe;
    }
    s ^= s << 13;
    s ^= s >> 7;
    s ^= s << 17;
    s
}

/// Seed for one manager's stream at one boundary.
pub fn boundary_seed(world_seed: u64, manager: &str, kind: BoundaryKind, minute: u64) -> u64 {
    let state = fold(world_seed, name_hash(manager));
    let state = fold(state, kind as u64);
    fold(state, minute)
}

/// Fresh random stream for one manager at one boundary.
pub fn boundary_rng(world_seed: u64, manager: &str, kind: BoundaryKind, minute: u64) -> StdRng {
    StdRng::seed_from_u64(boundary_seed(world_seed, manager, kind, minute))
}

/// Random stream used by a manager's `on_start` (world seeding).
pub fn start_rng(world_seed: u64, manager: &str) -> StdRng {
    StdRng::seed_from_u64(fold(world_seed, name_hash(manager)))
}
