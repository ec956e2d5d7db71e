//! Core primitives.
//!
//! Team identity, state hashing and the deterministic PRNG. Nothing here
//! depends on the scoring rules.

pub mod team;
pub mod rng;
pub mod hash;

// Re-export core types
pub use team::{PlayerRef, Team, TeamId};
pub use rng::DeterministicRng;
pub use hash::compute_state_hash;
