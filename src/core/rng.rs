//! Rally Simulation RNG
//!
//! Seeded Xorshift128+ used to simulate rallies in the demo binary and in
//! tests. The scoring engine never draws random numbers.

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::hash::domain_hash;
use crate::core::team::TeamId;

/// Seeded Xorshift128+ generator.
///
/// The output sequence depends only on the seed.
///
/// # Example
///
/// ```
/// use rally_score::core::rng::DeterministicRng;
/// use rally_score::TeamId;
///
/// let mut first = DeterministicRng::new(7);
/// let mut second = DeterministicRng::new(7);
/// assert_eq!(first.rally_winner(TeamId::A, 60), second.rally_winner(TeamId::A, 60));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    s0: u64,
    s1: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Seed the generator. SplitMix64 spreads the seed over both words.
    pub fn new(seed: u64) -> Self {
        let mut cursor = seed;
        let s0 = splitmix64(&mut cursor);
        let s1 = splitmix64(&mut cursor);
        if s0 | s1 == 0 {
            // Xorshift never leaves the all-zero state
            return Self { s0: 1, s1: 1 };
        }
        Self { s0, s1 }
    }

    /// Generator seeded from a match id.
    pub fn for_match(match_id: Uuid) -> Self {
        Self::new(derive_match_seed(match_id))
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        let (a, mut b) = (self.s0, self.s1);
        let out = a.wrapping_add(b);
        b ^= a;
        self.s0 = a.rotate_left(24) ^ b ^ (b << 16);
        self.s1 = b.rotate_left(37);
        out
    }

    /// Uniform-ish value in `0..bound`; `0` when `bound` is zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        match bound {
            0 => 0,
            n => (self.next_u64() % u64::from(n)) as u32,
        }
    }

    /// True with probability `percent`/100 (clamped to 100).
    pub fn percent(&mut self, percent: u32) -> bool {
        self.below(100) < percent.min(100)
    }

    /// Winner of a simulated rally in which `favoured` wins `percent`% of the time.
    pub fn rally_winner(&mut self, favoured: TeamId, percent: u32) -> TeamId {
        if self.percent(percent) {
            favoured
        } else {
            favoured.other()
        }
    }
}

fn splitmix64(cursor: &mut u64) -> u64 {
    *cursor = cursor.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *cursor;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for a match's rally simulation, derived from its id.
pub fn derive_match_seed(match_id: Uuid) -> u64 {
    let digest = domain_hash(b"RALLY_SCORE_SEED_V1", match_id.as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(word)
}
