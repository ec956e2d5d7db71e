//! State Hashing
//!
//! SHA-256 fingerprints of match state. Two snapshots that score the same
//! hash the same, which lets the store detect tampered snapshots and the
//! demo confirm that a replay reproduced the live match.

use sha2::{Digest, Sha256};

/// 32-byte SHA-256 digest.
pub type StateHash = [u8; 32];

/// Domain tag mixed into every match state hash.
const STATE_DOMAIN: &[u8] = b"RALLY_SCORE_STATE_V1";

/// Field-by-field hasher.
///
/// Every integer is written little-endian at a fixed width; `usize` is
/// widened to 8 bytes. Fields must be written in the same order by every
/// caller that expects matching hashes.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    /// Start a hash under a domain tag.
    pub fn with_domain(domain: &[u8]) -> Self {
        let mut inner = Sha256::new();
        inner.update(domain);
        Self { inner }
    }

    fn absorb(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    /// Write fixed-length bytes (digests, ids) as-is.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.absorb(bytes);
    }

    /// Write one byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.absorb(&[value]);
    }

    /// Write a counter.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.absorb(&value.to_le_bytes());
    }

    /// Write an index or length as 8 bytes.
    #[inline]
    pub fn update_usize(&mut self, value: usize) {
        self.absorb(&(value as u64).to_le_bytes());
    }

    /// Write a flag as 0 or 1.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(u8::from(value));
    }

    /// Write a string, prefixed by its byte length.
    pub fn update_str(&mut self, value: &str) {
        self.update_usize(value.len());
        self.absorb(value.as_bytes());
    }

    /// Write an optional byte: a presence flag, then the value if any.
    pub fn update_opt_u8(&mut self, value: Option<u8>) {
        self.update_bool(value.is_some());
        if let Some(v) = value {
            self.update_u8(v);
        }
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> StateHash {
        self.inner.finalize().into()
    }
}

/// One-shot digest of `data` under `domain`.
pub fn domain_hash(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = StateHasher::with_domain(domain);
    hasher.absorb(data);
    hasher.finalize()
}

/// Hash a match state.
///
/// `sport_tag` separates sports whose fields happen to serialize alike;
/// `write_fields` feeds the rest of the state.
pub fn compute_state_hash<F>(sport_tag: u8, write_fields: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::with_domain(STATE_DOMAIN);
    hasher.update_u8(sport_tag);
    write_fields(&mut hasher);
    hasher.finalize()
}
