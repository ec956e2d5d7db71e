//! Local Persistence
//!
//! A string key-value seam with two backends, and the repository that
//! keeps the current match slot and the bounded match history on top of it.
//!
//! ## Module Structure
//!
//! - `kv`: `KeyValueStore` trait, in-memory and directory-backed stores
//! - `repository`: Current match snapshot and match history

pub mod kv;
pub mod repository;

pub use kv::{FileKv, KeyValueStore, MemoryKv};
pub use repository::{
    HistoryEntry, MatchRepository, StoredMatch, CURRENT_MATCH_KEY, HISTORY_KEY, HISTORY_LIMIT,
};

use uuid::Uuid;

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be mapped onto the backend.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Stored snapshot does not match its recorded hash.
    #[error("Corrupt snapshot for match {match_id}: expected hash {expected}, computed {computed}")]
    Corrupt {
        /// Match the snapshot belongs to
        match_id: Uuid,
        /// Hash recorded alongside the snapshot
        expected: String,
        /// Hash of the decoded state
        computed: String,
    },
}
