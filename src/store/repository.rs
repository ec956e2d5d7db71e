//! Match Repository
//!
//! Two slots on top of a [`KeyValueStore`]:
//!
//! - `current_match`: the live session (state, timeline, undo stack) as
//!   JSON, stamped with the state hash and checked on load
//! - `match_history`: summaries of finished matches, newest first,
//!   at most [`HISTORY_LIMIT`] entries

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{KeyValueStore, StoreError};
use crate::core::hash::{StateHash, StateHasher};
use crate::engine::events::Timeline;
use crate::engine::state::MatchState;
use crate::engine::summary::MatchSummary;
use crate::session::MatchSession;

/// Key of the current match slot.
pub const CURRENT_MATCH_KEY: &str = "current_match";

/// Key of the match history list.
pub const HISTORY_KEY: &str = "match_history";

/// Maximum number of history entries kept.
pub const HISTORY_LIMIT: usize = 10;

/// Persisted form of a live session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMatch {
    /// Match identifier
    pub match_id: Uuid,
    /// Current state
    pub state: MatchState,
    /// Recorded timeline
    pub timeline: Timeline,
    /// Undo snapshots, oldest first
    pub undo_stack: Vec<MatchState>,
    /// Hex SHA-256 of `state`
    pub state_hash: String,
    /// Hex SHA-256 over the timeline entries and the undo snapshots' state hashes
    pub history_hash: String,
}

/// Digest of everything besides the live state that a restore depends on.
fn history_digest(timeline: &Timeline, undo_stack: &[MatchState]) -> StateHash {
    let mut hasher = StateHasher::with_domain(b"RALLY_SCORE_HISTORY_V1");
    hasher.update_usize(timeline.len());
    for event in timeline.events() {
        hasher.update_bytes(event.id.as_bytes());
        hasher.update_bytes(&event.timestamp.timestamp().to_le_bytes());
        hasher.update_u32(event.timestamp.timestamp_subsec_nanos());
        hasher.update_u8(event.event_type as u8);
        hasher.update_opt_u8(event.team.map(|t| t as u8));
        hasher.update_str(&event.label);
    }
    hasher.update_usize(undo_stack.len());
    for snapshot in undo_stack {
        hasher.update_bytes(&snapshot.compute_hash());
    }
    hasher.finalize()
}

impl StoredMatch {
    /// Capture a session.
    pub fn from_session(session: &MatchSession) -> Self {
        Self {
            match_id: session.id(),
            state: session.state().clone(),
            timeline: session.timeline().clone(),
            undo_stack: session.undo_stack().to_vec(),
            state_hash: hex::encode(session.state().compute_hash()),
            history_hash: hex::encode(history_digest(session.timeline(), session.undo_stack())),
        }
    }

    /// Check the recorded hashes against the state, timeline and undo stack.
    pub fn verify(&self) -> Result<(), StoreError> {
        let computed = hex::encode(self.state.compute_hash());
        if computed != self.state_hash {
            return Err(StoreError::Corrupt {
                match_id: self.match_id,
                expected: self.state_hash.clone(),
                computed,
            });
        }

        let computed = hex::encode(history_digest(&self.timeline, &self.undo_stack));
        if computed != self.history_hash {
            return Err(StoreError::Corrupt {
                match_id: self.match_id,
                expected: self.history_hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Rebuild the session.
    pub fn into_session(self) -> MatchSession {
        MatchSession::from_parts(self.match_id, self.state, self.timeline, self.undo_stack)
    }
}

/// One finished match in the history list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Match identifier
    pub match_id: Uuid,
    /// Final summary
    pub summary: MatchSummary,
}

/// Current match slot and match history over a key-value store.
#[derive(Debug)]
pub struct MatchRepository<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> MatchRepository<K> {
    /// Wrap a store.
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Underlying store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Mutable access to the underlying store.
    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    /// Persist the live session into the current match slot.
    pub fn save_current(&mut self, session: &MatchSession) -> Result<(), StoreError> {
        let stored = StoredMatch::from_session(session);
        let json = serde_json::to_string(&stored)?;
        self.kv.set(CURRENT_MATCH_KEY, json)?;
        debug!(match_id = %stored.match_id, hash = %stored.state_hash, "Saved current match");
        Ok(())
    }

    /// Load the current match, verifying its state hash.
    pub fn load_current(&self) -> Result<Option<MatchSession>, StoreError> {
        let Some(json) = self.kv.get(CURRENT_MATCH_KEY)? else {
            return Ok(None);
        };
        let stored: StoredMatch = serde_json::from_str(&json)?;
        if let Err(e) = stored.verify() {
            warn!(match_id = %stored.match_id, "Rejected current match snapshot: {}", e);
            return Err(e);
        }
        info!(match_id = %stored.match_id, events = stored.timeline.len(), "Restored current match");
        Ok(Some(stored.into_session()))
    }

    /// Empty the current match slot.
    pub fn clear_current(&mut self) -> Result<(), StoreError> {
        self.kv.remove(CURRENT_MATCH_KEY)
    }

    /// Match history, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.kv.get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Record a finished match at the front of the history.
    ///
    /// An entry with the same id is replaced; the list is capped at
    /// [`HISTORY_LIMIT`].
    pub fn record_history(&mut self, match_id: Uuid, summary: MatchSummary) -> Result<(), StoreError> {
        let mut entries = self.history()?;
        entries.retain(|entry| entry.match_id != match_id);
        entries.insert(0, HistoryEntry { match_id, summary });
        entries.truncate(HISTORY_LIMIT);

        self.kv.set(HISTORY_KEY, serde_json::to_string(&entries)?)?;
        info!(%match_id, entries = entries.len(), "Recorded match history");
        Ok(())
    }

    /// Record the session's summary if the match is finished.
    ///
    /// Returns `false` for a match still in progress.
    pub fn record_finished(&mut self, session: &MatchSession) -> Result<bool, StoreError> {
        match session.summary() {
            Some(summary) => {
                self.record_history(session.id(), summary.clone())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
