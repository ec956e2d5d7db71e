//! # Rally Score
//!
//! Scoring engine for racket sports: tennis, padel and badminton.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RALLY SCORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── team.rs     - Team ids, players, teams                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  engine/         - Scoring rules (pure)                      │
//! │  ├── config.rs   - Rule inputs and resolution                │
//! │  ├── state.rs    - Match, score and server state             │
//! │  ├── rotation.rs - Serving order                             │
//! │  ├── point.rs    - Point state machine                       │
//! │  ├── pressure.rs - Break / set / match point detection       │
//! │  ├── display.rs  - Scoreboard projection                     │
//! │  ├── events.rs   - Timeline events                           │
//! │  └── summary.rs  - End-of-match summary                      │
//! │                                                              │
//! │  session.rs      - Live match, undo stack (caller layer)     │
//! │  store/          - Current match slot and match history      │
//! │  config.rs       - Environment configuration for the binary  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! `engine::point::point_won_by` is a pure function of a state snapshot
//! and the side that won the point:
//! - Never mutates its input
//! - No clock reads, no randomness, no logging
//! - Applying the same points to the same initial state always yields
//!   the same state hash
//!
//! Clock reads happen only where a match or timeline event is stamped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod session;
pub mod store;
pub mod config;

// Re-export commonly used types
pub use crate::core::team::{PlayerRef, Team, TeamId};
pub use crate::core::rng::DeterministicRng;
pub use crate::engine::config::{resolve_config, MatchConfig, MatchConfigInput, MatchFormat, Sport};
pub use crate::engine::state::{create_match, MatchState};
pub use crate::engine::point::point_won_by;
pub use crate::engine::rotation::{get_server, Server};
pub use crate::engine::pressure::{get_pressure, Pressure, PressureKind};
pub use crate::engine::display::{get_display_score, DisplayScore};
pub use crate::engine::events::{derive_timeline_event, Action, EventType, TimelineEvent};
pub use crate::engine::summary::{build_match_summary, MatchSummary, SummaryInput};
pub use crate::session::{MatchSession, PointOutcome, SessionError};
pub use crate::store::{KeyValueStore, MatchRepository, StoreError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
