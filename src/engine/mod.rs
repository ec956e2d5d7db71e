//! Scoring Engine Module
//!
//! All scoring logic. Pure and synchronous: no clock reads except where a
//! timestamp is stamped onto a new match or event, no logging, no I/O.
//!
//! ## Module Structure
//!
//! - `config`: Rule inputs and their resolution
//! - `state`: Match, score and server state
//! - `rotation`: Serving order and current server
//! - `point`: The point state machine
//! - `pressure`: Break, set and match point detection
//! - `display`: Scoreboard projection
//! - `events`: Timeline events for replay and undo
//! - `summary`: End-of-match summary

pub mod config;
pub mod state;
pub mod rotation;
pub mod point;
pub mod pressure;
pub mod display;
pub mod events;
pub mod summary;

// Re-export key types
pub use config::{resolve_config, MatchConfig, MatchConfigInput, MatchFormat, Sport};
pub use state::{create_match, MatchState, ScoreState, ServerState};
pub use rotation::{get_server, Server};
pub use point::{apply_points, point_won_by};
pub use pressure::{get_pressure, Pressure, PressureKind};
pub use display::{get_display_score, DisplayScore};
pub use events::{derive_timeline_event, Action, EventType, Timeline, TimelineEvent};
pub use summary::{build_match_summary, MatchSummary, SummaryInput};
