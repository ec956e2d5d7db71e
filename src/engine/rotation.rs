//! Server Rotation
//!
//! Who serves next. Tennis and padel follow a fixed rotation that advances
//! once per game (and by point count inside a tiebreak); badminton simply
//! hands the serve to whoever won the last rally.

use serde::{Serialize, Deserialize};

use crate::core::team::TeamId;
use crate::engine::config::{MatchFormat, StartingServer};
use crate::engine::state::{MatchState, RotationEntry, ServerState};

/// The resolved server: side plus the serving player's user id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Serving side
    pub team: TeamId,
    /// Serving player, when the team has a player in that slot
    pub player_user_id: Option<String>,
}

/// Build the serving rotation for a format.
///
/// Singles is `[start, other]`. Doubles is a 4-entry cycle that opens
/// with the starting player, always alternates sides, and alternates each
/// side's two partners across that side's service games:
/// `(T, p), (T', 0), (T, 1 - p), (T', 1)`.
pub fn build_rotation(format: MatchFormat, start: StartingServer) -> Vec<RotationEntry> {
    let first = start.team;
    let second = first.other();

    match format {
        MatchFormat::Singles => vec![
            RotationEntry::new(first, 0),
            RotationEntry::new(second, 0),
        ],
        MatchFormat::Doubles => {
            let p = start.player_index.min(1);
            vec![
                RotationEntry::new(first, p),
                RotationEntry::new(second, 0),
                RotationEntry::new(first, 1 - p),
                RotationEntry::new(second, 1),
            ]
        }
    }
}

/// Rotation index serving tiebreak point `n` (1-indexed).
///
/// The first point is served from `start`; after that the serve changes
/// every two points.
#[inline]
pub fn tiebreak_server_index(start: usize, point_number: u32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if point_number <= 1 {
        return start % len;
    }
    let steps = ((point_number as usize - 2) / 2) + 1;
    (start + steps) % len
}

/// Resolve who serves the next point.
pub fn get_server(state: &MatchState) -> Server {
    match &state.server {
        ServerState::Rotation(rotation) => {
            let entry = rotation.current();
            let player_user_id = state
                .team(entry.team)
                .player(entry.player_index)
                .map(|p| p.user_id.clone());
            Server { team: entry.team, player_user_id }
        }
        ServerState::Badminton { serving } => Server {
            team: *serving,
            // No per-player serving is tracked in badminton.
            player_user_id: state.team(*serving).player(0).map(|p| p.user_id.clone()),
        },
    }
}
