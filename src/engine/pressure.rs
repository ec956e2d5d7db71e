//! Pressure Detection
//!
//! Break, set and match points are found by speculatively applying the
//! next point for each side and inspecting the result. The simulated
//! states are dropped; nothing is committed.

use serde::{Serialize, Deserialize};

use crate::core::team::TeamId;
use crate::engine::point::point_won_by;
use crate::engine::rotation::get_server;
use crate::engine::state::{MatchState, ScoreState, TennisScore};

/// Kind of pressure situation, in descending priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PressureKind {
    /// The next point can win the match
    MatchPoint,
    /// The next point can win a set
    SetPoint,
    /// The receiving side can win the current game
    BreakPoint,
}

/// A pressure indicator for one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pressure {
    /// Side that would benefit from the next point
    pub team: TeamId,
    /// What the next point would decide
    pub kind: PressureKind,
}

/// Detect the highest-priority pressure situation before the next point.
///
/// Tiers are checked in order (match, set, break) and within each tier
/// team A before team B. Returns `None` for badminton and for finished
/// matches.
pub fn get_pressure(state: &MatchState) -> Option<Pressure> {
    let ScoreState::TennisPadel(before) = &state.score else {
        return None;
    };
    if before.match_winner.is_some() {
        return None;
    }

    let outcomes: Vec<(TeamId, MatchState)> = TeamId::BOTH
        .into_iter()
        .map(|team| (team, point_won_by(state, team)))
        .collect();

    let tiers = [PressureKind::MatchPoint, PressureKind::SetPoint, PressureKind::BreakPoint];
    for kind in tiers {
        for (team, next) in &outcomes {
            let Some(after) = next.score.as_tennis() else {
                continue;
            };
            if applies(kind, state, before, after, *team) {
                return Some(Pressure { team: *team, kind });
            }
        }
    }

    None
}

fn applies(
    kind: PressureKind,
    state: &MatchState,
    before: &TennisScore,
    after: &TennisScore,
    team: TeamId,
) -> bool {
    let config = &state.config;
    match kind {
        PressureKind::MatchPoint => after.match_winner == Some(team),
        PressureKind::SetPoint => {
            after.match_winner.is_none()
                && after.sets_won(team, config) > before.sets_won(team, config)
        }
        PressureKind::BreakPoint => {
            !before.in_tiebreak
                && get_server(state).team != team
                && after.total_games(team) > before.total_games(team)
        }
    }
}
