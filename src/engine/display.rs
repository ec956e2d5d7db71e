//! Display Projection
//!
//! Sport-specific read-only view of a match for scoreboards.

use serde::{Serialize, Deserialize};

use crate::core::team::TeamId;
use crate::engine::point::DEUCE;
use crate::engine::rotation::get_server;
use crate::engine::state::{GameScore, MatchState, ScoreState, SetScore, TennisScore};

/// Scoreboard projection of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayScore {
    /// Tennis and padel
    TennisPadel {
        /// Set scores played so far, including the current set
        sets: Vec<SetScore>,
        /// Current game point labels ("0", "15", "30", "40", "Ad");
        /// `None` during a tiebreak or once the match is over
        points: Option<(String, String)>,
        /// Tiebreak points while a tiebreak is being played
        tiebreak: Option<(u32, u32)>,
        /// Side serving the next point
        serving: TeamId,
        /// Match winner
        winner: Option<TeamId>,
    },
    /// Badminton
    Badminton {
        /// Point scores of every game played
        games: Vec<GameScore>,
        /// Completed games won by each side
        games_won: (u32, u32),
        /// Points in the current game
        points: (u32, u32),
        /// Side serving the next rally
        serving: TeamId,
        /// Match winner
        winner: Option<TeamId>,
    },
}

/// Project a match onto its scoreboard view.
pub fn get_display_score(state: &MatchState) -> DisplayScore {
    let serving = get_server(state).team;

    match &state.score {
        ScoreState::TennisPadel(score) => {
            let finished = score.match_winner.is_some();
            let tiebreak = (score.in_tiebreak && !finished)
                .then_some((score.tiebreak_a, score.tiebreak_b));
            let points = (!score.in_tiebreak && !finished).then(|| point_labels(score));

            DisplayScore::TennisPadel {
                sets: super_tiebreak_aware_sets(state, score),
                points,
                tiebreak,
                serving,
                winner: score.match_winner,
            }
        }
        ScoreState::Badminton(score) => {
            let rules = &state.config.badminton;
            let current = score.current();
            DisplayScore::Badminton {
                games: score.played_games().to_vec(),
                games_won: (
                    score.games_won(TeamId::A, rules),
                    score.games_won(TeamId::B, rules),
                ),
                points: (current.points_a, current.points_b),
                serving,
                winner: score.match_winner,
            }
        }
    }
}

/// Super-tiebreak matches show the final tiebreak as the only set.
fn super_tiebreak_aware_sets(state: &MatchState, score: &TennisScore) -> Vec<SetScore> {
    if state.config.super_tiebreak_only && score.match_winner.is_some() {
        return vec![SetScore::new(score.tiebreak_a, score.tiebreak_b)];
    }
    score.played_sets().to_vec()
}

/// Labels for the current game: "0", "15", "30", "40", "Ad".
///
/// Level at 40 or beyond reads "40"/"40"; the leader past deuce reads "Ad".
pub fn point_labels(score: &TennisScore) -> (String, String) {
    let (a, b) = (score.points_a, score.points_b);
    if a >= DEUCE && b >= DEUCE {
        return match a.cmp(&b) {
            std::cmp::Ordering::Equal => ("40".into(), "40".into()),
            std::cmp::Ordering::Greater => ("Ad".into(), "40".into()),
            std::cmp::Ordering::Less => ("40".into(), "Ad".into()),
        };
    }
    (point_label(a).into(), point_label(b).into())
}

fn point_label(points: u32) -> &'static str {
    match points {
        0 => "0",
        1 => "15",
        2 => "30",
        _ => "40",
    }
}
