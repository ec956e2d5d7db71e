//! Match State Definitions
//!
//! All state types for point-by-point scoring. Score and server state are
//! sport-discriminated enums so every sport-specific branch is checked
//! exhaustively at compile time.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::core::team::{Team, TeamId};
use crate::engine::config::{MatchConfig, TiebreakRules, BadmintonRules};
use crate::engine::rotation::build_rotation;

// =============================================================================
// TENNIS / PADEL
// =============================================================================

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    /// Games won by team A
    pub games_a: u32,
    /// Games won by team B
    pub games_b: u32,
}

impl SetScore {
    /// Create a set score.
    pub const fn new(games_a: u32, games_b: u32) -> Self {
        Self { games_a, games_b }
    }

    /// Games won by a side.
    #[inline]
    pub fn games(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.games_a,
            TeamId::B => self.games_b,
        }
    }

    /// Award one game to a side.
    #[inline]
    pub fn add_game(&mut self, team: TeamId) {
        match team {
            TeamId::A => self.games_a += 1,
            TeamId::B => self.games_b += 1,
        }
    }

    /// Winner of this set, if it is complete under the given rules.
    ///
    /// A set is won by reaching `target` games with a two game lead or,
    /// when tiebreaks are enabled, by the tiebreak score `target + 1` to `target`.
    pub fn winner(&self, target: u32, tiebreak: &TiebreakRules) -> Option<TeamId> {
        TeamId::BOTH.into_iter().find(|team| {
            let won = self.games(*team);
            let lost = self.games(team.other());
            (won >= target && won >= lost + 2)
                || (tiebreak.enabled && won == target + 1 && lost == target)
        })
    }

    /// True when this set was decided by a tiebreak.
    pub fn is_tiebreak_result(&self, target: u32) -> bool {
        (self.games_a == target + 1 && self.games_b == target)
            || (self.games_b == target + 1 && self.games_a == target)
    }
}

/// Score of a tennis or padel match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TennisScore {
    /// Sets in play order; the last one is the current set
    pub sets: Vec<SetScore>,
    /// Index of the set being played
    pub current_set: usize,
    /// In-game points for team A (0, 1, 2, 3, then beyond for deuce play)
    pub points_a: u32,
    /// In-game points for team B
    pub points_b: u32,
    /// A tiebreak is being played
    pub in_tiebreak: bool,
    /// Tiebreak points for team A
    pub tiebreak_a: u32,
    /// Tiebreak points for team B
    pub tiebreak_b: u32,
    /// Set once the match is decided; the state is then terminal
    pub match_winner: Option<TeamId>,
}

impl TennisScore {
    /// Fresh score: one empty set, no points.
    pub fn new(starts_in_tiebreak: bool) -> Self {
        Self {
            sets: vec![SetScore::default()],
            current_set: 0,
            points_a: 0,
            points_b: 0,
            in_tiebreak: starts_in_tiebreak,
            tiebreak_a: 0,
            tiebreak_b: 0,
            match_winner: None,
        }
    }

    /// In-game points of a side.
    #[inline]
    pub fn points(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.points_a,
            TeamId::B => self.points_b,
        }
    }

    /// Tiebreak points of a side.
    #[inline]
    pub fn tiebreak_points(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.tiebreak_a,
            TeamId::B => self.tiebreak_b,
        }
    }

    /// The set currently in play.
    #[inline]
    pub fn current(&self) -> SetScore {
        self.sets.get(self.current_set).copied().unwrap_or_default()
    }

    /// Sets that have been started (truncated to the current set).
    pub fn played_sets(&self) -> &[SetScore] {
        let end = (self.current_set + 1).min(self.sets.len());
        &self.sets[..end]
    }

    /// Number of completed sets won by a side.
    pub fn sets_won(&self, team: TeamId, config: &MatchConfig) -> u32 {
        self.played_sets()
            .iter()
            .filter(|set| set.winner(config.set_target(), &config.tiebreak) == Some(team))
            .count() as u32
    }

    /// Total games won by a side across all sets.
    pub fn total_games(&self, team: TeamId) -> u32 {
        self.played_sets().iter().map(|set| set.games(team)).sum()
    }
}

// =============================================================================
// BADMINTON
// =============================================================================

/// Points won by each side in one badminton game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    /// Points won by team A
    pub points_a: u32,
    /// Points won by team B
    pub points_b: u32,
}

impl GameScore {
    /// Create a game score.
    pub const fn new(points_a: u32, points_b: u32) -> Self {
        Self { points_a, points_b }
    }

    /// Points of a side.
    #[inline]
    pub fn points(&self, team: TeamId) -> u32 {
        match team {
            TeamId::A => self.points_a,
            TeamId::B => self.points_b,
        }
    }

    /// Award one rally to a side.
    #[inline]
    pub fn add_point(&mut self, team: TeamId) {
        match team {
            TeamId::A => self.points_a += 1,
            TeamId::B => self.points_b += 1,
        }
    }

    /// Winner of this game, if complete.
    ///
    /// Reaching the cap wins outright; otherwise the target must be reached
    /// with a two point lead (or outright when `win_by_two` is off).
    pub fn winner(&self, rules: &BadmintonRules) -> Option<TeamId> {
        TeamId::BOTH.into_iter().find(|team| {
            let won = self.points(*team);
            let lost = self.points(team.other());
            if won >= rules.max_points_cap {
                return true;
            }
            won >= rules.points_to_win_game && (!rules.win_by_two || won >= lost + 2)
        })
    }
}

/// Score of a badminton match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadmintonScore {
    /// Games in play order; the last one is the current game
    pub games: Vec<GameScore>,
    /// Index of the game being played
    pub current_game: usize,
    /// Set once the match is decided; the state is then terminal
    pub match_winner: Option<TeamId>,
}

impl BadmintonScore {
    /// Fresh score: one empty game.
    pub fn new() -> Self {
        Self {
            games: vec![GameScore::default()],
            current_game: 0,
            match_winner: None,
        }
    }

    /// The game currently in play.
    #[inline]
    pub fn current(&self) -> GameScore {
        self.games.get(self.current_game).copied().unwrap_or_default()
    }

    /// Games that have been started.
    pub fn played_games(&self) -> &[GameScore] {
        let end = (self.current_game + 1).min(self.games.len());
        &self.games[..end]
    }

    /// Completed games won by a side.
    pub fn games_won(&self, team: TeamId, rules: &BadmintonRules) -> u32 {
        self.played_games()
            .iter()
            .filter(|game| game.winner(rules) == Some(team))
            .count() as u32
    }
}

impl Default for BadmintonScore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sport-discriminated score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreState {
    /// Tennis and padel
    TennisPadel(TennisScore),
    /// Badminton rally scoring
    Badminton(BadmintonScore),
}

impl ScoreState {
    /// Winner of the match, if decided.
    #[inline]
    pub fn match_winner(&self) -> Option<TeamId> {
        match self {
            ScoreState::TennisPadel(score) => score.match_winner,
            ScoreState::Badminton(score) => score.match_winner,
        }
    }

    /// Tennis/padel score, if this is one.
    pub fn as_tennis(&self) -> Option<&TennisScore> {
        match self {
            ScoreState::TennisPadel(score) => Some(score),
            ScoreState::Badminton(_) => None,
        }
    }

    /// Badminton score, if this is one.
    pub fn as_badminton(&self) -> Option<&BadmintonScore> {
        match self {
            ScoreState::Badminton(score) => Some(score),
            ScoreState::TennisPadel(_) => None,
        }
    }
}

// =============================================================================
// SERVER STATE
// =============================================================================

/// One slot in a serving rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationEntry {
    /// Serving side
    pub team: TeamId,
    /// Partner index within the side
    pub player_index: usize,
}

impl RotationEntry {
    /// Create a rotation entry.
    pub const fn new(team: TeamId, player_index: usize) -> Self {
        Self { team, player_index }
    }
}

/// Fixed serving order for tennis and padel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// Serving order, 2 entries (singles) or 4 (doubles)
    pub order: Vec<RotationEntry>,
    /// Entry serving now; always `< order.len()`
    pub index: usize,
    /// Rotation index of the first tiebreak server, while a tiebreak runs
    pub tiebreak_start_index: Option<usize>,
}

impl RotationState {
    /// The entry currently serving.
    #[inline]
    pub fn current(&self) -> RotationEntry {
        self.order
            .get(self.index)
            .copied()
            .unwrap_or(RotationEntry::new(TeamId::A, 0))
    }
}

/// Sport-discriminated serving state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerState {
    /// Tennis/padel fixed rotation
    Rotation(RotationState),
    /// Badminton: the last rally winner serves
    Badminton {
        /// Serving side
        serving: TeamId,
    },
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
///
/// A plain value: cloning produces an independent snapshot, so callers can
/// keep any number of prior states and the pressure detector can simulate
/// points without touching the live state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    /// Resolved rules
    pub config: MatchConfig,
    /// Team A and team B, indexed by `TeamId::index()`
    pub teams: [Team; 2],
    /// Score
    pub score: ScoreState,
    /// Serving state
    pub server: ServerState,
    /// When the match was created
    pub started_at: DateTime<Utc>,
}

impl MatchState {
    /// Get a team by id.
    #[inline]
    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    /// Winner of the match, if decided.
    #[inline]
    pub fn match_winner(&self) -> Option<TeamId> {
        self.score.match_winner()
    }

    /// Check if the match has ended.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.match_winner().is_some()
    }

    /// Compute hash of the scoring state for verification.
    ///
    /// Covers rules, score and server; the creation timestamp is excluded
    /// so replays of the same points hash identically.
    pub fn compute_hash(&self) -> StateHash {
        let kind = match self.score {
            ScoreState::TennisPadel(_) => 0,
            ScoreState::Badminton(_) => 1,
        };

        compute_state_hash(kind, |hasher| {
            hash_config(&self.config, hasher);

            for team in &self.teams {
                hasher.update_u8(team.id as u8);
                for player in &team.players {
                    hasher.update_str(&player.user_id);
                }
            }

            match &self.score {
                ScoreState::TennisPadel(score) => {
                    hasher.update_usize(score.sets.len());
                    for set in &score.sets {
                        hasher.update_u32(set.games_a);
                        hasher.update_u32(set.games_b);
                    }
                    hasher.update_usize(score.current_set);
                    hasher.update_u32(score.points_a);
                    hasher.update_u32(score.points_b);
                    hasher.update_bool(score.in_tiebreak);
                    hasher.update_u32(score.tiebreak_a);
                    hasher.update_u32(score.tiebreak_b);
                    hasher.update_opt_u8(score.match_winner.map(|t| t as u8));
                }
                ScoreState::Badminton(score) => {
                    hasher.update_usize(score.games.len());
                    for game in &score.games {
                        hasher.update_u32(game.points_a);
                        hasher.update_u32(game.points_b);
                    }
                    hasher.update_usize(score.current_game);
                    hasher.update_opt_u8(score.match_winner.map(|t| t as u8));
                }
            }

            match &self.server {
                ServerState::Rotation(rotation) => {
                    for entry in &rotation.order {
                        hasher.update_u8(entry.team as u8);
                        hasher.update_usize(entry.player_index);
                    }
                    hasher.update_usize(rotation.index);
                    match rotation.tiebreak_start_index {
                        None => hasher.update_bool(false),
                        Some(start) => {
                            hasher.update_bool(true);
                            hasher.update_usize(start);
                        }
                    }
                }
                ServerState::Badminton { serving } => hasher.update_u8(*serving as u8),
            }
        })
    }
}

fn hash_config(config: &MatchConfig, hasher: &mut StateHasher) {
    hasher.update_u8(config.sport as u8);
    hasher.update_u8(config.format as u8);
    hasher.update_u32(config.best_of);
    hasher.update_bool(config.tiebreak.enabled);
    hasher.update_u32(config.tiebreak.target);
    hasher.update_u32(config.short_set_to.unwrap_or(0));
    hasher.update_bool(config.super_tiebreak_only);
    hasher.update_u8(config.starting_server.team as u8);
    hasher.update_usize(config.starting_server.player_index);
    hasher.update_u32(config.badminton.points_to_win_game);
    hasher.update_bool(config.badminton.win_by_two);
    hasher.update_u32(config.badminton.max_points_cap);
    hasher.update_u32(config.badminton.games_to_win);
}

/// Create a new match, timestamped now.
pub fn create_match(config: MatchConfig, team_a: Team, team_b: Team) -> MatchState {
    create_match_at(config, team_a, team_b, Utc::now())
}

/// Create a new match with an explicit start time.
///
/// Team ids are normalised to their slot so `teams[0]` is always A.
pub fn create_match_at(
    config: MatchConfig,
    mut team_a: Team,
    mut team_b: Team,
    started_at: DateTime<Utc>,
) -> MatchState {
    team_a.id = TeamId::A;
    team_b.id = TeamId::B;

    let (score, server) = if config.sport.uses_sets() {
        let order = build_rotation(config.format, config.starting_server);
        let tiebreak_start_index = config.super_tiebreak_only.then_some(0);
        (
            ScoreState::TennisPadel(TennisScore::new(config.super_tiebreak_only)),
            ServerState::Rotation(RotationState {
                order,
                index: 0,
                tiebreak_start_index,
            }),
        )
    } else {
        (
            ScoreState::Badminton(BadmintonScore::new()),
            ServerState::Badminton { serving: config.starting_server.team },
        )
    };

    MatchState {
        config,
        teams: [team_a, team_b],
        score,
        server,
        started_at,
    }
}
