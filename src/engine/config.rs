//! Match Configuration
//!
//! A partially specified [`MatchConfigInput`] is resolved into a fully
//! specified, sport-appropriate [`MatchConfig`]. Resolution is total:
//! every field has a safe default and nothing is ever rejected.

use serde::{Serialize, Deserialize};

use crate::core::team::TeamId;

/// Default number of sets (tennis/padel) in a match.
pub const DEFAULT_BEST_OF: u32 = 3;

/// Games needed to take a standard set.
pub const DEFAULT_SET_GAMES: u32 = 6;

/// Points needed to win a standard tiebreak.
pub const DEFAULT_TIEBREAK_TARGET: u32 = 7;

/// Points needed to win a super tiebreak.
pub const SUPER_TIEBREAK_TARGET: u32 = 10;

/// Badminton: points to win a game.
pub const BADMINTON_POINTS_TO_WIN: u32 = 21;

/// Badminton: outright cap that ends a game regardless of lead.
pub const BADMINTON_POINTS_CAP: u32 = 30;

/// Badminton: games needed to win the match.
pub const BADMINTON_GAMES_TO_WIN: u32 = 2;

// =============================================================================
// ENUMS
// =============================================================================

/// Supported racket sports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Sport {
    /// Tennis: sets of games, tiebreak at 6-all
    #[default]
    Tennis,
    /// Padel: scored like tennis
    Padel,
    /// Badminton: rally scoring
    Badminton,
}

impl Sport {
    /// Sports that use points/games/sets.
    #[inline]
    pub fn uses_sets(self) -> bool {
        matches!(self, Sport::Tennis | Sport::Padel)
    }
}

impl std::str::FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tennis" => Ok(Sport::Tennis),
            "padel" => Ok(Sport::Padel),
            "badminton" => Ok(Sport::Badminton),
            other => Err(format!("unknown sport: {other}")),
        }
    }
}

/// Singles or doubles play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum MatchFormat {
    /// One player per side
    #[default]
    Singles,
    /// Two players per side
    Doubles,
}

impl MatchFormat {
    /// Players per side.
    #[inline]
    pub fn players_per_team(self) -> usize {
        match self {
            MatchFormat::Singles => 1,
            MatchFormat::Doubles => 2,
        }
    }
}

impl std::str::FromStr for MatchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singles" => Ok(MatchFormat::Singles),
            "doubles" => Ok(MatchFormat::Doubles),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Tiebreak rules for tennis/padel sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakRules {
    /// Play a tiebreak when games reach target-all
    pub enabled: bool,
    /// Points needed to win the tiebreak (lead of two required)
    pub target: u32,
}

/// The player who serves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartingServer {
    /// Serving side
    pub team: TeamId,
    /// Partner index within the side (always 0 in singles)
    pub player_index: usize,
}

/// Badminton rally-scoring constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadmintonRules {
    /// Points to win a game
    pub points_to_win_game: u32,
    /// Require a two point lead below the cap
    pub win_by_two: bool,
    /// Reaching this many points wins outright
    pub max_points_cap: u32,
    /// Games to win the match
    pub games_to_win: u32,
}

impl Default for BadmintonRules {
    fn default() -> Self {
        Self {
            points_to_win_game: BADMINTON_POINTS_TO_WIN,
            win_by_two: true,
            max_points_cap: BADMINTON_POINTS_CAP,
            games_to_win: BADMINTON_GAMES_TO_WIN,
        }
    }
}

/// Fully resolved match rules.
///
/// Immutable for the life of a match; a reset replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Sport being played
    pub sport: Sport,
    /// Singles or doubles
    pub format: MatchFormat,
    /// Maximum number of sets
    pub best_of: u32,
    /// Tiebreak rules
    pub tiebreak: TiebreakRules,
    /// Games per set override (short sets); `None` means 6
    pub short_set_to: Option<u32>,
    /// The whole match is a single tiebreak
    pub super_tiebreak_only: bool,
    /// Who serves first
    pub starting_server: StartingServer,
    /// Rally-scoring constants (used only for badminton)
    pub badminton: BadmintonRules,
}

impl MatchConfig {
    /// Games needed to take a set.
    #[inline]
    pub fn set_target(&self) -> u32 {
        self.short_set_to.unwrap_or(DEFAULT_SET_GAMES)
    }

    /// Sets needed to win the match: ceil(best_of / 2).
    #[inline]
    pub fn sets_to_win(&self) -> u32 {
        self.best_of.div_ceil(2)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        resolve_config(MatchConfigInput::default())
    }
}

// =============================================================================
// PARTIAL CONFIG
// =============================================================================

/// Partially specified match rules, as supplied by a setup screen or
/// stored preset. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfigInput {
    /// Sport being played
    pub sport: Option<Sport>,
    /// Singles or doubles
    pub format: Option<MatchFormat>,
    /// Maximum number of sets
    pub best_of: Option<u32>,
    /// Play a tiebreak at target-all
    pub tiebreak_enabled: Option<bool>,
    /// Tiebreak points target
    pub tiebreak_target: Option<u32>,
    /// Games per set override
    pub short_set_to: Option<u32>,
    /// Single super tiebreak instead of sets
    pub super_tiebreak_only: Option<bool>,
    /// Side that serves first
    pub starting_team: Option<TeamId>,
    /// Partner index of the first server
    pub starting_player_index: Option<usize>,
    /// Badminton points to win a game
    pub points_to_win_game: Option<u32>,
    /// Badminton two point lead rule
    pub win_by_two: Option<bool>,
    /// Badminton outright points cap
    pub max_points_cap: Option<u32>,
    /// Badminton games to win the match
    pub games_to_win: Option<u32>,
}

/// Resolve a partial configuration into a complete rule set.
///
/// Zero or out-of-range numbers are replaced by the sport default, so the
/// state machine never has to guard against them.
pub fn resolve_config(input: MatchConfigInput) -> MatchConfig {
    let sport = input.sport.unwrap_or_default();
    let format = input.format.unwrap_or_default();
    let super_tiebreak_only = input.super_tiebreak_only.unwrap_or(false);

    let default_target = if super_tiebreak_only {
        SUPER_TIEBREAK_TARGET
    } else {
        DEFAULT_TIEBREAK_TARGET
    };

    let tiebreak = TiebreakRules {
        enabled: input.tiebreak_enabled.unwrap_or(true),
        target: positive_or(input.tiebreak_target, default_target),
    };

    let player_index = input
        .starting_player_index
        .filter(|i| *i < format.players_per_team())
        .unwrap_or(0);

    let defaults = BadmintonRules::default();
    let points_to_win_game = positive_or(input.points_to_win_game, defaults.points_to_win_game);
    let badminton = BadmintonRules {
        points_to_win_game,
        win_by_two: input.win_by_two.unwrap_or(defaults.win_by_two),
        max_points_cap: input
            .max_points_cap
            .filter(|cap| *cap >= points_to_win_game)
            .unwrap_or(defaults.max_points_cap.max(points_to_win_game)),
        games_to_win: positive_or(input.games_to_win, defaults.games_to_win),
    };

    MatchConfig {
        sport,
        format,
        best_of: input.best_of.map(|b| b.max(1)).unwrap_or(DEFAULT_BEST_OF),
        tiebreak,
        short_set_to: input.short_set_to.filter(|g| *g > 0),
        super_tiebreak_only,
        starting_server: StartingServer {
            team: input.starting_team.unwrap_or_default(),
            player_index,
        },
        badminton,
    }
}

#[inline]
fn positive_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}
