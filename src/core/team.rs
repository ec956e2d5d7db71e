//! Team and Player Identity
//!
//! The two sides of a match. `TeamId` is a closed two-value domain so a
//! point can never be awarded to a side that does not exist.

use serde::{Serialize, Deserialize};

// =============================================================================
// TEAM ID
// =============================================================================

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum TeamId {
    /// First side (listed first in score lines)
    #[default]
    A = 0,
    /// Second side
    B = 1,
}

impl TeamId {
    /// Both sides, in display order.
    pub const BOTH: [TeamId; 2] = [TeamId::A, TeamId::B];

    /// The opposing side.
    #[inline]
    pub fn other(self) -> TeamId {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }

    /// Index into two-element per-team arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamId::A => write!(f, "A"),
            TeamId::B => write!(f, "B"),
        }
    }
}

// =============================================================================
// PLAYER / TEAM
// =============================================================================

/// Reference to a player taking part in a match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Stable user identifier
    pub user_id: String,
    /// Name shown in labels and summaries
    pub display_name: String,
}

impl PlayerRef {
    /// Create a player reference.
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A side of the match: one player in singles, two in doubles.
///
/// Partner order is fixed for the whole match; the doubles serving
/// rotation refers to players by their index in `players`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Which side this is
    pub id: TeamId,
    /// Players in fixed partner order
    pub players: Vec<PlayerRef>,
}

impl Team {
    /// Create a singles team.
    pub fn singles(id: TeamId, player: PlayerRef) -> Self {
        Self { id, players: vec![player] }
    }

    /// Create a doubles team.
    pub fn doubles(id: TeamId, first: PlayerRef, second: PlayerRef) -> Self {
        Self { id, players: vec![first, second] }
    }

    /// Get a player by partner index.
    pub fn player(&self, index: usize) -> Option<&PlayerRef> {
        self.players.get(index)
    }

    /// Display name: player names joined with " / ", or "Team X" when empty.
    pub fn display_name(&self) -> String {
        if self.players.is_empty() {
            return format!("Team {}", self.id);
        }
        self.players
            .iter()
            .map(|p| p.display_name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_team() {
        assert_eq!(TeamId::A.other(), TeamId::B);
        assert_eq!(TeamId::B.other(), TeamId::A);
        assert_eq!(TeamId::A.index(), 0);
        assert_eq!(TeamId::B.index(), 1);
    }

    #[test]
    fn test_display_name() {
        let team = Team::doubles(
            TeamId::B,
            PlayerRef::new("u1", "Ana"),
            PlayerRef::new("u2", "Bea"),
        );
        assert_eq!(team.display_name(), "Ana / Bea");

        let empty = Team { id: TeamId::A, players: Vec::new() };
        assert_eq!(empty.display_name(), "Team A");
    }
}
