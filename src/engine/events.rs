//! Match Timeline
//!
//! Semantic events derived from consecutive states. Each transition yields
//! at most one event; higher-level events subsume lower ones, so a point
//! that wins a set is recorded as SET rather than GAME or POINT.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::team::TeamId;
use crate::engine::state::{BadmintonScore, MatchState, ScoreState, TennisScore};

/// Type of timeline entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// A point that decided nothing larger
    Point,
    /// A game was won
    Game,
    /// A set was won (tennis/padel)
    Set,
    /// A tiebreak began
    TiebreakStart,
    /// The match was decided
    MatchEnd,
}

/// Caller action that produced a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "team", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// A point was won by the given side
    Point(TeamId),
    /// The caller restored its previous snapshot
    Undo,
}

/// One entry of the append-only match timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Unique event id
    pub id: Uuid,
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// What happened
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Side that won the deciding point
    pub team: Option<TeamId>,
    /// Human-readable description
    pub label: String,
}

impl TimelineEvent {
    /// Create an event with a fresh id.
    pub fn new(
        timestamp: DateTime<Utc>,
        event_type: EventType,
        team: Option<TeamId>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            event_type,
            team,
            label: label.into(),
        }
    }
}

/// Derive the event for a `prev -> next` transition.
///
/// Checked in priority order: MATCH_END, TIEBREAK_START, SET, GAME, POINT.
/// UNDO and transitions that changed nothing derive no event.
pub fn derive_timeline_event(
    prev: &MatchState,
    next: &MatchState,
    action: Action,
    at: DateTime<Utc>,
) -> Option<TimelineEvent> {
    let Action::Point(team) = action else {
        return None;
    };

    let (event_type, label) = match (&prev.score, &next.score) {
        (ScoreState::TennisPadel(before), ScoreState::TennisPadel(after)) => {
            tennis_event(next, before, after, team)?
        }
        (ScoreState::Badminton(before), ScoreState::Badminton(after)) => {
            badminton_event(next, before, after, team)?
        }
        _ => return None,
    };

    Some(TimelineEvent::new(at, event_type, Some(team), label))
}

fn tennis_event(
    next: &MatchState,
    before: &TennisScore,
    after: &TennisScore,
    team: TeamId,
) -> Option<(EventType, String)> {
    if before.match_winner.is_none() {
        if let Some(winner) = after.match_winner {
            let name = next.team(winner).display_name();
            return Some((EventType::MatchEnd, format!("{name} wins the match")));
        }
    }

    if !before.in_tiebreak && after.in_tiebreak {
        let set = after.current();
        return Some((
            EventType::TiebreakStart,
            format!("Tiebreak at {}–{}", set.games_a, set.games_b),
        ));
    }

    if after.current_set > before.current_set {
        let completed = after.sets.get(before.current_set).copied().unwrap_or_default();
        let winner = if completed.games_a > completed.games_b { TeamId::A } else { TeamId::B };
        return Some((
            EventType::Set,
            format!(
                "Set {} to {} ({}–{})",
                before.current_set + 1,
                next.team(winner).display_name(),
                completed.games_a,
                completed.games_b
            ),
        ));
    }

    let (was, now) = (before.current(), after.current());
    if was != now {
        return Some((
            EventType::Game,
            format!(
                "Game {} ({}–{})",
                next.team(team).display_name(),
                now.games_a,
                now.games_b
            ),
        ));
    }

    let counters = |s: &TennisScore| (s.points_a, s.points_b, s.tiebreak_a, s.tiebreak_b);
    if counters(before) != counters(after) {
        return Some((EventType::Point, format!("Point {}", next.team(team).display_name())));
    }

    None
}

fn badminton_event(
    next: &MatchState,
    before: &BadmintonScore,
    after: &BadmintonScore,
    team: TeamId,
) -> Option<(EventType, String)> {
    if before.match_winner.is_none() {
        if let Some(winner) = after.match_winner {
            let name = next.team(winner).display_name();
            return Some((EventType::MatchEnd, format!("{name} wins the match")));
        }
    }

    if after.current_game > before.current_game {
        let completed = after.games.get(before.current_game).copied().unwrap_or_default();
        return Some((
            EventType::Game,
            format!(
                "Game {} to {} ({}–{})",
                before.current_game + 1,
                next.team(team).display_name(),
                completed.points_a,
                completed.points_b
            ),
        ));
    }

    if before.current() != after.current() {
        return Some((EventType::Point, format!("Point {}", next.team(team).display_name())));
    }

    None
}

// =============================================================================
// TIMELINE
// =============================================================================

/// Append-only event log with single-step undo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of an action.
    ///
    /// A point appends the derived event (if any); UNDO removes the most
    /// recent entry. Returns the appended event.
    pub fn apply(
        &mut self,
        prev: &MatchState,
        next: &MatchState,
        action: Action,
        at: DateTime<Utc>,
    ) -> Option<&TimelineEvent> {
        if action == Action::Undo {
            self.events.pop();
            return None;
        }

        let event = derive_timeline_event(prev, next, action, at)?;
        self.events.push(event);
        self.events.last()
    }

    /// Append an already-derived event.
    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Drop the most recent entry.
    pub fn pop(&mut self) -> Option<TimelineEvent> {
        self.events.pop()
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Most recent event.
    pub fn last(&self) -> Option<&TimelineEvent> {
        self.events.last()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
