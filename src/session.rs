//! Match Session
//!
//! The caller layer around the pure engine. Owns the live state, the
//! append-only timeline, the undo snapshot stack and the end-of-match
//! summary, and applies one point at a time.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::team::{Team, TeamId};
use crate::engine::config::{resolve_config, MatchConfigInput};
use crate::engine::display::{get_display_score, DisplayScore};
use crate::engine::events::{Action, EventType, Timeline, TimelineEvent};
use crate::engine::point;
use crate::engine::pressure::{get_pressure, Pressure};
use crate::engine::rotation::{get_server, Server};
use crate::engine::state::{create_match, MatchState};
use crate::engine::summary::{build_match_summary, MatchSummary, SummaryInput};

/// Result of offering a point to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointOutcome {
    /// The point was scored.
    Applied {
        /// Timeline entry recorded for the point
        event: Option<TimelineEvent>,
        /// Pressure situation before the next point
        pressure: Option<Pressure>,
    },
    /// The match is already decided; nothing changed.
    Ignored,
}

/// A live match.
#[derive(Clone, Debug)]
pub struct MatchSession {
    id: Uuid,
    state: MatchState,
    timeline: Timeline,
    undo_stack: Vec<MatchState>,
    summary: Option<MatchSummary>,
}

impl MatchSession {
    /// Start a new match with a fresh id.
    pub fn new(config: MatchConfigInput, team_a: Team, team_b: Team) -> Self {
        let state = create_match(resolve_config(config), team_a, team_b);
        let id = Uuid::new_v4();

        info!(
            match_id = %id,
            sport = ?state.config.sport,
            format = ?state.config.format,
            "Match created: {} vs {}",
            state.team(TeamId::A).display_name(),
            state.team(TeamId::B).display_name(),
        );

        Self {
            id,
            state,
            timeline: Timeline::new(),
            undo_stack: Vec::new(),
            summary: None,
        }
    }

    /// Rebuild a session from persisted parts.
    ///
    /// The summary of a finished match is rebuilt from the timeline.
    pub fn from_parts(
        id: Uuid,
        state: MatchState,
        timeline: Timeline,
        undo_stack: Vec<MatchState>,
    ) -> Self {
        let mut session = Self {
            id,
            state,
            timeline,
            undo_stack,
            summary: None,
        };
        if session.state.is_ended() {
            session.summary = Some(session.build_summary());
        }
        session
    }

    /// Match identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Who serves the next point.
    pub fn server(&self) -> Server {
        get_server(&self.state)
    }

    /// Scoreboard view.
    pub fn display(&self) -> DisplayScore {
        get_display_score(&self.state)
    }

    /// Pressure situation before the next point.
    pub fn pressure(&self) -> Option<Pressure> {
        get_pressure(&self.state)
    }

    /// Recorded timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Snapshots available to undo, oldest first.
    pub fn undo_stack(&self) -> &[MatchState] {
        &self.undo_stack
    }

    /// End-of-match summary, once the match is decided.
    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    /// Check if there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Score a point for `team`.
    pub fn point_won_by(&mut self, team: TeamId) -> PointOutcome {
        self.point_won_by_at(team, Utc::now())
    }

    /// Score a point with an explicit event timestamp.
    pub fn point_won_by_at(&mut self, team: TeamId, at: DateTime<Utc>) -> PointOutcome {
        if self.state.is_ended() {
            debug!(match_id = %self.id, %team, "Point ignored: match already decided");
            return PointOutcome::Ignored;
        }

        let next = point::point_won_by(&self.state, team);
        let prev = std::mem::replace(&mut self.state, next);
        let event = self
            .timeline
            .apply(&prev, &self.state, Action::Point(team), at)
            .cloned();
        self.undo_stack.push(prev);

        match event.as_ref().map(|e| e.event_type) {
            Some(EventType::Set) | Some(EventType::MatchEnd) => {
                if let Some(e) = &event {
                    info!(match_id = %self.id, "{}", e.label);
                }
            }
            _ => debug!(
                match_id = %self.id,
                %team,
                label = event.as_ref().map(|e| e.label.as_str()).unwrap_or(""),
                "Point applied"
            ),
        }

        if self.state.is_ended() && self.summary.is_none() {
            let summary = self.build_summary();
            info!(
                match_id = %self.id,
                score = %summary.score_line,
                duration_secs = summary.duration_secs,
                "Match complete"
            );
            self.summary = Some(summary);
        }

        PointOutcome::Applied {
            event,
            pressure: self.pressure(),
        }
    }

    /// Restore the state before the most recent point.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        let previous = self.undo_stack.pop().ok_or(SessionError::NothingToUndo)?;
        let current = std::mem::replace(&mut self.state, previous);
        self.timeline.apply(&current, &self.state, Action::Undo, Utc::now());
        self.summary = None;

        debug!(match_id = %self.id, remaining = self.undo_stack.len(), "Point undone");
        Ok(())
    }

    /// Restart with new rules, keeping the same teams.
    pub fn reset(&mut self, config: MatchConfigInput) {
        let [team_a, team_b] = self.state.teams.clone();
        *self = Self::new(config, team_a, team_b);
    }

    fn build_summary(&self) -> MatchSummary {
        build_match_summary(SummaryInput {
            config: &self.state.config,
            final_state: &self.state,
            timeline: self.timeline.events(),
        })
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No point has been scored since the match started.
    #[error("Nothing to undo")]
    NothingToUndo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::team::PlayerRef;
    use crate::engine::config::Sport;
    use crate::engine::pressure::PressureKind;

    use TeamId::{A, B};

    fn session(config: MatchConfigInput) -> MatchSession {
        MatchSession::new(
            config,
            Team::singles(A, PlayerRef::new("a", "Ana")),
            Team::singles(B, PlayerRef::new("b", "Bo")),
        )
    }

    fn play(session: &mut MatchSession, team: TeamId, points: usize) {
        for _ in 0..points {
            session.point_won_by(team);
        }
    }

    #[test]
    fn test_point_applied_records_event() {
        let mut s = session(MatchConfigInput::default());
        match s.point_won_by(A) {
            PointOutcome::Applied { event, pressure } => {
                assert_eq!(event.unwrap().event_type, EventType::Point);
                assert_eq!(pressure, None);
            }
            PointOutcome::Ignored => panic!("point should apply"),
        }
        assert_eq!(s.timeline().len(), 1);
        assert!(s.can_undo());
    }

    #[test]
    fn test_outcome_reports_pressure() {
        let mut s = session(MatchConfigInput::default());
        play(&mut s, B, 2);
        match s.point_won_by(B) {
            PointOutcome::Applied { pressure, .. } => {
                assert_eq!(pressure.map(|p| p.kind), Some(PressureKind::BreakPoint));
            }
            PointOutcome::Ignored => panic!("point should apply"),
        }
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut s = session(MatchConfigInput::default());
        let start = s.state().clone();
        s.point_won_by(A);
        s.point_won_by(B);

        s.undo().unwrap();
        assert_eq!(s.timeline().len(), 1);
        s.undo().unwrap();
        assert_eq!(s.state(), &start);
        assert!(s.timeline().is_empty());
        assert_eq!(s.undo(), Err(SessionError::NothingToUndo));
    }

    #[test]
    fn test_summary_built_once_at_match_end() {
        let mut s = session(MatchConfigInput::default());
        play(&mut s, A, 47);
        assert!(s.summary().is_none());

        s.point_won_by(A);
        let summary = s.summary().cloned().unwrap();
        assert_eq!(summary.score_line, "6–0, 6–0");
        assert_eq!(summary.winner, Some(A));

        // Further points are ignored and leave the summary untouched
        assert_eq!(s.point_won_by(B), PointOutcome::Ignored);
        assert_eq!(s.summary(), Some(&summary));
        assert_eq!(s.undo_stack().len(), 48);
    }

    #[test]
    fn test_undo_out_of_finished_match_clears_summary() {
        let mut s = session(MatchConfigInput {
            sport: Some(Sport::Badminton),
            ..Default::default()
        });
        play(&mut s, B, 42);
        assert!(s.state().is_ended());
        assert!(s.summary().is_some());

        s.undo().unwrap();
        assert!(!s.state().is_ended());
        assert!(s.summary().is_none());
        assert_eq!(s.timeline().last().unwrap().event_type, EventType::Point);
    }

    #[test]
    fn test_reset_keeps_teams() {
        let mut s = session(MatchConfigInput::default());
        let old_id = s.id();
        play(&mut s, A, 5);

        s.reset(MatchConfigInput {
            sport: Some(Sport::Padel),
            ..Default::default()
        });
        assert_ne!(s.id(), old_id);
        assert_eq!(s.state().config.sport, Sport::Padel);
        assert_eq!(s.state().team(B).display_name(), "Bo");
        assert!(s.timeline().is_empty());
        assert!(!s.can_undo());
    }

    #[test]
    fn test_from_parts_rebuilds_summary() {
        let mut s = session(MatchConfigInput::default());
        play(&mut s, B, 48);

        let restored = MatchSession::from_parts(
            s.id(),
            s.state().clone(),
            s.timeline().clone(),
            s.undo_stack().to_vec(),
        );
        assert_eq!(restored.summary().map(|x| x.winner), Some(Some(B)));
        assert_eq!(restored.server(), s.server());
    }
}
