//! Match Summary
//!
//! End-of-match projection built once from the final state and the
//! complete timeline. Never mutated after it is built.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::core::team::TeamId;
use crate::engine::config::{MatchConfig, MatchFormat, Sport};
use crate::engine::events::{EventType, TimelineEvent};
use crate::engine::state::{MatchState, ScoreState, SetScore};

/// Inputs to [`build_match_summary`].
#[derive(Clone, Copy, Debug)]
pub struct SummaryInput<'a> {
    /// Rules the match was played under
    pub config: &'a MatchConfig,
    /// Terminal (or abandoned) state
    pub final_state: &'a MatchState,
    /// Complete timeline, oldest first
    pub timeline: &'a [TimelineEvent],
}

/// Per-side tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTotals {
    /// Team A's count
    pub a: u32,
    /// Team B's count
    pub b: u32,
}

impl SideTotals {
    fn add(&mut self, team: TeamId, amount: u32) {
        match team {
            TeamId::A => self.a += amount,
            TeamId::B => self.b += amount,
        }
    }
}

/// Read-only end-of-match summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Sport played
    pub sport: Sport,
    /// Singles or doubles
    pub format: MatchFormat,
    /// Set scores (badminton: game point scores) actually played
    pub sets: Vec<SetScore>,
    /// Scores joined with ", ", e.g. "6–4, 3–6, 6–3"
    pub score_line: String,
    /// Winning side
    pub winner: Option<TeamId>,
    /// Winning side's display name
    pub winner_name: Option<String>,
    /// When the match started
    pub started_at: DateTime<Utc>,
    /// When the match ended
    pub ended_at: DateTime<Utc>,
    /// Elapsed whole seconds, never negative
    pub duration_secs: i64,
    /// Games won per side
    pub games_won: SideTotals,
    /// Sets won per side (badminton: games won)
    pub sets_won: SideTotals,
    /// Points won per side
    pub points_won: SideTotals,
    /// Tiebreaks played
    pub tiebreaks_played: u32,
}

/// Build the end-of-match summary; a missing MATCH_END event ends "now".
pub fn build_match_summary(input: SummaryInput<'_>) -> MatchSummary {
    build_match_summary_at(input, Utc::now())
}

/// Build the summary with an explicit fallback end time.
pub fn build_match_summary_at(input: SummaryInput<'_>, now: DateTime<Utc>) -> MatchSummary {
    let SummaryInput { config, final_state, timeline } = input;

    let ended_at = timeline
        .iter()
        .rev()
        .find(|e| e.event_type == EventType::MatchEnd)
        .map(|e| e.timestamp)
        .unwrap_or(now);
    let duration_secs = (ended_at - final_state.started_at).num_seconds().max(0);

    let winner = final_state.match_winner();
    let winner_name = winner.map(|team| final_state.team(team).display_name());

    let mut games_won = SideTotals::default();
    let mut sets_won = SideTotals::default();
    let mut points_won = SideTotals::default();

    let (sets, tiebreaks_played) = match &final_state.score {
        ScoreState::TennisPadel(score) => {
            for team in TeamId::BOTH {
                games_won.add(team, score.total_games(team));
                sets_won.add(team, score.sets_won(team, config));
            }
            for event in timeline {
                if let Some(team) = event.team {
                    points_won.add(team, 1);
                }
            }

            if config.super_tiebreak_only {
                // The deciding tiebreak is one set, and one game, to the winner
                if let Some(team) = score.match_winner {
                    games_won.add(team, 1);
                    sets_won.add(team, 1);
                }
                (vec![SetScore::new(score.tiebreak_a, score.tiebreak_b)], 1)
            } else {
                let played = score.played_sets().to_vec();
                let target = config.set_target();
                let tiebreaks = played
                    .iter()
                    .filter(|set| set.is_tiebreak_result(target))
                    .count() as u32;
                (played, tiebreaks)
            }
        }
        ScoreState::Badminton(score) => {
            let rules = &config.badminton;
            for team in TeamId::BOTH {
                let won = score.games_won(team, rules);
                games_won.add(team, won);
                sets_won.add(team, won);
            }
            let games = score.played_games();
            for game in games {
                points_won.add(TeamId::A, game.points_a);
                points_won.add(TeamId::B, game.points_b);
            }
            let sets = games
                .iter()
                .map(|g| SetScore::new(g.points_a, g.points_b))
                .collect();
            (sets, 0)
        }
    };

    MatchSummary {
        sport: config.sport,
        format: config.format,
        score_line: format_score_line(&sets),
        sets,
        winner,
        winner_name,
        started_at: final_state.started_at,
        ended_at,
        duration_secs,
        games_won,
        sets_won,
        points_won,
        tiebreaks_played,
    }
}

/// Join scores as "6–4, 3–6, 6–3".
pub fn format_score_line(sets: &[SetScore]) -> String {
    sets.iter()
        .map(|set| format!("{}–{}", set.games_a, set.games_b))
        .collect::<Vec<_>>()
        .join(", ")
}
