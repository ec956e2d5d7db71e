//! Point Application
//!
//! The scoring state machine. [`point_won_by`] takes a snapshot and the
//! side that won the rally and returns the next snapshot. It never mutates
//! its input and never fails: a point applied to a finished match returns
//! an unchanged copy.

use crate::core::team::TeamId;
use crate::engine::config::{BadmintonRules, MatchConfig};
use crate::engine::rotation::tiebreak_server_index;
use crate::engine::state::{
    BadmintonScore, GameScore, MatchState, RotationState, ScoreState, ServerState, SetScore,
    TennisScore,
};

/// Points needed to take a standard game (with a two point lead).
pub const POINTS_TO_WIN_GAME: u32 = 4;

/// In-game point count representing 40 (deuce when level).
pub const DEUCE: u32 = 3;

/// Apply one point won by `team` and return the resulting state.
///
/// # Determinism
///
/// Pure function of its inputs: no clock, no randomness, no shared state.
/// Safe to call speculatively (the pressure detector relies on this).
pub fn point_won_by(state: &MatchState, team: TeamId) -> MatchState {
    let mut next = state.clone();
    if state.is_ended() {
        return next;
    }

    let config = &state.config;
    match (&mut next.score, &mut next.server) {
        (ScoreState::TennisPadel(score), ServerState::Rotation(rotation)) => {
            if score.in_tiebreak {
                tiebreak_point(score, rotation, config, team);
            } else {
                game_point(score, rotation, config, team);
            }
        }
        (ScoreState::Badminton(score), ServerState::Badminton { serving }) => {
            rally_point(score, serving, &config.badminton, team);
        }
        // create_match never pairs a score with the other sport's server state
        _ => return state.clone(),
    }

    next
}

/// Apply a sequence of points in order.
///
/// Points after the match is decided are absorbed.
pub fn apply_points(initial: &MatchState, points: &[TeamId]) -> MatchState {
    points
        .iter()
        .fold(initial.clone(), |state, team| point_won_by(&state, *team))
}

// =============================================================================
// TENNIS / PADEL
// =============================================================================

/// A point in a regular game.
fn game_point(
    score: &mut TennisScore,
    rotation: &mut RotationState,
    config: &MatchConfig,
    team: TeamId,
) {
    match team {
        TeamId::A => score.points_a += 1,
        TeamId::B => score.points_b += 1,
    }

    // Advantage lost: back to deuce.
    if score.points_a == score.points_b && score.points_a > DEUCE {
        score.points_a = DEUCE;
        score.points_b = DEUCE;
    }

    let won = score.points(team);
    let lost = score.points(team.other());
    if won < POINTS_TO_WIN_GAME || won < lost + 2 {
        return;
    }

    score.points_a = 0;
    score.points_b = 0;
    current_set_mut(score).add_game(team);
    advance(rotation);
    after_game(score, rotation, config, team);
}

/// A point inside a tiebreak.
fn tiebreak_point(
    score: &mut TennisScore,
    rotation: &mut RotationState,
    config: &MatchConfig,
    team: TeamId,
) {
    match team {
        TeamId::A => score.tiebreak_a += 1,
        TeamId::B => score.tiebreak_b += 1,
    }

    let start = rotation.tiebreak_start_index.unwrap_or(rotation.index);
    let won = score.tiebreak_points(team);
    let lost = score.tiebreak_points(team.other());

    if won < config.tiebreak.target || won < lost + 2 {
        let next_point = score.tiebreak_a + score.tiebreak_b + 1;
        rotation.index = tiebreak_server_index(start, next_point, rotation.order.len());
        return;
    }

    if config.super_tiebreak_only {
        // The tiebreak is the match; the final tiebreak score stays on record.
        score.match_winner = Some(team);
        return;
    }

    score.in_tiebreak = false;
    score.tiebreak_a = 0;
    score.tiebreak_b = 0;
    current_set_mut(score).add_game(team);

    // Next set opens with whoever follows the tiebreak's first server.
    rotation.index = wrap(start + 1, rotation.order.len());
    rotation.tiebreak_start_index = None;

    after_game(score, rotation, config, team);
}

/// Set and match bookkeeping after a game has been awarded.
fn after_game(
    score: &mut TennisScore,
    rotation: &mut RotationState,
    config: &MatchConfig,
    team: TeamId,
) {
    let set = score.current();
    let target = config.set_target();

    if set.winner(target, &config.tiebreak) == Some(team) {
        complete_set(score, config, team);
        return;
    }

    if config.tiebreak.enabled && set.games_a == target && set.games_b == target {
        score.in_tiebreak = true;
        score.tiebreak_a = 0;
        score.tiebreak_b = 0;
        rotation.tiebreak_start_index = Some(rotation.index);
    }
}

/// Close the current set: either end the match or open a new set.
fn complete_set(score: &mut TennisScore, config: &MatchConfig, team: TeamId) {
    if score.sets_won(team, config) >= config.sets_to_win() {
        score.match_winner = Some(team);
        return;
    }

    score.sets.truncate(score.current_set + 1);
    score.sets.push(SetScore::default());
    score.current_set = score.sets.len() - 1;
    score.points_a = 0;
    score.points_b = 0;
    score.in_tiebreak = false;
    score.tiebreak_a = 0;
    score.tiebreak_b = 0;
}

/// Mutable access to the current set, repairing a short `sets` vector.
fn current_set_mut(score: &mut TennisScore) -> &mut SetScore {
    if score.sets.len() <= score.current_set {
        score.sets.resize(score.current_set + 1, SetScore::default());
    }
    &mut score.sets[score.current_set]
}

#[inline]
fn advance(rotation: &mut RotationState) {
    rotation.index = wrap(rotation.index + 1, rotation.order.len());
}

#[inline]
fn wrap(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index % len
    }
}

// =============================================================================
// BADMINTON
// =============================================================================

/// A rally under rally scoring: the winner scores and serves next.
fn rally_point(
    score: &mut BadmintonScore,
    serving: &mut TeamId,
    rules: &BadmintonRules,
    team: TeamId,
) {
    *serving = team;

    if score.games.len() <= score.current_game {
        score.games.resize(score.current_game + 1, GameScore::default());
    }
    let game = &mut score.games[score.current_game];
    game.add_point(team);

    if game.winner(rules) != Some(team) {
        return;
    }

    if score.games_won(team, rules) >= rules.games_to_win {
        score.match_winner = Some(team);
        return;
    }

    score.games.truncate(score.current_game + 1);
    score.games.push(GameScore::default());
    score.current_game = score.games.len() - 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::core::team::{PlayerRef, Team};
    use crate::engine::config::{resolve_config, MatchConfigInput, MatchFormat, Sport};
    use crate::engine::rotation::get_server;
    use crate::engine::state::create_match;

    use TeamId::{A, B};

    fn new_match(input: MatchConfigInput) -> MatchState {
        let config = resolve_config(input);
        let (a, b) = if config.format == MatchFormat::Doubles {
            (
                Team::doubles(A, PlayerRef::new("a1", "Ana"), PlayerRef::new("a2", "Abe")),
                Team::doubles(B, PlayerRef::new("b1", "Bo"), PlayerRef::new("b2", "Bea")),
            )
        } else {
            (
                Team::singles(A, PlayerRef::new("a", "Ana")),
                Team::singles(B, PlayerRef::new("b", "Bo")),
            )
        };
        create_match(config, a, b)
    }

    fn tennis() -> MatchState {
        new_match(MatchConfigInput::default())
    }

    fn badminton() -> MatchState {
        new_match(MatchConfigInput {
            sport: Some(Sport::Badminton),
            ..Default::default()
        })
    }

    fn score(state: &MatchState) -> &TennisScore {
        state.score.as_tennis().unwrap()
    }

    fn rotation(state: &MatchState) -> &RotationState {
        match &state.server {
            ServerState::Rotation(rotation) => rotation,
            ServerState::Badminton { .. } => panic!("expected rotation"),
        }
    }

    fn game(team: TeamId) -> Vec<TeamId> {
        vec![team; 4]
    }

    /// Alternate held games until the set reaches `games`-all.
    fn games_all(games: u32) -> Vec<TeamId> {
        let mut points = Vec::new();
        for _ in 0..games {
            points.extend(game(A));
            points.extend(game(B));
        }
        points
    }

    fn set_for(team: TeamId) -> Vec<TeamId> {
        (0..6).flat_map(|_| game(team)).collect()
    }

    #[test]
    fn test_love_game() {
        let state = apply_points(&tennis(), &game(A));
        let s = score(&state);

        assert_eq!(s.sets[0], SetScore::new(1, 0));
        assert_eq!((s.points_a, s.points_b), (0, 0));
        assert_eq!(rotation(&state).index, 1);
    }

    #[test]
    fn test_deuce_advantage_returns_to_deuce() {
        let deuce = apply_points(&tennis(), &[A, A, A, B, B, B]);
        assert_eq!((score(&deuce).points_a, score(&deuce).points_b), (3, 3));

        let advantage = point_won_by(&deuce, A);
        assert_eq!((score(&advantage).points_a, score(&advantage).points_b), (4, 3));

        let back = point_won_by(&advantage, B);
        let s = score(&back);
        assert_eq!(s.sets[0], SetScore::new(0, 0));
        assert_eq!((s.points_a, s.points_b), (3, 3));
    }

    #[test]
    fn test_game_from_advantage() {
        let state = apply_points(&tennis(), &[A, A, A, B, B, B, A, B, B, B]);
        assert_eq!(score(&state).sets[0], SetScore::new(0, 1));
        assert_eq!((score(&state).points_a, score(&state).points_b), (0, 0));
    }

    #[test]
    fn test_set_won_six_four() {
        let mut points = games_all(4);
        points.extend(game(A));
        points.extend(game(A));
        let state = apply_points(&tennis(), &points);
        let s = score(&state);

        assert_eq!(s.sets, vec![SetScore::new(6, 4), SetScore::new(0, 0)]);
        assert_eq!(s.current_set, 1);
        assert!(s.match_winner.is_none());
    }

    #[test]
    fn test_seven_five_without_tiebreak() {
        let mut points = games_all(5);
        points.extend(game(A));
        points.extend(game(A));
        let state = apply_points(&tennis(), &points);
        assert_eq!(score(&state).sets[0], SetScore::new(7, 5));
        assert_eq!(score(&state).current_set, 1);
    }

    #[test]
    fn test_six_all_enters_tiebreak() {
        let state = apply_points(&tennis(), &games_all(6));
        let s = score(&state);

        assert!(s.in_tiebreak);
        assert_eq!(s.sets[0], SetScore::new(6, 6));
        // 12 games played: rotation back at index 0, which serves first
        assert_eq!(rotation(&state).tiebreak_start_index, Some(0));
        assert_eq!(rotation(&state).index, 0);
    }

    #[test]
    fn test_tiebreak_seven_five_wins_set() {
        let mut points = games_all(6);
        points.extend([A, B, A, B, A, B, A, B, A, B]); // 5-5
        points.extend([A, A]); // 7-5
        let state = apply_points(&tennis(), &points);
        let s = score(&state);

        assert_eq!(s.sets[0], SetScore::new(7, 6));
        assert_eq!(s.current_set, 1);
        assert!(!s.in_tiebreak);
        assert_eq!((s.tiebreak_a, s.tiebreak_b), (0, 0));
        // Tiebreak opened at index 0, so the next set starts with index 1
        assert_eq!(rotation(&state).index, 1);
        assert_eq!(rotation(&state).tiebreak_start_index, None);
    }

    #[test]
    fn test_doubles_set_after_odd_tiebreak_opens_after_first_tiebreak_server() {
        let doubles = new_match(MatchConfigInput {
            format: Some(MatchFormat::Doubles),
            best_of: Some(5),
            ..Default::default()
        });

        // Set 1: 6-6, tiebreak 7-0 from index 0
        let mut points = games_all(6);
        points.extend([A; 7]);
        let state = apply_points(&doubles, &points);
        assert_eq!(score(&state).sets[0], SetScore::new(7, 6));
        assert_eq!(rotation(&state).index, 1);

        // Set 2: twelve games from index 1, so the tiebreak opens at 1
        let state = apply_points(&state, &games_all(6));
        assert_eq!(rotation(&state).tiebreak_start_index, Some(1));

        // Seven points: the last one is served by index 0, yet set 3 opens at 2
        let before_last = apply_points(&state, &[A; 6]);
        assert_eq!(rotation(&before_last).index, 0);
        let state = point_won_by(&before_last, A);

        let s = score(&state);
        assert_eq!(s.sets[1], SetScore::new(7, 6));
        assert_eq!(s.current_set, 2);
        assert!(s.match_winner.is_none());
        assert_eq!(rotation(&state).index, 2);
        assert_eq!(get_server(&state).player_user_id.as_deref(), Some("a2"));
    }

    #[test]
    fn test_tiebreak_needs_two_point_lead() {
        let mut points = games_all(6);
        points.extend([A, B, A, B, A, B, A, B, A, B, A, B]); // 6-6
        points.push(A); // 7-6
        let state = apply_points(&tennis(), &points);
        assert!(score(&state).in_tiebreak);
        assert_eq!((score(&state).tiebreak_a, score(&state).tiebreak_b), (7, 6));

        let state = point_won_by(&state, A);
        assert!(!score(&state).in_tiebreak);
        assert_eq!(score(&state).sets[0], SetScore::new(7, 6));
    }

    #[test]
    fn test_tiebreak_serve_alternates_every_two_points() {
        let start = apply_points(&tennis(), &games_all(6));
        let mut state = start.clone();
        let mut servers = vec![get_server(&state).team];
        for _ in 0..5 {
            state = point_won_by(&state, A);
            servers.push(get_server(&state).team);
        }
        assert_eq!(servers, vec![A, B, B, A, A, B]);
    }

    #[test]
    fn test_advantage_set_when_tiebreak_disabled() {
        let state = apply_points(
            &new_match(MatchConfigInput {
                tiebreak_enabled: Some(false),
                ..Default::default()
            }),
            &games_all(6),
        );
        assert!(!score(&state).in_tiebreak);

        let state = apply_points(&state, &game(A));
        assert_eq!(score(&state).sets[0], SetScore::new(7, 6));
        assert_eq!(score(&state).current_set, 0);

        let state = apply_points(&state, &game(A));
        assert_eq!(score(&state).sets[0], SetScore::new(8, 6));
        assert_eq!(score(&state).current_set, 1);
    }

    #[test]
    fn test_short_sets() {
        let state = new_match(MatchConfigInput {
            short_set_to: Some(4),
            ..Default::default()
        });
        let state = apply_points(&state, &games_all(4));
        assert!(score(&state).in_tiebreak);

        let state = apply_points(&state, &[B; 7]);
        assert_eq!(score(&state).sets[0], SetScore::new(4, 5));
        assert_eq!(score(&state).current_set, 1);
    }

    #[test]
    fn test_straight_sets_match() {
        let mut points = set_for(B);
        points.extend(set_for(B));
        let state = apply_points(&tennis(), &points);
        let s = score(&state);

        assert_eq!(s.match_winner, Some(B));
        assert_eq!(s.sets, vec![SetScore::new(0, 6), SetScore::new(0, 6)]);
    }

    #[test]
    fn test_three_set_match() {
        let mut points = set_for(A);
        points.extend(set_for(B));
        points.extend(set_for(A));
        let state = apply_points(&tennis(), &points);
        assert_eq!(score(&state).match_winner, Some(A));
        assert_eq!(score(&state).sets.len(), 3);
    }

    #[test]
    fn test_super_tiebreak_only() {
        let state = new_match(MatchConfigInput {
            super_tiebreak_only: Some(true),
            ..Default::default()
        });
        let state = apply_points(&state, &[A; 9]);
        assert!(score(&state).match_winner.is_none());

        let state = point_won_by(&state, A);
        let s = score(&state);
        assert_eq!(s.match_winner, Some(A));
        assert_eq!((s.tiebreak_a, s.tiebreak_b), (10, 0));
        // No game recorded for the super tiebreak
        assert_eq!(s.sets, vec![SetScore::new(0, 0)]);
    }

    #[test]
    fn test_terminal_state_is_unchanged() {
        let mut points = set_for(A);
        points.extend(set_for(A));
        let finished = apply_points(&tennis(), &points);
        assert!(finished.is_ended());

        assert_eq!(point_won_by(&finished, B), finished);
        assert_eq!(point_won_by(&finished, A), finished);
    }

    #[test]
    fn test_input_state_not_mutated() {
        let before = apply_points(&tennis(), &[A, A, A]);
        let snapshot = before.clone();
        let _ = point_won_by(&before, A);
        assert_eq!(before, snapshot);
    }

    #[test]
    fn test_badminton_win_by_two() {
        let mut points = Vec::new();
        for _ in 0..20 {
            points.push(A);
            points.push(B);
        }
        let twenty_all = apply_points(&badminton(), &points);
        let b = twenty_all.score.as_badminton().unwrap();
        assert_eq!(b.current(), GameScore::new(20, 20));

        let one_up = point_won_by(&twenty_all, A);
        let b = one_up.score.as_badminton().unwrap();
        assert_eq!(b.current_game, 0);
        assert_eq!(b.current(), GameScore::new(21, 20));

        let two_up = point_won_by(&one_up, A);
        let b = two_up.score.as_badminton().unwrap();
        assert_eq!(b.games[0], GameScore::new(22, 20));
        assert_eq!(b.current_game, 1);
        assert_eq!(b.current(), GameScore::new(0, 0));
    }

    #[test]
    fn test_badminton_cap_overrides_lead() {
        let mut points = Vec::new();
        for _ in 0..29 {
            points.push(A);
            points.push(B);
        }
        let all_29 = apply_points(&badminton(), &points);
        assert_eq!(all_29.score.as_badminton().unwrap().current(), GameScore::new(29, 29));

        let capped = point_won_by(&all_29, B);
        let b = capped.score.as_badminton().unwrap();
        assert_eq!(b.games[0], GameScore::new(29, 30));
        assert_eq!(b.current_game, 1);

        // 30-28 via a 29-28 lead also ends the game
        let mut points = Vec::new();
        for _ in 0..28 {
            points.push(A);
            points.push(B);
        }
        points.push(A);
        let state = apply_points(&badminton(), &points);
        let state = point_won_by(&state, A);
        assert_eq!(state.score.as_badminton().unwrap().games[0], GameScore::new(30, 28));
    }

    #[test]
    fn test_badminton_match_in_two_games() {
        let state = apply_points(&badminton(), &[B; 42]);
        let b = state.score.as_badminton().unwrap();
        assert_eq!(b.match_winner, Some(B));
        assert_eq!(b.games, vec![GameScore::new(0, 21), GameScore::new(0, 21)]);
        assert_eq!(state.server, ServerState::Badminton { serving: B });
    }

    #[test]
    fn test_badminton_deciding_game() {
        let mut points = vec![A; 21];
        points.extend(vec![B; 21]);
        points.extend(vec![A; 21]);
        let state = apply_points(&badminton(), &points);
        let b = state.score.as_badminton().unwrap();
        assert_eq!(b.match_winner, Some(A));
        assert_eq!(b.games.len(), 3);
    }

    #[test]
    fn test_doubles_rotation_over_games() {
        let mut state = new_match(MatchConfigInput {
            format: Some(MatchFormat::Doubles),
            ..Default::default()
        });
        let mut seen = Vec::new();
        for _ in 0..5 {
            let server = get_server(&state);
            seen.push(server.player_user_id.unwrap());
            state = apply_points(&state, &game(server.team));
        }
        assert_eq!(seen, vec!["a1", "b1", "a2", "b2", "a1"]);
    }

    fn points_strategy() -> impl Strategy<Value = Vec<TeamId>> {
        prop::collection::vec(prop_oneof![Just(A), Just(B)], 0..400)
    }

    fn format_strategy() -> impl Strategy<Value = MatchConfigInput> {
        (
            prop_oneof![Just(MatchFormat::Singles), Just(MatchFormat::Doubles)],
            prop_oneof![Just(1u32), Just(3), Just(5)],
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(format, best_of, tiebreak, super_tb)| MatchConfigInput {
                format: Some(format),
                best_of: Some(best_of),
                tiebreak_enabled: Some(tiebreak),
                super_tiebreak_only: Some(super_tb),
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn prop_tennis_invariants(input in format_strategy(), points in points_strategy()) {
            let mut state = new_match(input);
            for team in points {
                let next = point_won_by(&state, team);
                let s = score(&next);
                let r = rotation(&next);

                prop_assert!(r.index < r.order.len());
                prop_assert!(s.points_a.max(s.points_b) <= POINTS_TO_WIN_GAME);
                if let Some(start) = r.tiebreak_start_index {
                    prop_assert!(start < r.order.len());
                }
                // Exactly one of normal game / tiebreak is live
                if s.in_tiebreak {
                    prop_assert_eq!((s.points_a, s.points_b), (0, 0));
                } else {
                    prop_assert_eq!((s.tiebreak_a, s.tiebreak_b), (0, 0));
                }
                if state.is_ended() {
                    prop_assert_eq!(&next, &state);
                }
                state = next;
            }
        }

        #[test]
        fn prop_badminton_games_bounded(points in points_strategy()) {
            let state = apply_points(&badminton(), &points);
            let b = state.score.as_badminton().unwrap();
            let rules = &state.config.badminton;

            prop_assert!(b.games.len() as u32 <= 2 * rules.games_to_win - 1);
            for game in b.games.iter().take(b.current_game) {
                prop_assert!(game.winner(rules).is_some());
                prop_assert!(game.points_a.max(game.points_b) <= rules.max_points_cap);
            }
        }
    }
}
