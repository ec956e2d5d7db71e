//! Rally Score Demo
//!
//! Plays a seeded match point by point, logs the timeline and pressure
//! moments, verifies the final state hash by replay and persists the
//! result.

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rally_score::{
    VERSION,
    config::AppConfig,
    core::{rng::{derive_match_seed, DeterministicRng}, team::{PlayerRef, Team, TeamId}},
    engine::{events::EventType, point::apply_points, state::create_match_at},
    session::{MatchSession, PointOutcome},
    store::{FileKv, KeyValueStore, MatchRepository, MemoryKv},
    MatchFormat,
};

/// Percent chance the serving side wins a rally.
const SERVER_WIN_PERCENT: u32 = 62;

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid RALLY_* configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    info!("Rally Score v{}", VERSION);
    info!(
        "Sport: {:?}, Format: {:?}",
        config.sport, config.format
    );

    match &config.store_dir {
        Some(dir) => {
            info!("Store: {}", dir.display());
            let kv = FileKv::open(dir)
                .with_context(|| format!("cannot open store at {}", dir.display()))?;
            demo_match(&config, MatchRepository::new(kv))
        }
        None => {
            info!("Store: in-memory");
            demo_match(&config, MatchRepository::new(MemoryKv::new()))
        }
    }
}

fn teams(format: MatchFormat) -> (Team, Team) {
    match format {
        MatchFormat::Singles => (
            Team::singles(TeamId::A, PlayerRef::new("p1", "Ana")),
            Team::singles(TeamId::B, PlayerRef::new("p2", "Bo")),
        ),
        MatchFormat::Doubles => (
            Team::doubles(TeamId::A, PlayerRef::new("p1", "Ana"), PlayerRef::new("p3", "Cy")),
            Team::doubles(TeamId::B, PlayerRef::new("p2", "Bo"), PlayerRef::new("p4", "Di")),
        ),
    }
}

/// Demo function to exercise the engine end to end.
fn demo_match<K: KeyValueStore>(config: &AppConfig, mut repo: MatchRepository<K>) -> Result<()> {
    info!("=== Starting Demo Match ===");

    let (team_a, team_b) = teams(config.format);
    let mut session = MatchSession::new(config.match_input(), team_a, team_b);
    let seed = config
        .seed
        .unwrap_or_else(|| derive_match_seed(session.id()));
    let mut rng = DeterministicRng::new(seed);
    let mut points: Vec<TeamId> = Vec::new();
    let mut last_pressure = None;

    info!("Match ID: {}", session.id());
    info!("RNG Seed: {}{}", seed, if config.seed.is_some() { "" } else { " (from match id)" });

    while !session.state().is_ended() {
        let serving = session.server().team;
        let winner = rng.rally_winner(serving, SERVER_WIN_PERCENT);
        points.push(winner);

        let PointOutcome::Applied { event, pressure } = session.point_won_by(winner) else {
            break;
        };

        if let Some(event) = event {
            if event.event_type != EventType::Point {
                info!("[{:?}] {}", event.event_type, event.label);
            }
        }
        if pressure != last_pressure {
            if let Some(p) = pressure {
                let name = session.state().team(p.team).display_name();
                info!("{:?} for {}", p.kind, name);
            }
            last_pressure = pressure;
        }
    }

    // Print final results
    info!("=== Match Results ===");
    let summary = session
        .summary()
        .cloned()
        .ok_or_else(|| anyhow!("match finished without a summary"))?;
    info!("Score: {}", summary.score_line);
    if let Some(name) = &summary.winner_name {
        info!("Winner: {}", name);
    }
    info!(
        "Points won: {}-{}, Games won: {}-{}, Tiebreaks: {}",
        summary.points_won.a,
        summary.points_won.b,
        summary.games_won.a,
        summary.games_won.b,
        summary.tiebreaks_played
    );
    info!("Total points: {}, Timeline events: {}", points.len(), session.timeline().len());

    let hash = session.state().compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let initial = session
        .undo_stack()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("no points were played"))?;
    let replay = create_match_at(
        initial.config.clone(),
        initial.teams[0].clone(),
        initial.teams[1].clone(),
        initial.started_at,
    );
    let replay_hash = apply_points(&replay, &points).compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    // Correct the final point and re-score it
    session.undo()?;
    info!("Undo: match decided = {}", session.state().is_ended());
    if let Some(team) = points.last() {
        session.point_won_by(*team);
    }

    // Persist
    repo.save_current(&session)?;
    repo.record_finished(&session)?;
    let restored = repo
        .load_current()?
        .ok_or_else(|| anyhow!("current match slot is empty after save"))?;
    info!(
        "Persisted match {} ({} history entries), restored hash {}",
        restored.id(),
        repo.history()?.len(),
        hex::encode(restored.state().compute_hash())
    );

    Ok(())
}
