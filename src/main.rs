use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use stealth_ai::config::{AiConfig, SimConfig};
use stealth_ai::game::agent::{HitOutcome, Pose};
use stealth_ai::game::arena::{Arena, SimTarget};
use stealth_ai::game::constants::sim::{
    PLAYER_DAMAGE, PLAYER_FIRE_INTERVAL, PLAYER_FIRE_RANGE, SPAWN_POINT_COUNT, SPAWN_RING_RADIUS,
    SUMMARY_INTERVAL,
};
use stealth_ai::game::manager::{EnemyManager, ManagerError};
use stealth_ai::game::systems::combat::FireRequest;
use stealth_ai::game::systems::fsm::BehaviorState;
use stealth_ai::game::world::{ColliderId, LayerMask, SceneQuery};
use stealth_ai::metrics::{self, SimMetrics};
use stealth_ai::util::vec2::Vec2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Stealth AI simulation v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let sim = SimConfig::load_or_default();
    sim.validate()?;
    let ai = AiConfig::load_or_default();
    ai.validate()?;
    info!(
        "Configuration loaded: tick_rate={}, enemies={}, seed={}",
        sim.tick_rate, sim.enemy_count, sim.seed
    );

    let metrics = Arc::new(SimMetrics::new());
    if let Some(port) = sim.metrics_port {
        let metrics_clone = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics::start_metrics_server(metrics_clone, port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let mut arena = Arena::demo();
    let mut target = SimTarget::demo();
    let spawn_points = spawn_ring();

    let mut manager = EnemyManager::new(ai, sim.enemy_count, sim.seed)?;
    let spawned = manager.spawn_at_points(&spawn_points)?;
    info!("Spawned {} enemies", spawned.len());

    let dt = sim.dt();
    let mut interval = tokio::time::interval(Duration::from_secs_f32(dt));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut projectiles: Vec<FireRequest> = Vec::new();
    let mut player_hits = 0u64;
    let mut next_player_shot = PLAYER_FIRE_INTERVAL;
    let mut next_summary = SUMMARY_INTERVAL;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
        }

        target.step(dt);
        arena.track(&target);

        let started = Instant::now();
        projectiles.clear();
        let report = manager.tick(&arena, &target, dt, &mut projectiles);
        metrics.record_tick_time(started.elapsed());
        metrics.record_report(&report);

        player_hits += resolve_projectiles(&arena, &projectiles);

        let now = manager.now();
        if now >= next_player_shot {
            next_player_shot += PLAYER_FIRE_INTERVAL;
            return_fire(&mut manager, &arena, &target, &metrics);
        }

        for id in manager.despawn_dead() {
            debug!(agent = %id, "removed dead enemy");
        }
        if manager.len() < sim.enemy_count {
            match manager.spawn_at_points(&spawn_points) {
                Ok(ids) => debug!("Respawned {} enemies", ids.len()),
                Err(ManagerError::CapacityReached(_)) => {}
                Err(e) => warn!("Respawn failed: {}", e),
            }
        }

        let snapshots = manager.snapshots();
        metrics.record_agents(&snapshots);

        if now >= next_summary {
            next_summary += SUMMARY_INTERVAL;
            let in_state = |state: BehaviorState| snapshots.iter().filter(|s| s.state == state).count();
            info!(
                sim_time = now,
                roaming = in_state(BehaviorState::Roaming),
                aware = in_state(BehaviorState::Aware),
                combat = in_state(BehaviorState::Combat),
                player_hits,
                "simulation summary"
            );
            if let Ok(json) = serde_json::to_string(&snapshots) {
                debug!("snapshots: {}", json);
            }
        }

        if sim.duration_secs.is_some_and(|limit| now >= f64::from(limit)) {
            info!("Simulated duration reached");
            break;
        }
    }

    info!(
        "Simulation stopped after {:.1}s: {} enemy shots, {} landed on the player",
        manager.now(),
        metrics.shots_total.load(std::sync::atomic::Ordering::Relaxed),
        player_hits
    );

    Ok(())
}

/// Spawn points on a ring around the arena centre, facing along the ring
fn spawn_ring() -> Vec<Pose> {
    (0..SPAWN_POINT_COUNT)
        .map(|i| {
            let angle = i as f32 * 360.0 / SPAWN_POINT_COUNT as f32;
            Pose::new(Vec2::from_heading(angle) * SPAWN_RING_RADIUS, angle + 90.0)
        })
        .collect()
}

/// Count enemy projectiles whose path reaches the player before a wall
fn resolve_projectiles(arena: &Arena, projectiles: &[FireRequest]) -> u64 {
    projectiles
        .iter()
        .filter(|shot| {
            arena
                .raycast(
                    shot.origin,
                    shot.direction,
                    shot.range,
                    LayerMask::OBSTACLE | LayerMask::TARGET,
                )
                .is_some_and(|hit| hit.collider == ColliderId::Target)
        })
        .count() as u64
}

/// The simulated player shoots the nearest enemy it has a clear line to
fn return_fire(manager: &mut EnemyManager, arena: &Arena, target: &SimTarget, metrics: &SimMetrics) {
    let origin = target.position();
    let victim = manager
        .snapshots()
        .into_iter()
        .filter(|s| s.alive)
        .map(|s| (s.id, s.position.distance_to(origin), s.position))
        .filter(|(_, distance, _)| *distance <= PLAYER_FIRE_RANGE)
        .filter(|(_, distance, position)| {
            let direction = (*position - origin).normalize();
            arena
                .raycast(origin, direction, *distance, LayerMask::OBSTACLE)
                .is_none()
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let Some((id, _, _)) = victim else {
        return;
    };

    match manager.on_hit(id, PLAYER_DAMAGE, Some(origin)) {
        Ok(HitOutcome::Died { .. }) => {
            metrics.record_hit(true);
            info!(agent = %id, "player killed an enemy");
        }
        Ok(HitOutcome::Damaged { applied, .. }) => {
            metrics.record_hit(false);
            debug!(agent = %id, applied, "player hit an enemy");
        }
        Ok(HitOutcome::Ignored) => {}
        Err(e) => warn!("Return fire failed: {}", e),
    }
}
