//! Owns every live enemy and drives them through the tick
//!
//! Agents only read shared world state and mutate themselves, so their
//! ticks are computed in parallel. Side effects that touch anything outside
//! an agent (projectile spawns, help calls to allies) are applied afterwards
//! in agent-id order, which keeps a seeded run reproducible.

use hashbrown::HashMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{AiConfig, ConfigError};
use crate::game::agent::{Agent, AgentEvent, AgentId, AgentSnapshot, HitOutcome, Pose, TickOutput};
use crate::game::spatial::SpatialGrid;
use crate::game::world::{Clock, ProjectileSpawner, SceneQuery, SimClock, TickContext, World};
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
    #[error("no spawn points provided")]
    NoSpawnPoints,
    #[error("enemy limit of {0} reached")]
    CapacityReached(usize),
    #[error("invalid AI config: {0}")]
    Config(#[from] ConfigError),
}

/// What happened during one manager tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub now: f64,
    pub shots: usize,
    pub misses: usize,
    pub transitions: usize,
    /// Allies that received a help call
    pub help_deliveries: usize,
    /// All agent events in agent-id order
    pub events: Vec<(AgentId, AgentEvent)>,
}

pub struct EnemyManager {
    agents: HashMap<AgentId, Agent>,
    config: AiConfig,
    max_enemies: usize,
    rng: ChaCha8Rng,
    grid: SpatialGrid,
    clock: SimClock,
}

impl EnemyManager {
    /// Validates `config` once; agents never re-check it per tick
    pub fn new(config: AiConfig, max_enemies: usize, seed: u64) -> Result<Self, ManagerError> {
        config.validate()?;
        let grid = SpatialGrid::new(config.fsm.help_radius.max(1.0));
        Ok(Self {
            agents: HashMap::with_capacity(max_enemies),
            config,
            max_enemies,
            rng: ChaCha8Rng::seed_from_u64(seed),
            grid,
            clock: SimClock::new(),
        })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.values().filter(|a| a.is_alive()).count()
    }

    pub fn max_enemies(&self) -> usize {
        self.max_enemies
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Agent ids in ascending order
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Spawn one agent in Roaming at `pose`
    pub fn spawn(&mut self, pose: Pose) -> Result<AgentId, ManagerError> {
        if self.agents.len() >= self.max_enemies {
            return Err(ManagerError::CapacityReached(self.max_enemies));
        }

        // Ids and agent seeds come from the manager RNG so a seeded run is repeatable
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let seed: u64 = self.rng.gen();
        self.agents
            .insert(id, Agent::with_seed(id, pose, &self.config, seed)?);

        tracing::debug!(agent = %id, x = pose.position.x, y = pose.position.y, "enemy spawned");
        Ok(id)
    }

    /// Spawn on a random subset of `points`, up to the remaining capacity
    pub fn spawn_at_points(&mut self, points: &[Pose]) -> Result<Vec<AgentId>, ManagerError> {
        if points.is_empty() {
            return Err(ManagerError::NoSpawnPoints);
        }
        let free = self.max_enemies.saturating_sub(self.agents.len());
        if free == 0 {
            return Err(ManagerError::CapacityReached(self.max_enemies));
        }

        let mut shuffled = points.to_vec();
        shuffled.shuffle(&mut self.rng);
        shuffled
            .into_iter()
            .take(free)
            .map(|pose| self.spawn(pose))
            .collect()
    }

    pub fn despawn(&mut self, id: AgentId) -> Result<Agent, ManagerError> {
        self.agents
            .remove(&id)
            .ok_or(ManagerError::UnknownAgent(id))
    }

    /// Remove dead agents and return their ids
    pub fn despawn_dead(&mut self) -> Vec<AgentId> {
        let mut dead: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|(_, agent)| !agent.is_alive())
            .map(|(id, _)| *id)
            .collect();
        dead.sort_unstable();
        for id in &dead {
            self.agents.remove(id);
        }
        dead
    }

    /// Advance the clock by `dt` and tick every agent.
    ///
    /// Agent ticks never fail; a bad tick is absorbed inside the agent.
    pub fn tick(
        &mut self,
        scene: &dyn SceneQuery,
        world: &dyn World,
        dt: f32,
        spawner: &mut dyn ProjectileSpawner,
    ) -> TickReport {
        self.clock.advance(dt);
        let ctx = TickContext::new(scene, world, &self.clock);

        // Compute agent ticks in parallel
        #[cfg(feature = "parallel")]
        let mut outputs: Vec<(AgentId, TickOutput)> = self
            .agents
            .par_iter_mut()
            .map(|(id, agent)| (*id, agent.tick(&ctx)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut outputs: Vec<(AgentId, TickOutput)> = self
            .agents
            .iter_mut()
            .map(|(id, agent)| (*id, agent.tick(&ctx)))
            .collect();

        outputs.sort_unstable_by_key(|(id, _)| *id);

        // Apply side effects (sequential, in agent-id order)
        let mut report = TickReport {
            now: ctx.now,
            ..TickReport::default()
        };
        let mut help_calls: Vec<(AgentId, Vec2)> = Vec::new();

        for (id, output) in outputs {
            if let Some(request) = &output.fire {
                spawner.spawn(request);
                report.shots += 1;
            }
            for event in output.events {
                match &event {
                    AgentEvent::StateChanged { .. } => report.transitions += 1,
                    AgentEvent::CalledForHelp { target_position } => {
                        help_calls.push((id, *target_position))
                    }
                    AgentEvent::ShotMissed => report.misses += 1,
                }
                report.events.push((id, event));
            }
        }

        if !help_calls.is_empty() {
            report.help_deliveries = self.deliver_help_calls(&help_calls, ctx.now);
        }

        report
    }

    fn deliver_help_calls(&mut self, calls: &[(AgentId, Vec2)], now: f64) -> usize {
        self.grid.rebuild(
            self.agents
                .iter()
                .filter(|(_, agent)| agent.is_alive())
                .map(|(id, agent)| (*id, agent.pose().position)),
        );

        let radius = self.config.fsm.help_radius;
        let mut delivered = 0;

        for (caller, target_position) in calls {
            let Some(origin) = self.agents.get(caller).map(|a| a.pose().position) else {
                continue;
            };

            let mut allies: Vec<AgentId> = self
                .grid
                .query_radius(origin, radius)
                .map(|entry| entry.id)
                .filter(|id| id != caller)
                .collect();
            allies.sort_unstable();

            for ally in allies {
                if let Some(agent) = self.agents.get_mut(&ally) {
                    agent.receive_help_call(*target_position, now);
                    delivered += 1;
                }
            }
            tracing::debug!(agent = %caller, delivered, "called for help");
        }

        delivered
    }

    /// Route a projectile hit to an agent
    pub fn on_hit(
        &mut self,
        id: AgentId,
        damage: f32,
        source: Option<Vec2>,
    ) -> Result<HitOutcome, ManagerError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(ManagerError::UnknownAgent(id))?;
        Ok(agent.on_hit(damage, source))
    }

    pub fn force_reset(&mut self, id: AgentId) -> Result<Option<AgentEvent>, ManagerError> {
        let now = self.clock.now();
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(ManagerError::UnknownAgent(id))?;
        Ok(agent.force_reset(now))
    }

    pub fn snapshot(&self, id: AgentId) -> Result<AgentSnapshot, ManagerError> {
        self.agents
            .get(&id)
            .map(Agent::snapshot)
            .ok_or(ManagerError::UnknownAgent(id))
    }

    /// Snapshots of every agent in agent-id order
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        let mut snapshots: Vec<AgentSnapshot> = self.agents.values().map(Agent::snapshot).collect();
        snapshots.sort_unstable_by_key(|s| s.id);
        snapshots
    }
}
