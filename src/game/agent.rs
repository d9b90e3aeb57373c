//! A single enemy: perception, tension, state machine, steering and weapon
//!
//! The agent owns every collaborator it mutates. World access goes through
//! the [`TickContext`] handed to [`Agent::tick`]; the agent never looks up
//! the target or the scene on its own.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::config::{AiConfig, ConfigError, FsmConfig};
use crate::game::systems::awareness::AwarenessState;
use crate::game::systems::combat::{CombatController, EngagementCheck, FireOutcome, FireRequest};
use crate::game::systems::fsm::{BehaviorState, StateData};
use crate::game::systems::perception::{Perception, PerceptionSample};
use crate::game::systems::stats::StatsModel;
use crate::game::systems::steering::{
    Motion, MovementCommand, SteeringController, SteeringIntent,
};
use crate::game::world::{RandomSource, TargetPose, TickContext};
use crate::util::vec2::{wrap_heading, Vec2};

pub type AgentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub position: Vec2,
    /// Degrees, counter-clockwise from +X
    pub heading: f32,
}

impl Pose {
    pub fn new(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading: wrap_heading(heading),
        }
    }
}

/// Where and when the target was last noticed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetMemory {
    pub last_known_position: Vec2,
    /// Last sighting, hearing or ally report
    pub last_detected_at: f64,
    /// Last actual sighting; `None` when the target was only heard or reported
    pub last_seen_at: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AgentEvent {
    StateChanged {
        from: BehaviorState,
        to: BehaviorState,
    },
    /// Emitted once per Combat entry; allies nearby should investigate
    CalledForHelp { target_position: Vec2 },
    /// A fire attempt whose hit roll failed
    ShotMissed,
}

/// Everything one tick produced
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub movement: MovementCommand,
    pub fire: Option<FireRequest>,
    pub events: SmallVec<[AgentEvent; 4]>,
}

impl TickOutput {
    fn idle(heading: f32) -> Self {
        Self {
            movement: MovementCommand::idle(heading),
            fire: None,
            events: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Agent already dead or the damage value was unusable
    Ignored,
    Damaged { applied: f32, fallback_for: f32 },
    /// Health reached zero on this hit
    Died { applied: f32 },
}

/// Debug view of an agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub state: BehaviorState,
    pub state_entered_at: f64,
    pub tension: f32,
    pub tension_delta: f32,
    pub health: f32,
    pub max_health: f32,
    pub fear: f32,
    pub position: Vec2,
    pub heading: f32,
    pub alive: bool,
    pub falling_back: bool,
    pub weapon_enabled: bool,
    pub memory: Option<TargetMemory>,
    pub target_in_sight: bool,
}

pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) pose: Pose,
    pub(crate) state: StateData,
    pub(crate) state_entered_at: f64,
    pub(crate) memory: Option<TargetMemory>,
    pub(crate) awareness: AwarenessState,
    pub(crate) perception: Perception,
    pub(crate) steering: SteeringController,
    pub(crate) combat: CombatController,
    pub(crate) stats: StatsModel,
    pub(crate) fsm_config: FsmConfig,
    pub(crate) rng: Box<dyn RandomSource + Send>,
    fallback_remaining: f32,
    hit_from: Option<Vec2>,
    alive: bool,
    last_sample: PerceptionSample,
}

impl Agent {
    /// New agent in Roaming with its own seeded RNG
    pub fn with_seed(
        id: AgentId,
        pose: Pose,
        config: &AiConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(id, pose, config, Box::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    /// New agent in Roaming; `config` is validated first
    pub fn new(
        id: AgentId,
        pose: Pose,
        config: &AiConfig,
        rng: Box<dyn RandomSource + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id,
            pose,
            state: StateData::Roaming {
                direction_change_in: config.fsm.direction_change_interval,
            },
            state_entered_at: 0.0,
            memory: None,
            awareness: AwarenessState::new(config.awareness.clone()),
            perception: Perception::new(config.perception.clone()),
            steering: SteeringController::new(config.steering.clone()),
            combat: CombatController::new(config.combat.clone()),
            stats: StatsModel::new(&config.stats),
            fsm_config: config.fsm.clone(),
            rng,
            fallback_remaining: 0.0,
            hit_from: None,
            alive: true,
            last_sample: PerceptionSample::none(),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn state(&self) -> BehaviorState {
        self.state.kind()
    }

    pub fn state_data(&self) -> &StateData {
        &self.state
    }

    pub fn memory(&self) -> Option<TargetMemory> {
        self.memory
    }

    pub fn awareness(&self) -> &AwarenessState {
        &self.awareness
    }

    pub fn stats(&self) -> &StatsModel {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsModel {
        &mut self.stats
    }

    pub fn combat(&self) -> &CombatController {
        &self.combat
    }

    pub fn steering(&self) -> &SteeringController {
        &self.steering
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_falling_back(&self) -> bool {
        self.fallback_remaining > 0.0
    }

    pub fn last_sample(&self) -> PerceptionSample {
        self.last_sample
    }

    pub fn weapon_enabled(&self) -> bool {
        matches!(self.state, StateData::Combat(e) if e.weapon_enabled)
    }

    /// Advance one tick: perceive, integrate tension, transition, move, shoot
    pub fn tick(&mut self, ctx: &TickContext<'_>) -> TickOutput {
        let mut out = TickOutput::idle(self.pose.heading);
        if !self.alive {
            return out;
        }

        let dt = ctx.dt;
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(agent = %self.id, dt, "invalid tick delta, skipping tick");
            return out;
        }

        let target = ctx.world.target_pose().filter(|pose| {
            let valid = pose.is_valid();
            if !valid && pose.is_alive {
                tracing::warn!(agent = %self.id, "target pose is not finite, ignoring");
            }
            valid
        });

        let loudness = ctx.world.target_loudness();
        let loudness = if loudness.is_finite() { loudness } else { 0.0 };

        let sample = match &target {
            Some(target) => self.perception.sample(
                self.pose.position,
                self.pose.heading,
                target,
                loudness,
                ctx.scene,
            ),
            None => PerceptionSample::none(),
        };

        if let Some(target) = &target {
            if sample.detected() {
                let last_seen_at = if sample.target_in_sight {
                    Some(ctx.now)
                } else {
                    self.memory.and_then(|m| m.last_seen_at)
                };
                self.memory = Some(TargetMemory {
                    last_known_position: target.position,
                    last_detected_at: ctx.now,
                    last_seen_at,
                });
            }
        }

        let falling_back = self.is_falling_back();
        if falling_back {
            self.awareness.hold();
        } else {
            self.awareness
                .update(sample.target_in_sight, sample.distance_to_target, dt);
        }

        self.evaluate_transitions(
            target.is_some(),
            sample.target_in_sight,
            ctx.now,
            &mut out.events,
        );

        out.movement = if falling_back {
            self.fallback_movement(target.as_ref(), dt)
        } else {
            self.run_state(ctx.scene, target.as_ref(), ctx.now, dt, &mut out.events)
        };
        self.fallback_remaining = (self.fallback_remaining - dt).max(0.0);

        out.fire = self.try_fire(target.as_ref(), &sample, ctx.now, &mut out.events);

        self.pose.heading = wrap_heading(out.movement.heading);
        self.pose.position += out.movement.displacement;
        self.last_sample = sample;

        out
    }

    fn try_fire(
        &mut self,
        target: Option<&TargetPose>,
        sample: &PerceptionSample,
        now: f64,
        events: &mut SmallVec<[AgentEvent; 4]>,
    ) -> Option<FireRequest> {
        let StateData::Combat(engagement) = self.state else {
            return None;
        };
        let target = target?;

        let check = EngagementCheck {
            weapon_enabled: engagement.weapon_enabled,
            target_in_sight: sample.target_in_sight,
            distance: sample.distance_to_target,
            tension_full: self.awareness.is_full(),
        };
        if !self.combat.may_engage(check, &self.stats) {
            return None;
        }

        match self.combat.try_fire(
            now,
            self.id,
            self.pose.position,
            target.position,
            &self.stats,
            &mut *self.rng,
        ) {
            FireOutcome::Fired(request) => Some(request),
            FireOutcome::Missed => {
                events.push(AgentEvent::ShotMissed);
                None
            }
            FireOutcome::NotReady => None,
        }
    }

    /// Retreat straight away from the threat at stats speed
    fn fallback_movement(&mut self, target: Option<&TargetPose>, dt: f32) -> MovementCommand {
        let threat = target
            .map(|t| t.position)
            .or(self.memory.map(|m| m.last_known_position))
            .or(self.hit_from);

        let away = threat
            .map(|p| (self.pose.position - p).normalize())
            .filter(|d| *d != Vec2::ZERO)
            .unwrap_or_else(|| -Vec2::from_heading(self.pose.heading));

        self.steering.steer(
            self.pose.heading,
            SteeringIntent {
                face: None,
                speed: self.stats.speed,
                rotation_multiplier: 1.0,
                motion: Motion::Direction(away),
            },
            dt,
        )
    }

    /// Apply a projectile hit.
    ///
    /// `source` is where the shot came from, used to pick a retreat direction
    /// when the target is not known.
    pub fn on_hit(&mut self, damage: f32, source: Option<Vec2>) -> HitOutcome {
        if !self.alive {
            return HitOutcome::Ignored;
        }
        if !damage.is_finite() {
            tracing::warn!(agent = %self.id, damage, "ignoring non-finite damage");
            return HitOutcome::Ignored;
        }

        let applied = self.stats.take_damage(damage);
        if self.stats.is_dead() {
            self.alive = false;
            self.fallback_remaining = 0.0;
            self.steering.cancel_turn();
            tracing::info!(agent = %self.id, applied, "agent died");
            return HitOutcome::Died { applied };
        }

        self.stats.raise_fear(self.stats.fear_increase_on_hit);
        let fallback_for = self.combat.fallback_duration(&self.stats);
        self.fallback_remaining = fallback_for;
        self.hit_from = source.filter(Vec2::is_finite);
        self.steering.cancel_turn();

        tracing::debug!(
            agent = %self.id,
            applied,
            health = self.stats.health,
            fear = self.stats.fear_level,
            fallback_for,
            "agent hit"
        );
        HitOutcome::Damaged {
            applied,
            fallback_for,
        }
    }

    /// Stimulus from an ally that spotted the target
    pub fn receive_help_call(&mut self, target_position: Vec2, now: f64) {
        if !self.alive || self.state() == BehaviorState::Combat || !target_position.is_finite() {
            return;
        }
        self.memory = Some(TargetMemory {
            last_known_position: target_position,
            last_detected_at: now,
            last_seen_at: self.memory.and_then(|m| m.last_seen_at),
        });
    }

    /// Drop straight back to Roaming, forgetting the target.
    ///
    /// Runs the same exit and entry actions as a normal transition. Returns
    /// the state change event when the state actually changed.
    pub fn force_reset(&mut self, now: f64) -> Option<AgentEvent> {
        let from = self.state.kind();

        self.exit_state();
        self.enter_state(BehaviorState::Roaming, now);
        self.awareness.reset();
        self.steering.reset();
        self.fallback_remaining = 0.0;
        self.hit_from = None;

        tracing::debug!(agent = %self.id, from = ?from, "forced reset");
        (from != BehaviorState::Roaming).then_some(AgentEvent::StateChanged {
            from,
            to: BehaviorState::Roaming,
        })
    }

    /// Bring a dead or live agent back at full health
    pub fn respawn(&mut self, pose: Pose, now: f64) {
        self.force_reset(now);
        self.stats.restore();
        self.combat.reset();
        self.pose = pose;
        self.alive = true;
        self.last_sample = PerceptionSample::none();
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            state: self.state.kind(),
            state_entered_at: self.state_entered_at,
            tension: self.awareness.tension(),
            tension_delta: self.awareness.tension_delta(),
            health: self.stats.health,
            max_health: self.stats.max_health,
            fear: self.stats.fear_level,
            position: self.pose.position,
            heading: self.pose.heading,
            alive: self.alive,
            falling_back: self.is_falling_back(),
            weapon_enabled: self.weapon_enabled(),
            memory: self.memory,
            target_in_sight: self.last_sample.target_in_sight,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("pose", &self.pose)
            .field("state", &self.state)
            .field("tension", &self.awareness.tension())
            .field("health", &self.stats.health)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::{Arena, SimTarget};
    use crate::game::systems::fsm::AwarePhase;

    const DT: f32 = 1.0 / 30.0;

    struct Scripted {
        rolls: Vec<f32>,
        next: usize,
    }

    impl Scripted {
        fn always(roll: f32) -> Box<Self> {
            Box::new(Self {
                rolls: vec![roll],
                next: 0,
            })
        }
    }

    impl RandomSource for Scripted {
        fn uniform01(&mut self) -> f32 {
            let roll = self.rolls[self.next % self.rolls.len()];
            self.next += 1;
            roll
        }

        fn range(&mut self, min: f32, max: f32) -> f32 {
            min + (max - min) * self.uniform01()
        }
    }

    fn agent_at(position: Vec2, heading: f32) -> Agent {
        Agent::new(
            Uuid::new_v4(),
            Pose::new(position, heading),
            &AiConfig::default(),
            Scripted::always(0.0),
        )
        .unwrap()
    }

    /// Run ticks with a fixed target, returning every output
    fn run(agent: &mut Agent, arena: &Arena, target: &SimTarget, start: f64, ticks: usize) -> Vec<TickOutput> {
        (0..ticks)
            .map(|i| {
                let ctx = TickContext {
                    scene: arena,
                    world: target,
                    now: start + i as f64 * f64::from(DT),
                    dt: DT,
                };
                agent.tick(&ctx)
            })
            .collect()
    }

    fn scene_with_target(position: Vec2) -> (Arena, SimTarget) {
        let mut arena = Arena::new();
        arena.set_target(Some(position));
        (arena, SimTarget::stationary(position))
    }

    #[test]
    fn test_spawns_roaming_and_calm() {
        let agent = agent_at(Vec2::ZERO, 0.0);
        assert_eq!(agent.state(), BehaviorState::Roaming);
        assert_eq!(agent.awareness().tension(), 0.0);
        assert!(agent.memory().is_none());
        assert!(agent.is_alive());
    }

    #[test]
    fn test_sighting_enters_combat_and_calls_for_help() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(5.0, 0.0));

        let out = run(&mut agent, &arena, &target, 0.0, 1).remove(0);
        assert_eq!(agent.state(), BehaviorState::Combat);
        assert_eq!(
            out.events[0],
            AgentEvent::StateChanged {
                from: BehaviorState::Roaming,
                to: BehaviorState::Combat
            }
        );
        assert_eq!(
            out.events[1],
            AgentEvent::CalledForHelp {
                target_position: Vec2::new(5.0, 0.0)
            }
        );
    }

    #[test]
    fn test_very_close_sighting_fills_tension() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(1.0, 0.0));

        run(&mut agent, &arena, &target, 0.0, 1);
        assert!(agent.awareness().is_full());
    }

    #[test]
    fn test_hearing_pulls_roaming_into_aware() {
        // Behind the agent, close and noisy
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let mut arena = Arena::new();
        arena.set_target(Some(Vec2::new(-1.5, 0.0)));
        let target = SimTarget::stationary(Vec2::new(-1.5, 0.0)).with_loudness(1.0);

        let out = run(&mut agent, &arena, &target, 0.0, 1).remove(0);
        assert_eq!(agent.state(), BehaviorState::Aware);
        assert!(out.fire.is_none());
        match agent.state_data() {
            StateData::Aware(investigation) => {
                assert!(investigation.point.approx_eq(Vec2::new(-1.5, 0.0), 1e-6));
            }
            other => panic!("expected Aware, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = AiConfig::default();
        config.perception.hearing_radius = -1.0;
        let result = Agent::new(
            Uuid::new_v4(),
            Pose::new(Vec2::ZERO, 0.0),
            &config,
            Scripted::always(0.0),
        );
        assert!(matches!(result, Err(ConfigError::Negative { .. })));

        let mut config = AiConfig::default();
        config.combat.min_rate_of_fire = 0.0;
        assert!(Agent::with_seed(Uuid::new_v4(), Pose::new(Vec2::ZERO, 0.0), &config, 1).is_err());
    }

    #[test]
    fn test_no_target_keeps_roaming() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let arena = Arena::new();
        let target = SimTarget::absent();

        let outputs = run(&mut agent, &arena, &target, 0.0, 30);
        assert_eq!(agent.state(), BehaviorState::Roaming);
        assert!(outputs.iter().all(|o| o.events.is_empty()));
        assert!(agent.pose().position.x > 0.0);
    }

    #[test]
    fn test_invalid_dt_is_absorbed() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(5.0, 0.0));
        let ctx = TickContext {
            scene: &arena,
            world: &target,
            now: 0.0,
            dt: f32::NAN,
        };
        let out = agent.tick(&ctx);
        assert_eq!(out.movement.velocity, Vec2::ZERO);
        assert_eq!(agent.state(), BehaviorState::Roaming);
        assert_eq!(agent.pose().position, Vec2::ZERO);
    }

    #[test]
    fn test_death_fires_once() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);

        assert_eq!(agent.on_hit(100.0, None), HitOutcome::Died { applied: 100.0 });
        assert!(!agent.is_alive());
        assert_eq!(agent.stats().health, 0.0);

        assert_eq!(agent.on_hit(10.0, None), HitOutcome::Ignored);
        assert_eq!(agent.stats().health, 0.0);

        let (arena, target) = scene_with_target(Vec2::new(3.0, 0.0));
        let out = run(&mut agent, &arena, &target, 0.0, 1).remove(0);
        assert!(out.events.is_empty());
        assert_eq!(agent.pose().position, Vec2::ZERO);
    }

    #[test]
    fn test_hit_raises_fear_and_starts_fallback() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let outcome = agent.on_hit(10.0, Some(Vec2::new(4.0, 0.0)));

        assert_eq!(
            outcome,
            HitOutcome::Damaged {
                applied: 10.0,
                fallback_for: 1.0
            }
        );
        assert_eq!(agent.stats().fear_level, 1.0);
        assert!(agent.is_falling_back());

        let arena = Arena::new();
        let target = SimTarget::absent();
        let out = run(&mut agent, &arena, &target, 0.0, 1).remove(0);
        // Away from the shot, at stats speed
        assert!((out.movement.velocity.x + 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_fallback_freezes_tension() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(6.0, 0.0));

        run(&mut agent, &arena, &target, 0.0, 5);
        let before = agent.awareness().tension();
        assert!(before > 0.0);

        agent.on_hit(5.0, None);
        run(&mut agent, &arena, &target, 1.0, 5);
        assert_eq!(agent.awareness().tension(), before);
        assert_eq!(agent.snapshot().tension_delta, 0.0);
    }

    #[test]
    fn test_look_around_expiry_returns_to_roaming() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        agent.receive_help_call(Vec2::new(0.2, 0.0), 0.0);
        let arena = Arena::new();
        let target = SimTarget::absent();

        run(&mut agent, &arena, &target, 0.0, 1);
        assert_eq!(agent.state(), BehaviorState::Aware);

        // Arrives at once, then looks around for twice the investigation time
        run(&mut agent, &arena, &target, f64::from(DT), 2);
        assert!(matches!(
            agent.state_data(),
            StateData::Aware(inv) if matches!(inv.phase, AwarePhase::LookingAround { .. })
        ));

        let outputs = run(&mut agent, &arena, &target, 0.1, 8 * 30 + 5);
        assert_eq!(agent.state(), BehaviorState::Roaming);
        assert!(agent.memory().is_none());
        let changes = outputs
            .iter()
            .flat_map(|o| o.events.iter())
            .filter(|e| matches!(e, AgentEvent::StateChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_force_reset_clears_everything() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(1.0, 0.0));
        run(&mut agent, &arena, &target, 0.0, 1);
        assert_eq!(agent.state(), BehaviorState::Combat);
        agent.on_hit(5.0, None);

        let event = agent.force_reset(1.0);
        assert_eq!(
            event,
            Some(AgentEvent::StateChanged {
                from: BehaviorState::Combat,
                to: BehaviorState::Roaming
            })
        );
        assert_eq!(agent.state(), BehaviorState::Roaming);
        assert!(agent.memory().is_none());
        assert_eq!(agent.awareness().tension(), 0.0);
        assert!(!agent.is_falling_back());
        assert!(!agent.weapon_enabled());

        assert_eq!(agent.force_reset(2.0), None);
    }

    #[test]
    fn test_respawn_restores_dead_agent() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        agent.on_hit(500.0, None);
        agent.respawn(Pose::new(Vec2::new(3.0, 3.0), 90.0), 5.0);

        assert!(agent.is_alive());
        assert_eq!(agent.stats().health, agent.stats().max_health);
        assert_eq!(agent.pose().position, Vec2::new(3.0, 3.0));
        assert_eq!(agent.state(), BehaviorState::Roaming);
    }

    #[test]
    fn test_help_call_ignored_in_combat() {
        let mut agent = agent_at(Vec2::ZERO, 0.0);
        let (arena, target) = scene_with_target(Vec2::new(4.0, 0.0));
        run(&mut agent, &arena, &target, 0.0, 1);

        agent.receive_help_call(Vec2::new(-20.0, 0.0), 0.1);
        let memory = agent.memory().expect("combat agent remembers the target");
        assert!(memory.last_known_position.approx_eq(Vec2::new(4.0, 0.0), 1e-6));
    }

    #[test]
    fn test_snapshot_serializes() {
        let agent = agent_at(Vec2::new(1.0, 2.0), 45.0);
        let json = serde_json::to_value(agent.snapshot()).unwrap();
        assert_eq!(json["state"], "Roaming");
        assert_eq!(json["alive"], true);
        assert_eq!(json["heading"], 45.0);
    }
}
