//! Roaming / Aware / Combat behavior state machine
//!
//! Transitions are decided by [`next_state`] from the current perception
//! sample and the time since the target was last detected. Applying a
//! transition runs the exit actions of the old state and then the entry
//! actions of the new one, before the tick's movement and shooting.
//!
//! Long running behaviors (investigating, looking around, wandering) are
//! countdown fields on the state data, decremented by the tick delta.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::FsmConfig;
use crate::game::agent::{Agent, AgentEvent, TargetMemory};
use crate::game::constants::steering::REVERSE_SPEED_FACTOR;
use crate::game::systems::steering::{Motion, MovementCommand, SteeringIntent, TurnKind};
use crate::game::world::{SceneQuery, TargetPose};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    Roaming,
    Aware,
    Combat,
}

/// Sub-state of Aware
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AwarePhase {
    /// Walking to the investigation point
    Investigating { remaining: f32 },
    /// Turning in place at the investigation point
    LookingAround { remaining: f32, next_turn_in: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Investigation {
    pub point: Vec2,
    /// Memory timestamp the point was taken from
    pub stamp: f64,
    pub phase: AwarePhase,
}

/// Shooting bookkeeping, rebuilt on every Combat entry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Engagement {
    pub weapon_enabled: bool,
    pub last_toggle_at: Option<f64>,
    pub help_called: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateData {
    Roaming { direction_change_in: f32 },
    Aware(Investigation),
    Combat(Engagement),
}

impl StateData {
    pub fn kind(&self) -> BehaviorState {
        match self {
            StateData::Roaming { .. } => BehaviorState::Roaming,
            StateData::Aware(_) => BehaviorState::Aware,
            StateData::Combat(_) => BehaviorState::Combat,
        }
    }
}

/// Seconds since the target was last noticed, infinite when never
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryAge {
    /// Since the last actual sighting
    pub since_seen: f64,
    /// Since the last sighting, hearing or ally report
    pub since_detected: f64,
}

impl MemoryAge {
    pub const NEVER: Self = Self {
        since_seen: f64::INFINITY,
        since_detected: f64::INFINITY,
    };

    pub fn of(memory: Option<TargetMemory>, now: f64) -> Self {
        match memory {
            Some(m) => Self {
                since_seen: m.last_seen_at.map_or(f64::INFINITY, |at| now - at),
                since_detected: now - m.last_detected_at,
            },
            None => Self::NEVER,
        }
    }
}

/// Pick the state for this tick.
///
/// The Combat grace window only counts sightings; hearing keeps an agent
/// Aware but never holds it in Combat.
pub fn next_state(
    current: BehaviorState,
    target_valid: bool,
    in_sight: bool,
    age: MemoryAge,
    config: &FsmConfig,
) -> BehaviorState {
    let forget = f64::from(config.forget_timeout);
    let grace = f64::from(config.short_grace_window);

    match current {
        BehaviorState::Roaming if in_sight => BehaviorState::Combat,
        BehaviorState::Roaming if age.since_detected < forget => BehaviorState::Aware,
        BehaviorState::Roaming => BehaviorState::Roaming,

        BehaviorState::Aware if in_sight => BehaviorState::Combat,
        BehaviorState::Aware if age.since_detected >= forget => BehaviorState::Roaming,
        BehaviorState::Aware => BehaviorState::Aware,

        BehaviorState::Combat if !target_valid => BehaviorState::Aware,
        BehaviorState::Combat if !in_sight && age.since_seen > grace => BehaviorState::Aware,
        BehaviorState::Combat => BehaviorState::Combat,
    }
}

impl Agent {
    pub(crate) fn evaluate_transitions(
        &mut self,
        target_valid: bool,
        in_sight: bool,
        now: f64,
        events: &mut SmallVec<[AgentEvent; 4]>,
    ) {
        let next = next_state(
            self.state.kind(),
            target_valid,
            in_sight,
            MemoryAge::of(self.memory, now),
            &self.fsm_config,
        );
        self.change_state(next, now, events);
    }

    /// Run exit then entry actions; no-op when `next` is the current state
    pub(crate) fn change_state(
        &mut self,
        next: BehaviorState,
        now: f64,
        events: &mut SmallVec<[AgentEvent; 4]>,
    ) {
        let from = self.state.kind();
        if from == next {
            return;
        }

        self.exit_state();
        let help = self.enter_state(next, now);

        tracing::debug!(agent = %self.id, from = ?from, to = ?next, "state transition");
        events.push(AgentEvent::StateChanged { from, to: next });
        events.extend(help);
    }

    /// Exit actions of the current state
    pub(crate) fn exit_state(&mut self) {
        self.steering.cancel_turn();
        if let StateData::Combat(engagement) = &mut self.state {
            engagement.weapon_enabled = false;
            engagement.help_called = false;
        }
    }

    /// Entry actions; returns the call-for-help event when entering Combat
    pub(crate) fn enter_state(&mut self, next: BehaviorState, now: f64) -> Option<AgentEvent> {
        self.state_entered_at = now;

        match next {
            BehaviorState::Roaming => {
                // Roaming means the agent gave up on the target
                self.memory = None;
                self.state = StateData::Roaming {
                    direction_change_in: self.fsm_config.direction_change_interval,
                };
                None
            }
            BehaviorState::Aware => {
                let (point, stamp) = match self.memory {
                    Some(memory) => (memory.last_known_position, memory.last_detected_at),
                    None => (self.pose.position, now),
                };
                self.state = StateData::Aware(Investigation {
                    point,
                    stamp,
                    phase: AwarePhase::Investigating {
                        remaining: self.fsm_config.investigation_time,
                    },
                });
                None
            }
            BehaviorState::Combat => {
                let help = self.memory.map(|m| AgentEvent::CalledForHelp {
                    target_position: m.last_known_position,
                });
                self.state = StateData::Combat(Engagement {
                    help_called: help.is_some(),
                    ..Engagement::default()
                });
                help
            }
        }
    }

    /// Movement for the active state
    pub(crate) fn run_state(
        &mut self,
        scene: &dyn SceneQuery,
        target: Option<&TargetPose>,
        now: f64,
        dt: f32,
        events: &mut SmallVec<[AgentEvent; 4]>,
    ) -> MovementCommand {
        match self.state {
            StateData::Roaming {
                direction_change_in,
            } => self.roam(scene, direction_change_in, dt),
            StateData::Aware(investigation) => self.investigate(investigation, now, dt, events),
            StateData::Combat(engagement) => self.engage(scene, target, engagement, now, dt),
        }
    }

    fn roam(&mut self, scene: &dyn SceneQuery, mut countdown: f32, dt: f32) -> MovementCommand {
        let heading = self.pose.heading;
        let fan = self.steering.fan_cast(self.pose.position, heading, scene);

        if !fan.clear {
            if self.steering.active_turn() != Some(TurnKind::TurnAround) {
                tracing::trace!(agent = %self.id, "path blocked, turning around");
                self.steering.start_turn(heading + 180.0, TurnKind::TurnAround);
            }
        } else if !self.steering.is_turning() {
            countdown -= dt;
            if countdown <= 0.0 {
                countdown = self.fsm_config.direction_change_interval;
                if self.rng.uniform01() < self.fsm_config.direction_change_probability {
                    let turn = self.random_turn_angle();
                    self.steering.start_turn(heading + turn, TurnKind::Random);
                }
            }
        }

        self.state = StateData::Roaming {
            direction_change_in: countdown,
        };
        self.steering
            .steer(heading, SteeringIntent::forward(self.fsm_config.roaming_speed), dt)
    }

    fn investigate(
        &mut self,
        mut investigation: Investigation,
        now: f64,
        dt: f32,
        events: &mut SmallVec<[AgentEvent; 4]>,
    ) -> MovementCommand {
        let heading = self.pose.heading;

        if let Some(memory) = self.memory {
            if memory.last_detected_at > investigation.stamp {
                investigation.stamp = memory.last_detected_at;
                // Fresh news about the same spot keeps the current phase
                let moved = memory.last_known_position.distance_to(investigation.point)
                    > self.fsm_config.arrival_threshold;
                if moved {
                    investigation.point = memory.last_known_position;
                    investigation.phase = AwarePhase::Investigating {
                        remaining: self.fsm_config.investigation_time,
                    };
                    self.steering.cancel_turn();
                }
            }
        }

        let intent = match investigation.phase {
            AwarePhase::Investigating { remaining } => {
                let remaining = remaining - dt;
                let (direction, distance) =
                    (investigation.point - self.pose.position).normalize_with_length();

                if distance < self.fsm_config.arrival_threshold || remaining <= 0.0 {
                    investigation.phase = AwarePhase::LookingAround {
                        remaining: 2.0 * self.fsm_config.investigation_time,
                        next_turn_in: 0.0,
                    };
                    SteeringIntent::hold()
                } else {
                    investigation.phase = AwarePhase::Investigating { remaining };
                    SteeringIntent {
                        face: Some(direction.heading()),
                        speed: self.fsm_config.investigation_speed,
                        rotation_multiplier: 1.0,
                        motion: Motion::Direction(direction),
                    }
                }
            }
            AwarePhase::LookingAround {
                remaining,
                next_turn_in,
            } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    tracing::debug!(agent = %self.id, "investigation exhausted, giving up");
                    self.change_state(BehaviorState::Roaming, now, events);
                    return self.steering.steer(heading, SteeringIntent::hold(), dt);
                }

                let mut next_turn_in = next_turn_in - dt;
                if next_turn_in <= 0.0 && !self.steering.is_turning() {
                    let turn = self.random_turn_angle();
                    self.steering.start_turn(heading + turn, TurnKind::LookAround);
                    next_turn_in = self.fsm_config.look_around_interval;
                }
                investigation.phase = AwarePhase::LookingAround {
                    remaining,
                    next_turn_in,
                };
                SteeringIntent::hold()
            }
        };

        self.state = StateData::Aware(investigation);
        self.steering.steer(heading, intent, dt)
    }

    fn engage(
        &mut self,
        scene: &dyn SceneQuery,
        target: Option<&TargetPose>,
        mut engagement: Engagement,
        now: f64,
        dt: f32,
    ) -> MovementCommand {
        let heading = self.pose.heading;
        let position = self.pose.position;

        if engagement
            .last_toggle_at
            .map_or(true, |at| now - at >= f64::from(self.fsm_config.shoot_toggle_cooldown))
        {
            engagement.weapon_enabled = match target {
                Some(target) => {
                    let (direction, distance) = (target.position - position).normalize_with_length();
                    distance <= self.stats.attack_range
                        && self.steering.line_clear(position, direction, distance, scene)
                }
                None => false,
            };
            engagement.last_toggle_at = Some(now);
        }
        self.state = StateData::Combat(engagement);

        let Some(memory) = self.memory else {
            return self.steering.steer(heading, SteeringIntent::hold(), dt);
        };

        let (to_aim, distance) = (memory.last_known_position - position).normalize_with_length();
        let rotation_multiplier = self.steering.config().combat_rotation_multiplier;
        let face = (distance > 0.0).then(|| to_aim.heading());
        let combat_speed = self.fsm_config.combat_speed;

        let (motion, speed) = if distance <= self.fsm_config.min_standoff_distance {
            (Motion::Hold, 0.0)
        } else if self.steering.line_clear(position, to_aim, distance, scene) {
            (
                Motion::Direction(to_aim),
                combat_speed * self.fsm_config.chase_multiplier,
            )
        } else if let Some(detour) = self
            .steering
            .probe_detour(position, to_aim.heading(), scene)
        {
            (Motion::Direction(detour), combat_speed)
        } else {
            tracing::trace!(agent = %self.id, "all probes blocked, reversing");
            (Motion::Direction(-to_aim), combat_speed * REVERSE_SPEED_FACTOR)
        };

        self.steering.steer(
            heading,
            SteeringIntent {
                face,
                speed,
                rotation_multiplier,
                motion,
            },
            dt,
        )
    }

    /// Random turn magnitude within the configured limits, either direction
    fn random_turn_angle(&mut self) -> f32 {
        let magnitude = self
            .rng
            .range(self.fsm_config.random_turn_min, self.fsm_config.random_turn_max);
        if self.rng.uniform01() < 0.5 {
            -magnitude
        } else {
            magnitude
        }
    }
}
