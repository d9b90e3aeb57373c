//! Collaborators the AI core consumes but does not own
//!
//! The host engine supplies ray casts, the target's pose and noise, a clock
//! and somewhere to send projectile spawn requests. Everything is passed in
//! explicitly through [`TickContext`]; the core never looks anything up.

use bitflags::bitflags;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::game::systems::combat::FireRequest;
use crate::util::vec2::Vec2;

bitflags! {
    /// Collision layers a ray cast may hit
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        const OBSTACLE = 1 << 0;
        const TARGET = 1 << 1;
    }
}

/// What a ray hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderId {
    /// The tracked target (the player)
    Target,
    /// A wall or other static obstacle
    Obstacle(u32),
}

/// Nearest hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec2,
    pub collider: ColliderId,
}

/// Scene ray casts, provided by the physics engine
pub trait SceneQuery: Send + Sync {
    /// Cast a ray and return the nearest hit on any layer in `mask`.
    ///
    /// `direction` is expected to be normalized.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

/// Snapshot of the target for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPose {
    pub position: Vec2,
    pub velocity: Vec2,
    pub forward: Vec2,
    pub is_alive: bool,
    /// Ambient light on the target in [0, 1]; `None` means fully lit
    pub light_level: Option<f32>,
}

impl TargetPose {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            forward: Vec2::RIGHT,
            is_alive: true,
            light_level: None,
        }
    }

    /// A target that can be perceived: alive with finite coordinates
    pub fn is_valid(&self) -> bool {
        self.is_alive && self.position.is_finite()
    }
}

/// Shared world state the agents read
pub trait World: Send + Sync {
    /// `None` when there is no target (not spawned, despawned, between scenes)
    fn target_pose(&self) -> Option<TargetPose>;
    /// Current noise emitted by the target
    fn target_loudness(&self) -> f32;
}

/// Simulation clock
pub trait Clock {
    fn delta_time(&self) -> f32;
    fn now(&self) -> f64;
}

/// Clock driven purely by accumulated tick deltas
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: f64,
    dt: f32,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.now += f64::from(dt);
    }
}

impl Clock for SimClock {
    fn delta_time(&self) -> f32 {
        self.dt
    }

    fn now(&self) -> f64 {
        self.now
    }
}

/// Receives projectile spawn requests
pub trait ProjectileSpawner {
    fn spawn(&mut self, request: &FireRequest);
}

impl ProjectileSpawner for Vec<FireRequest> {
    fn spawn(&mut self, request: &FireRequest) {
        self.push(request.clone());
    }
}

/// Random numbers for roaming turns and hit rolls
pub trait RandomSource {
    /// Uniform sample in [0, 1)
    fn uniform01(&mut self) -> f32;

    /// Uniform sample in [min, max); returns `min` for an empty range
    fn range(&mut self, min: f32, max: f32) -> f32;
}

impl RandomSource for ChaCha8Rng {
    fn uniform01(&mut self) -> f32 {
        self.gen::<f32>()
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.gen_range(min..max)
        } else {
            min
        }
    }
}

/// Everything one agent tick may read
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub scene: &'a dyn SceneQuery,
    pub world: &'a dyn World,
    pub now: f64,
    pub dt: f32,
}

impl<'a> TickContext<'a> {
    pub fn new(scene: &'a dyn SceneQuery, world: &'a dyn World, clock: &dyn Clock) -> Self {
        Self {
            scene,
            world,
            now: clock.now(),
            dt: clock.delta_time(),
        }
    }
}
