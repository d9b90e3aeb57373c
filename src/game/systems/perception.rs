//! Sight and hearing queries
//!
//! Perception is stateless: it turns the agent pose, the target pose and a
//! ray cast capability into a [`PerceptionSample`]. Remembering where the
//! target was last seen is the state machine's job.

use crate::config::PerceptionConfig;
use crate::game::world::{ColliderId, LayerMask, SceneQuery, TargetPose};
use crate::util::vec2::Vec2;

/// Extra ray length so a target collider sitting exactly at the target
/// position is still reached
const RAY_EPSILON: f32 = 0.01;

/// Instantaneous perception result, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionSample {
    pub target_in_sight: bool,
    pub target_audible: bool,
    pub distance_to_target: f32,
    /// Unsigned angle between forward and the direction to the target, in degrees
    pub angle_to_target: f32,
}

impl PerceptionSample {
    /// Sample for a tick with no valid target
    pub fn none() -> Self {
        Self {
            target_in_sight: false,
            target_audible: false,
            distance_to_target: f32::INFINITY,
            angle_to_target: 180.0,
        }
    }

    /// Seen or heard this tick
    pub fn detected(&self) -> bool {
        self.target_in_sight || self.target_audible
    }
}

/// Vision cone and hearing radius of one agent
#[derive(Debug, Clone)]
pub struct Perception {
    config: PerceptionConfig,
}

impl Perception {
    pub fn new(config: PerceptionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn sample(
        &self,
        origin: Vec2,
        heading: f32,
        target: &TargetPose,
        loudness: f32,
        scene: &dyn SceneQuery,
    ) -> PerceptionSample {
        let (direction, distance) = (target.position - origin).normalize_with_length();
        let angle = if distance > 0.0 {
            Vec2::from_heading(heading).angle_between(direction)
        } else {
            0.0
        };

        PerceptionSample {
            target_in_sight: self.can_see(origin, heading, target, scene),
            target_audible: self.can_hear(origin, target.position, loudness, scene),
            distance_to_target: distance,
            angle_to_target: angle,
        }
    }

    /// Range, cone, light and occlusion test.
    ///
    /// A single ray is cast against obstacles and the target together; the
    /// target is seen only when it is the first thing the ray touches.
    pub fn can_see(
        &self,
        origin: Vec2,
        heading: f32,
        target: &TargetPose,
        scene: &dyn SceneQuery,
    ) -> bool {
        let (direction, distance) = (target.position - origin).normalize_with_length();

        if distance > self.config.sight_range {
            return false;
        }

        if let Some(light) = target.light_level {
            if light < self.config.full_light_level && distance >= self.config.dark_sight_range {
                return false;
            }
        }

        if distance <= f32::EPSILON {
            return true;
        }

        let forward = Vec2::from_heading(heading);
        if forward.angle_between(direction) > self.config.sight_angle / 2.0 {
            return false;
        }

        match scene.raycast(
            origin,
            direction,
            distance + RAY_EPSILON,
            LayerMask::OBSTACLE | LayerMask::TARGET,
        ) {
            Some(hit) => hit.collider == ColliderId::Target,
            None => false,
        }
    }

    /// Distance and loudness test, optionally blocked by walls
    pub fn can_hear(
        &self,
        origin: Vec2,
        target_position: Vec2,
        loudness: f32,
        scene: &dyn SceneQuery,
    ) -> bool {
        let (direction, distance) = (target_position - origin).normalize_with_length();

        if distance > self.config.hearing_radius || loudness <= self.config.min_loudness {
            return false;
        }

        if self.config.hearing_blocked_by_walls && distance > 0.0 {
            return scene
                .raycast(origin, direction, distance, LayerMask::OBSTACLE)
                .is_none();
        }

        true
    }
}
