//! Minimal 2D scene for the headless simulation
//!
//! Walls are line segments and the target is a circle. This is enough to
//! drive perception and steering without a physics engine, and doubles as
//! the scene used in tests.

use crate::game::constants::arena::{HALF_EXTENT, TARGET_RADIUS, TARGET_SPEED, WAYPOINT_TOLERANCE};
use crate::game::world::{ColliderId, LayerMask, RayHit, SceneQuery, TargetPose, World};
use crate::util::vec2::Vec2;

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
}

#[derive(Debug, Clone)]
pub struct Arena {
    walls: Vec<Wall>,
    target: Option<Vec2>,
    target_radius: f32,
}

impl Arena {
    /// Empty, unbounded arena with no target collider
    pub fn new() -> Self {
        Self {
            walls: Vec::new(),
            target: None,
            target_radius: TARGET_RADIUS,
        }
    }

    /// Square arena centred on the origin
    pub fn bounded(half_extent: f32) -> Self {
        let mut arena = Self::new();
        let h = half_extent;
        arena.add_wall(Vec2::new(-h, -h), Vec2::new(h, -h));
        arena.add_wall(Vec2::new(h, -h), Vec2::new(h, h));
        arena.add_wall(Vec2::new(h, h), Vec2::new(-h, h));
        arena.add_wall(Vec2::new(-h, h), Vec2::new(-h, -h));
        arena
    }

    /// Default simulation layout: outer walls plus a few cover blocks
    pub fn demo() -> Self {
        let mut arena = Self::bounded(HALF_EXTENT);
        arena.add_box(Vec2::new(-8.0, 6.0), Vec2::new(-4.0, 8.0));
        arena.add_box(Vec2::new(4.0, -8.0), Vec2::new(8.0, -4.0));
        arena.add_box(Vec2::new(-2.0, -2.0), Vec2::new(2.0, 2.0));
        arena.add_wall(Vec2::new(10.0, 5.0), Vec2::new(10.0, 15.0));
        arena
    }

    /// Add a wall segment and return its collider index
    pub fn add_wall(&mut self, start: Vec2, end: Vec2) -> u32 {
        self.walls.push(Wall { start, end });
        (self.walls.len() - 1) as u32
    }

    /// Axis aligned box from its min and max corners
    pub fn add_box(&mut self, min: Vec2, max: Vec2) {
        self.add_wall(Vec2::new(min.x, min.y), Vec2::new(max.x, min.y));
        self.add_wall(Vec2::new(max.x, min.y), Vec2::new(max.x, max.y));
        self.add_wall(Vec2::new(max.x, max.y), Vec2::new(min.x, max.y));
        self.add_wall(Vec2::new(min.x, max.y), Vec2::new(min.x, min.y));
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Move (or remove) the target collider
    pub fn set_target(&mut self, position: Option<Vec2>) {
        self.target = position;
    }

    pub fn set_target_radius(&mut self, radius: f32) {
        self.target_radius = radius.max(0.0);
    }

    /// Keep the target collider in sync with a simulated target
    pub fn track(&mut self, target: &SimTarget) {
        self.target = target.present.then_some(target.position);
    }

    fn ray_segment(origin: Vec2, direction: Vec2, wall: &Wall) -> Option<f32> {
        let edge = wall.end - wall.start;
        let denom = direction.cross(edge);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let to_start = wall.start - origin;
        let t = to_start.cross(edge) / denom;
        let u = to_start.cross(direction) / denom;
        (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
    }

    fn ray_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
        let offset = origin - center;
        let b = offset.dot(direction);
        let c = offset.length_sq() - radius * radius;
        if c > 0.0 && b > 0.0 {
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        // Origin inside the circle hits immediately
        Some((-b - discriminant.sqrt()).max(0.0))
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneQuery for Arena {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize();
        if direction == Vec2::ZERO || !origin.is_finite() || max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }

        let mut nearest: Option<(f32, ColliderId)> = None;
        let mut consider = |distance: f32, collider: ColliderId| {
            if distance <= max_distance && nearest.map_or(true, |(best, _)| distance < best) {
                nearest = Some((distance, collider));
            }
        };

        if mask.contains(LayerMask::OBSTACLE) {
            for (index, wall) in self.walls.iter().enumerate() {
                if let Some(distance) = Self::ray_segment(origin, direction, wall) {
                    consider(distance, ColliderId::Obstacle(index as u32));
                }
            }
        }

        if mask.contains(LayerMask::TARGET) {
            if let Some(center) = self.target {
                if let Some(distance) =
                    Self::ray_circle(origin, direction, center, self.target_radius)
                {
                    consider(distance, ColliderId::Target);
                }
            }
        }

        nearest.map(|(distance, collider)| RayHit {
            distance,
            point: origin + direction * distance,
            collider,
        })
    }
}

/// Scripted target walking a closed loop of waypoints
#[derive(Debug, Clone)]
pub struct SimTarget {
    position: Vec2,
    velocity: Vec2,
    waypoints: Vec<Vec2>,
    next: usize,
    speed: f32,
    loudness: f32,
    light_level: Option<f32>,
    alive: bool,
    present: bool,
}

impl SimTarget {
    pub fn stationary(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            waypoints: Vec::new(),
            next: 0,
            speed: 0.0,
            loudness: 0.0,
            light_level: None,
            alive: true,
            present: true,
        }
    }

    /// No target in the world
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::stationary(Vec2::ZERO)
        }
    }

    /// Walk `waypoints` in order, looping back to the first
    pub fn patrol(waypoints: Vec<Vec2>, speed: f32) -> Self {
        let start = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        Self {
            waypoints,
            next: 1,
            speed,
            ..Self::stationary(start)
        }
    }

    /// Loop around the demo arena's cover
    pub fn demo() -> Self {
        Self::patrol(
            vec![
                Vec2::new(-15.0, -15.0),
                Vec2::new(15.0, -15.0),
                Vec2::new(15.0, 15.0),
                Vec2::new(-15.0, 15.0),
            ],
            TARGET_SPEED,
        )
        .with_loudness(0.5)
        .with_light_level(0.6)
    }

    pub fn with_loudness(mut self, loudness: f32) -> Self {
        self.loudness = loudness;
        self
    }

    pub fn with_light_level(mut self, level: f32) -> Self {
        self.light_level = Some(level);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    /// Advance along the patrol route
    pub fn step(&mut self, dt: f32) {
        if self.waypoints.is_empty() || !self.alive {
            self.velocity = Vec2::ZERO;
            return;
        }

        let index = self.next % self.waypoints.len();
        let goal = self.waypoints[index];
        let (direction, distance) = (goal - self.position).normalize_with_length();

        if distance <= WAYPOINT_TOLERANCE {
            self.next = (index + 1) % self.waypoints.len();
            self.velocity = Vec2::ZERO;
            return;
        }

        let step = (self.speed * dt).min(distance);
        self.velocity = direction * self.speed;
        self.position += direction * step;
    }
}

impl World for SimTarget {
    fn target_pose(&self) -> Option<TargetPose> {
        self.present.then(|| TargetPose {
            position: self.position,
            velocity: self.velocity,
            forward: if self.velocity == Vec2::ZERO {
                Vec2::RIGHT
            } else {
                self.velocity.normalize()
            },
            is_alive: self.alive,
            light_level: self.light_level,
        })
    }

    fn target_loudness(&self) -> f32 {
        if self.alive {
            self.loudness
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_nearest_wall() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(5.0, -1.0), Vec2::new(5.0, 1.0));
        let near = arena.add_wall(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0));

        let hit = arena
            .raycast(Vec2::ZERO, Vec2::RIGHT, 10.0, LayerMask::OBSTACLE)
            .unwrap();
        assert_eq!(hit.collider, ColliderId::Obstacle(near));
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!(hit.point.approx_eq(Vec2::new(2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(5.0, -1.0), Vec2::new(5.0, 1.0));
        assert!(arena
            .raycast(Vec2::ZERO, Vec2::RIGHT, 4.9, LayerMask::OBSTACLE)
            .is_none());
    }

    #[test]
    fn test_ray_misses_wall_behind() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(-2.0, -1.0), Vec2::new(-2.0, 1.0));
        assert!(arena
            .raycast(Vec2::ZERO, Vec2::RIGHT, 10.0, LayerMask::OBSTACLE)
            .is_none());
    }

    #[test]
    fn test_mask_filters_layers() {
        let mut arena = Arena::new();
        arena.set_target(Some(Vec2::new(3.0, 0.0)));

        assert!(arena
            .raycast(Vec2::ZERO, Vec2::RIGHT, 10.0, LayerMask::OBSTACLE)
            .is_none());

        let hit = arena
            .raycast(Vec2::ZERO, Vec2::RIGHT, 10.0, LayerMask::TARGET)
            .unwrap();
        assert_eq!(hit.collider, ColliderId::Target);
        assert!((hit.distance - (3.0 - TARGET_RADIUS)).abs() < 1e-5);
    }

    #[test]
    fn test_wall_in_front_of_target_wins() {
        let mut arena = Arena::new();
        arena.set_target(Some(Vec2::new(6.0, 0.0)));
        arena.add_wall(Vec2::new(3.0, -1.0), Vec2::new(3.0, 1.0));

        let hit = arena
            .raycast(
                Vec2::ZERO,
                Vec2::RIGHT,
                10.0,
                LayerMask::OBSTACLE | LayerMask::TARGET,
            )
            .unwrap();
        assert_eq!(hit.collider, ColliderId::Obstacle(0));
    }

    #[test]
    fn test_bounded_arena_contains_rays() {
        let arena = Arena::bounded(10.0);
        for heading in [0.0, 45.0, 90.0, 200.0, 300.0] {
            let hit = arena.raycast(
                Vec2::ZERO,
                Vec2::from_heading(heading),
                100.0,
                LayerMask::OBSTACLE,
            );
            assert!(hit.is_some(), "ray at {} escaped", heading);
        }
    }

    #[test]
    fn test_patrol_walks_waypoints() {
        let mut target = SimTarget::patrol(vec![Vec2::ZERO, Vec2::new(2.0, 0.0)], 1.0);
        for _ in 0..10 {
            target.step(0.1);
        }
        assert!(target.position().approx_eq(Vec2::new(1.0, 0.0), 1e-4));

        let pose = target.target_pose().unwrap();
        assert!(pose.forward.approx_eq(Vec2::RIGHT, 1e-5));
        assert!((pose.velocity.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_absent_target_has_no_pose() {
        let target = SimTarget::absent();
        assert!(target.target_pose().is_none());

        let mut arena = Arena::new();
        arena.track(&target);
        assert!(arena
            .raycast(Vec2::new(-1.0, 0.0), Vec2::RIGHT, 5.0, LayerMask::TARGET)
            .is_none());
    }

    #[test]
    fn test_dead_target_is_silent() {
        let mut target = SimTarget::stationary(Vec2::ZERO).with_loudness(1.0);
        target.set_alive(false);
        assert_eq!(target.target_loudness(), 0.0);
        assert!(!target.target_pose().unwrap().is_valid());
    }
}
