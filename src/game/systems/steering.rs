//! Rate-limited rotation, speed shaping and ray based obstacle probes

use crate::config::SteeringConfig;
use crate::game::constants::steering::DETOUR_ANGLES;
use crate::game::world::{LayerMask, SceneQuery};
use crate::util::vec2::{delta_angle, move_towards_angle, Vec2};

/// Bounded per-tick movement produced by the steering controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCommand {
    /// Units per second
    pub velocity: Vec2,
    /// `velocity * dt`
    pub displacement: Vec2,
    /// Signed degrees rotated this tick
    pub rotation_delta: f32,
    /// Heading after the rotation
    pub heading: f32,
}

impl MovementCommand {
    /// Stand still facing `heading`
    pub fn idle(heading: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            displacement: Vec2::ZERO,
            rotation_delta: 0.0,
            heading,
        }
    }
}

/// Why an in-place turn was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Obstacle ahead, reverse direction
    TurnAround,
    /// Roaming wander
    Random,
    /// Scanning while investigating
    LookAround,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Turn {
    target: f32,
    kind: TurnKind,
}

/// How the agent wants to translate this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Along the heading after rotation
    Forward,
    /// Along a fixed world direction, independent of heading
    Direction(Vec2),
    Hold,
}

/// One tick of desired movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringIntent {
    /// Heading to rotate toward; falls back to the active turn when `None`
    pub face: Option<f32>,
    pub speed: f32,
    pub rotation_multiplier: f32,
    pub motion: Motion,
}

impl SteeringIntent {
    pub fn forward(speed: f32) -> Self {
        Self {
            face: None,
            speed,
            rotation_multiplier: 1.0,
            motion: Motion::Forward,
        }
    }

    pub fn hold() -> Self {
        Self {
            face: None,
            speed: 0.0,
            rotation_multiplier: 1.0,
            motion: Motion::Hold,
        }
    }

    pub fn facing(mut self, heading: f32) -> Self {
        self.face = Some(heading);
        self
    }

    pub fn with_rotation_multiplier(mut self, multiplier: f32) -> Self {
        self.rotation_multiplier = multiplier;
        self
    }
}

/// Result of the three-ray avoidance fan.
///
/// Only the centre ray decides whether the path is clear; the flank hits are
/// kept for debug overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanCast {
    pub left: Option<f32>,
    pub center: Option<f32>,
    pub right: Option<f32>,
    pub clear: bool,
}

#[derive(Debug, Clone)]
pub struct SteeringController {
    config: SteeringConfig,
    speed_factor: f32,
    turn: Option<Turn>,
}

impl SteeringController {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            speed_factor: 1.0,
            turn: None,
        }
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn active_turn(&self) -> Option<TurnKind> {
        self.turn.map(|t| t.kind)
    }

    pub fn is_turning(&self) -> bool {
        self.turn.is_some()
    }

    /// Begin rotating toward `target_heading`, replacing any active turn
    pub fn start_turn(&mut self, target_heading: f32, kind: TurnKind) {
        self.turn = Some(Turn {
            target: target_heading,
            kind,
        });
    }

    pub fn cancel_turn(&mut self) {
        self.turn = None;
    }

    /// Back to spawn condition
    pub fn reset(&mut self) {
        self.turn = None;
        self.speed_factor = 1.0;
    }

    /// Probe the path ahead with rays at `-spread`, `0` and `+spread`
    pub fn fan_cast(&self, origin: Vec2, heading: f32, scene: &dyn SceneQuery) -> FanCast {
        let cast = |offset: f32| {
            scene
                .raycast(
                    origin,
                    Vec2::from_heading(heading + offset),
                    self.config.probe_distance,
                    LayerMask::OBSTACLE,
                )
                .map(|hit| hit.distance)
        };

        let center = cast(0.0);
        FanCast {
            left: cast(self.config.probe_spread),
            center,
            right: cast(-self.config.probe_spread),
            clear: center.map_or(true, |d| d > self.config.min_clearance),
        }
    }

    /// No obstacle between `origin` and `origin + direction * distance`
    pub fn line_clear(
        &self,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        scene: &dyn SceneQuery,
    ) -> bool {
        scene
            .raycast(origin, direction, distance, LayerMask::OBSTACLE)
            .is_none()
    }

    /// First clear detour direction, widest angle first
    pub fn probe_detour(&self, origin: Vec2, heading: f32, scene: &dyn SceneQuery) -> Option<Vec2> {
        DETOUR_ANGLES.iter().find_map(|offset| {
            let direction = Vec2::from_heading(heading + offset);
            let clear = scene
                .raycast(
                    origin,
                    direction,
                    self.config.probe_distance,
                    LayerMask::OBSTACLE,
                )
                .map_or(true, |hit| hit.distance > self.config.min_clearance);
            clear.then_some(direction)
        })
    }

    /// Produce this tick's bounded rotation and displacement
    pub fn steer(&mut self, heading: f32, intent: SteeringIntent, dt: f32) -> MovementCommand {
        let desired = intent.face.or_else(|| self.turn.map(|t| t.target));

        let (new_heading, remaining) = match desired {
            Some(target) => {
                let max_step = self.config.rotation_speed * intent.rotation_multiplier * dt;
                let remaining = delta_angle(heading, target).abs();
                (move_towards_angle(heading, target, max_step), remaining)
            }
            None => (heading, 0.0),
        };

        if let Some(turn) = self.turn {
            if delta_angle(new_heading, turn.target).abs() <= self.config.turn_epsilon {
                self.turn = None;
            }
        }

        self.update_speed_factor(remaining, dt);

        let direction = match intent.motion {
            Motion::Forward => Vec2::from_heading(new_heading),
            Motion::Direction(direction) => direction.normalize(),
            Motion::Hold => Vec2::ZERO,
        };
        let velocity = direction * (intent.speed.max(0.0) * self.speed_factor);

        MovementCommand {
            velocity,
            displacement: velocity * dt,
            rotation_delta: delta_angle(heading, new_heading),
            heading: new_heading,
        }
    }

    fn update_speed_factor(&mut self, remaining_turn: f32, dt: f32) {
        let threshold = self.config.sharp_turn_threshold;
        if remaining_turn > threshold {
            let t = ((remaining_turn - threshold) / (180.0 - threshold)).clamp(0.0, 1.0);
            self.speed_factor = 1.0 + (self.config.min_speed_factor - 1.0) * t;
        } else {
            self.speed_factor = (self.speed_factor + self.config.speed_recovery_rate * dt).min(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::arena::Arena;

    const DT: f32 = 1.0 / 30.0;

    fn controller() -> SteeringController {
        SteeringController::new(SteeringConfig::default())
    }

    #[test]
    fn test_rotation_is_rate_limited() {
        let mut steering = controller();
        let command = steering.steer(0.0, SteeringIntent::hold().facing(90.0), DT);

        // 180 deg/s over one 30 Hz tick
        assert!((command.rotation_delta - 6.0).abs() < 1e-3);
        assert!((command.heading - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_multiplier_speeds_up_turn() {
        let mut steering = controller();
        let intent = SteeringIntent::hold().facing(90.0).with_rotation_multiplier(2.0);
        let command = steering.steer(0.0, intent, DT);
        assert!((command.rotation_delta - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_takes_short_arc() {
        let mut steering = controller();
        let command = steering.steer(10.0, SteeringIntent::hold().facing(350.0), DT);
        assert!(command.rotation_delta < 0.0);
    }

    #[test]
    fn test_turn_completes_within_epsilon() {
        let mut steering = controller();
        steering.start_turn(30.0, TurnKind::Random);

        let mut heading = 0.0;
        for _ in 0..10 {
            heading = steering.steer(heading, SteeringIntent::forward(2.0), DT).heading;
        }
        assert!(!steering.is_turning());
        assert!(delta_angle(heading, 30.0).abs() <= 2.0);
    }

    #[test]
    fn test_turn_around_slows_but_keeps_moving() {
        let mut steering = controller();
        steering.start_turn(180.0, TurnKind::TurnAround);

        let command = steering.steer(0.0, SteeringIntent::forward(2.0), DT);
        let speed = command.velocity.length();
        assert!(speed > 0.0);
        assert!(speed < 2.0);
        assert!((steering.speed_factor() - 0.3).abs() < 0.05);
    }

    #[test]
    fn test_speed_recovers_after_turn() {
        let mut steering = controller();
        steering.start_turn(180.0, TurnKind::TurnAround);

        let mut heading = 0.0;
        for _ in 0..90 {
            heading = steering.steer(heading, SteeringIntent::forward(2.0), DT).heading;
        }
        assert!(!steering.is_turning());
        assert!((steering.speed_factor() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_is_velocity_times_dt() {
        let mut steering = controller();
        let command = steering.steer(0.0, SteeringIntent::forward(3.0), 0.1);
        assert!(command.velocity.approx_eq(Vec2::new(3.0, 0.0), 1e-5));
        assert!(command.displacement.approx_eq(Vec2::new(0.3, 0.0), 1e-5));
    }

    #[test]
    fn test_fixed_direction_ignores_heading() {
        let mut steering = controller();
        let intent = SteeringIntent {
            face: None,
            speed: 2.0,
            rotation_multiplier: 1.0,
            motion: Motion::Direction(Vec2::new(0.0, -5.0)),
        };
        let command = steering.steer(0.0, intent, DT);
        assert!(command.velocity.approx_eq(Vec2::new(0.0, -2.0), 1e-5));
        assert_eq!(command.rotation_delta, 0.0);
    }

    #[test]
    fn test_fan_clear_in_open_space() {
        let arena = Arena::new();
        let fan = controller().fan_cast(Vec2::ZERO, 0.0, &arena);
        assert!(fan.clear);
        assert_eq!(fan.center, None);
    }

    #[test]
    fn test_fan_blocked_by_wall_ahead() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(0.8, -3.0), Vec2::new(0.8, 3.0));
        let fan = controller().fan_cast(Vec2::ZERO, 0.0, &arena);
        assert!(!fan.clear);
        assert!(fan.left.is_some());
        assert!(fan.right.is_some());
    }

    #[test]
    fn test_fan_ignores_flank_hits() {
        // Wall only reachable by the left ray
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(0.5, 0.5), Vec2::new(2.0, 0.5));
        let fan = controller().fan_cast(Vec2::ZERO, 0.0, &arena);
        assert!(fan.left.is_some());
        assert_eq!(fan.center, None);
        assert!(fan.clear);
    }

    #[test]
    fn test_wall_beyond_clearance_keeps_path_clear() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(1.5, -1.0), Vec2::new(1.5, 1.0));
        let fan = controller().fan_cast(Vec2::ZERO, 0.0, &arena);
        assert!(fan.center.is_some());
        assert!(fan.clear);
    }

    #[test]
    fn test_detour_prefers_widest_clear_probe() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(0.5, -3.0), Vec2::new(0.5, 3.0));
        let detour = controller().probe_detour(Vec2::ZERO, 0.0, &arena);
        let direction = detour.expect("perpendicular probe should be clear");
        assert!(direction.approx_eq(Vec2::UP, 1e-5));
    }

    #[test]
    fn test_detour_none_when_boxed_in() {
        let mut arena = Arena::new();
        arena.add_wall(Vec2::new(0.5, -3.0), Vec2::new(0.5, 3.0));
        arena.add_wall(Vec2::new(-3.0, 0.5), Vec2::new(3.0, 0.5));
        arena.add_wall(Vec2::new(-3.0, -0.5), Vec2::new(3.0, -0.5));
        assert_eq!(controller().probe_detour(Vec2::ZERO, 0.0, &arena), None);
    }
}
