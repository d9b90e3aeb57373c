//! Tuning values for the enemy AI and the headless simulation
//!
//! Every knob has a default in [`crate::game::constants`]. `load_or_default`
//! layers an optional JSON file (`AI_CONFIG_PATH`) and individual environment
//! overrides on top, warning and keeping the previous value when an override
//! does not parse. Invalid combinations are rejected once by `validate`, never
//! per tick.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::constants::{awareness, combat, fsm, perception, sim, stats, steering};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{0}")]
    Inconsistent(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails this check too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Sight and hearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub sight_range: f32,
    /// Full cone width in degrees
    pub sight_angle: f32,
    pub hearing_radius: f32,
    pub min_loudness: f32,
    /// Require an unobstructed line for hearing as well as for sight
    pub hearing_blocked_by_walls: bool,
    pub full_light_level: f32,
    pub dark_sight_range: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            sight_range: perception::SIGHT_RANGE,
            sight_angle: perception::SIGHT_ANGLE,
            hearing_radius: perception::HEARING_RADIUS,
            min_loudness: perception::MIN_LOUDNESS,
            hearing_blocked_by_walls: false,
            full_light_level: perception::FULL_LIGHT_LEVEL,
            dark_sight_range: perception::DARK_SIGHT_RANGE,
        }
    }
}

impl PerceptionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("perception.sight_range", self.sight_range)?;
        within("perception.sight_angle", self.sight_angle, 0.0, 360.0)?;
        non_negative("perception.hearing_radius", self.hearing_radius)?;
        non_negative("perception.min_loudness", self.min_loudness)?;
        non_negative("perception.full_light_level", self.full_light_level)?;
        non_negative("perception.dark_sight_range", self.dark_sight_range)?;
        Ok(())
    }
}

/// Tension meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwarenessConfig {
    pub max_tension: f32,
    pub fill_rate: f32,
    pub drain_rate: f32,
    pub very_close_distance: f32,
    /// Distance at which the proximity fill factor reaches zero
    pub effective_range: f32,
}

impl Default for AwarenessConfig {
    fn default() -> Self {
        Self {
            max_tension: awareness::MAX_TENSION,
            fill_rate: awareness::FILL_RATE,
            drain_rate: awareness::DRAIN_RATE,
            very_close_distance: awareness::VERY_CLOSE_DISTANCE,
            effective_range: perception::SIGHT_RANGE,
        }
    }
}

impl AwarenessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("awareness.max_tension", self.max_tension)?;
        positive("awareness.fill_rate", self.fill_rate)?;
        non_negative("awareness.drain_rate", self.drain_rate)?;
        non_negative("awareness.very_close_distance", self.very_close_distance)?;
        positive("awareness.effective_range", self.effective_range)?;
        Ok(())
    }
}

/// State machine timers, speeds and roaming randomness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmConfig {
    pub forget_timeout: f32,
    pub short_grace_window: f32,
    pub investigation_time: f32,
    pub arrival_threshold: f32,
    pub roaming_speed: f32,
    pub investigation_speed: f32,
    pub combat_speed: f32,
    pub chase_multiplier: f32,
    pub min_standoff_distance: f32,
    pub shoot_toggle_cooldown: f32,
    pub direction_change_interval: f32,
    pub direction_change_probability: f32,
    pub random_turn_min: f32,
    pub random_turn_max: f32,
    pub look_around_interval: f32,
    pub help_radius: f32,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            forget_timeout: fsm::FORGET_TIMEOUT,
            short_grace_window: fsm::SHORT_GRACE_WINDOW,
            investigation_time: fsm::INVESTIGATION_TIME,
            arrival_threshold: fsm::ARRIVAL_THRESHOLD,
            roaming_speed: fsm::ROAMING_SPEED,
            investigation_speed: fsm::INVESTIGATION_SPEED,
            combat_speed: fsm::COMBAT_SPEED,
            chase_multiplier: fsm::CHASE_MULTIPLIER,
            min_standoff_distance: fsm::MIN_STANDOFF_DISTANCE,
            shoot_toggle_cooldown: fsm::SHOOT_TOGGLE_COOLDOWN,
            direction_change_interval: fsm::DIRECTION_CHANGE_INTERVAL,
            direction_change_probability: fsm::DIRECTION_CHANGE_PROBABILITY,
            random_turn_min: fsm::RANDOM_TURN_MIN,
            random_turn_max: fsm::RANDOM_TURN_MAX,
            look_around_interval: fsm::LOOK_AROUND_INTERVAL,
            help_radius: fsm::HELP_RADIUS,
        }
    }
}

impl FsmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fsm.forget_timeout", self.forget_timeout)?;
        non_negative("fsm.short_grace_window", self.short_grace_window)?;
        if self.forget_timeout <= self.short_grace_window {
            return Err(ConfigError::Inconsistent(
                "fsm.forget_timeout must exceed fsm.short_grace_window",
            ));
        }
        positive("fsm.investigation_time", self.investigation_time)?;
        positive("fsm.arrival_threshold", self.arrival_threshold)?;
        non_negative("fsm.roaming_speed", self.roaming_speed)?;
        non_negative("fsm.investigation_speed", self.investigation_speed)?;
        non_negative("fsm.combat_speed", self.combat_speed)?;
        positive("fsm.chase_multiplier", self.chase_multiplier)?;
        non_negative("fsm.min_standoff_distance", self.min_standoff_distance)?;
        positive("fsm.shoot_toggle_cooldown", self.shoot_toggle_cooldown)?;
        positive("fsm.direction_change_interval", self.direction_change_interval)?;
        within(
            "fsm.direction_change_probability",
            self.direction_change_probability,
            0.0,
            1.0,
        )?;
        within("fsm.random_turn_min", self.random_turn_min, 0.0, 180.0)?;
        within("fsm.random_turn_max", self.random_turn_max, 0.0, 180.0)?;
        if self.random_turn_min > self.random_turn_max {
            return Err(ConfigError::Inconsistent(
                "fsm.random_turn_min cannot exceed fsm.random_turn_max",
            ));
        }
        positive("fsm.look_around_interval", self.look_around_interval)?;
        non_negative("fsm.help_radius", self.help_radius)?;
        Ok(())
    }
}

/// Rotation limits and the obstacle fan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub rotation_speed: f32,
    pub combat_rotation_multiplier: f32,
    pub probe_spread: f32,
    pub probe_distance: f32,
    pub min_clearance: f32,
    pub turn_epsilon: f32,
    pub sharp_turn_threshold: f32,
    pub min_speed_factor: f32,
    pub speed_recovery_rate: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            rotation_speed: steering::ROTATION_SPEED,
            combat_rotation_multiplier: steering::COMBAT_ROTATION_MULTIPLIER,
            probe_spread: steering::PROBE_SPREAD,
            probe_distance: steering::PROBE_DISTANCE,
            min_clearance: steering::MIN_CLEARANCE,
            turn_epsilon: steering::TURN_EPSILON,
            sharp_turn_threshold: steering::SHARP_TURN_THRESHOLD,
            min_speed_factor: steering::MIN_SPEED_FACTOR,
            speed_recovery_rate: steering::SPEED_RECOVERY_RATE,
        }
    }
}

impl SteeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("steering.rotation_speed", self.rotation_speed)?;
        positive(
            "steering.combat_rotation_multiplier",
            self.combat_rotation_multiplier,
        )?;
        within("steering.probe_spread", self.probe_spread, 0.0, 180.0)?;
        positive("steering.probe_distance", self.probe_distance)?;
        non_negative("steering.min_clearance", self.min_clearance)?;
        if self.min_clearance > self.probe_distance {
            return Err(ConfigError::Inconsistent(
                "steering.min_clearance cannot exceed steering.probe_distance",
            ));
        }
        positive("steering.turn_epsilon", self.turn_epsilon)?;
        within(
            "steering.sharp_turn_threshold",
            self.sharp_turn_threshold,
            0.0,
            179.0,
        )?;
        // Zero would stop the agent dead during a turn-around
        within("steering.min_speed_factor", self.min_speed_factor, 0.01, 1.0)?;
        positive("steering.speed_recovery_rate", self.speed_recovery_rate)?;
        Ok(())
    }
}

/// Fear/health modifiers and fallback timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Only fire once the tension meter is full
    pub require_full_tension: bool,
    pub accuracy_fear_penalty: f32,
    pub rate_of_fire_fear_penalty: f32,
    pub rate_of_fire_aggression_bonus: f32,
    pub min_rate_of_fire: f32,
    pub default_fallback_duration: f32,
    pub fallback_seconds_per_fear: f32,
    pub max_fallback_duration: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            require_full_tension: true,
            accuracy_fear_penalty: combat::ACCURACY_FEAR_PENALTY,
            rate_of_fire_fear_penalty: combat::RATE_OF_FIRE_FEAR_PENALTY,
            rate_of_fire_aggression_bonus: combat::RATE_OF_FIRE_AGGRESSION_BONUS,
            min_rate_of_fire: combat::MIN_RATE_OF_FIRE,
            default_fallback_duration: combat::DEFAULT_FALLBACK_DURATION,
            fallback_seconds_per_fear: combat::FALLBACK_SECONDS_PER_FEAR,
            max_fallback_duration: combat::MAX_FALLBACK_DURATION,
        }
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        within(
            "combat.accuracy_fear_penalty",
            self.accuracy_fear_penalty,
            0.0,
            1.0,
        )?;
        within(
            "combat.rate_of_fire_fear_penalty",
            self.rate_of_fire_fear_penalty,
            0.0,
            1.0,
        )?;
        within(
            "combat.rate_of_fire_aggression_bonus",
            self.rate_of_fire_aggression_bonus,
            0.0,
            1.0,
        )?;
        positive("combat.min_rate_of_fire", self.min_rate_of_fire)?;
        positive(
            "combat.default_fallback_duration",
            self.default_fallback_duration,
        )?;
        non_negative(
            "combat.fallback_seconds_per_fear",
            self.fallback_seconds_per_fear,
        )?;
        if self.max_fallback_duration < self.default_fallback_duration {
            return Err(ConfigError::Inconsistent(
                "combat.max_fallback_duration cannot be below combat.default_fallback_duration",
            ));
        }
        Ok(())
    }
}

/// Starting stat block for spawned enemies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub max_health: f32,
    pub armor: f32,
    pub speed: f32,
    pub accuracy: f32,
    pub rate_of_fire: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub max_fear: f32,
    pub fear_increase_on_hit: f32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            max_health: stats::MAX_HEALTH,
            armor: stats::ARMOR,
            speed: stats::SPEED,
            accuracy: stats::ACCURACY,
            rate_of_fire: stats::RATE_OF_FIRE,
            attack_power: stats::ATTACK_POWER,
            attack_range: stats::ATTACK_RANGE,
            max_fear: stats::MAX_FEAR,
            fear_increase_on_hit: stats::FEAR_INCREASE_ON_HIT,
        }
    }
}

impl StatsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("stats.max_health", self.max_health)?;
        non_negative("stats.armor", self.armor)?;
        non_negative("stats.speed", self.speed)?;
        within("stats.accuracy", self.accuracy, 0.0, 1.0)?;
        positive("stats.rate_of_fire", self.rate_of_fire)?;
        non_negative("stats.attack_power", self.attack_power)?;
        positive("stats.attack_range", self.attack_range)?;
        positive("stats.max_fear", self.max_fear)?;
        non_negative("stats.fear_increase_on_hit", self.fear_increase_on_hit)?;
        Ok(())
    }
}

/// Full AI tuning block shared by every agent a manager spawns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub perception: PerceptionConfig,
    pub awareness: AwarenessConfig,
    pub fsm: FsmConfig,
    pub steering: SteeringConfig,
    pub combat: CombatConfig,
    pub stats: StatsConfig,
}

impl AiConfig {
    /// Parse a JSON config file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load config from `AI_CONFIG_PATH` and environment overrides, or use defaults
    pub fn load_or_default() -> Self {
        let mut config = match std::env::var("AI_CONFIG_PATH") {
            Ok(path) => match Self::from_json_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        override_f32("AI_SIGHT_RANGE", &mut config.perception.sight_range);
        override_f32("AI_SIGHT_ANGLE", &mut config.perception.sight_angle);
        override_f32("AI_HEARING_RADIUS", &mut config.perception.hearing_radius);
        override_bool(
            "AI_HEARING_BLOCKED_BY_WALLS",
            &mut config.perception.hearing_blocked_by_walls,
        );
        override_f32("AI_MAX_TENSION", &mut config.awareness.max_tension);
        override_f32("AI_FILL_RATE", &mut config.awareness.fill_rate);
        override_f32("AI_DRAIN_RATE", &mut config.awareness.drain_rate);
        override_f32("AI_FORGET_TIMEOUT", &mut config.fsm.forget_timeout);
        override_f32("AI_GRACE_WINDOW", &mut config.fsm.short_grace_window);
        override_f32("AI_INVESTIGATION_TIME", &mut config.fsm.investigation_time);
        override_f32("AI_ROTATION_SPEED", &mut config.steering.rotation_speed);
        override_bool(
            "AI_REQUIRE_FULL_TENSION",
            &mut config.combat.require_full_tension,
        );

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.perception.validate()?;
        self.awareness.validate()?;
        self.fsm.validate()?;
        self.steering.validate()?;
        self.combat.validate()?;
        self.stats.validate()?;
        Ok(())
    }
}

fn override_f32(name: &str, field: &mut f32) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse::<f32>() {
            Ok(parsed) if parsed.is_finite() => *field = parsed,
            _ => tracing::warn!("Invalid {} '{}', using {}", name, raw, field),
        }
    }
}

fn override_bool(name: &str, field: &mut bool) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse::<bool>() {
            Ok(parsed) => *field = parsed,
            Err(_) => tracing::warn!("Invalid {} '{}', using {}", name, raw, field),
        }
    }
}

/// Headless simulation runner configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub tick_rate: u32,
    pub enemy_count: usize,
    pub seed: u64,
    /// Serve metrics on this port when set
    pub metrics_port: Option<u16>,
    /// Stop after this many seconds of simulated time; run until Ctrl+C when unset
    pub duration_secs: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: sim::TICK_RATE,
            enemy_count: crate::game::constants::spawn::MAX_ENEMIES,
            seed: 42,
            metrics_port: None,
            duration_secs: None,
        }
    }
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(rate) = std::env::var("SIM_TICK_RATE") {
            match rate.parse::<u32>() {
                Ok(parsed) if (1..=240).contains(&parsed) => config.tick_rate = parsed,
                _ => tracing::warn!("SIM_TICK_RATE must be 1-240, got '{}', using default", rate),
            }
        }

        if let Ok(count) = std::env::var("SIM_ENEMIES") {
            if let Ok(parsed) = count.parse::<usize>() {
                config.enemy_count = parsed;
            } else {
                tracing::warn!("Invalid SIM_ENEMIES '{}', using default", count);
            }
        }

        if let Ok(seed) = std::env::var("SIM_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = parsed;
            } else {
                tracing::warn!("Invalid SIM_SEED '{}', using default", seed);
            }
        }

        if let Ok(port) = std::env::var("METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) if parsed > 0 => config.metrics_port = Some(parsed),
                _ => tracing::warn!("Invalid METRICS_PORT '{}', metrics disabled", port),
            }
        }

        if let Ok(duration) = std::env::var("SIM_DURATION") {
            match duration.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 => config.duration_secs = Some(parsed),
                _ => tracing::warn!("Invalid SIM_DURATION '{}', running until stopped", duration),
            }
        }

        config
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Inconsistent("tick_rate cannot be 0"));
        }
        if self.enemy_count == 0 {
            return Err(ConfigError::Inconsistent("enemy_count must be at least 1"));
        }
        Ok(())
    }
}
