//! Shooting decisions and hit reactions
//!
//! Fear slows the trigger finger and spoils the aim; a healthy, calm agent
//! fires slightly faster than its base rate. A failed hit roll still spends
//! the shot so missing never speeds up the next attempt.

use serde::Serialize;

use crate::config::CombatConfig;
use crate::game::agent::AgentId;
use crate::game::systems::stats::StatsModel;
use crate::game::world::RandomSource;
use crate::util::vec2::Vec2;

/// Projectile spawn request handed to the host engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireRequest {
    pub shooter: AgentId,
    pub origin: Vec2,
    /// Unit vector
    pub direction: Vec2,
    pub damage: f32,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// Still cooling down
    NotReady,
    Fired(FireRequest),
    /// Hit roll failed; the cooldown was consumed anyway
    Missed,
}

/// Everything the fire gate looks at besides the cooldown
#[derive(Debug, Clone, Copy)]
pub struct EngagementCheck {
    pub weapon_enabled: bool,
    pub target_in_sight: bool,
    pub distance: f32,
    pub tension_full: bool,
}

#[derive(Debug, Clone)]
pub struct CombatController {
    config: CombatConfig,
    next_fire_at: f64,
}

impl CombatController {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            next_fire_at: 0.0,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn next_fire_at(&self) -> f64 {
        self.next_fire_at
    }

    pub fn ready(&self, now: f64) -> bool {
        now >= self.next_fire_at
    }

    /// Weapon flag, sight, range and tension preconditions
    pub fn may_engage(&self, check: EngagementCheck, stats: &StatsModel) -> bool {
        check.weapon_enabled
            && check.target_in_sight
            && check.distance <= stats.attack_range
            && (check.tension_full || !self.config.require_full_tension)
    }

    /// Shots per second after fear and aggression modifiers
    pub fn effective_rate_of_fire(&self, stats: &StatsModel) -> f32 {
        let fear = stats.fear_factor();
        let aggression = stats.aggression();
        let rate = stats.rate_of_fire
            * (1.0 - fear * self.config.rate_of_fire_fear_penalty)
            * (1.0 + (aggression - 0.5) * 2.0 * self.config.rate_of_fire_aggression_bonus);
        rate.max(self.config.min_rate_of_fire)
    }

    /// Hit chance after the fear penalty, in [0, 1]
    pub fn effective_accuracy(&self, stats: &StatsModel) -> f32 {
        (stats.accuracy * (1.0 - stats.fear_factor() * self.config.accuracy_fear_penalty))
            .clamp(0.0, 1.0)
    }

    /// Attempt a shot at `target`.
    ///
    /// Preconditions other than the cooldown are checked by the caller with
    /// [`CombatController::may_engage`].
    pub fn try_fire(
        &mut self,
        now: f64,
        shooter: AgentId,
        origin: Vec2,
        target: Vec2,
        stats: &StatsModel,
        rng: &mut dyn RandomSource,
    ) -> FireOutcome {
        if !self.ready(now) {
            return FireOutcome::NotReady;
        }

        self.next_fire_at = now + 1.0 / f64::from(self.effective_rate_of_fire(stats));

        if rng.uniform01() > self.effective_accuracy(stats) {
            return FireOutcome::Missed;
        }

        let direction = (target - origin).normalize();
        if direction == Vec2::ZERO {
            return FireOutcome::Missed;
        }

        FireOutcome::Fired(FireRequest {
            shooter,
            origin,
            direction,
            damage: stats.attack_power,
            range: stats.attack_range,
        })
    }

    /// Seconds to fall back after being hit at the current fear level
    pub fn fallback_duration(&self, stats: &StatsModel) -> f32 {
        let scaled = (stats.fear_level * self.config.fallback_seconds_per_fear)
            .min(self.config.max_fallback_duration);
        if scaled > 0.0 {
            scaled
        } else {
            self.config.default_fallback_duration
        }
    }

    pub fn reset(&mut self) {
        self.next_fire_at = 0.0;
    }
}
