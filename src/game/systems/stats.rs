//! Per-agent health, fear and weapon stats

use serde::{Deserialize, Serialize};

use crate::config::StatsConfig;

/// Stat block owned by a single agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsModel {
    pub health: f32,
    pub max_health: f32,
    /// Flat reduction applied to every incoming hit
    pub armor: f32,
    pub speed: f32,
    /// Base hit chance in [0, 1]
    pub accuracy: f32,
    /// Base shots per second
    pub rate_of_fire: f32,
    /// Damage carried by each projectile
    pub attack_power: f32,
    /// Weapon range
    pub attack_range: f32,
    pub fear_level: f32,
    pub max_fear_level: f32,
    pub fear_increase_on_hit: f32,
}

impl StatsModel {
    /// Fresh stat block at full health and no fear
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            health: config.max_health,
            max_health: config.max_health,
            armor: config.armor,
            speed: config.speed,
            accuracy: config.accuracy,
            rate_of_fire: config.rate_of_fire,
            attack_power: config.attack_power,
            attack_range: config.attack_range,
            fear_level: 0.0,
            max_fear_level: config.max_fear,
            fear_increase_on_hit: config.fear_increase_on_hit,
        }
    }

    /// Apply a hit and return the damage that actually landed.
    ///
    /// Armor is subtracted first and the result never goes below zero, so a
    /// hit weaker than the armor heals nothing and hurts nothing.
    pub fn take_damage(&mut self, damage: f32) -> f32 {
        if !damage.is_finite() {
            return 0.0;
        }
        let effective = (damage - self.armor).max(0.0);
        let before = self.health;
        self.health = (self.health - effective).clamp(0.0, self.max_health);
        before - self.health
    }

    /// Raise fear, clamped to the maximum
    pub fn raise_fear(&mut self, amount: f32) {
        self.fear_level = (self.fear_level + amount).clamp(0.0, self.max_fear_level);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Fear as a fraction of its maximum
    pub fn fear_factor(&self) -> f32 {
        if self.max_fear_level > 0.0 {
            (self.fear_level / self.max_fear_level).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Health as a fraction of its maximum
    pub fn health_factor(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Healthy and calm agents are aggressive: health fraction scaled by calmness
    pub fn aggression(&self) -> f32 {
        self.health_factor() * (1.0 - self.fear_factor())
    }

    /// Back to spawn condition
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.fear_level = 0.0;
    }
}

impl Default for StatsModel {
    fn default() -> Self {
        Self::new(&StatsConfig::default())
    }
}
