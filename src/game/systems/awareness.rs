//! Tension meter
//!
//! Suspicion rises while the target is in sight, faster the closer it is,
//! and drains slowly otherwise. The meter is not reset on loss of sight so a
//! brief occlusion does not forgive an almost alerted enemy.

use serde::Serialize;

use crate::config::AwarenessConfig;

#[derive(Debug, Clone, Serialize)]
pub struct AwarenessState {
    tension: f32,
    previous: f32,
    #[serde(skip)]
    config: AwarenessConfig,
}

impl AwarenessState {
    pub fn new(config: AwarenessConfig) -> Self {
        Self {
            tension: 0.0,
            previous: 0.0,
            config,
        }
    }

    /// Integrate one tick
    pub fn update(&mut self, target_in_sight: bool, distance: f32, dt: f32) {
        self.previous = self.tension;

        let next = if target_in_sight {
            if distance < self.config.very_close_distance {
                self.config.max_tension
            } else {
                let proximity = (1.0 - distance / self.config.effective_range).clamp(0.0, 1.0);
                self.tension + dt * self.config.fill_rate * proximity
            }
        } else {
            self.tension - dt * self.config.drain_rate
        };

        self.tension = if next.is_finite() {
            next.clamp(0.0, self.config.max_tension)
        } else {
            tracing::warn!(tension = next, "non-finite tension, keeping previous value");
            self.previous
        };
    }

    /// Skip integration for a tick, keeping the value where it is
    pub fn hold(&mut self) {
        self.previous = self.tension;
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    pub fn max_tension(&self) -> f32 {
        self.config.max_tension
    }

    /// Change during the last update
    pub fn tension_delta(&self) -> f32 {
        self.tension - self.previous
    }

    pub fn is_full(&self) -> bool {
        self.tension >= self.config.max_tension
    }

    pub fn reset(&mut self) {
        self.tension = 0.0;
        self.previous = 0.0;
    }
}
