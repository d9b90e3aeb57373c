/// Simulation timing
pub mod sim {
    /// Default tick rate in Hz
    pub const TICK_RATE: u32 = 30;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 30.0;
    /// Seconds of simulated time between summary log lines
    pub const SUMMARY_INTERVAL: f64 = 5.0;
    /// Seconds between the simulated player's return shots
    pub const PLAYER_FIRE_INTERVAL: f64 = 2.0;
    pub const PLAYER_DAMAGE: f32 = 25.0;
    pub const PLAYER_FIRE_RANGE: f32 = 8.0;
    /// Radius of the ring of spawn points around the arena centre
    pub const SPAWN_RING_RADIUS: f32 = 12.0;
    pub const SPAWN_POINT_COUNT: usize = 8;
}

/// Sight and hearing
pub mod perception {
    /// Maximum distance at which the target can be seen
    pub const SIGHT_RANGE: f32 = 10.0;
    /// Full width of the vision cone in degrees
    pub const SIGHT_ANGLE: f32 = 90.0;
    /// Radius within which a noisy target can be heard
    pub const HEARING_RADIUS: f32 = 2.0;
    /// Loudness the target must exceed to be heard
    pub const MIN_LOUDNESS: f32 = 0.01;
    /// Light level at or above which the target is visible at full sight range
    pub const FULL_LIGHT_LEVEL: f32 = 1.0;
    /// A poorly lit target is only seen closer than this
    pub const DARK_SIGHT_RANGE: f32 = 5.0;
}

/// Tension meter
pub mod awareness {
    pub const MAX_TENSION: f32 = 10.0;
    /// Tension gained per second at zero distance
    pub const FILL_RATE: f32 = 0.5;
    /// Tension lost per second while the target is out of sight
    pub const DRAIN_RATE: f32 = 0.2;
    /// Seeing the target closer than this fills the meter instantly
    pub const VERY_CLOSE_DISTANCE: f32 = 2.0;
}

/// Behavior state machine timing and speeds
pub mod fsm {
    /// Seconds after the last sighting before the target is forgotten
    pub const FORGET_TIMEOUT: f32 = 10.0;
    /// Seconds out of sight tolerated in Combat before dropping to Aware
    pub const SHORT_GRACE_WINDOW: f32 = 1.0;
    /// Seconds spent walking to the last known position before looking around
    pub const INVESTIGATION_TIME: f32 = 4.0;
    /// Distance at which the investigation point counts as reached
    pub const ARRIVAL_THRESHOLD: f32 = 0.5;
    pub const ROAMING_SPEED: f32 = 2.0;
    pub const INVESTIGATION_SPEED: f32 = 2.5;
    pub const COMBAT_SPEED: f32 = 3.0;
    /// Multiplier applied to combat speed when chasing along a clear line
    pub const CHASE_MULTIPLIER: f32 = 1.5;
    /// Chasing stops inside this distance
    pub const MIN_STANDOFF_DISTANCE: f32 = 3.0;
    /// Seconds between weapon eligibility re-evaluations
    pub const SHOOT_TOGGLE_COOLDOWN: f32 = 0.5;
    /// Seconds between random direction-change rolls while roaming
    pub const DIRECTION_CHANGE_INTERVAL: f32 = 3.0;
    /// Chance that a direction-change roll actually turns
    pub const DIRECTION_CHANGE_PROBABILITY: f32 = 0.4;
    pub const RANDOM_TURN_MIN: f32 = 20.0;
    pub const RANDOM_TURN_MAX: f32 = 90.0;
    /// Seconds between in-place turns while looking around
    pub const LOOK_AROUND_INTERVAL: f32 = 1.0;
    /// Radius within which allies answer a call for help
    pub const HELP_RADIUS: f32 = 12.0;
}

/// Steering and obstacle avoidance
pub mod steering {
    /// Maximum rotation rate in degrees per second
    pub const ROTATION_SPEED: f32 = 180.0;
    /// Rotation multiplier while facing a target in combat
    pub const COMBAT_ROTATION_MULTIPLIER: f32 = 2.0;
    /// Angular offset of the flank rays in the obstacle fan
    pub const PROBE_SPREAD: f32 = 30.0;
    /// Length of the obstacle fan rays
    pub const PROBE_DISTANCE: f32 = 2.0;
    /// The centre ray must be clear beyond this distance for the path to be clear
    pub const MIN_CLEARANCE: f32 = 1.0;
    /// A turn is complete once within this many degrees of the target heading
    pub const TURN_EPSILON: f32 = 2.0;
    /// Required turn above which speed is reduced
    pub const SHARP_TURN_THRESHOLD: f32 = 45.0;
    /// Speed factor used when the required turn is a full 180 degrees
    pub const MIN_SPEED_FACTOR: f32 = 0.3;
    /// Speed factor recovered per second once the turn is gentle again
    pub const SPEED_RECOVERY_RATE: f32 = 2.0;
    /// Headings probed around a blocked line to the target, widest first
    pub const DETOUR_ANGLES: [f32; 6] = [90.0, -90.0, 60.0, -60.0, 30.0, -30.0];
    /// Fraction of the requested speed used when reversing out of a dead end
    pub const REVERSE_SPEED_FACTOR: f32 = 0.5;
}

/// Weapon and fear modifiers
pub mod combat {
    /// Maximum fractional accuracy lost at full fear
    pub const ACCURACY_FEAR_PENALTY: f32 = 0.5;
    /// Maximum fractional rate-of-fire lost at full fear
    pub const RATE_OF_FIRE_FEAR_PENALTY: f32 = 0.3;
    /// Maximum fractional rate-of-fire gained when healthy and calm
    pub const RATE_OF_FIRE_AGGRESSION_BONUS: f32 = 0.2;
    /// Rate of fire never drops below this many shots per second
    pub const MIN_RATE_OF_FIRE: f32 = 0.1;
    /// Fallback duration when fear gives none
    pub const DEFAULT_FALLBACK_DURATION: f32 = 1.5;
    /// Fallback seconds per point of fear
    pub const FALLBACK_SECONDS_PER_FEAR: f32 = 1.0;
    /// Upper bound on a single fallback
    pub const MAX_FALLBACK_DURATION: f32 = 5.0;
}

/// Default enemy stat block
pub mod stats {
    pub const MAX_HEALTH: f32 = 100.0;
    pub const ARMOR: f32 = 0.0;
    pub const SPEED: f32 = 3.0;
    pub const ACCURACY: f32 = 0.9;
    /// Shots per second
    pub const RATE_OF_FIRE: f32 = 1.0;
    /// Damage carried by each projectile
    pub const ATTACK_POWER: f32 = 10.0;
    /// Weapon range
    pub const ATTACK_RANGE: f32 = 10.0;
    pub const MAX_FEAR: f32 = 5.0;
    pub const FEAR_INCREASE_ON_HIT: f32 = 1.0;
}

/// Spawning
pub mod spawn {
    /// Maximum number of enemies a manager keeps alive
    pub const MAX_ENEMIES: usize = 5;
}

/// Headless simulation arena
pub mod arena {
    /// Radius of the target's collider
    pub const TARGET_RADIUS: f32 = 0.4;
    /// Half the side length of the default square arena
    pub const HALF_EXTENT: f32 = 20.0;
    /// Walking speed of the simulated target
    pub const TARGET_SPEED: f32 = 2.5;
    /// Distance at which the simulated target counts a waypoint as reached
    pub const WAYPOINT_TOLERANCE: f32 = 0.25;
}

/// Spatial hashing for ally lookups
pub mod spatial {
    /// Grid cell size; at least the help radius keeps lookups to 3x3 cells
    pub const CELL_SIZE: f32 = 12.0;
}
