//! Stealth Enemy AI Library
//!
//! Perception, tension, behavior state machine, steering and combat for the
//! enemies of a top-down stealth game. The host engine supplies ray casts,
//! the target's pose and a clock; the library returns movement commands and
//! projectile spawn requests.
//!
//! # Features
//!
//! - `parallel` - Tick agents on the rayon thread pool (enabled by default).
//!   Without it rayon is not compiled and agents tick sequentially.

pub mod config;
pub mod game;
pub mod metrics;
pub mod util;
