//! Web dash.
//!
//! A dash fires one trace along the aim direction. On a hit the character is
//! yanked toward the hit point with an upward kick, and the resulting speed
//! is capped.

use bevy::prelude::*;

use crate::collision::RaySegment;
use crate::config::DashConfig;

/// The trace a dash casts.
pub fn dash_ray(origin: Vec3, aim: Vec3, config: &DashConfig) -> RaySegment {
    RaySegment::from_direction(origin, aim, config.trace_distance)
}

/// Velocity after dashing toward `target`.
pub fn dash_velocity(actor_position: Vec3, velocity: Vec3, target: Vec3, config: &DashConfig) -> Vec3 {
    let toward = (target - actor_position).normalize_or_zero();
    let boosted = velocity + toward * config.forward_impulse + Vec3::Y * config.up_impulse;
    boosted.clamp_length_max(config.max_velocity.max(0.0))
}
