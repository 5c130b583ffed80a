//! Tether simulation.
//!
//! While tethered, the actor moves on or inside a sphere of radius
//! `tether_length` around the governing anchor, like a pendulum bob on an
//! inextensible rope:
//!
//! 1. When the rope is taut (distance ≥ length) the outward radial velocity is
//!    removed and a centripetal force `m·v²/L` pulls toward the anchor.
//! 2. When the actor has drifted past the rope length (discrete timestep
//!    error) it is placed back on the sphere, on the same direction.
//! 3. Player steering is a force tangent to the sphere.

use bevy::prelude::*;

use crate::anchor::Anchor;

/// Result of one tether step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherStep {
    /// Velocity after the constraint and forces.
    pub velocity: Vec3,
    /// Position the actor must be teleported to, if it was over-extended.
    pub position: Option<Vec3>,
    /// Total force integrated this step (centripetal + steering).
    pub force: Vec3,
    /// Whether the tether was taut at the start of the step.
    pub taut: bool,
}

/// Advance the tether constraint by one tick.
///
/// `player_force` is integrated together with the centripetal force as
/// `F / mass * dt`. A non-positive mass integrates no force.
pub fn step(
    actor_position: Vec3,
    velocity: Vec3,
    anchor: &Anchor,
    mass: f32,
    player_force: Vec3,
    dt: f32,
) -> TetherStep {
    let length = anchor.tether_length();
    let to_anchor = anchor.location() - actor_position;
    let distance_sq = to_anchor.length_squared();
    let length_sq = length * length;
    let direction = to_anchor.normalize_or_zero();

    let mut velocity = velocity;
    let mut force = player_force;
    let mut position = None;
    let taut = distance_sq >= length_sq;

    if taut {
        // Negative radial speed means moving away from the anchor.
        let radial = velocity.dot(direction);
        if radial < 0.0 {
            velocity -= direction * radial;
        }

        if length > f32::EPSILON {
            let horizontal_speed_sq = velocity.xz().length_squared();
            force += direction * (mass * horizontal_speed_sq / length);
        }

        if distance_sq > length_sq {
            position = Some(anchor.location() - direction * length);
        }
    }

    if mass > 0.0 {
        velocity += force / mass * dt;
    }

    TetherStep {
        velocity,
        position,
        force,
        taut,
    }
}

/// Steering force from the movement axes while tethered.
///
/// The control rotation's forward and right axes are projected onto the
/// plane perpendicular to the actor→anchor direction, so steering only ever
/// swings the actor around the anchor. The result is clamped to `max_force`.
pub fn steering_force(
    control_rotation: Quat,
    move_forward: f32,
    move_right: f32,
    actor_position: Vec3,
    anchor_location: Vec3,
    max_force: f32,
) -> Vec3 {
    if move_forward == 0.0 && move_right == 0.0 {
        return Vec3::ZERO;
    }

    let to_anchor = (anchor_location - actor_position).normalize_or_zero();
    let tangent = |axis: Vec3| -> Vec3 {
        if to_anchor == Vec3::ZERO {
            axis.normalize_or_zero()
        } else {
            axis.reject_from_normalized(to_anchor).normalize_or_zero()
        }
    };

    let forward = tangent(control_rotation * Vec3::NEG_Z);
    let right = tangent(control_rotation * Vec3::X);

    ((forward * move_forward + right * move_right) * max_force).clamp_length_max(max_force.max(0.0))
}

/// Velocity change when jumping out of a swing.
///
/// Converts the upward part of the swing velocity into vertical launch speed
/// and the forward part into horizontal launch speed, both scaled by the jump
/// charge ratio and `multiplier`.
pub fn release_velocity(
    charge_ratio: f32,
    velocity: Vec3,
    up: Vec3,
    forward: Vec3,
    multiplier: f32,
) -> Vec3 {
    let up = up.normalize_or_zero();
    let forward = forward.normalize_or_zero();
    let vertical = charge_ratio * velocity.dot(up).max(0.0) * multiplier;
    let horizontal = charge_ratio * velocity.dot(forward) * multiplier;
    up * vertical + forward * horizontal
}
