//! Charged jumping.
//!
//! Holding jump charges it; releasing fires a jump whose strength scales with
//! how long it was held. Jumping while tethered releases the tether and turns
//! the swing velocity into launch velocity instead.

use bevy::prelude::*;

use crate::config::JumpConfig;
use crate::tether;

/// Jump charge state machine.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum JumpCharge {
    /// Not charging.
    #[default]
    Idle,
    /// Jump held since `started_at` (seconds of elapsed time).
    Charging {
        /// Elapsed time when the charge began.
        started_at: f32,
    },
}

impl JumpCharge {
    /// Begin charging. Pressing again while charging restarts the charge.
    pub fn press(&mut self, now: f32) {
        *self = JumpCharge::Charging { started_at: now };
    }

    /// Stop charging and return the charge ratio, or `None` if not charging.
    pub fn release(&mut self, now: f32, full_charge_time: f32) -> Option<f32> {
        let ratio = self.ratio(now, full_charge_time);
        let was_charging = self.is_charging();
        *self = JumpCharge::Idle;
        was_charging.then_some(ratio)
    }

    /// Whether a charge is in progress.
    pub fn is_charging(&self) -> bool {
        matches!(self, JumpCharge::Charging { .. })
    }

    /// Current charge ratio in [0, 1]; zero when idle.
    pub fn ratio(&self, now: f32, full_charge_time: f32) -> f32 {
        match *self {
            JumpCharge::Idle => 0.0,
            JumpCharge::Charging { started_at } => charge_ratio(now - started_at, full_charge_time),
        }
    }
}

/// Normalize a hold duration against the full charge time, clamped to [0, 1].
pub fn charge_ratio(held_for: f32, full_charge_time: f32) -> f32 {
    if full_charge_time <= 0.0 {
        return 1.0;
    }
    (held_for / full_charge_time).clamp(0.0, 1.0)
}

/// Everything about the character a jump depends on.
#[derive(Debug, Clone, Copy)]
pub struct JumpContext {
    /// Whether the character is currently tethered.
    pub tethered: bool,
    /// Current velocity.
    pub velocity: Vec3,
    /// Character up direction.
    pub up: Vec3,
    /// Character forward direction.
    pub forward: Vec3,
    /// Whether the run input is held.
    pub running: bool,
}

/// Velocity change for a jump with the given charge ratio.
pub fn jump_velocity(charge_ratio: f32, config: &JumpConfig, context: &JumpContext) -> Vec3 {
    let up = context.up.normalize_or_zero();
    let forward = context.forward.normalize_or_zero();

    if charge_ratio < config.charge_threshold {
        return up * config.jump_velocity;
    }

    if context.tethered {
        return tether::release_velocity(
            charge_ratio,
            context.velocity,
            up,
            forward,
            config.swing_release_multiplier,
        );
    }

    let vertical = config.jump_velocity * (1.0 + charge_ratio * (config.velocity_scale_max - 1.0));
    let horizontal = if context.running {
        config.run_jump_forward_speed
    } else {
        0.0
    };
    up * vertical + forward * horizontal
}
