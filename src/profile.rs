//! Locomotion profile.
//!
//! The host's ground/air locomotion reads these settings. Swinging needs
//! friction and air control switched off and rotation decoupled from
//! movement; the controller captures the host's profile the first time a
//! swing starts and restores it whenever the swing ends.

use bevy::prelude::*;

/// Host locomotion settings that swinging overrides.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct LocomotionProfile {
    /// Rotate the character to face its movement direction.
    pub orient_rotation_to_movement: bool,
    /// Friction applied while walking.
    pub ground_friction: f32,
    /// Lateral friction applied while falling.
    pub falling_lateral_friction: f32,
    /// Fraction of lateral control available in the air.
    pub air_control: f32,
}

impl Default for LocomotionProfile {
    fn default() -> Self {
        Self {
            orient_rotation_to_movement: true,
            ground_friction: 8.0,
            falling_lateral_friction: 0.0,
            air_control: 0.2,
        }
    }
}

impl LocomotionProfile {
    /// The profile applied while swinging.
    pub fn swinging() -> Self {
        Self {
            orient_rotation_to_movement: false,
            ground_friction: 0.0,
            falling_lateral_friction: 0.0,
            air_control: 0.0,
        }
    }

    /// Builder: set air control.
    pub fn with_air_control(mut self, air_control: f32) -> Self {
        self.air_control = air_control;
        self
    }

    /// Builder: set ground friction.
    pub fn with_ground_friction(mut self, friction: f32) -> Self {
        self.ground_friction = friction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swinging_disables_friction_and_air_control() {
        let profile = LocomotionProfile::swinging();
        assert!(!profile.orient_rotation_to_movement);
        assert_eq!(profile.ground_friction, 0.0);
        assert_eq!(profile.falling_lateral_friction, 0.0);
        assert_eq!(profile.air_control, 0.0);
    }

    #[test]
    fn builders_override_defaults() {
        let profile = LocomotionProfile::default()
            .with_air_control(1.0)
            .with_ground_friction(2.0);
        assert_eq!(profile.air_control, 1.0);
        assert_eq!(profile.ground_friction, 2.0);
        assert!(profile.orient_rotation_to_movement);
    }
}
