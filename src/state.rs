//! Swing state and state marker components.
//!
//! [`SwingState`] is the authoritative state held by the controller. The
//! marker components mirror it (and the airborne flag) so game code can
//! filter queries with `With<Tethered>` and friends; they are added and
//! removed automatically by the controller systems.

use bevy::prelude::*;

/// Web-swing state machine.
///
/// `Idle → Searching` when swing is held while airborne,
/// `Searching → Tethered` when an anchor is acquired,
/// `Tethered → Idle` on release, landing or jump.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SwingState {
    /// Not swinging and not looking for an anchor.
    #[default]
    Idle,
    /// Casting rays for an anchor.
    Searching,
    /// Hanging from an anchor.
    Tethered,
}

/// Queries a swing simulation needs from whatever owns it.
pub trait LocomotionOwner {
    /// Whether the owner is in the air.
    fn is_falling(&self) -> bool;

    /// Whether the owner is hanging from an anchor.
    fn is_tethered(&self) -> bool;

    /// Governing anchor location, or [`Vec3::ZERO`] when not tethered.
    fn anchor_location(&self) -> Vec3;

    /// Governing tether length, or `-1.0` when not tethered.
    fn tether_length(&self) -> f32;
}

/// Whether the owner may swing.
///
/// With `to_start` the owner must not already be tethered (starting a swing);
/// otherwise it must be tethered (continuing one). Either way it must be
/// falling.
pub fn can_swing(owner: &impl LocomotionOwner, to_start: bool) -> bool {
    owner.is_falling() && (to_start != owner.is_tethered())
}

/// Marker component indicating the character is airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is searching for an anchor.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct SearchingAnchor;

/// Marker component indicating the character is tethered.
///
/// Contains the governing anchor location and tether length at the time
/// the marker was last synced.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct Tethered {
    /// Anchor the character swings around.
    pub anchor: Vec3,
    /// Tether length.
    pub length: f32,
}

impl Tethered {
    /// Create a new tethered marker.
    pub fn new(anchor: Vec3, length: f32) -> Self {
        Self { anchor, length }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner {
        falling: bool,
        tethered: bool,
    }

    impl LocomotionOwner for Owner {
        fn is_falling(&self) -> bool {
            self.falling
        }
        fn is_tethered(&self) -> bool {
            self.tethered
        }
        fn anchor_location(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn tether_length(&self) -> f32 {
            -1.0
        }
    }

    #[test]
    fn swing_state_default_is_idle() {
        assert_eq!(SwingState::default(), SwingState::Idle);
    }

    #[test]
    fn can_start_only_when_falling_and_free() {
        let owner = Owner { falling: true, tethered: false };
        assert!(can_swing(&owner, true));
        assert!(!can_swing(&owner, false));

        let grounded = Owner { falling: false, tethered: false };
        assert!(!can_swing(&grounded, true));
    }

    #[test]
    fn can_continue_only_when_falling_and_tethered() {
        let owner = Owner { falling: true, tethered: true };
        assert!(can_swing(&owner, false));
        assert!(!can_swing(&owner, true));

        let landed = Owner { falling: false, tethered: true };
        assert!(!can_swing(&landed, false));
    }

    #[test]
    fn tethered_marker_new() {
        let marker = Tethered::new(Vec3::Y, 5.0);
        assert_eq!(marker.anchor, Vec3::Y);
        assert_eq!(marker.length, 5.0);
    }
}
