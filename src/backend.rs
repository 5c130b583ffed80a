//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the swing controller. This allows easy swapping between
//! physics engines (Rapier3D, XPBD, custom, etc.).
//!
//! Ray queries are not part of the trait. Backends register their own sensor
//! systems in [`SwingControllerSet::GroundSensors`] and
//! [`SwingControllerSet::AnchorSensors`] which fill
//! [`SwingController::set_ground`] and cast the queued rays with
//! [`SensorProbe::cast_with`]. Those systems can take the engine's query
//! context as an ordinary system parameter.
//!
//! [`SwingControllerSet::GroundSensors`]: crate::SwingControllerSet::GroundSensors
//! [`SwingControllerSet::AnchorSensors`]: crate::SwingControllerSet::AnchorSensors
//! [`SwingController::set_ground`]: crate::config::SwingController::set_ground
//! [`SensorProbe::cast_with`]: crate::collision::SensorProbe::cast_with

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the swing
/// controller. The backend exposes the body state the controller reads and
/// writes: position, velocity, rotation and mass.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`, or the test backend in `tests/integration.rs`.
pub trait SwingPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend (sensor systems etc.).
    fn plugin() -> impl Plugin;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply an impulse to an entity.
    ///
    /// Impulse is an instantaneous change in momentum (mass × velocity).
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Teleport an entity to a new position.
    fn set_position(world: &mut World, entity: Entity, position: Vec3);

    /// Get the current rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    /// Get the mass of an entity.
    ///
    /// Used to turn forces into accelerations and velocity changes into
    /// impulses.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        // Default implementation returns 1.0 (no scaling)
        1.0
    }
}
