//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature (on by default).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::SwingPhysicsBackend;
use crate::collision::{CollisionData, RaySegment};
use crate::config::{SwingConfig, SwingController};
use crate::SwingControllerSet;

/// Rapier3D physics backend for the swing controller.
///
/// This backend uses `bevy_rapier3d` for velocity and impulse manipulation.
/// Ray queries are handled by dedicated Rapier systems that receive
/// `RapierContext` as a system parameter.
pub struct Rapier3dBackend;

impl SwingPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        let mass = Self::get_mass(world, entity);
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
        } else if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            // Fallback: apply as velocity change if no ExternalImpulse component
            vel.linvel += impulse / mass;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| world.get::<GlobalTransform>(entity).map(|t| t.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec3) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation = position;
        }
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation)
            .or_else(|| {
                world.get::<GlobalTransform>(entity).map(|t| {
                    let (_, rotation, _) = t.to_scale_rotation_translation();
                    rotation
                })
            })
            .unwrap_or(Quat::IDENTITY)
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        // Rapier fills ReadMassProperties after the first physics step.
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|mass| *mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0)
    }
}

/// Plugin that sets up Rapier3D-specific sensor systems for the swing controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_ground_probe.in_set(SwingControllerSet::GroundSensors),
        );
        app.add_systems(
            FixedUpdate,
            rapier_anchor_probe.in_set(SwingControllerSet::AnchorSensors),
        );
    }
}

/// Cast a ray segment using RapierContext.
fn rapier_raycast(
    context: &RapierContext,
    ray: RaySegment,
    exclude_entity: Entity,
    collision_groups: Option<CollisionGroups>,
) -> Option<CollisionData> {
    let direction = ray.direction();
    let max_distance = ray.length();
    if direction == Vec3::ZERO || max_distance <= 0.0 {
        return None;
    }

    // Create filter to exclude the casting entity
    let mut filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors();

    if let Some(groups) = collision_groups {
        filter = filter.groups(groups);
    }

    context
        .cast_ray_and_get_normal(ray.origin, direction, max_distance, true, filter)
        .map(|(hit_entity, hit)| {
            CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

/// Probe straight down for ground within `ground_probe_length`.
fn rapier_ground_probe(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        Option<&SwingConfig>,
        &mut SwingController,
        Option<&CollisionGroups>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, config, mut controller, collision_groups) in &mut q_controllers {
        let config = config.copied().unwrap_or_default();
        let ray = RaySegment::from_direction(
            transform.translation(),
            Vec3::NEG_Y,
            config.ground_probe_length,
        );
        let ground = rapier_raycast(&context, ray, entity, collision_groups.copied());
        controller.set_ground(ground);
    }
}

/// Cast the search and dash rays queued this tick.
fn rapier_anchor_probe(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(Entity, &mut SwingController, Option<&CollisionGroups>)>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, mut controller, collision_groups) in &mut q_controllers {
        if !controller.probe().has_pending() {
            continue;
        }
        let groups = collision_groups.copied();
        controller
            .probe_mut()
            .cast_with(|ray| rapier_raycast(&context, ray, entity, groups));
    }
}

/// Bundle for creating a swinging character with Rapier3D physics.
///
/// This bundle provides the Rapier3D components the swing controller reads
/// and writes: the rigid body, velocity, external impulses for jumps, axis
/// locking, damping and mass properties.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use web_swing_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         SwingController::new(),
///         SwingConfig::meters(),
///         JumpConfig::meters(),
///         DashConfig::meters(),
///         SwingIntent::default(),
///         LocomotionProfile::default(),
///         Rapier3dCharacterBundle::new(),
///         Collider::capsule_y(0.5, 0.3),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_impulse`: Zero impulse (used for jump impulses)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`] so the tether never spins the body
/// - `damping`: None, so swings keep their momentum
/// - `mass_properties`: Default (computed by Rapier from collider)
#[derive(Bundle, Default)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`] for characters.
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity. Written by the tether constraint.
    pub velocity: Velocity,
    /// Accumulated impulses applied this frame. Used for jumps.
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked.
    pub locked_axes: LockedAxes,
    /// Damping coefficients for velocity reduction.
    pub damping: Damping,
    /// Computed mass properties. Rapier updates this based on the entity's collider.
    pub mass_properties: ReadMassProperties,
}

impl Rapier3dCharacterBundle {
    /// Create a new character bundle with rotation locked and no damping.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            // Rapier will update this based on collider after first physics step
            mass_properties: ReadMassProperties::default(),
        }
    }

    /// Set the rigid body type for the character.
    ///
    /// Use [`RigidBody::KinematicVelocityBased`] for scripted characters that
    /// should still swing but ignore collision responses.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients for velocity reduction.
    ///
    /// Linear damping bleeds swing momentum; keep it low for long arcs.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
