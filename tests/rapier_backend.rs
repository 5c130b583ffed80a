//! Integration tests for the Rapier3D backend.
//!
//! These run the controller against real Rapier colliders so the ground and
//! anchor sensors go through actual ray queries, including self exclusion,
//! sensor colliders and collision groups.

#![cfg(feature = "rapier3d")]

use bevy::prelude::*;
use bevy::time::Virtual;
use bevy_rapier3d::prelude::*;
use web_swing_controller::prelude::*;

/// Underside of the ceiling slab.
const CEILING_Y: f32 = 2000.0;

/// Create a minimal test app with physics and the swing controller.
fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(TransformPlugin);
    app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
    app.add_plugins(SwingControllerPlugin::<Rapier3dBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));

    app.finish();
    app.cleanup();
    app
}

/// Spawn a static box collider.
fn spawn_box(app: &mut App, position: Vec3, half_size: Vec3) -> Entity {
    let transform = Transform::from_translation(position);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            RigidBody::Fixed,
            Collider::cuboid(half_size.x, half_size.y, half_size.z),
        ))
        .id()
}

/// Spawn a wide slab whose underside sits at [`CEILING_Y`].
fn spawn_ceiling(app: &mut App) -> Entity {
    spawn_box(
        app,
        Vec3::new(0.0, CEILING_Y + 10.0, 0.0),
        Vec3::new(20000.0, 10.0, 20000.0),
    )
}

/// Spawn a swinging character with its own collider and no Rapier gravity.
fn spawn_character(app: &mut App, position: Vec3) -> Entity {
    let transform = Transform::from_translation(position);
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            SwingController::new(),
            SwingConfig::default(),
            JumpConfig::default(),
            DashConfig::default(),
            SwingIntent::default(),
            LocomotionProfile::default(),
            Rapier3dCharacterBundle::new(),
            Collider::ball(50.0),
            GravityScale(0.0),
        ))
        .id()
}

/// Run one physics step.
fn tick(app: &mut App) {
    let timestep = std::time::Duration::from_secs_f64(1.0 / 60.0);
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(timestep);
    app.update();
    app.world_mut().run_schedule(FixedUpdate);
    app.update();
}

/// Run until the character is tethered or `frames` have passed.
fn run_until_tethered(app: &mut App, entity: Entity, frames: usize) {
    for _ in 0..frames {
        tick(app);
        if controller(app, entity).state() == SwingState::Tethered {
            return;
        }
    }
}

fn controller(app: &App, entity: Entity) -> &SwingController {
    app.world().get::<SwingController>(entity).unwrap()
}

fn hold_swing(app: &mut App, entity: Entity) {
    app.world_mut()
        .get_mut::<SwingIntent>(entity)
        .unwrap()
        .set_swing_pressed(true);
}

// ==================== Anchor Tests ====================

#[test]
fn ceiling_collider_becomes_anchor() {
    let mut app = create_test_app();
    spawn_ceiling(&mut app);
    let character = spawn_character(&mut app, Vec3::ZERO);
    tick(&mut app);

    hold_swing(&mut app, character);
    run_until_tethered(&mut app, character, 300);

    let controller = controller(&app, character);
    assert_eq!(controller.state(), SwingState::Tethered);

    let anchor = controller.anchor_location();
    let position = app.world().get::<Transform>(character).unwrap().translation;
    assert!((anchor.y - CEILING_Y).abs() < 1.0, "anchor was {anchor}");

    // Tether length is the distance to the hit, at least the ceiling height.
    let length = controller.tether_length();
    assert!(length >= CEILING_Y - 1.0, "length was {length}");
    assert!((length - anchor.distance(position)).abs() < 1.0);

    let marker = app.world().get::<Tethered>(character).copied().unwrap();
    assert!((marker.length - length).abs() < 1e-3);
}

#[test]
fn sensor_ceiling_is_not_an_anchor() {
    let mut app = create_test_app();
    let ceiling = spawn_ceiling(&mut app);
    app.world_mut().entity_mut(ceiling).insert(Sensor);
    let character = spawn_character(&mut app, Vec3::ZERO);
    tick(&mut app);

    hold_swing(&mut app, character);
    run_until_tethered(&mut app, character, 200);

    assert_eq!(controller(&app, character).state(), SwingState::Searching);
}

#[test]
fn collision_groups_filter_anchor_rays() {
    let mut app = create_test_app();
    let ceiling = spawn_ceiling(&mut app);
    app.world_mut()
        .entity_mut(ceiling)
        .insert(CollisionGroups::new(Group::GROUP_2, Group::ALL));
    let character = spawn_character(&mut app, Vec3::ZERO);
    app.world_mut()
        .entity_mut(character)
        .insert(CollisionGroups::new(Group::GROUP_1, Group::GROUP_1));
    tick(&mut app);

    hold_swing(&mut app, character);
    run_until_tethered(&mut app, character, 200);

    assert_eq!(controller(&app, character).state(), SwingState::Searching);
}

// ==================== Ground Tests ====================

#[test]
fn floor_collider_grounds_character() {
    let mut app = create_test_app();
    // Top face 60 units below the character, inside the 100 unit probe.
    spawn_box(&mut app, Vec3::new(0.0, -70.0, 0.0), Vec3::new(5000.0, 10.0, 5000.0));
    spawn_ceiling(&mut app);
    let character = spawn_character(&mut app, Vec3::ZERO);
    tick(&mut app);

    hold_swing(&mut app, character);
    for _ in 0..10 {
        tick(&mut app);
    }

    let controller = controller(&app, character);
    assert!(controller.is_grounded());
    let ground = controller.ground().unwrap();
    assert!((ground.distance - 60.0).abs() < 1.0, "ground was {ground:?}");
    assert_eq!(controller.state(), SwingState::Idle);
    assert!(app.world().get::<SearchingAnchor>(character).is_none());
    assert!(app.world().get::<Airborne>(character).is_none());
}

#[test]
fn own_collider_does_not_ground_character() {
    let mut app = create_test_app();
    let character = spawn_character(&mut app, Vec3::ZERO);

    for _ in 0..3 {
        tick(&mut app);
    }

    assert!(!controller(&app, character).is_grounded());
    assert!(app.world().get::<Airborne>(character).is_some());
}
