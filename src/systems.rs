//! Core controller systems.
//!
//! These systems drive the swing state machine, the tether constraint, the
//! charged jump and the web dash. They are generic over the physics backend
//! to allow different physics engines to be used.
//!
//! Per fixed tick, in [`SwingControllerSet`](crate::SwingControllerSet) order:
//!
//! 1. Preparation: clear last tick's rays, validate new configs.
//! 2. GroundSensors (backend): probe for ground below each controller.
//! 3. Search: release, start or continue searching; queue search and dash rays.
//! 4. AnchorSensors (backend): cast the queued rays.
//! 5. Simulation: accept anchors, then run the tether constraint.
//! 6. Actions: charged jumps and web dashes.
//! 7. Finalize: sync marker components, flush telemetry events.

use bevy::prelude::*;

use crate::anchor::Anchor;
use crate::backend::SwingPhysicsBackend;
use crate::collision::{CollisionData, RaySegment, SensorProbe};
use crate::config::{DashConfig, JumpConfig, SwingConfig, SwingController};
use crate::dash::{dash_ray, dash_velocity};
use crate::intent::SwingIntent;
use crate::jump::{jump_velocity, JumpContext};
use crate::profile::LocomotionProfile;
use crate::search::{plan_search, resolve_hits, velocity_ratio};
use crate::state::{can_swing, Airborne, LocomotionOwner, SearchingAnchor, SwingState, Tethered};
use crate::telemetry::{
    EntityRecorder, ReleaseReason, SwingEvent, SwingEventBuffer, SwingObserver, SwingTelemetry,
};
use crate::tether;

/// Drop the previous tick's rays and results.
pub fn clear_sensor_probes(mut q_controllers: Query<&mut SwingController>) {
    for mut controller in &mut q_controllers {
        controller.probe.clear();
    }
}

/// Warn about invalid tuning on newly added configuration components.
pub fn validate_swing_configs(
    q_configs: Query<
        (Entity, Option<&SwingConfig>, Option<&JumpConfig>, Option<&DashConfig>),
        Or<(Added<SwingConfig>, Added<JumpConfig>, Added<DashConfig>)>,
    >,
) {
    for (entity, swing, jump, dash) in &q_configs {
        let results = [
            swing.map(SwingConfig::validate),
            jump.map(JumpConfig::validate),
            dash.map(DashConfig::validate),
        ];
        for error in results.into_iter().flatten().filter_map(Result::err) {
            warn!("{entity}: invalid swing configuration: {error}");
        }
    }
}

/// Why a tethered controller must let go this tick, if at all.
fn release_reason(controller: &SwingController, intent: &SwingIntent) -> Option<ReleaseReason> {
    if controller.state != SwingState::Tethered {
        return None;
    }
    if !intent.swing_pressed {
        Some(ReleaseReason::InputReleased)
    } else if controller.is_grounded() {
        Some(ReleaseReason::Landed)
    } else if !can_swing(controller, false) {
        Some(ReleaseReason::CannotSwing)
    } else {
        None
    }
}

/// Release the tether and restore the host's locomotion profile.
fn stop_swing(world: &mut World, entity: Entity, reason: ReleaseReason, events: &mut Vec<SwingEvent>) {
    let saved = match world.get_mut::<SwingController>(entity) {
        Some(mut controller) => {
            controller.release();
            controller.saved_profile
        }
        None => return,
    };

    if let (Some(saved), Some(mut profile)) = (saved, world.get_mut::<LocomotionProfile>(entity)) {
        *profile = saved;
    }

    EntityRecorder::new(entity, events).record(SwingTelemetry::Released { reason });
    debug!("{entity}: tether released ({reason:?})");
}

/// Attach a freshly acquired anchor and switch to the swinging profile.
fn start_swing(world: &mut World, entity: Entity, anchor: Anchor) {
    let current_profile = world.get::<LocomotionProfile>(entity).copied();

    if let Some(mut controller) = world.get_mut::<SwingController>(entity) {
        controller.attach(anchor);
        if let Some(profile) = current_profile {
            controller.saved_profile.get_or_insert(profile);
        }
    }

    if let Some(mut profile) = world.get_mut::<LocomotionProfile>(entity) {
        *profile = LocomotionProfile::swinging();
    }

    info!(
        "{entity}: tethered to {} (length {:.1})",
        anchor.location(),
        anchor.tether_length()
    );
}

fn buffer_events(world: &mut World, events: Vec<SwingEvent>) {
    if events.is_empty() {
        return;
    }
    if let Some(mut buffer) = world.get_resource_mut::<SwingEventBuffer>() {
        buffer.extend(events);
    }
}

/// Run the swing state machine and queue this tick's search rays.
///
/// - Tethered controllers are released when the swing input is let go, when
///   they land, or when they can no longer swing.
/// - Idle controllers holding swing while falling start a new search with
///   the spread reset to zero.
/// - Searching controllers abort when swing is let go or they land, and
///   otherwise queue the ray fan in their [`SensorProbe`].
pub fn update_swing_state<B: SwingPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, SwingConfig, SwingIntent)> = world
        .query::<(Entity, &SwingConfig, &SwingIntent, &SwingController)>()
        .iter(world)
        .map(|(e, config, intent, _)| (e, *config, intent.clone()))
        .collect();

    let mut events = Vec::new();

    for (entity, config, intent) in entities {
        let Some(release) = world
            .get::<SwingController>(entity)
            .map(|controller| release_reason(controller, &intent))
        else {
            continue;
        };
        if let Some(reason) = release {
            stop_swing(world, entity, reason, &mut events);
            continue;
        }

        let position = B::get_position(world, entity);
        let velocity = B::get_velocity(world, entity);
        let rotation = B::get_rotation(world, entity);

        let Some(mut controller) = world.get_mut::<SwingController>(entity) else {
            continue;
        };

        match controller.state {
            SwingState::Idle => {
                if !(intent.swing_pressed && can_swing(&*controller, true)) {
                    continue;
                }
                controller.begin_search();
                EntityRecorder::new(entity, &mut events).record(SwingTelemetry::SearchStarted);
                debug!("{entity}: searching for an anchor");
            }
            SwingState::Searching => {
                if !(intent.swing_pressed && can_swing(&*controller, true)) {
                    controller.state = SwingState::Idle;
                    debug!("{entity}: anchor search cancelled");
                    continue;
                }
            }
            SwingState::Tethered => continue,
        }

        let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
        let ratio = velocity_ratio(velocity, config.swing_velocity_max);
        let rays = plan_search(&mut controller.spread, position, yaw, ratio, dt, &config);
        controller.probe.rays = rays;
    }

    buffer_events(world, events);
}

/// Queue a dash trace for every consumed dash request.
pub fn plan_web_dash<B: SwingPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, DashConfig)> = world
        .query::<(Entity, &DashConfig, &SwingIntent, &SwingController)>()
        .iter(world)
        .filter(|(_, _, intent, _)| intent.has_dash_request())
        .map(|(e, config, _, _)| (e, *config))
        .collect();

    for (entity, config) in entities {
        let position = B::get_position(world, entity);
        let Some((origin, aim)) = world.get_mut::<SwingIntent>(entity).map(|mut intent| {
            intent.take_dash_request();
            (intent.aim_origin.unwrap_or(position), intent.aim_direction())
        }) else {
            continue;
        };

        if let Some(mut controller) = world.get_mut::<SwingController>(entity) {
            controller.probe.dash_ray = Some(dash_ray(origin, aim, &config));
        }
    }
}

/// Accept an anchor from the cast search rays.
///
/// The first hit in ray order that is at least `min_valid_length` away wins.
/// Every ray is reported as a [`SwingTelemetry::RayCast`].
pub fn resolve_anchor_probes(world: &mut World) {
    let entities: Vec<(Entity, SwingConfig, SensorProbe)> = world
        .query::<(Entity, &SwingConfig, &SwingController)>()
        .iter(world)
        .filter(|(_, _, controller)| {
            controller.state == SwingState::Searching
                && controller.probe.is_cast()
                && !controller.probe.rays.is_empty()
        })
        .map(|(e, config, controller)| (e, *config, controller.probe.clone()))
        .collect();

    let mut events = Vec::new();

    for (entity, config, probe) in entities {
        let Some(origin) = probe.rays.first().map(|ray| ray.origin) else {
            continue;
        };
        let mut recorder = EntityRecorder::new(entity, &mut events);
        if let Some(anchor) = resolve_hits(origin, &probe.rays, &probe.hits, &config, &mut recorder) {
            start_swing(world, entity, anchor);
        }
    }

    buffer_events(world, events);
}

/// Apply the tether constraint and player steering.
///
/// Over-extended actors are teleported back onto the tether sphere and a
/// [`SwingTelemetry::TetherCorrected`] is reported.
pub fn simulate_tether<B: SwingPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, SwingConfig, SwingIntent, Anchor)> = world
        .query::<(Entity, &SwingConfig, &SwingIntent, &SwingController)>()
        .iter(world)
        .filter(|(_, _, _, controller)| controller.is_tethered())
        .filter_map(|(e, config, intent, controller)| {
            controller
                .anchors
                .governing()
                .map(|anchor| (e, *config, intent.clone(), anchor))
        })
        .collect();

    let mut events = Vec::new();

    for (entity, config, intent, anchor) in entities {
        let position = B::get_position(world, entity);
        let velocity = B::get_velocity(world, entity);
        let mass = B::get_mass(world, entity);

        let steering = tether::steering_force(
            intent.control_rotation(),
            intent.move_forward,
            intent.move_right,
            position,
            anchor.location(),
            config.steering_force_max,
        );

        let result = tether::step(position, velocity, &anchor, mass, steering, dt);

        B::set_velocity(world, entity, result.velocity);
        if let Some(corrected) = result.position {
            B::set_position(world, entity, corrected);
            EntityRecorder::new(entity, &mut events).record(SwingTelemetry::TetherCorrected {
                from: position,
                to: corrected,
            });
        }

        if let Some(mut controller) = world.get_mut::<SwingController>(entity) {
            controller.steering_force = steering;
        }
    }

    buffer_events(world, events);
}

/// Charge jumps on press and fire them on release.
///
/// A jump fires only when the controller is grounded or tethered. Jumping
/// while tethered releases the tether first and launches with the swing
/// momentum. The velocity change is applied as an impulse (`mass × Δv`).
pub fn apply_jump<B: SwingPhysicsBackend>(world: &mut World) {
    let now = world
        .get_resource::<Time>()
        .map(|t| t.elapsed_secs())
        .unwrap_or(0.0);

    let entities: Vec<(Entity, JumpConfig)> = world
        .query::<(Entity, &JumpConfig, &SwingIntent, &SwingController)>()
        .iter(world)
        .map(|(e, config, _, _)| (e, *config))
        .collect();

    let mut events = Vec::new();

    for (entity, config) in entities {
        let Some((pressed, released, running)) = world.get_mut::<SwingIntent>(entity).map(|mut intent| {
            let (pressed, released) = intent.take_jump_edges();
            (pressed, released, intent.run_pressed)
        }) else {
            continue;
        };

        let (ratio, tethered, grounded) = {
            let Some(mut controller) = world.get_mut::<SwingController>(entity) else {
                continue;
            };
            if pressed {
                controller.jump.press(now);
            }
            if !released {
                continue;
            }
            let Some(ratio) = controller.jump.release(now, config.full_charge_time) else {
                continue;
            };
            (ratio, controller.is_tethered(), controller.is_grounded())
        };

        if !tethered && !grounded {
            debug!("{entity}: jump released in the air, ignored");
            continue;
        }

        let rotation = B::get_rotation(world, entity);
        let context = JumpContext {
            tethered,
            velocity: B::get_velocity(world, entity),
            up: rotation * Vec3::Y,
            forward: rotation * Vec3::NEG_Z,
            running,
        };
        let velocity_change = jump_velocity(ratio, &config, &context);

        if tethered {
            stop_swing(world, entity, ReleaseReason::Jumped, &mut events);
        }

        let mass = B::get_mass(world, entity);
        B::apply_impulse(world, entity, velocity_change * mass);

        EntityRecorder::new(entity, &mut events).record(SwingTelemetry::Jumped {
            charge: ratio,
            velocity_change,
            from_swing: tethered,
        });
        debug!("{entity}: jumped with charge {ratio:.2}");
    }

    buffer_events(world, events);
}

/// Yank dashing controllers toward their dash hit.
pub fn apply_dash<B: SwingPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, DashConfig, RaySegment, Option<CollisionData>)> = world
        .query::<(Entity, &DashConfig, &SwingController)>()
        .iter(world)
        .filter(|(_, _, controller)| controller.probe.is_cast())
        .filter_map(|(e, config, controller)| {
            controller
                .probe
                .dash_ray
                .map(|ray| (e, *config, ray, controller.probe.dash_hit))
        })
        .collect();

    let mut events = Vec::new();

    for (entity, config, ray, hit) in entities {
        let Some(hit) = hit else {
            EntityRecorder::new(entity, &mut events).record(SwingTelemetry::DashMissed {
                origin: ray.origin,
                end: ray.end,
            });
            continue;
        };

        let position = B::get_position(world, entity);
        let velocity = B::get_velocity(world, entity);
        let new_velocity = dash_velocity(position, velocity, hit.point, &config);
        B::set_velocity(world, entity, new_velocity);

        EntityRecorder::new(entity, &mut events).record(SwingTelemetry::Dashed {
            target: hit.point,
            velocity: new_velocity,
        });
    }

    buffer_events(world, events);
}

/// Sync state marker components with the controller state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &SwingController,
        Has<Airborne>,
        Has<SearchingAnchor>,
        Option<&Tethered>,
    )>,
) {
    for (entity, controller, has_airborne, has_searching, tethered) in &q_controllers {
        let falling = controller.is_falling();
        if falling && !has_airborne {
            commands.entity(entity).insert(Airborne);
        } else if !falling && has_airborne {
            commands.entity(entity).remove::<Airborne>();
        }

        let searching = controller.is_searching();
        if searching && !has_searching {
            commands.entity(entity).insert(SearchingAnchor);
        } else if !searching && has_searching {
            commands.entity(entity).remove::<SearchingAnchor>();
        }

        if controller.is_tethered() {
            let marker = Tethered::new(controller.anchor_location(), controller.tether_length());
            if tethered != Some(&marker) {
                commands.entity(entity).insert(marker);
            }
        } else if tethered.is_some() {
            commands.entity(entity).remove::<Tethered>();
        }
    }
}

/// Publish this tick's telemetry as [`SwingEvent`]s.
pub fn flush_swing_events(mut buffer: ResMut<SwingEventBuffer>, mut writer: EventWriter<SwingEvent>) {
    for event in buffer.drain() {
        writer.write(event);
    }
}
