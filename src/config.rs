//! Controller configuration components.
//!
//! This module defines the runtime state of a swinging character
//! ([`SwingController`]) and its tuning components: anchor search and tether
//! parameters, charged jump parameters, and web dash parameters.
//!
//! Default values are in centimetres (gravity around 980). Use
//! [`SwingConfig::meters`] and friends for worlds measured in metres.

use bevy::prelude::*;
use thiserror::Error;

use crate::anchor::{Anchor, AnchorSide, TetherAnchors};
use crate::collision::{CollisionData, SensorProbe};
use crate::jump::JumpCharge;
use crate::profile::LocomotionProfile;
use crate::search::{SpreadCasting, TraceSpread};
use crate::state::{LocomotionOwner, SwingState};

/// Invalid tuning values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwingConfigError {
    /// A length or distance that must be positive is not.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A value that must not be negative is.
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
    /// A `[min, max]` pair is inverted.
    #[error("`{min_field}` ({min}) exceeds `{max_field}` ({max})")]
    InvertedRange {
        /// Name of the lower bound.
        min_field: &'static str,
        /// Name of the upper bound.
        max_field: &'static str,
        /// Lower bound value.
        min: f32,
        /// Upper bound value.
        max: f32,
    },
    /// The search would cast no rays.
    #[error("`trace_count` must be at least 1")]
    NoTraces,
    /// Anchors could never be accepted: the minimum exceeds the trace length.
    #[error("`min_valid_length` ({min_valid_length}) exceeds `trace_length` ({trace_length})")]
    UnreachableAnchor {
        /// Minimum accepted anchor distance.
        min_valid_length: f32,
        /// Length of each search ray.
        trace_length: f32,
    },
    /// The charge threshold is outside [0, 1].
    #[error("`charge_threshold` must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f32),
}

fn positive(field: &'static str, value: f32) -> Result<(), SwingConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SwingConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SwingConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SwingConfigError::Negative { field, value })
    }
}

/// Core swing controller component.
///
/// This is the **central hub** for all swing state. Systems write it, game
/// code reads it. The physics backend fills the ground probe and casts the
/// rays queued in the [`SensorProbe`].
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct SwingController {
    /// Current state machine state.
    pub(crate) state: SwingState,
    /// Search cone half-width for the current search episode.
    pub(crate) spread: TraceSpread,
    /// Attached anchors.
    pub(crate) anchors: TetherAnchors,
    /// Ground below the character, if any was detected within probe range.
    #[reflect(ignore)]
    pub(crate) ground: Option<CollisionData>,
    /// Rays queued for the backend this tick.
    #[reflect(ignore)]
    pub(crate) probe: SensorProbe,
    /// Steering force applied during the last tether step.
    pub(crate) steering_force: Vec3,
    /// Jump charge.
    pub(crate) jump: JumpCharge,
    /// Host locomotion profile captured when the first swing started.
    pub(crate) saved_profile: Option<LocomotionProfile>,
}

impl SwingController {
    /// Create a new idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current swing state.
    #[inline]
    pub fn state(&self) -> SwingState {
        self.state
    }

    /// Whether an anchor search is in progress.
    pub fn is_searching(&self) -> bool {
        self.state == SwingState::Searching
    }

    /// Current search spread in degrees.
    pub fn spread_degrees(&self) -> f32 {
        self.spread.degrees()
    }

    /// Attached anchors.
    pub fn anchors(&self) -> &TetherAnchors {
        &self.anchors
    }

    /// Steering force applied during the last tether step.
    pub fn steering_force(&self) -> Vec3 {
        self.steering_force
    }

    /// Jump charge state.
    pub fn jump_charge(&self) -> JumpCharge {
        self.jump
    }

    /// Ground probe result.
    pub fn ground(&self) -> Option<&CollisionData> {
        self.ground.as_ref()
    }

    /// Whether ground was detected below the character.
    pub fn is_grounded(&self) -> bool {
        self.ground.is_some()
    }

    /// Store the ground probe result. Called by physics backends.
    pub fn set_ground(&mut self, ground: Option<CollisionData>) {
        self.ground = ground;
    }

    /// Rays queued for this tick.
    pub fn probe(&self) -> &SensorProbe {
        &self.probe
    }

    /// Mutable access to the queued rays. Called by physics backends.
    pub fn probe_mut(&mut self) -> &mut SensorProbe {
        &mut self.probe
    }

    /// Attach a secondary anchor to an active swing.
    ///
    /// The anchor's tether length is measured from `actor_position`. Returns
    /// `false` (and attaches nothing) unless the controller is tethered.
    pub fn attach_secondary(&mut self, location: Vec3, actor_position: Vec3) -> bool {
        if self.state != SwingState::Tethered {
            return false;
        }
        self.anchors
            .attach(Anchor::capture(location, actor_position, AnchorSide::Secondary));
        true
    }

    /// Enter the searching state with a fresh spread.
    pub(crate) fn begin_search(&mut self) {
        self.state = SwingState::Searching;
        self.spread.reset();
    }

    /// Attach a searched anchor and enter the tethered state.
    pub(crate) fn attach(&mut self, anchor: Anchor) {
        self.anchors.attach(anchor);
        self.state = SwingState::Tethered;
    }

    /// Drop every anchor and return to idle.
    pub(crate) fn release(&mut self) {
        self.anchors.clear();
        self.steering_force = Vec3::ZERO;
        self.state = SwingState::Idle;
    }
}

impl LocomotionOwner for SwingController {
    fn is_falling(&self) -> bool {
        self.ground.is_none()
    }

    fn is_tethered(&self) -> bool {
        self.state == SwingState::Tethered && self.anchors.is_attached()
    }

    fn anchor_location(&self) -> Vec3 {
        self.anchors.location(AnchorSide::None)
    }

    fn tether_length(&self) -> f32 {
        self.anchors.tether_length(AnchorSide::None)
    }
}

/// Anchor search and tether parameters.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct SwingConfig {
    // === Search Settings ===
    /// Length of each search ray.
    pub trace_length: f32,
    /// Number of rays in the search fan.
    pub trace_count: u32,
    /// Maximum cone half-width (degrees).
    pub spread_max: f32,
    /// Cone widening rate (degrees per second).
    pub spread_speed: f32,
    /// Forward tilt of the fan axis at rest (degrees from vertical).
    pub axis_offset_min: f32,
    /// Forward tilt of the fan axis at `swing_velocity_max` (degrees).
    pub axis_offset_max: f32,
    /// Hits closer than this are never used as anchors.
    pub min_valid_length: f32,
    /// When the fan starts casting.
    pub spread_casting: SpreadCasting,

    // === Tether Settings ===
    /// Largest steering force the player can apply while tethered.
    pub steering_force_max: f32,
    /// Horizontal speed at which the fan reaches `axis_offset_max`.
    pub swing_velocity_max: f32,

    // === Sensor Settings ===
    /// Length of the downward ground probe, measured from the actor position.
    pub ground_probe_length: f32,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            // Search settings
            trace_length: 10000.0,
            trace_count: 30,
            spread_max: 40.0,
            spread_speed: 30.0,
            axis_offset_min: 25.0,
            axis_offset_max: 50.0,
            min_valid_length: 1000.0,
            spread_casting: SpreadCasting::WhenSaturated,

            // Tether settings
            steering_force_max: 150000.0,
            swing_velocity_max: 3000.0,

            // Sensor settings
            ground_probe_length: 100.0,
        }
    }
}

impl SwingConfig {
    /// Defaults rescaled for a world measured in metres.
    pub fn meters() -> Self {
        Self {
            trace_length: 100.0,
            min_valid_length: 10.0,
            steering_force_max: 1500.0,
            swing_velocity_max: 30.0,
            ground_probe_length: 1.0,
            ..default()
        }
    }

    /// Check the parameters for values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), SwingConfigError> {
        if self.trace_count == 0 {
            return Err(SwingConfigError::NoTraces);
        }
        positive("trace_length", self.trace_length)?;
        non_negative("spread_max", self.spread_max)?;
        non_negative("spread_speed", self.spread_speed)?;
        if self.spread_casting == SpreadCasting::WhenSaturated && self.spread_max > 0.0 {
            // The fan is never cast until the spread fills.
            positive("spread_speed", self.spread_speed)?;
        }
        non_negative("min_valid_length", self.min_valid_length)?;
        non_negative("steering_force_max", self.steering_force_max)?;
        positive("swing_velocity_max", self.swing_velocity_max)?;
        positive("ground_probe_length", self.ground_probe_length)?;
        if self.axis_offset_min > self.axis_offset_max {
            return Err(SwingConfigError::InvertedRange {
                min_field: "axis_offset_min",
                max_field: "axis_offset_max",
                min: self.axis_offset_min,
                max: self.axis_offset_max,
            });
        }
        if self.min_valid_length > self.trace_length {
            return Err(SwingConfigError::UnreachableAnchor {
                min_valid_length: self.min_valid_length,
                trace_length: self.trace_length,
            });
        }
        Ok(())
    }

    /// Builder: set trace length and count.
    pub fn with_traces(mut self, length: f32, count: u32) -> Self {
        self.trace_length = length;
        self.trace_count = count;
        self
    }

    /// Builder: set spread maximum and widening rate.
    pub fn with_spread(mut self, max: f32, speed: f32) -> Self {
        self.spread_max = max;
        self.spread_speed = speed;
        self
    }

    /// Builder: set the fan axis tilt range.
    pub fn with_axis_offset(mut self, min: f32, max: f32) -> Self {
        self.axis_offset_min = min;
        self.axis_offset_max = max;
        self
    }

    /// Builder: set the minimum anchor distance.
    pub fn with_min_valid_length(mut self, length: f32) -> Self {
        self.min_valid_length = length;
        self
    }

    /// Builder: set when the fan starts casting.
    pub fn with_spread_casting(mut self, casting: SpreadCasting) -> Self {
        self.spread_casting = casting;
        self
    }

    /// Builder: set the maximum steering force.
    pub fn with_steering_force_max(mut self, force: f32) -> Self {
        self.steering_force_max = force;
        self
    }

    /// Builder: set the reference swing speed.
    pub fn with_swing_velocity_max(mut self, speed: f32) -> Self {
        self.swing_velocity_max = speed;
        self
    }

    /// Builder: set the ground probe length.
    pub fn with_ground_probe_length(mut self, length: f32) -> Self {
        self.ground_probe_length = length;
        self
    }
}

/// Charged jump parameters.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct JumpConfig {
    /// Hold time (seconds) for a full charge.
    pub full_charge_time: f32,
    /// Charge ratio below which the jump uses the base velocity.
    pub charge_threshold: f32,
    /// Base jump velocity.
    pub jump_velocity: f32,
    /// Multiplier on the base velocity at full charge.
    pub velocity_scale_max: f32,
    /// Multiplier on swing velocity when jumping out of a swing.
    pub swing_release_multiplier: f32,
    /// Forward launch speed for a charged jump while running.
    pub run_jump_forward_speed: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            full_charge_time: 1.5,
            charge_threshold: 0.15,
            jump_velocity: 600.0,
            velocity_scale_max: 5.0,
            swing_release_multiplier: 2.0,
            run_jump_forward_speed: 2500.0,
        }
    }
}

impl JumpConfig {
    /// Defaults rescaled for a world measured in metres.
    pub fn meters() -> Self {
        Self {
            jump_velocity: 6.0,
            run_jump_forward_speed: 25.0,
            ..default()
        }
    }

    /// Check the parameters for values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), SwingConfigError> {
        non_negative("full_charge_time", self.full_charge_time)?;
        if !(0.0..=1.0).contains(&self.charge_threshold) {
            return Err(SwingConfigError::ThresholdOutOfRange(self.charge_threshold));
        }
        non_negative("jump_velocity", self.jump_velocity)?;
        positive("velocity_scale_max", self.velocity_scale_max)?;
        non_negative("swing_release_multiplier", self.swing_release_multiplier)?;
        non_negative("run_jump_forward_speed", self.run_jump_forward_speed)?;
        Ok(())
    }

    /// Builder: set the full charge time.
    pub fn with_full_charge_time(mut self, seconds: f32) -> Self {
        self.full_charge_time = seconds;
        self
    }

    /// Builder: set the base velocity and its full-charge multiplier.
    pub fn with_jump_velocity(mut self, velocity: f32, scale_max: f32) -> Self {
        self.jump_velocity = velocity;
        self.velocity_scale_max = scale_max;
        self
    }

    /// Builder: set the charge threshold.
    pub fn with_charge_threshold(mut self, threshold: f32) -> Self {
        self.charge_threshold = threshold;
        self
    }
}

/// Web dash parameters.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct DashConfig {
    /// Length of the dash trace.
    pub trace_distance: f32,
    /// Speed added toward the hit point.
    pub forward_impulse: f32,
    /// Speed added upward.
    pub up_impulse: f32,
    /// Speed cap after the dash.
    pub max_velocity: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            trace_distance: 10000.0,
            forward_impulse: 6000.0,
            up_impulse: 2000.0,
            max_velocity: 4000.0,
        }
    }
}

impl DashConfig {
    /// Defaults rescaled for a world measured in metres.
    pub fn meters() -> Self {
        Self {
            trace_distance: 100.0,
            forward_impulse: 60.0,
            up_impulse: 20.0,
            max_velocity: 40.0,
        }
    }

    /// Check the parameters for values the simulation cannot work with.
    pub fn validate(&self) -> Result<(), SwingConfigError> {
        positive("trace_distance", self.trace_distance)?;
        non_negative("forward_impulse", self.forward_impulse)?;
        non_negative("max_velocity", self.max_velocity)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_new_is_idle_and_falling() {
        let controller = SwingController::new();
        assert_eq!(controller.state(), SwingState::Idle);
        assert!(controller.is_falling());
        assert!(!controller.is_tethered());
        assert_eq!(controller.anchor_location(), Vec3::ZERO);
        assert_eq!(LocomotionOwner::tether_length(&controller), -1.0);
    }

    #[test]
    fn controller_ground_makes_it_not_falling() {
        let mut controller = SwingController::new();
        controller.set_ground(Some(CollisionData::new(50.0, Vec3::Y, Vec3::ZERO, None)));
        assert!(controller.is_grounded());
        assert!(!controller.is_falling());
    }

    #[test]
    fn controller_attach_and_release() {
        let mut controller = SwingController::new();
        controller.begin_search();
        assert!(controller.is_searching());

        controller.attach(Anchor::capture(Vec3::new(0.0, 2000.0, 0.0), Vec3::ZERO, AnchorSide::Primary));
        assert!(controller.is_tethered());
        assert!((LocomotionOwner::tether_length(&controller) - 2000.0).abs() < 1e-3);

        controller.steering_force = Vec3::X;
        controller.release();
        assert_eq!(controller.state(), SwingState::Idle);
        assert_eq!(controller.steering_force(), Vec3::ZERO);
        assert!(!controller.anchors().is_attached());
    }

    #[test]
    fn begin_search_resets_spread() {
        let mut controller = SwingController::new();
        controller.spread.advance(1.0, 30.0, 40.0);
        assert!(controller.spread_degrees() > 0.0);
        controller.begin_search();
        assert_eq!(controller.spread_degrees(), 0.0);
    }

    #[test]
    fn secondary_anchor_requires_tether() {
        let mut controller = SwingController::new();
        assert!(!controller.attach_secondary(Vec3::Y * 100.0, Vec3::ZERO));

        controller.attach(Anchor::capture(Vec3::new(-100.0, 0.0, 0.0), Vec3::ZERO, AnchorSide::Primary));
        assert!(controller.attach_secondary(Vec3::new(100.0, 0.0, 0.0), Vec3::ZERO));
        assert_eq!(controller.anchor_location(), Vec3::ZERO);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SwingConfig::default().validate(), Ok(()));
        assert_eq!(SwingConfig::meters().validate(), Ok(()));
        assert_eq!(JumpConfig::default().validate(), Ok(()));
        assert_eq!(JumpConfig::meters().validate(), Ok(()));
        assert_eq!(DashConfig::default().validate(), Ok(()));
        assert_eq!(DashConfig::meters().validate(), Ok(()));
    }

    #[test]
    fn swing_config_errors() {
        let none = SwingConfig::default().with_traces(100.0, 0);
        assert_eq!(none.validate(), Err(SwingConfigError::NoTraces));

        let inverted = SwingConfig::default().with_axis_offset(60.0, 10.0);
        assert!(matches!(inverted.validate(), Err(SwingConfigError::InvertedRange { .. })));

        let unreachable = SwingConfig::default().with_min_valid_length(20000.0);
        assert!(matches!(unreachable.validate(), Err(SwingConfigError::UnreachableAnchor { .. })));

        let negative = SwingConfig::default().with_spread(-1.0, 30.0);
        assert_eq!(
            negative.validate(),
            Err(SwingConfigError::Negative { field: "spread_max", value: -1.0 })
        );
    }

    #[test]
    fn stalled_spread_is_rejected_when_casting_waits_for_saturation() {
        let stalled = SwingConfig::default().with_spread(40.0, 0.0);
        assert_eq!(
            stalled.validate(),
            Err(SwingConfigError::NonPositive { field: "spread_speed", value: 0.0 })
        );

        let progressive = stalled.with_spread_casting(SpreadCasting::Progressive);
        assert_eq!(progressive.validate(), Ok(()));

        let no_spread = SwingConfig::default().with_spread(0.0, 0.0);
        assert_eq!(no_spread.validate(), Ok(()));
    }

    #[test]
    fn jump_config_threshold_range() {
        let config = JumpConfig::default().with_charge_threshold(1.5);
        assert_eq!(config.validate(), Err(SwingConfigError::ThresholdOutOfRange(1.5)));
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = DashConfig { trace_distance: 0.0, ..default() }.validate().unwrap_err();
        assert_eq!(err.to_string(), "`trace_distance` must be positive, got 0");
    }
}
