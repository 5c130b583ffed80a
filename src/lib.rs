//! # `web_swing_controller`
//!
//! A tethered ("web-swing") locomotion layer for 3D Bevy characters, with
//! physics backend abstraction.
//!
//! This crate provides a swing controller that:
//! - Searches for anchors with a widening fan of raycasts while airborne
//! - Constrains the character to an inextensible tether around the anchor
//! - Lets the player steer around the anchor with tangential forces
//! - Charges jumps and converts swing momentum into launch momentum
//! - Dashes toward whatever the camera is aimed at
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! The controller is a thin state machine over pure simulation functions:
//! 1. [`search`] plans the ray fan and picks an anchor from the hits
//! 2. [`tether`] applies the pendulum constraint to velocity and position
//! 3. [`jump`] turns hold duration into jump velocity
//! 4. [`dash`] computes the web dash velocity
//!
//! The Bevy systems in [`systems`] wire these to the physics backend. The
//! pure functions can also be called directly from a custom game loop.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use web_swing_controller::prelude::*;
//!
//! // Create controller components for a swinging character
//! let controller = SwingController::new();
//! let config = SwingConfig::meters();
//! let jump = JumpConfig::meters();
//! let intent = SwingIntent::default();
//!
//! // These can be spawned together with physics components
//! ```

use bevy::prelude::*;

pub mod anchor;
pub mod backend;
pub mod collision;
pub mod config;
pub mod dash;
pub mod intent;
pub mod jump;
pub mod profile;
pub mod search;
pub mod state;
pub mod systems;
pub mod telemetry;
pub mod tether;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::anchor::{Anchor, AnchorSide, TetherAnchors, NO_TETHER_LENGTH};
    pub use crate::backend::SwingPhysicsBackend;
    pub use crate::collision::{CollisionData, RaySegment, SensorProbe};
    pub use crate::config::{DashConfig, JumpConfig, SwingConfig, SwingConfigError, SwingController};
    pub use crate::intent::SwingIntent;
    pub use crate::jump::JumpCharge;
    pub use crate::profile::LocomotionProfile;
    pub use crate::search::{SpreadCasting, TraceSpread};
    pub use crate::state::{can_swing, Airborne, LocomotionOwner, SearchingAnchor, SwingState, Tethered};
    pub use crate::telemetry::{ReleaseReason, SwingEvent, SwingObserver, SwingTelemetry};
    pub use crate::{SwingControllerPlugin, SwingControllerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// System sets for the swing controller, run in this order in `FixedUpdate`.
///
/// Physics backends add their sensor systems to [`GroundSensors`] and
/// [`AnchorSensors`]. Game code can order its own systems around these sets,
/// e.g. write [`SwingIntent`](intent::SwingIntent) before [`Preparation`].
///
/// [`GroundSensors`]: SwingControllerSet::GroundSensors
/// [`AnchorSensors`]: SwingControllerSet::AnchorSensors
/// [`Preparation`]: SwingControllerSet::Preparation
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwingControllerSet {
    /// Clear per-tick state and validate configs.
    Preparation,
    /// Backend: detect ground below each controller.
    GroundSensors,
    /// Update the state machine and queue rays.
    Search,
    /// Backend: cast the queued search and dash rays.
    AnchorSensors,
    /// Accept anchors and apply the tether constraint.
    Simulation,
    /// Fire jumps and dashes.
    Actions,
    /// Sync markers and publish events.
    Finalize,
}

/// Main plugin for the swing controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (raycasting, velocity, impulses).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use web_swing_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(SwingControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct SwingControllerPlugin<B: backend::SwingPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::SwingPhysicsBackend> Default for SwingControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::SwingPhysicsBackend> Plugin for SwingControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::SwingController>();
        app.register_type::<config::SwingConfig>();
        app.register_type::<config::JumpConfig>();
        app.register_type::<config::DashConfig>();
        app.register_type::<intent::SwingIntent>();
        app.register_type::<profile::LocomotionProfile>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::SearchingAnchor>();
        app.register_type::<state::Tethered>();

        app.init_resource::<telemetry::SwingEventBuffer>();
        app.add_event::<telemetry::SwingEvent>();

        app.configure_sets(
            FixedUpdate,
            (
                SwingControllerSet::Preparation,
                SwingControllerSet::GroundSensors,
                SwingControllerSet::Search,
                SwingControllerSet::AnchorSensors,
                SwingControllerSet::Simulation,
                SwingControllerSet::Actions,
                SwingControllerSet::Finalize,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            (systems::clear_sensor_probes, systems::validate_swing_configs)
                .in_set(SwingControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::update_swing_state::<B>, systems::plan_web_dash::<B>)
                .chain()
                .in_set(SwingControllerSet::Search),
        );
        app.add_systems(
            FixedUpdate,
            (systems::resolve_anchor_probes, systems::simulate_tether::<B>)
                .chain()
                .in_set(SwingControllerSet::Simulation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::apply_jump::<B>, systems::apply_dash::<B>)
                .chain()
                .in_set(SwingControllerSet::Actions),
        );
        app.add_systems(
            FixedUpdate,
            (systems::sync_state_markers, systems::flush_swing_events)
                .in_set(SwingControllerSet::Finalize),
        );
    }
}
