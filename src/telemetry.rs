//! Structured telemetry for the swing simulation.
//!
//! The simulation never draws or prints anything itself. Instead every
//! interesting step (rays cast, anchors acquired, tether corrections, jumps)
//! is reported to a [`SwingObserver`]. Inside Bevy the plugin buffers these
//! as [`SwingEvent`]s and flushes them once per fixed tick, so debug drawing,
//! audio or analytics can subscribe with an ordinary `EventReader`.

use bevy::prelude::*;

use crate::anchor::Anchor;

/// Why a tether was released.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseReason {
    /// The swing input was let go.
    InputReleased,
    /// The character touched the ground.
    Landed,
    /// The character is no longer in a state that allows swinging.
    CannotSwing,
    /// A jump converted the swing into a launch.
    Jumped,
}

/// A single telemetry record produced by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SwingTelemetry {
    /// A new anchor search episode began.
    SearchStarted,
    /// One ray of the anchor search fan was cast.
    RayCast {
        /// Ray start.
        origin: Vec3,
        /// Ray end.
        end: Vec3,
        /// Hit point, if the ray hit anything.
        hit: Option<Vec3>,
        /// Whether the hit was far enough away to anchor to.
        accepted: bool,
    },
    /// An anchor was acquired and the tether is now active.
    AnchorAcquired {
        /// The new anchor.
        anchor: Anchor,
    },
    /// The actor was pulled back onto the tether sphere.
    TetherCorrected {
        /// Position before the correction.
        from: Vec3,
        /// Position after the correction.
        to: Vec3,
    },
    /// The tether was released.
    Released {
        /// What caused the release.
        reason: ReleaseReason,
    },
    /// A jump fired.
    Jumped {
        /// Charge ratio in [0, 1].
        charge: f32,
        /// Velocity change applied.
        velocity_change: Vec3,
        /// Whether the jump launched out of a swing.
        from_swing: bool,
    },
    /// A web dash hit and changed the velocity.
    Dashed {
        /// Dash target.
        target: Vec3,
        /// Velocity after the dash.
        velocity: Vec3,
    },
    /// A web dash trace found nothing.
    DashMissed {
        /// Start of the trace.
        origin: Vec3,
        /// End of the trace.
        end: Vec3,
    },
}

/// Receives telemetry from the simulation functions.
pub trait SwingObserver {
    /// Record one telemetry item.
    fn record(&mut self, telemetry: SwingTelemetry);
}

/// Discards all telemetry.
impl SwingObserver for () {
    fn record(&mut self, _telemetry: SwingTelemetry) {}
}

impl SwingObserver for Vec<SwingTelemetry> {
    fn record(&mut self, telemetry: SwingTelemetry) {
        self.push(telemetry);
    }
}

/// Telemetry tagged with the entity that produced it.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SwingEvent {
    /// The swinging entity.
    pub entity: Entity,
    /// What happened.
    pub telemetry: SwingTelemetry,
}

/// Events produced during the current fixed tick, awaiting flush.
#[derive(Resource, Debug, Default)]
pub struct SwingEventBuffer {
    events: Vec<SwingEvent>,
}

impl SwingEventBuffer {
    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append events.
    pub fn extend(&mut self, events: impl IntoIterator<Item = SwingEvent>) {
        self.events.extend(events);
    }

    /// Remove and return all buffered events.
    pub fn drain(&mut self) -> impl Iterator<Item = SwingEvent> + '_ {
        self.events.drain(..)
    }
}

/// Observer that tags telemetry with an entity.
pub(crate) struct EntityRecorder<'a> {
    pub(crate) entity: Entity,
    pub(crate) events: &'a mut Vec<SwingEvent>,
}

impl<'a> EntityRecorder<'a> {
    pub(crate) fn new(entity: Entity, events: &'a mut Vec<SwingEvent>) -> Self {
        Self { entity, events }
    }
}

impl SwingObserver for EntityRecorder<'_> {
    fn record(&mut self, telemetry: SwingTelemetry) {
        self.events.push(SwingEvent {
            entity: self.entity,
            telemetry,
        });
    }
}
