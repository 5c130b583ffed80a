//! Anchor search.
//!
//! While the character is airborne with the swing input held, a fan of rays
//! is cast from the actor every fixed tick. The fan is centred on world up
//! tilted toward the facing direction (more tilt at higher speed) and widens
//! over time. The first ray that hits geometry far enough away becomes the
//! primary anchor.
//!
//! The search is split into [`plan_search`] (which rays to cast this tick)
//! and [`resolve_hits`] (which hit to accept) so the physics backend can cast
//! the rays in between. [`try_search`] runs all three steps for hosts that
//! own a raycast function directly.

use bevy::prelude::*;

use crate::anchor::{Anchor, AnchorSide};
use crate::collision::{CollisionData, RaySegment};
use crate::config::SwingConfig;
use crate::telemetry::{SwingObserver, SwingTelemetry};

/// When the anchor search starts casting rays.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpreadCasting {
    /// Grow the spread without casting until it reaches its maximum, then
    /// cast the fully widened fan every tick.
    #[default]
    WhenSaturated,
    /// Cast at the current spread every tick while it widens.
    Progressive,
}

/// Angular half-width of the search cone, in degrees.
///
/// Reset to zero at the start of every search episode and never decreases
/// until the next reset.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct TraceSpread {
    degrees: f32,
}

impl TraceSpread {
    /// Current half-width in degrees.
    #[inline]
    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    /// Start a new search episode.
    pub fn reset(&mut self) {
        self.degrees = 0.0;
    }

    /// Widen toward `max` at `rate` degrees per second.
    pub fn advance(&mut self, dt: f32, rate: f32, max: f32) {
        let step = (rate * dt).max(0.0);
        self.degrees = (self.degrees + step).min(max).max(self.degrees);
    }

    /// Whether the spread has reached `max`.
    pub fn is_saturated(&self, max: f32) -> bool {
        self.degrees >= max
    }
}

/// Horizontal speed as a fraction of `reference_speed`, clamped to [0, 1].
pub fn velocity_ratio(velocity: Vec3, reference_speed: f32) -> f32 {
    if reference_speed <= 0.0 {
        return 0.0;
    }
    (velocity.xz().length() / reference_speed).clamp(0.0, 1.0)
}

/// Horizontal facing direction for a yaw angle (radians, `0` faces `-Z`).
pub fn facing_forward(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * Vec3::NEG_Z
}

/// Build the ray fan for the given spread.
pub fn ray_fan(
    origin: Vec3,
    facing_yaw: f32,
    velocity_ratio: f32,
    spread_degrees: f32,
    config: &SwingConfig,
) -> Vec<RaySegment> {
    let count = config.trace_count;
    if count == 0 {
        return Vec::new();
    }

    let forward = facing_forward(facing_yaw);
    // Rotating up around this axis tilts it toward `forward`.
    let tilt_axis = Vec3::Y.cross(forward).normalize_or_zero();
    let t = velocity_ratio.clamp(0.0, 1.0);
    let tilt = (config.axis_offset_min + (config.axis_offset_max - config.axis_offset_min) * t)
        .to_radians();
    let center = Quat::from_axis_angle(tilt_axis, tilt) * Vec3::Y;
    let spread = spread_degrees.to_radians();

    (0..count)
        .map(|i| {
            let angle = (i as f32 * (360.0 / count as f32)).to_radians();
            let spread_axis = Quat::from_axis_angle(center, angle) * tilt_axis;
            let direction = Quat::from_axis_angle(spread_axis.normalize_or_zero(), spread) * center;
            RaySegment::from_direction(origin, direction, config.trace_length)
        })
        .collect()
}

/// Decide which rays to cast this tick and advance the spread.
///
/// Returns an empty list when nothing should be cast (spread still widening
/// under [`SpreadCasting::WhenSaturated`]).
pub fn plan_search(
    spread: &mut TraceSpread,
    origin: Vec3,
    facing_yaw: f32,
    velocity_ratio: f32,
    dt: f32,
    config: &SwingConfig,
) -> Vec<RaySegment> {
    match config.spread_casting {
        SpreadCasting::WhenSaturated => {
            if !spread.is_saturated(config.spread_max) {
                spread.advance(dt, config.spread_speed, config.spread_max);
                if !spread.is_saturated(config.spread_max) {
                    return Vec::new();
                }
            }
            ray_fan(origin, facing_yaw, velocity_ratio, spread.degrees(), config)
        }
        SpreadCasting::Progressive => {
            let rays = ray_fan(origin, facing_yaw, velocity_ratio, spread.degrees(), config);
            spread.advance(dt, config.spread_speed, config.spread_max);
            rays
        }
    }
}

/// Pick the first acceptable hit, in ray order.
///
/// A hit is acceptable when its squared distance from `origin` is at least
/// `min_valid_length²`. `hits` is matched to `rays` by index.
pub fn resolve_hits(
    origin: Vec3,
    rays: &[RaySegment],
    hits: &[Option<CollisionData>],
    config: &SwingConfig,
    observer: &mut impl SwingObserver,
) -> Option<Anchor> {
    let min_sq = config.min_valid_length * config.min_valid_length;
    let mut accepted: Option<Anchor> = None;

    for (ray, hit) in rays.iter().zip(hits.iter()) {
        let valid = hit.filter(|h| h.point.distance_squared(origin) >= min_sq);
        let take = accepted.is_none() && valid.is_some();
        observer.record(SwingTelemetry::RayCast {
            origin: ray.origin,
            end: ray.end,
            hit: hit.map(|h| h.point),
            accepted: take,
        });
        if take {
            accepted = valid.map(|h| Anchor::capture(h.point, origin, AnchorSide::Primary));
        }
    }

    if let Some(anchor) = accepted {
        observer.record(SwingTelemetry::AnchorAcquired { anchor });
    }
    accepted
}

/// Plan, cast and resolve one search tick.
#[allow(clippy::too_many_arguments)]
pub fn try_search(
    origin: Vec3,
    facing_yaw: f32,
    velocity_ratio: f32,
    spread: &mut TraceSpread,
    dt: f32,
    config: &SwingConfig,
    mut raycast: impl FnMut(RaySegment) -> Option<CollisionData>,
    observer: &mut impl SwingObserver,
) -> Option<Anchor> {
    let rays = plan_search(spread, origin, facing_yaw, velocity_ratio, dt, config);
    if rays.is_empty() {
        return None;
    }
    let hits: Vec<Option<CollisionData>> = rays.iter().map(|ray| raycast(*ray)).collect();
    resolve_hits(origin, &rays, &hits, config, observer)
}
