//! Physics query structures.
//!
//! These structures carry ray segments into the physics backend and the
//! resulting hits back out. The [`SensorProbe`] is the per-tick batch of rays
//! a backend is asked to cast on behalf of a swing controller.

use bevy::prelude::*;

/// Information about a raycast collision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// A finite ray from `origin` to `end` in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct RaySegment {
    /// Start of the ray.
    pub origin: Vec3,
    /// End of the ray.
    pub end: Vec3,
}

impl RaySegment {
    /// Create a segment between two points.
    pub fn new(origin: Vec3, end: Vec3) -> Self {
        Self { origin, end }
    }

    /// Create a segment from an origin, a direction and a length.
    ///
    /// The direction is normalized; a zero direction gives a zero-length segment.
    pub fn from_direction(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self {
            origin,
            end: origin + direction.normalize_or_zero() * length,
        }
    }

    /// Normalized direction of the segment (zero for degenerate segments).
    #[inline]
    pub fn direction(&self) -> Vec3 {
        (self.end - self.origin).normalize_or_zero()
    }

    /// Length of the segment.
    #[inline]
    pub fn length(&self) -> f32 {
        self.origin.distance(self.end)
    }
}

/// Rays requested from the physics backend for the current tick.
///
/// Filled by the search and dash planning systems, cast by the backend's
/// sensor systems via [`SensorProbe::cast_with`], and read back by the
/// simulation systems.
#[derive(Debug, Clone, Default)]
pub struct SensorProbe {
    /// Anchor search rays, in fan order.
    pub rays: Vec<RaySegment>,
    /// One result per entry of `rays` once cast.
    pub hits: Vec<Option<CollisionData>>,
    /// Pending dash trace.
    pub dash_ray: Option<RaySegment>,
    /// Result of the dash trace once cast.
    pub dash_hit: Option<CollisionData>,
    /// Whether the backend has cast the current batch.
    pub(crate) cast: bool,
}

impl SensorProbe {
    /// Drop all rays and results from the previous tick.
    pub fn clear(&mut self) {
        self.rays.clear();
        self.hits.clear();
        self.dash_ray = None;
        self.dash_hit = None;
        self.cast = false;
    }

    /// Whether any ray is waiting to be cast.
    pub fn has_pending(&self) -> bool {
        !self.cast && (!self.rays.is_empty() || self.dash_ray.is_some())
    }

    /// Whether the backend has cast this tick's rays.
    pub fn is_cast(&self) -> bool {
        self.cast
    }

    /// Cast every pending ray with the given query and store the results.
    pub fn cast_with(&mut self, mut raycast: impl FnMut(RaySegment) -> Option<CollisionData>) {
        self.hits = self.rays.iter().map(|ray| raycast(*ray)).collect();
        self.dash_hit = self.dash_ray.and_then(&mut raycast);
        self.cast = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_hit() {
        let cast = CollisionData::new(5.0, Vec3::Y, Vec3::new(10.0, 0.0, 0.0), None);

        assert_eq!(cast.distance, 5.0);
        assert_eq!(cast.normal, Vec3::Y);
        assert_eq!(cast.point, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn collision_data_with_entity() {
        let entity = Entity::from_raw(42);
        let cast = CollisionData::new(3.0, Vec3::X, Vec3::ZERO, Some(entity));

        assert_eq!(cast.entity, Some(entity));
    }

    #[test]
    fn segment_from_direction_normalizes() {
        let ray = RaySegment::from_direction(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0), 50.0);
        assert_eq!(ray.end, Vec3::new(0.0, 50.0, 0.0));
        assert!((ray.length() - 50.0).abs() < 1e-4);
        assert_eq!(ray.direction(), Vec3::Y);
    }

    #[test]
    fn degenerate_segment_has_zero_direction() {
        let ray = RaySegment::from_direction(Vec3::ONE, Vec3::ZERO, 50.0);
        assert_eq!(ray.direction(), Vec3::ZERO);
        assert_eq!(ray.length(), 0.0);
    }

    #[test]
    fn probe_cast_fills_results_in_order() {
        let mut probe = SensorProbe::default();
        probe.rays = vec![
            RaySegment::new(Vec3::ZERO, Vec3::Y),
            RaySegment::new(Vec3::ZERO, Vec3::X),
        ];
        probe.dash_ray = Some(RaySegment::new(Vec3::ZERO, Vec3::Z));
        assert!(probe.has_pending());

        probe.cast_with(|ray| {
            (ray.end == Vec3::X).then(|| CollisionData::new(1.0, Vec3::NEG_X, ray.end, None))
        });

        assert!(probe.is_cast());
        assert!(!probe.has_pending());
        assert_eq!(probe.hits.len(), 2);
        assert!(probe.hits[0].is_none());
        assert_eq!(probe.hits[1].map(|h| h.point), Some(Vec3::X));
        assert!(probe.dash_hit.is_none());

        probe.clear();
        assert!(probe.rays.is_empty());
        assert!(!probe.is_cast());
    }
}
