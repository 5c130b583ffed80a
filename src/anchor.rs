//! Tether anchors.
//!
//! An anchor is a fixed world point the character hangs from. Its tether
//! length is measured once, when the anchor is captured, and never changes.
//! A controller holds up to two anchors (primary and secondary); when both are
//! present the swing pivots around their midpoint.

use bevy::prelude::*;

/// Sentinel returned by length queries when no anchor is attached.
pub const NO_TETHER_LENGTH: f32 = -1.0;

/// Which anchor slot a query or attachment refers to.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    /// No specific side: combine whatever anchors are present.
    #[default]
    None,
    /// The primary anchor (acquired by anchor search).
    Primary,
    /// The secondary anchor.
    Secondary,
    /// Both anchors together.
    Both,
}

/// A captured swing anchor.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    location: Vec3,
    tether_length: f32,
    side: AnchorSide,
}

impl Anchor {
    /// Capture an anchor at `location`, measuring the tether from `actor_position`.
    pub fn capture(location: Vec3, actor_position: Vec3, side: AnchorSide) -> Self {
        Self {
            location,
            tether_length: location.distance(actor_position),
            side,
        }
    }

    /// Create an anchor with an explicit tether length.
    pub fn with_length(location: Vec3, tether_length: f32, side: AnchorSide) -> Self {
        Self {
            location,
            tether_length: tether_length.max(0.0),
            side,
        }
    }

    /// World position of the anchor.
    #[inline]
    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Maximum distance the actor may be from the anchor.
    #[inline]
    pub fn tether_length(&self) -> f32 {
        self.tether_length
    }

    /// Slot this anchor was attached to.
    #[inline]
    pub fn side(&self) -> AnchorSide {
        self.side
    }
}

/// The anchors a controller is currently tethered to.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct TetherAnchors {
    primary: Option<Anchor>,
    secondary: Option<Anchor>,
}

impl TetherAnchors {
    /// Whether any anchor is attached.
    pub fn is_attached(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    /// The primary anchor, if attached.
    pub fn primary(&self) -> Option<&Anchor> {
        self.primary.as_ref()
    }

    /// The secondary anchor, if attached.
    pub fn secondary(&self) -> Option<&Anchor> {
        self.secondary.as_ref()
    }

    /// Attach an anchor to the slot it names.
    ///
    /// `Primary` and `Secondary` replace that slot. `None` and `Both` fill the
    /// primary slot when empty, otherwise the secondary slot.
    pub fn attach(&mut self, anchor: Anchor) {
        let side = match anchor.side {
            AnchorSide::Primary => AnchorSide::Primary,
            AnchorSide::Secondary => AnchorSide::Secondary,
            AnchorSide::None | AnchorSide::Both => {
                if self.primary.is_none() {
                    AnchorSide::Primary
                } else {
                    AnchorSide::Secondary
                }
            }
        };
        let anchor = Anchor { side, ..anchor };
        match side {
            AnchorSide::Secondary => self.secondary = Some(anchor),
            _ => self.primary = Some(anchor),
        }
    }

    /// Detach every anchor.
    pub fn clear(&mut self) {
        self.primary = None;
        self.secondary = None;
    }

    /// Anchor location for the given side.
    ///
    /// Returns [`Vec3::ZERO`] when the requested anchor(s) are missing; callers
    /// must treat that as "no anchor", not as a valid point.
    pub fn location(&self, side: AnchorSide) -> Vec3 {
        match side {
            AnchorSide::Primary => self.primary.map(|a| a.location).unwrap_or(Vec3::ZERO),
            AnchorSide::Secondary => self.secondary.map(|a| a.location).unwrap_or(Vec3::ZERO),
            AnchorSide::Both => match (self.primary, self.secondary) {
                (Some(a), Some(b)) => (a.location + b.location) * 0.5,
                _ => Vec3::ZERO,
            },
            AnchorSide::None => match (self.primary, self.secondary) {
                (Some(a), Some(b)) => (a.location + b.location) * 0.5,
                (Some(a), None) | (None, Some(a)) => a.location,
                (None, None) => Vec3::ZERO,
            },
        }
    }

    /// Tether length for the given side.
    ///
    /// Returns [`NO_TETHER_LENGTH`] when the requested anchor is missing.
    pub fn tether_length(&self, side: AnchorSide) -> f32 {
        let anchor = match side {
            AnchorSide::Primary => self.primary,
            AnchorSide::Secondary => self.secondary,
            AnchorSide::None | AnchorSide::Both => self.primary.or(self.secondary),
        };
        anchor.map(|a| a.tether_length).unwrap_or(NO_TETHER_LENGTH)
    }

    /// The anchor the tether constraint pivots around this tick.
    pub fn governing(&self) -> Option<Anchor> {
        if !self.is_attached() {
            return None;
        }
        Some(Anchor {
            location: self.location(AnchorSide::None),
            tether_length: self.tether_length(AnchorSide::None),
            side: if self.primary.is_some() && self.secondary.is_some() {
                AnchorSide::Both
            } else if self.primary.is_some() {
                AnchorSide::Primary
            } else {
                AnchorSide::Secondary
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_measures_tether_length() {
        let anchor = Anchor::capture(Vec3::new(0.0, 2000.0, 0.0), Vec3::ZERO, AnchorSide::Primary);
        assert_eq!(anchor.tether_length(), 2000.0);
        assert_eq!(anchor.side(), AnchorSide::Primary);
    }

    #[test]
    fn empty_anchors_return_sentinels() {
        let anchors = TetherAnchors::default();
        assert!(!anchors.is_attached());
        assert_eq!(anchors.location(AnchorSide::None), Vec3::ZERO);
        assert_eq!(anchors.location(AnchorSide::Both), Vec3::ZERO);
        assert_eq!(anchors.tether_length(AnchorSide::None), NO_TETHER_LENGTH);
        assert_eq!(anchors.tether_length(AnchorSide::Secondary), NO_TETHER_LENGTH);
        assert!(anchors.governing().is_none());
    }

    #[test]
    fn dual_anchors_average_location() {
        let mut anchors = TetherAnchors::default();
        anchors.attach(Anchor::with_length(Vec3::new(-100.0, 500.0, 0.0), 400.0, AnchorSide::Primary));
        anchors.attach(Anchor::with_length(Vec3::new(100.0, 500.0, 0.0), 300.0, AnchorSide::Secondary));

        assert_eq!(anchors.location(AnchorSide::Both), Vec3::new(0.0, 500.0, 0.0));
        assert_eq!(anchors.location(AnchorSide::None), Vec3::new(0.0, 500.0, 0.0));
        assert_eq!(anchors.location(AnchorSide::Secondary), Vec3::new(100.0, 500.0, 0.0));

        // Combined length follows the primary anchor.
        assert_eq!(anchors.tether_length(AnchorSide::None), 400.0);
        assert_eq!(anchors.tether_length(AnchorSide::Secondary), 300.0);

        let governing = anchors.governing().unwrap();
        assert_eq!(governing.side(), AnchorSide::Both);
        assert_eq!(governing.tether_length(), 400.0);
    }

    #[test]
    fn both_requires_two_anchors() {
        let mut anchors = TetherAnchors::default();
        anchors.attach(Anchor::with_length(Vec3::Y, 1.0, AnchorSide::Primary));
        assert_eq!(anchors.location(AnchorSide::Both), Vec3::ZERO);
        assert_eq!(anchors.location(AnchorSide::None), Vec3::Y);
    }

    #[test]
    fn unsided_attach_fills_primary_then_secondary() {
        let mut anchors = TetherAnchors::default();
        anchors.attach(Anchor::with_length(Vec3::X, 1.0, AnchorSide::None));
        anchors.attach(Anchor::with_length(Vec3::Z, 2.0, AnchorSide::None));

        assert_eq!(anchors.primary().map(|a| a.side()), Some(AnchorSide::Primary));
        assert_eq!(anchors.secondary().map(|a| a.side()), Some(AnchorSide::Secondary));

        anchors.clear();
        assert!(!anchors.is_attached());
    }

    #[test]
    fn secondary_only_still_governs() {
        let mut anchors = TetherAnchors::default();
        anchors.attach(Anchor::with_length(Vec3::Z, 7.0, AnchorSide::Secondary));
        let governing = anchors.governing().unwrap();
        assert_eq!(governing.side(), AnchorSide::Secondary);
        assert_eq!(governing.tether_length(), 7.0);
        assert_eq!(governing.location(), Vec3::Z);
    }
}
