//! Geometry primitives shared across the toolpath core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in 3D machine space
///
/// Coordinates are in the active unit system of the owning document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    ///
    /// Coordinates must be finite; NaN or infinite values indicate an
    /// upstream computation bug.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite(),
            "Point3 coordinates must be finite: ({}, {}, {})",
            x,
            y,
            z
        );
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// An axis-aligned machining boundary box
///
/// The box is stored as per-axis low/high pairs. After cutter-radius
/// adjustment a box may become inverted on X or Y; such a box is reported
/// rather than machined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Bounds3 {
    /// Low X limit
    pub minx: f64,
    /// High X limit
    pub maxx: f64,
    /// Low Y limit
    pub miny: f64,
    /// High Y limit
    pub maxy: f64,
    /// Low Z limit
    pub minz: f64,
    /// High Z limit
    pub maxz: f64,
}

impl Bounds3 {
    /// Creates a boundary box from per-axis limits.
    pub fn new(minx: f64, maxx: f64, miny: f64, maxy: f64, minz: f64, maxz: f64) -> Self {
        Self {
            minx,
            maxx,
            miny,
            maxy,
            minz,
            maxz,
        }
    }

    /// True when no axis is inverted.
    ///
    /// Zero spans are allowed; only min > max counts as inverted.
    pub fn is_valid(&self) -> bool {
        self.minx <= self.maxx && self.miny <= self.maxy && self.minz <= self.maxz
    }

    /// Extent along X.
    pub fn x_span(&self) -> f64 {
        self.maxx - self.minx
    }

    /// Extent along Y.
    pub fn y_span(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Extent along Z.
    pub fn z_span(&self) -> f64 {
        self.maxz - self.minz
    }

    /// Returns a copy grown (or shrunk, for negative `offset`) on X and Y.
    ///
    /// The low limits move down by `offset` and the high limits move up by
    /// it. Z limits are never touched: cutter-radius compensation applies
    /// to the horizontal contour only.
    pub fn grown_xy(&self, offset: f64) -> Self {
        Self {
            minx: self.minx - offset,
            maxx: self.maxx + offset,
            miny: self.miny - offset,
            maxy: self.maxy + offset,
            minz: self.minz,
            maxz: self.maxz,
        }
    }
}

impl fmt::Display for Bounds3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x {:.3}..{:.3}, y {:.3}..{:.3}, z {:.3}..{:.3}",
            self.minx, self.maxx, self.miny, self.maxy, self.minz, self.maxz
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_grown_xy_positive() {
        let bounds = Bounds3::new(0.0, 10.0, 0.0, 20.0, -5.0, 1.0);
        let grown = bounds.grown_xy(2.0);
        assert_eq!(grown.minx, -2.0);
        assert_eq!(grown.maxx, 12.0);
        assert_eq!(grown.miny, -2.0);
        assert_eq!(grown.maxy, 22.0);
        // Z must never move.
        assert_eq!(grown.minz, -5.0);
        assert_eq!(grown.maxz, 1.0);
    }

    #[test]
    fn test_grown_xy_negative_can_invert() {
        let bounds = Bounds3::new(0.0, 3.0, 0.0, 3.0, 0.0, 1.0);
        let shrunk = bounds.grown_xy(-2.0);
        assert_eq!(shrunk.minx, 2.0);
        assert_eq!(shrunk.maxx, 1.0);
        assert!(!shrunk.is_valid());
    }

    #[test]
    fn test_inverted_z_is_invalid() {
        let bounds = Bounds3::new(0.0, 10.0, 0.0, 10.0, 2.0, -2.0);
        assert!(!bounds.is_valid());
        // A flat box is still valid.
        assert!(Bounds3::new(0.0, 10.0, 0.0, 10.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_spans() {
        let bounds = Bounds3::new(-1.0, 4.0, 2.0, 2.5, 0.0, 3.0);
        assert!((bounds.x_span() - 5.0).abs() < 1e-12);
        assert!((bounds.y_span() - 0.5).abs() < 1e-12);
        assert!((bounds.z_span() - 3.0).abs() < 1e-12);
    }
}
