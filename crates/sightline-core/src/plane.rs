//! Clipping planes.
//!
//! A clip plane bounds a half space: points with negative signed distance
//! are kept (inside), points with positive signed distance are clipped
//! away. Candidates own their planes in local coordinates.

use glam::Vec3;

/// A half-space boundary with inward-facing negative side.
///
/// The plane satisfies `normal . x + offset == 0`; `normal` is kept at
/// unit length by the constructors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    /// Unit normal, pointing toward the clipped (outside) half space.
    normal: Vec3,
    /// Plane offset along the normal.
    offset: f32,
}

impl ClipPlane {
    /// Creates a plane from a normal and offset, normalizing both so the
    /// stored normal has unit length.
    #[must_use]
    pub fn new(normal: Vec3, offset: f32) -> Self {
        let len = normal.length();
        if len < 1e-12 {
            // Degenerate normal: keep everything.
            return Self {
                normal: Vec3::ZERO,
                offset: -1.0,
            };
        }
        Self {
            normal: normal / len,
            offset: offset / len,
        }
    }

    /// Creates a plane through `origin` with the given normal.
    #[must_use]
    pub fn from_origin_normal(origin: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            offset: -origin.dot(n),
        }
    }

    /// Creates a plane through three points, with the normal of the
    /// triangle winding `(a, b, c)`.
    #[must_use]
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let n = (b - a).cross(c - a).normalize_or_zero();
        Self {
            normal: n,
            offset: -a.dot(n),
        }
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the plane offset.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Returns the signed distance from `point` to the plane. Negative
    /// values are inside (kept), positive values are outside (clipped).
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.offset
    }

    /// Returns whether `point` is on the kept side (boundary included).
    #[must_use]
    pub fn is_inside(&self, point: Vec3) -> bool {
        self.signed_distance(point) <= 0.0
    }

    /// Returns the same boundary with the kept side inverted.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Projects a point onto the plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.signed_distance(point) * self.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_origin_normal() {
        let plane = ClipPlane::from_origin_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        assert_eq!(plane.normal(), Vec3::Y);
        assert!((plane.offset() - (-2.0)).abs() < 1e-6);
        assert!((plane.signed_distance(Vec3::new(1.0, 2.0, 3.0))).abs() < 1e-6);
    }

    #[test]
    fn test_signed_distance_sides() {
        let plane = ClipPlane::from_origin_normal(Vec3::ZERO, Vec3::Y);
        assert!(plane.signed_distance(Vec3::new(0.0, 1.0, 0.0)) > 0.0);
        assert!(plane.signed_distance(Vec3::new(0.0, -1.0, 0.0)) < 0.0);
        assert!(plane.is_inside(Vec3::new(0.0, -1.0, 0.0)));
        assert!(!plane.is_inside(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_new_normalizes() {
        let plane = ClipPlane::new(Vec3::new(0.0, 2.0, 0.0), 4.0);
        assert!((plane.normal() - Vec3::Y).length() < 1e-6);
        assert!((plane.offset() - 2.0).abs() < 1e-6);
        // Same geometric plane as new(Y, 2): y = -2.
        assert!(plane.signed_distance(Vec3::new(5.0, -2.0, 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal_keeps_everything() {
        let plane = ClipPlane::new(Vec3::ZERO, 3.0);
        assert!(plane.is_inside(Vec3::new(100.0, -50.0, 7.0)));
        assert!(plane.is_inside(Vec3::ZERO));
    }

    #[test]
    fn test_flipped() {
        let plane = ClipPlane::from_origin_normal(Vec3::ZERO, Vec3::Y);
        let flipped = plane.flipped();
        assert!(flipped.is_inside(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!flipped.is_inside(Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_from_points_and_project() {
        // Plane z = 1 with +Z normal.
        let plane = ClipPlane::from_points(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert!((plane.normal() - Vec3::Z).length() < 1e-6);
        let projected = plane.project(Vec3::new(2.0, 3.0, 5.0));
        assert!((projected - Vec3::new(2.0, 3.0, 1.0)).length() < 1e-6);
    }
}
