//! Pick segments.
//!
//! Queries are phrased as finite segments rather than unbounded rays: the
//! parameter `t` runs from 0.0 at the near endpoint to 1.0 at the far
//! endpoint, and every reported hit keeps `t` relative to these original
//! endpoints even after clipping narrows the searched range.

use glam::{Mat4, Vec3};

/// A finite segment from a near endpoint to a far endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Near endpoint (t = 0).
    pub p1: Vec3,
    /// Far endpoint (t = 1).
    pub p2: Vec3,
}

impl Segment {
    /// Creates a segment from its near and far endpoints.
    #[must_use]
    pub fn new(p1: Vec3, p2: Vec3) -> Self {
        Self { p1, p2 }
    }

    /// Returns the point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.p1 + (self.p2 - self.p1) * t
    }

    /// Returns the unnormalized vector from the near to the far endpoint.
    #[must_use]
    pub fn delta(&self) -> Vec3 {
        self.p2 - self.p1
    }

    /// Returns the normalized direction, or zero for a degenerate segment.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.delta().normalize_or_zero()
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.delta().length()
    }

    /// Returns whether the endpoints coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.delta().length_squared() < 1e-12
    }

    /// Maps both endpoints through `matrix` as points.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            p1: (*matrix * self.p1.extend(1.0)).truncate(),
            p2: (*matrix * self.p2.extend(1.0)).truncate(),
        }
    }

    /// Parameter of the point on the segment closest to `point`, clamped
    /// to [0, 1]. Degenerate segments return 0.
    #[must_use]
    pub fn closest_t(&self, point: Vec3) -> f32 {
        let d = self.delta();
        let len_sq = d.length_squared();
        if len_sq < 1e-12 {
            return 0.0;
        }
        ((point - self.p1).dot(d) / len_sq).clamp(0.0, 1.0)
    }

    /// Distance from `point` to the segment.
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        (point - self.point_at(self.closest_t(point))).length()
    }
}
