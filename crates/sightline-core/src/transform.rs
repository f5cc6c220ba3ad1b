//! Model transforms between candidate-local and world coordinates.

use glam::{Mat4, Vec3};

use crate::ray::Segment;

/// A candidate's model matrix together with its cached inverse.
///
/// Intersection runs in each candidate's local frame: the query segment is
/// pulled into local coordinates through the inverse, and hit positions and
/// normals are pushed back out through the matrix (inverse-transpose for
/// normals). A singular matrix is flagged instead of producing NaNs; the
/// engine skips such candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    matrix: Mat4,
    inverse: Mat4,
    invertible: bool,
}

impl ModelTransform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            inverse: Mat4::IDENTITY,
            invertible: true,
        }
    }

    /// Wraps a model matrix, caching its inverse.
    #[must_use]
    pub fn new(matrix: Mat4) -> Self {
        let det = matrix.determinant();
        let invertible = det.is_finite() && det.abs() > 1e-12;
        let inverse = if invertible {
            matrix.inverse()
        } else {
            Mat4::IDENTITY
        };
        Self {
            matrix,
            inverse,
            invertible,
        }
    }

    /// Returns the forward (local to world) matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Returns whether the matrix has a usable inverse.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.invertible
    }

    /// Maps a local point into world space.
    #[must_use]
    pub fn point_to_world(&self, p: Vec3) -> Vec3 {
        (self.matrix * p.extend(1.0)).truncate()
    }

    /// Maps a world point into local space.
    #[must_use]
    pub fn point_to_local(&self, p: Vec3) -> Vec3 {
        (self.inverse * p.extend(1.0)).truncate()
    }

    /// Maps a local normal into world space via the inverse-transpose,
    /// renormalized. Zero normals stay zero.
    #[must_use]
    pub fn normal_to_world(&self, n: Vec3) -> Vec3 {
        (self.inverse.transpose() * n.extend(0.0))
            .truncate()
            .normalize_or_zero()
    }

    /// Maps a world segment into local space.
    #[must_use]
    pub fn segment_to_local(&self, segment: &Segment) -> Segment {
        segment.transformed(&self.inverse)
    }

    /// Mean scale of the three local basis vectors in world space.
    ///
    /// Used to convert a world-space tolerance into local units before
    /// intersecting in the local frame.
    #[must_use]
    pub fn uniform_scale(&self) -> f32 {
        let m = &self.matrix;
        let sx = m.x_axis.truncate().length();
        let sy = m.y_axis.truncate().length();
        let sz = m.z_axis.truncate().length();
        (sx + sy + sz) / 3.0
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}
