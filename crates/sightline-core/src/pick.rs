//! Pick results and payloads.

use glam::{IVec3, Vec2, Vec3};

/// Which attribute family a hardware selection addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldAssociation {
    /// Point-associated selection (snaps to mesh points).
    #[default]
    Points,
    /// Cell-associated selection.
    Cells,
}

/// Geometry-specific payload of a successful pick.
#[derive(Debug, Clone, PartialEq)]
pub enum PickedElement {
    /// Nothing was hit.
    None,
    /// A clipping plane was hit before the geometry behind it.
    ClipPlane {
        /// Index of the plane in the owning candidate's plane list.
        plane: usize,
    },
    /// A mesh cell.
    Cell {
        /// Cell index in the owning mesh.
        cell: usize,
        /// Sub-primitive index within a composite cell, 0 for simple cells.
        sub: usize,
        /// Parametric coordinates within the hit sub-primitive.
        pcoords: Vec3,
        /// Interpolation weights over the cell's points.
        weights: Vec<f32>,
        /// The cell point with the largest interpolation weight.
        point: u32,
        /// Interpolated texture coordinate, when the mesh carries one.
        texcoord: Option<Vec2>,
        /// Texture pixel position (half-texel offset applied), when the
        /// mesh carries a texture extent.
        texture_xy: Option<Vec2>,
    },
    /// A mesh point selected directly, without a cell intersection.
    Point {
        /// Point index in the owning mesh.
        point: u32,
    },
    /// A voxel in a structured volume.
    Voxel {
        /// Indices of the grid sample whose opacity crossed the threshold.
        ijk: IVec3,
        /// Fractional position within that sample's half-index footprint.
        pcoords: Vec3,
        /// Component whose opacity crossed the threshold.
        component: usize,
    },
    /// A texel on an image slice.
    SliceTexel {
        /// Nearest texel indices.
        ijk: IVec3,
        /// Fractional position within the texel.
        pcoords: Vec3,
    },
}

/// One candidate's contribution to a query: recorded for every candidate
/// that produced any finite hit, in candidate order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickedPosition {
    /// Candidate index in the query's input order.
    pub candidate: usize,
    /// Hit parameter relative to the original segment endpoints.
    pub t: f32,
    /// World-space hit position.
    pub world_position: Vec3,
}

/// A fully-resolved hit for one candidate, offered to the accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateHit {
    /// Hit parameter relative to the original segment endpoints.
    pub t: f32,
    /// Candidate index in the query's input order.
    pub candidate: usize,
    /// Candidate name.
    pub name: String,
    /// Hierarchy path of the candidate (outermost first).
    pub path: Vec<String>,
    /// Hit position in world coordinates.
    pub world_position: Vec3,
    /// Hit position in the candidate's local coordinates.
    pub local_position: Vec3,
    /// Surface normal in world coordinates (zero when undefined).
    pub world_normal: Vec3,
    /// Surface normal in local coordinates (zero when undefined).
    pub local_normal: Vec3,
    /// Geometry-specific payload.
    pub element: PickedElement,
    /// Clipping plane that bounded the hit, when one did.
    pub clip_plane: Option<usize>,
}

/// Accumulated result of one pick query.
///
/// Starts at a miss (`t` infinite); offered hits only ever decrease `t`;
/// the winning candidate's data is frozen once the query returns.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Winning hit parameter, `f32::INFINITY` on a miss.
    pub t: f32,
    /// Winning candidate index, `None` on a miss.
    pub candidate: Option<usize>,
    /// Winning candidate name, empty on a miss.
    pub candidate_name: String,
    /// Winning candidate hierarchy path.
    pub candidate_path: Vec<String>,
    /// World-space hit position.
    pub world_position: Vec3,
    /// Hit position in the winning candidate's local coordinates.
    pub local_position: Vec3,
    /// World-space surface normal (zero when undefined).
    pub world_normal: Vec3,
    /// Local-space surface normal (zero when undefined).
    pub local_normal: Vec3,
    /// Geometry-specific payload.
    pub element: PickedElement,
    /// Clipping plane that bounded the winning hit, when one did.
    pub clip_plane: Option<usize>,
    /// Every candidate that produced a finite hit, in candidate order.
    pub picked: Vec<PickedPosition>,
}

impl PickResult {
    /// A fresh all-miss result.
    #[must_use]
    pub fn miss() -> Self {
        Self {
            t: f32::INFINITY,
            candidate: None,
            candidate_name: String::new(),
            candidate_path: Vec::new(),
            world_position: Vec3::ZERO,
            local_position: Vec3::ZERO,
            world_normal: Vec3::ZERO,
            local_normal: Vec3::ZERO,
            element: PickedElement::None,
            clip_plane: None,
            picked: Vec::new(),
        }
    }

    /// Returns whether any candidate was hit.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.t.is_finite()
    }

    /// Records a finite per-candidate hit in the `picked` list.
    pub fn record_position(&mut self, position: PickedPosition) {
        self.picked.push(position);
    }

    /// Offers a candidate hit; it wins only with a strictly smaller `t`,
    /// so equal parameters keep the earlier candidate. Returns whether the
    /// offer won.
    pub fn offer(&mut self, hit: CandidateHit) -> bool {
        if !hit.t.is_finite() || hit.t >= self.t {
            return false;
        }
        self.t = hit.t;
        self.candidate = Some(hit.candidate);
        self.candidate_name = hit.name;
        self.candidate_path = hit.path;
        self.world_position = hit.world_position;
        self.local_position = hit.local_position;
        self.world_normal = hit.world_normal;
        self.local_normal = hit.local_normal;
        self.element = hit.element;
        self.clip_plane = hit.clip_plane;
        true
    }
}

impl Default for PickResult {
    fn default() -> Self {
        Self::miss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(candidate: usize, t: f32) -> CandidateHit {
        CandidateHit {
            t,
            candidate,
            name: format!("candidate{candidate}"),
            path: Vec::new(),
            world_position: Vec3::splat(t),
            local_position: Vec3::splat(t),
            world_normal: Vec3::Z,
            local_normal: Vec3::Z,
            element: PickedElement::None,
            clip_plane: None,
        }
    }

    #[test]
    fn test_miss_is_not_hit() {
        let result = PickResult::miss();
        assert!(!result.is_hit());
        assert_eq!(result.t, f32::INFINITY);
        assert_eq!(result.candidate, None);
    }

    #[test]
    fn test_offer_keeps_smallest_t() {
        let mut result = PickResult::miss();
        assert!(result.offer(hit(0, 0.7)));
        assert!(!result.offer(hit(1, 0.9)));
        assert!(result.offer(hit(2, 0.3)));
        assert_eq!(result.candidate, Some(2));
        assert!((result.t - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_equal_t_keeps_earlier_candidate() {
        let mut result = PickResult::miss();
        assert!(result.offer(hit(0, 0.5)));
        assert!(!result.offer(hit(1, 0.5)));
        assert_eq!(result.candidate, Some(0));
    }

    #[test]
    fn test_infinite_offer_ignored() {
        let mut result = PickResult::miss();
        assert!(!result.offer(hit(0, f32::INFINITY)));
        assert!(!result.is_hit());
    }

    #[test]
    fn test_picked_list_keeps_all() {
        let mut result = PickResult::miss();
        for (i, t) in [(0usize, 0.9f32), (1, 0.2), (2, 0.5)] {
            result.record_position(PickedPosition {
                candidate: i,
                t,
                world_position: Vec3::splat(t),
            });
            result.offer(hit(i, t));
        }
        assert_eq!(result.picked.len(), 3);
        assert_eq!(result.candidate, Some(1));
    }
}
