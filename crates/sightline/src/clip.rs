//! Segment clipping against plane sets and axis-aligned extents.
//!
//! Both clippers narrow the searched parameter range of a pick segment
//! without touching its endpoints: every `t` they report stays relative to
//! the original `p1`/`p2`, so hits found inside a narrowed range compare
//! directly against hits from unclipped candidates.

use sightline_core::{ClipPlane, Segment};

/// Parameter range left after clipping, with the plane that bounds its
/// near end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedRange {
    /// Near end of the surviving range.
    pub t1: f32,
    /// Far end of the surviving range.
    pub t2: f32,
    /// The plane that tightened `t1`, `None` when `t1` stayed at 0.
    pub front_plane: Option<usize>,
}

/// Parameter range left after an extent slab test, with the box plane that
/// determined entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtentRange {
    /// Near end of the surviving range.
    pub t1: f32,
    /// Far end of the surviving range.
    pub t2: f32,
    /// Index of the box plane (`0,1` = x min/max, `2,3` = y, `4,5` = z)
    /// that tightened `t1`, `None` when `t1` stayed at 0.
    pub entry_plane: Option<usize>,
}

/// Clips a segment against a set of half-space planes.
///
/// Points with negative signed distance are inside. A plane whose two
/// endpoint distances are both positive rejects the segment outright; a
/// sign change tightens the range at the crossing `t = d1 / (d1 - d2)`.
///
/// The plane set is assumed to bound a convex region. The result for a
/// non-convex set is unspecified and deliberately left that way.
#[must_use]
pub fn clip_with_planes(segment: &Segment, planes: &[ClipPlane]) -> Option<ClippedRange> {
    let mut t1 = 0.0_f32;
    let mut t2 = 1.0_f32;
    let mut front_plane = None;

    for (id, plane) in planes.iter().enumerate() {
        let d1 = plane.signed_distance(segment.p1);
        let d2 = plane.signed_distance(segment.p2);
        if d1 > 0.0 && d2 > 0.0 {
            return None;
        }
        if d1 <= 0.0 && d2 <= 0.0 {
            continue;
        }

        let t = d1 / (d1 - d2);
        if d1 > 0.0 {
            if t > t1 {
                t1 = t;
                front_plane = Some(id);
            }
        } else if t < t2 {
            t2 = t;
        }
        if t1 > t2 {
            return None;
        }
    }

    Some(ClippedRange { t1, t2, front_plane })
}

/// Clips a segment against an inclusive axis-aligned box, given as
/// `[x_min, x_max, y_min, y_max, z_min, z_max]`.
///
/// Classic three-axis slab test: per axis the two bounding planes yield an
/// entry and exit parameter, axis-parallel segments are inside-checked
/// instead, and the three intervals intersect into the result.
#[must_use]
pub fn clip_with_extent(segment: &Segment, bounds: &[f32; 6]) -> Option<ExtentRange> {
    let mut t1 = 0.0_f32;
    let mut t2 = 1.0_f32;
    let mut entry_plane = None;

    for axis in 0..3 {
        let lo = bounds[2 * axis];
        let hi = bounds[2 * axis + 1];
        if lo > hi {
            return None;
        }

        let origin = segment.p1[axis];
        let delta = segment.p2[axis] - origin;
        if delta.abs() < 1e-12 {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let (enter, enter_plane, exit) = if delta > 0.0 {
            ((lo - origin) / delta, 2 * axis, (hi - origin) / delta)
        } else {
            ((hi - origin) / delta, 2 * axis + 1, (lo - origin) / delta)
        };

        if enter > t1 {
            t1 = enter;
            entry_plane = Some(enter_plane);
        }
        if exit < t2 {
            t2 = exit;
        }
        if t1 > t2 {
            return None;
        }
    }

    Some(ExtentRange { t1, t2, entry_plane })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn seg(p1: Vec3, p2: Vec3) -> Segment {
        Segment::new(p1, p2)
    }

    #[test]
    fn test_no_planes_keeps_full_range() {
        let range = clip_with_planes(&seg(Vec3::ZERO, Vec3::X), &[]).unwrap();
        assert_eq!(range.t1, 0.0);
        assert_eq!(range.t2, 1.0);
        assert_eq!(range.front_plane, None);
    }

    #[test]
    fn test_plane_tightens_near_end() {
        // Keep x >= 0.5: a -X normal plane through (0.5, 0, 0).
        let plane = ClipPlane::from_origin_normal(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X);
        let range =
            clip_with_planes(&seg(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)), &[plane]).unwrap();
        assert!((range.t1 - 0.25).abs() < 1e-6);
        assert_eq!(range.t2, 1.0);
        assert_eq!(range.front_plane, Some(0));
    }

    #[test]
    fn test_plane_tightens_far_end_without_front_id() {
        // Keep x <= 0.5.
        let plane = ClipPlane::from_origin_normal(Vec3::new(0.5, 0.0, 0.0), Vec3::X);
        let range =
            clip_with_planes(&seg(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)), &[plane]).unwrap();
        assert_eq!(range.t1, 0.0);
        assert!((range.t2 - 0.25).abs() < 1e-6);
        assert_eq!(range.front_plane, None);
    }

    #[test]
    fn test_fully_outside_rejected() {
        let plane = ClipPlane::from_origin_normal(Vec3::ZERO, Vec3::NEG_X);
        assert!(clip_with_planes(
            &seg(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(-3.0, 1.0, 0.0)),
            &[plane],
        )
        .is_none());
    }

    #[test]
    fn test_disjoint_slabs_rejected() {
        // x >= 1 and x <= -1 leave nothing.
        let planes = [
            ClipPlane::from_origin_normal(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_X),
            ClipPlane::from_origin_normal(Vec3::new(-1.0, 0.0, 0.0), Vec3::X),
        ];
        assert!(clip_with_planes(
            &seg(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)),
            &planes,
        )
        .is_none());
    }

    #[test]
    fn test_most_restrictive_plane_wins_front() {
        // Two near-end planes; the later, tighter one owns the front id.
        let planes = [
            ClipPlane::from_origin_normal(Vec3::new(0.25, 0.0, 0.0), Vec3::NEG_X),
            ClipPlane::from_origin_normal(Vec3::new(0.5, 0.0, 0.0), Vec3::NEG_X),
        ];
        let range =
            clip_with_planes(&seg(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)), &planes).unwrap();
        assert!((range.t1 - 0.5).abs() < 1e-6);
        assert_eq!(range.front_plane, Some(1));
    }

    #[test]
    fn test_extent_inside_keeps_full_range() {
        let bounds = [0.0, 4.0, 0.0, 3.0, 0.0, 2.0];
        let range = clip_with_extent(
            &seg(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 2.0, 1.0)),
            &bounds,
        )
        .unwrap();
        assert_eq!(range.t1, 0.0);
        assert_eq!(range.t2, 1.0);
        assert_eq!(range.entry_plane, None);
    }

    #[test]
    fn test_extent_entry_plane() {
        let bounds = [0.0, 4.0, 0.0, 4.0, 0.0, 4.0];
        // Enters through the x-min face.
        let range = clip_with_extent(
            &seg(Vec3::new(-2.0, 2.0, 2.0), Vec3::new(2.0, 2.0, 2.0)),
            &bounds,
        )
        .unwrap();
        assert!((range.t1 - 0.5).abs() < 1e-6);
        assert_eq!(range.entry_plane, Some(0));

        // Enters through the z-max face.
        let range = clip_with_extent(
            &seg(Vec3::new(2.0, 2.0, 6.0), Vec3::new(2.0, 2.0, 2.0)),
            &bounds,
        )
        .unwrap();
        assert_eq!(range.entry_plane, Some(5));
    }

    #[test]
    fn test_extent_outside_one_axis_fails() {
        let bounds = [0.0, 4.0, 0.0, 4.0, 0.0, 4.0];
        assert!(clip_with_extent(
            &seg(Vec3::new(1.0, 9.0, 1.0), Vec3::new(3.0, 9.0, 3.0)),
            &bounds,
        )
        .is_none());
    }

    #[test]
    fn test_extent_axis_parallel_inside_check() {
        let bounds = [0.0, 4.0, 0.0, 4.0, 2.0, 2.0];
        // z is constant and on the (degenerate) z slab: passes.
        assert!(clip_with_extent(
            &seg(Vec3::new(1.0, 1.0, 2.0), Vec3::new(3.0, 3.0, 2.0)),
            &bounds,
        )
        .is_some());
        // z constant but off the slab: fails.
        assert!(clip_with_extent(
            &seg(Vec3::new(1.0, 1.0, 3.0), Vec3::new(3.0, 3.0, 3.0)),
            &bounds,
        )
        .is_none());
    }

    #[test]
    fn test_extent_inverted_bounds_rejected() {
        let bounds = [4.0, 0.0, 0.0, 4.0, 0.0, 4.0];
        assert!(clip_with_extent(&seg(Vec3::ONE, Vec3::splat(3.0)), &bounds).is_none());
    }
}
