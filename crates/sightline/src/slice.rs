//! Ray intersection with oriented, cropped image slices.

use sightline_core::Segment;
use sightline_structures::ImageSlice;

use crate::clip::clip_with_extent;

/// A resolved hit on an image slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceHit {
    /// Hit parameter relative to the original segment endpoints.
    pub t: f32,
    /// Indices of the texel nearest the hit.
    pub ijk: glam::IVec3,
    /// Fractional position within that texel's footprint.
    pub pcoords: glam::Vec3,
}

/// Intersects the local-space segment with the slice's display plane,
/// bounded by its crop box and the caller's `[t1, t2]` domain.
///
/// The segment is first slab-tested against the crop box in continuous
/// index space, then the plane crossing is refined by linearly
/// interpolating the signed plane distance at the two box-clip endpoints.
/// Positions outside the crop by no more than `tolerance` (local units)
/// are clamped onto it; anything further out is rejected.
#[must_use]
pub fn intersect_slice(
    slice: &ImageSlice,
    segment: &Segment,
    t1: f32,
    t2: f32,
    tolerance: f32,
) -> Option<SliceHit> {
    let crop = slice.crop_box();
    let index_segment = Segment::new(
        slice.local_to_index(segment.p1),
        slice.local_to_index(segment.p2),
    );
    let box_clip = clip_with_extent(&index_segment, &crop)?;

    // Signed plane distance at the box-clip endpoints, in local units. The
    // plane's stored orientation is irrelevant to the crossing parameter.
    let plane = slice.plane();
    let d1 = plane.signed_distance(segment.point_at(box_clip.t1));
    let d2 = plane.signed_distance(segment.point_at(box_clip.t2));

    let t = if (d1 - d2).abs() < 1e-12 {
        // Parallel to the plane: only a graze within tolerance counts.
        if d1.abs() > tolerance {
            return None;
        }
        box_clip.t1
    } else if d1 * d2 <= 0.0 {
        box_clip.t1 + (box_clip.t2 - box_clip.t1) * d1 / (d1 - d2)
    } else if d1.abs() <= tolerance {
        box_clip.t1
    } else if d2.abs() <= tolerance {
        box_clip.t2
    } else {
        return None;
    };

    let length = segment.length();
    let t_tol = if length > 1e-12 { tolerance / length } else { tolerance };
    if t < t1 - t_tol || t > t2 + t_tol {
        return None;
    }
    let t = t.clamp(t1, t2);

    // Clamp the hit onto the crop box, rejecting offsets beyond the
    // tolerance converted into index units per axis.
    let mut x = index_segment.point_at(t);
    let spacing = slice.spacing();
    for axis in 0..3 {
        let index_tol = if spacing[axis].abs() > 1e-12 {
            tolerance / spacing[axis].abs()
        } else {
            tolerance
        };
        let lo = crop[2 * axis];
        let hi = crop[2 * axis + 1];
        if x[axis] < lo - index_tol || x[axis] > hi + index_tol {
            return None;
        }
        x[axis] = x[axis].clamp(lo, hi);
    }

    let (ijk, pcoords) = slice.nearest_texel(x);
    Some(SliceHit { t, ijk, pcoords })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Vec3};

    /// A 5x5 image in the z = 2 plane, unit spacing.
    fn test_slice() -> ImageSlice {
        ImageSlice::axis_aligned(Vec3::ZERO, Vec3::ONE, [0, 4, 0, 4, 2, 2], 2).unwrap()
    }

    fn z_ray(x: f32, y: f32) -> Segment {
        Segment::new(Vec3::new(x, y, 10.0), Vec3::new(x, y, -10.0))
    }

    #[test]
    fn test_perpendicular_ray_center_pixel() {
        let slice = test_slice();
        let hit = intersect_slice(&slice, &z_ray(2.0, 2.0), 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.ijk, IVec3::new(2, 2, 2));
        assert!((z_ray(2.0, 2.0).point_at(hit.t).z - 2.0).abs() < 1e-5);
        assert!((hit.pcoords.x - 0.5).abs() < 1e-5);
        assert!((hit.pcoords.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_outside_crop_rejected() {
        let slice = test_slice();
        assert!(intersect_slice(&slice, &z_ray(7.0, 2.0), 0.0, 1.0, 1e-3).is_none());
    }

    #[test]
    fn test_crop_narrows_pickable_region() {
        let mut slice = test_slice();
        // Pixel (1, 1) is pickable before cropping.
        assert!(intersect_slice(&slice, &z_ray(1.0, 1.0), 0.0, 1.0, 1e-3).is_some());
        slice.set_crop([2.5, 4.5, 2.5, 4.5, 1.5, 2.5]);
        assert!(intersect_slice(&slice, &z_ray(1.0, 1.0), 0.0, 1.0, 1e-3).is_none());
        let hit = intersect_slice(&slice, &z_ray(3.0, 3.0), 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.ijk, IVec3::new(3, 3, 2));
    }

    #[test]
    fn test_domain_excludes_plane_crossing() {
        let slice = test_slice();
        // The plane sits at t = 0.4 along the ray; a later domain misses.
        assert!(intersect_slice(&slice, &z_ray(2.0, 2.0), 0.5, 1.0, 1e-3).is_none());
    }

    #[test]
    fn test_oblique_ray_reports_pierced_texel() {
        let slice = test_slice();
        // From above-left toward below-right, crossing z = 2 at (3, 1).
        let segment = Segment::new(Vec3::new(1.0, 1.0, 4.0), Vec3::new(5.0, 1.0, 0.0));
        let hit = intersect_slice(&slice, &segment, 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.ijk, IVec3::new(3, 1, 2));
        assert!((hit.t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_parallel_ray_grazing_within_tolerance() {
        let slice = test_slice();
        let on_plane = Segment::new(Vec3::new(0.0, 2.0, 2.0), Vec3::new(4.0, 2.0, 2.0));
        assert!(intersect_slice(&slice, &on_plane, 0.0, 1.0, 1e-3).is_some());
        let off_plane = Segment::new(Vec3::new(0.0, 2.0, 2.5), Vec3::new(4.0, 2.0, 2.5));
        assert!(intersect_slice(&slice, &off_plane, 0.0, 1.0, 1e-3).is_none());
    }
}
