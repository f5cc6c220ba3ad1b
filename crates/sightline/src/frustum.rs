//! Area picking: display-rectangle frustum construction and conservative
//! box-vs-frustum testing.

use glam::{Vec2, Vec3};
use sightline_core::{Camera, ClipPlane, Result};
use sightline_structures::PickCandidate;

/// Plane order within a [`Frustum`].
pub const FRUSTUM_LEFT: usize = 0;
/// Right plane index.
pub const FRUSTUM_RIGHT: usize = 1;
/// Bottom plane index.
pub const FRUSTUM_BOTTOM: usize = 2;
/// Top plane index.
pub const FRUSTUM_TOP: usize = 3;
/// Near plane index.
pub const FRUSTUM_NEAR: usize = 4;
/// Far plane index.
pub const FRUSTUM_FAR: usize = 5;

/// The convex world-space region visible through a display rectangle.
///
/// Six ordered planes (inside = negative signed distance) plus the eight
/// unprojected corner points they were derived from: the rectangle's
/// corners at depth 0 (near, indices 0-3) and depth 1 (far, indices 4-7),
/// each quad wound `(x0,y0), (x1,y0), (x1,y1), (x0,y1)` in display space.
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Bounding planes in [`FRUSTUM_LEFT`]..[`FRUSTUM_FAR`] order.
    pub planes: [ClipPlane; 6],
    /// Unprojected corner points, near quad then far quad.
    pub corners: [Vec3; 8],
}

impl Frustum {
    /// Builds the frustum under a display rectangle.
    ///
    /// Degenerate (zero-width or zero-height) rectangles are widened by
    /// one pixel before unprojection.
    pub fn from_display_rect(
        camera: &Camera,
        rect_min: Vec2,
        rect_max: Vec2,
        viewport: (u32, u32),
    ) -> Result<Self> {
        let (mut lo, mut hi) = (rect_min.min(rect_max), rect_min.max(rect_max));
        if (hi.x - lo.x).abs() < f32::EPSILON {
            hi.x = lo.x + 1.0;
        }
        if (hi.y - lo.y).abs() < f32::EPSILON {
            hi.y = lo.y + 1.0;
        }

        let quad = [lo, Vec2::new(hi.x, lo.y), hi, Vec2::new(lo.x, hi.y)];
        let mut corners = [Vec3::ZERO; 8];
        for (i, pixel) in quad.iter().enumerate() {
            corners[i] = camera.display_to_world(pixel.extend(0.0), viewport)?;
            corners[i + 4] = camera.display_to_world(pixel.extend(1.0), viewport)?;
        }

        // Each plane from three of its corners; orientation is then fixed
        // against the centroid so inside is negative regardless of the
        // camera handedness or display-space y direction.
        let centroid = corners.iter().sum::<Vec3>() / 8.0;
        let triples = [
            [0, 3, 4], // left: x0 corners
            [1, 2, 5], // right: x1 corners
            [2, 3, 6], // bottom: y1 corners (display y grows downward)
            [0, 1, 4], // top: y0 corners
            [0, 1, 2], // near
            [4, 5, 6], // far
        ];
        let planes = triples.map(|[a, b, c]| {
            let plane = ClipPlane::from_points(corners[a], corners[b], corners[c]);
            if plane.signed_distance(centroid) > 0.0 {
                plane.flipped()
            } else {
                plane
            }
        });

        Ok(Self { planes, corners })
    }

    /// Conservative box test: rejects only when the box lies entirely
    /// outside a single plane, so boxes straddling plane corners may be
    /// accepted despite missing the frustum.
    #[must_use]
    pub fn contains_box(&self, min: Vec3, max: Vec3) -> bool {
        for plane in &self.planes {
            // The box corner most inside this plane.
            let normal = plane.normal();
            let corner = Vec3::new(
                if normal.x > 0.0 { min.x } else { max.x },
                if normal.y > 0.0 { min.y } else { max.y },
                if normal.z > 0.0 { min.z } else { max.z },
            );
            if plane.signed_distance(corner) > 0.0 {
                return false;
            }
        }
        true
    }

    /// Smallest absolute distance from any corner of a box to the near
    /// plane. The area picker ranks accepted candidates by this.
    #[must_use]
    pub fn near_plane_distance(&self, min: Vec3, max: Vec3) -> f32 {
        let near = &self.planes[FRUSTUM_NEAR];
        let mut best = f32::INFINITY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            best = best.min(near.signed_distance(corner).abs());
        }
        best
    }
}

/// Outcome of an area pick.
#[derive(Debug, Clone)]
pub struct AreaPickResult {
    /// Indices of every accepted candidate, in input order (unordered
    /// along the ray).
    pub accepted: Vec<usize>,
    /// The accepted candidate whose bounding box sits closest to the near
    /// plane; ties keep the earliest input index.
    pub primary: Option<usize>,
    /// The frustum the query tested against.
    pub frustum: Frustum,
}

/// Tests every candidate's world bounding box against the rectangle's
/// frustum. Unpickable candidates and candidates without bounds are
/// skipped.
pub fn pick_area(
    candidates: &[PickCandidate],
    camera: &Camera,
    rect_min: Vec2,
    rect_max: Vec2,
    viewport: (u32, u32),
) -> Result<AreaPickResult> {
    let frustum = Frustum::from_display_rect(camera, rect_min, rect_max, viewport)?;

    let mut accepted = Vec::new();
    let mut primary = None;
    let mut primary_distance = f32::INFINITY;
    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.is_pickable() {
            continue;
        }
        let Some((min, max)) = candidate.world_bounds() else {
            continue;
        };
        if !frustum.contains_box(min, max) {
            continue;
        }
        accepted.push(index);

        let distance = frustum.near_plane_distance(min, max);
        if distance < primary_distance {
            primary_distance = distance;
            primary = Some(index);
        }
    }

    Ok(AreaPickResult {
        accepted,
        primary,
        frustum,
    })
}
