//! Nearest-cell intersection on explicit surface meshes.
//!
//! Cells are evaluated in ascending cell id, decomposed on demand into
//! point/edge/triangle sub-primitives. A new hit is admitted while its `t`
//! lies within the tolerance band of the best `t` seen so far, and wins only
//! when its (parametric distance from the cell interior, `t`) pair improves;
//! with equal keys the earlier cell is kept. The fold is therefore fully
//! determined by cell order, which makes the locator-accelerated path (same
//! fold over the locator's sorted candidate list) return the identical
//! winner as a brute-force scan.

use glam::{Vec2, Vec3};
use sightline_core::Segment;
use sightline_structures::{SubPrim, SurfaceMesh};

/// A resolved hit on one mesh cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    /// Hit parameter relative to the original segment endpoints.
    pub t: f32,
    /// Cell index in the mesh.
    pub cell: usize,
    /// Sub-primitive index within the cell, 0 for simple cells.
    pub sub: usize,
    /// Parametric coordinates within the hit sub-primitive.
    pub pcoords: Vec3,
    /// Interpolation weights over the cell's points.
    pub weights: Vec<f32>,
    /// The cell point carrying the largest weight.
    pub point: u32,
    /// Parametric distance from the cell interior, the first tie-break key.
    pub pdist: f32,
}

/// Finds the nearest admissible cell hit within `[t1, t2]`.
///
/// Uses the mesh's locator when one is built, else scans every cell;
/// both paths run the same admission fold and return the same winner.
/// `tolerance` is in the mesh's local length units.
#[must_use]
pub fn intersect_mesh(
    mesh: &SurfaceMesh,
    segment: &Segment,
    t1: f32,
    t2: f32,
    tolerance: f32,
) -> Option<SurfaceHit> {
    if mesh.num_cells() == 0 {
        return None;
    }

    if let Some(locator) = mesh.locator() {
        let sub_segment = Segment::new(segment.point_at(t1), segment.point_at(t2));
        let candidates = locator.candidates_along_segment(&sub_segment, tolerance);
        fold_cells(
            mesh,
            candidates.iter().map(|&id| id as usize),
            segment,
            t1,
            t2,
            tolerance,
        )
    } else {
        fold_cells(mesh, 0..mesh.num_cells(), segment, t1, t2, tolerance)
    }
}

/// Runs the admission fold against a single cell.
///
/// Hardware-assisted refinement uses this to re-intersect the one cell an
/// id-buffer selection named.
#[must_use]
pub fn intersect_cell(
    mesh: &SurfaceMesh,
    cell: usize,
    segment: &Segment,
    t1: f32,
    t2: f32,
    tolerance: f32,
) -> Option<SurfaceHit> {
    if cell >= mesh.num_cells() {
        return None;
    }
    fold_cells(mesh, std::iter::once(cell), segment, t1, t2, tolerance)
}

/// Local-space normal for a hit.
///
/// Interpolates stored point normals with the hit's weights when present;
/// else the planar normal of a triangular sub-primitive; else the direction
/// from the far endpoint back toward the near one.
#[must_use]
pub fn local_normal(mesh: &SurfaceMesh, hit: &SurfaceHit, segment: &Segment) -> Vec3 {
    if let Some(normals) = mesh.point_normals() {
        if let Some(cell) = mesh.cell(hit.cell) {
            let mut normal = Vec3::ZERO;
            for (slot, &point) in cell.points.iter().enumerate() {
                normal += hit.weights[slot] * normals[point as usize];
            }
            let normal = normal.normalize_or_zero();
            if normal != Vec3::ZERO {
                return normal;
            }
        }
    }

    if let Some(cell) = mesh.cell(hit.cell) {
        if let Some(SubPrim::Tri(a, b, c)) = cell.sub_primitive(hit.sub) {
            let v0 = mesh.point(cell.points[a]);
            let v1 = mesh.point(cell.points[b]);
            let v2 = mesh.point(cell.points[c]);
            let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            if normal != Vec3::ZERO {
                return normal;
            }
        }
    }

    (segment.p1 - segment.p2).normalize_or_zero()
}

/// Interpolated texture coordinate and, when the mesh binds a texture
/// extent, the pixel position with the half-texel offset applied.
#[must_use]
pub fn texture_coords(mesh: &SurfaceMesh, hit: &SurfaceHit) -> (Option<Vec2>, Option<Vec2>) {
    let Some(texcoords) = mesh.texcoords() else {
        return (None, None);
    };
    let Some(cell) = mesh.cell(hit.cell) else {
        return (None, None);
    };

    let mut tc = Vec2::ZERO;
    for (slot, &point) in cell.points.iter().enumerate() {
        tc += hit.weights[slot] * texcoords[point as usize];
    }

    let pixel = mesh.texture_extent().map(|extent| {
        let width = (extent[1] - extent[0] + 1) as f32;
        let height = (extent[3] - extent[2] + 1) as f32;
        Vec2::new(
            extent[0] as f32 - 0.5 + tc.x * width,
            extent[2] as f32 - 0.5 + tc.y * height,
        )
    });

    (Some(tc), pixel)
}

/// One sub-primitive's intersection before admission.
struct PrimHit {
    t: f32,
    sub: usize,
    pcoords: Vec3,
    pdist: f32,
    /// (slot, weight) pairs; slots not listed weigh 0.
    slots: [(usize, f32); 3],
    used: usize,
}

fn fold_cells<I>(
    mesh: &SurfaceMesh,
    cells: I,
    segment: &Segment,
    t1: f32,
    t2: f32,
    tolerance: f32,
) -> Option<SurfaceHit>
where
    I: IntoIterator<Item = usize>,
{
    let length = segment.length();
    let t_tol = if length > 1e-12 { tolerance / length } else { tolerance };
    let sub_segment = Segment::new(segment.point_at(t1), segment.point_at(t2));
    let span = t2 - t1;

    let mut best: Option<SurfaceHit> = None;
    for cell_id in cells {
        let Some(cell) = mesh.cell(cell_id) else {
            continue;
        };

        // Volumetric cells intersect the clipped sub-segment (t rescaled
        // back afterwards); 2D and lower cells intersect the full segment
        // bounded to [t1, t2].
        let volumetric = cell.kind.is_volumetric();
        let test_segment = if volumetric { &sub_segment } else { segment };

        for (sub, prim) in cell.sub_primitives() {
            let Some(mut prim_hit) =
                intersect_sub_primitive(mesh, cell_id, prim, sub, test_segment, tolerance)
            else {
                continue;
            };
            if volumetric {
                prim_hit.t = t1 + prim_hit.t * span;
            }
            if prim_hit.t < t1 - t_tol || prim_hit.t > t2 + t_tol {
                continue;
            }

            let admit = match &best {
                None => true,
                Some(current) => {
                    prim_hit.t <= current.t + t_tol
                        && (prim_hit.pdist < current.pdist
                            || (prim_hit.pdist == current.pdist && prim_hit.t < current.t))
                }
            };
            if admit {
                best = Some(finish_hit(mesh, cell_id, prim_hit));
            }
        }
    }
    best
}

fn finish_hit(mesh: &SurfaceMesh, cell_id: usize, prim: PrimHit) -> SurfaceHit {
    let cell = &mesh.cells()[cell_id];
    let mut weights = vec![0.0; cell.points.len()];
    for &(slot, weight) in &prim.slots[..prim.used] {
        weights[slot] = weight;
    }

    let mut dominant_slot = 0;
    let mut dominant_weight = f32::NEG_INFINITY;
    for (slot, &weight) in weights.iter().enumerate() {
        if weight > dominant_weight {
            dominant_weight = weight;
            dominant_slot = slot;
        }
    }

    SurfaceHit {
        t: prim.t,
        cell: cell_id,
        sub: prim.sub,
        pcoords: prim.pcoords,
        weights,
        point: cell.points[dominant_slot],
        pdist: prim.pdist,
    }
}

fn intersect_sub_primitive(
    mesh: &SurfaceMesh,
    cell_id: usize,
    prim: SubPrim,
    sub: usize,
    segment: &Segment,
    tolerance: f32,
) -> Option<PrimHit> {
    let cell = &mesh.cells()[cell_id];
    match prim {
        SubPrim::Tri(a, b, c) => {
            let v0 = mesh.point(cell.points[a]);
            let v1 = mesh.point(cell.points[b]);
            let v2 = mesh.point(cell.points[c]);
            let (t, u, v) = intersect_triangle(segment, v0, v1, v2)?;
            let w = 1.0 - u - v;
            Some(PrimHit {
                t,
                sub,
                pcoords: Vec3::new(u, v, 0.0),
                pdist: (-u).max(-v).max(u + v - 1.0).max(0.0),
                slots: [(a, w), (b, u), (c, v)],
                used: 3,
            })
        }
        SubPrim::Edge(a, b) => {
            let pa = mesh.point(cell.points[a]);
            let pb = mesh.point(cell.points[b]);
            let (s, u) = closest_between_segments(segment, pa, pb);
            let on_segment = segment.point_at(s);
            let on_edge = pa + (pb - pa) * u;
            let distance = (on_segment - on_edge).length();
            if distance > tolerance {
                return None;
            }
            Some(PrimHit {
                t: s,
                sub,
                pcoords: Vec3::new(u, 0.0, 0.0),
                pdist: if tolerance > 1e-12 { distance / tolerance } else { 0.0 },
                slots: [(a, 1.0 - u), (b, u), (0, 0.0)],
                used: 2,
            })
        }
        SubPrim::Point(a) => {
            let p = mesh.point(cell.points[a]);
            let s = segment.closest_t(p);
            let distance = (segment.point_at(s) - p).length();
            if distance > tolerance {
                return None;
            }
            Some(PrimHit {
                t: s,
                sub,
                pcoords: Vec3::ZERO,
                pdist: if tolerance > 1e-12 { distance / tolerance } else { 0.0 },
                slots: [(a, 1.0), (0, 0.0), (0, 0.0)],
                used: 1,
            })
        }
    }
}

/// Möller-Trumbore against a segment; `t` is in segment-parameter units and
/// may fall outside [0, 1] (the caller range-checks it).
fn intersect_triangle(segment: &Segment, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<(f32, f32, f32)> {
    let eps = 1e-7;
    let length = segment.length();
    if length < 1e-12 {
        return None;
    }
    let dir = segment.delta() / length;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < eps {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = segment.p1 - v0;
    let u = inv_det * s.dot(h);
    if !(-eps..=1.0 + eps).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = inv_det * dir.dot(q);
    if v < -eps || u + v > 1.0 + eps {
        return None;
    }
    let t_dist = inv_det * edge2.dot(q);
    Some((t_dist / length, u, v))
}

/// Closest-point parameters between the query segment and an edge, both
/// clamped to [0, 1].
fn closest_between_segments(segment: &Segment, a: Vec3, b: Vec3) -> (f32, f32) {
    let d1 = segment.delta();
    let d2 = b - a;
    let r = segment.p1 - a;
    let aa = d1.length_squared();
    let ee = d2.length_squared();
    let f = d2.dot(r);

    if aa < 1e-12 && ee < 1e-12 {
        return (0.0, 0.0);
    }
    if aa < 1e-12 {
        return (0.0, (f / ee).clamp(0.0, 1.0));
    }

    let c = d1.dot(r);
    if ee < 1e-12 {
        return ((-c / aa).clamp(0.0, 1.0), 0.0);
    }

    let bb = d1.dot(d2);
    let denom = aa * ee - bb * bb;
    let mut s = if denom.abs() > 1e-12 {
        ((bb * f - c * ee) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut u = (bb * s + f) / ee;
    if u < 0.0 {
        u = 0.0;
        s = (-c / aa).clamp(0.0, 1.0);
    } else if u > 1.0 {
        u = 1.0;
        s = ((bb - c) / aa).clamp(0.0, 1.0);
    }
    (s, u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_structures::{Cell, CellKind};

    fn z_ray(x: f32, y: f32) -> Segment {
        Segment::new(Vec3::new(x, y, 5.0), Vec3::new(x, y, -5.0))
    }

    fn unit_triangle() -> SurfaceMesh {
        SurfaceMesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let mesh = unit_triangle();
        let hit = intersect_mesh(&mesh, &z_ray(0.25, 0.25), 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.cell, 0);
        assert_eq!(hit.sub, 0);
        assert!((hit.t - 0.5).abs() < 1e-5);
        assert!((hit.weights.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((hit.pdist - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let mesh = unit_triangle();
        assert!(intersect_mesh(&mesh, &z_ray(0.9, 0.9), 0.0, 1.0, 1e-3).is_none());
    }

    #[test]
    fn test_domain_excludes_hit() {
        let mesh = unit_triangle();
        // The triangle sits at t = 0.5; a [0.6, 1.0] domain misses it.
        assert!(intersect_mesh(&mesh, &z_ray(0.25, 0.25), 0.6, 1.0, 1e-3).is_none());
        assert!(intersect_mesh(&mesh, &z_ray(0.25, 0.25), 0.0, 0.4, 1e-3).is_none());
    }

    #[test]
    fn test_nearest_of_two_parallel_triangles() {
        let mesh = SurfaceMesh::from_triangles(
            vec![
                // Far triangle at z = -1 first, so input order can't win.
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let hit = intersect_mesh(&mesh, &z_ray(0.25, 0.25), 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.cell, 1);
        assert!((hit.t - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_locator_matches_brute_force() {
        let mut points = Vec::new();
        let n = 12;
        for j in 0..=n {
            for i in 0..=n {
                points.push(Vec3::new(i as f32, j as f32, ((i * 7 + j * 3) % 5) as f32 * 0.1));
            }
        }
        let stride = (n + 1) as u32;
        let mut cells = Vec::new();
        for j in 0..n as u32 {
            for i in 0..n as u32 {
                let p = j * stride + i;
                cells.push(Cell::new(
                    CellKind::Quad,
                    vec![p, p + 1, p + stride + 1, p + stride],
                ));
            }
        }
        let mut mesh = SurfaceMesh::new(points, cells).unwrap();

        let rays = [
            z_ray(3.3, 4.7),
            z_ray(0.1, 0.1),
            z_ray(11.5, 2.2),
            Segment::new(Vec3::new(-1.0, -1.0, 3.0), Vec3::new(13.0, 13.0, -3.0)),
        ];
        let brute: Vec<_> = rays
            .iter()
            .map(|ray| intersect_mesh(&mesh, ray, 0.0, 1.0, 1e-3))
            .collect();

        mesh.build_locator();
        for (ray, expected) in rays.iter().zip(&brute) {
            let accelerated = intersect_mesh(&mesh, ray, 0.0, 1.0, 1e-3);
            match (expected, &accelerated) {
                (Some(e), Some(a)) => {
                    assert_eq!(e.cell, a.cell);
                    assert!((e.t - a.t).abs() < 1e-5);
                }
                (None, None) => {}
                other => panic!("paths disagree: {other:?}"),
            }
        }
    }

    #[test]
    fn test_polyline_within_tolerance() {
        let mesh = SurfaceMesh::new(
            vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.5, 0.0),
            ],
            vec![Cell::new(CellKind::PolyLine, vec![0, 1, 2])],
        )
        .unwrap();
        let hit = intersect_mesh(&mesh, &z_ray(-0.5, 0.0), 0.0, 1.0, 0.05).unwrap();
        assert_eq!(hit.sub, 0);
        assert!((hit.t - 0.5).abs() < 1e-4);
        // Out of tolerance: miss.
        assert!(intersect_mesh(&mesh, &z_ray(-0.5, 0.3), 0.0, 1.0, 0.05).is_none());
    }

    #[test]
    fn test_polyvertex_snaps_to_nearest_point() {
        let mesh = SurfaceMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
            vec![Cell::new(CellKind::PolyVertex, vec![0, 1, 2])],
        )
        .unwrap();
        let hit = intersect_mesh(&mesh, &z_ray(2.01, 0.0), 0.0, 1.0, 0.1).unwrap();
        assert_eq!(hit.sub, 1);
        assert_eq!(hit.point, 1);
    }

    #[test]
    fn test_tetra_intersects_clipped_subsegment() {
        let mesh = SurfaceMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 2.0),
            ],
            vec![Cell::new(CellKind::Tetra, vec![0, 1, 2, 3])],
        )
        .unwrap();
        let ray = z_ray(0.0, -0.2);
        let hit = intersect_mesh(&mesh, &ray, 0.0, 1.0, 1e-3).unwrap();
        // Entry through an upper face, above z = 0.
        let z = ray.point_at(hit.t).z;
        assert!(z > 0.0 && z < 2.0);

        // Restricting the domain to behind the tetra removes the hit.
        assert!(intersect_mesh(&mesh, &ray, 0.6, 1.0, 1e-3).is_none());
    }

    #[test]
    fn test_interpolated_normal_and_fallback() {
        let mut mesh = unit_triangle();
        let ray = z_ray(0.25, 0.25);
        let hit = intersect_mesh(&mesh, &ray, 0.0, 1.0, 1e-3).unwrap();

        // Face normal: counter-clockwise winding faces +z.
        assert!((local_normal(&mesh, &hit, &ray) - Vec3::Z).length() < 1e-5);

        // Stored normals take precedence.
        mesh.set_point_normals(vec![Vec3::X; 3]).unwrap();
        assert!((local_normal(&mesh, &hit, &ray) - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_texture_coords_with_extent() {
        let mut mesh = unit_triangle();
        mesh.set_texcoords(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ])
        .unwrap();
        mesh.set_texture_extent([0, 99, 0, 49]).unwrap();

        let hit = intersect_mesh(&mesh, &z_ray(0.25, 0.25), 0.0, 1.0, 1e-3).unwrap();
        let (tc, pixel) = texture_coords(&mesh, &hit);
        let tc = tc.unwrap();
        assert!((tc - Vec2::new(0.25, 0.25)).length() < 1e-5);
        let pixel = pixel.unwrap();
        assert!((pixel.x - (0.25 * 100.0 - 0.5)).abs() < 1e-3);
        assert!((pixel.y - (0.25 * 50.0 - 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_intersect_cell_only_sees_that_cell() {
        let mesh = SurfaceMesh::from_triangles(
            vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let ray = z_ray(0.25, 0.25);
        let hit = intersect_cell(&mesh, 1, &ray, 0.0, 1.0, 1e-3).unwrap();
        assert_eq!(hit.cell, 1);
        assert!((hit.t - 0.6).abs() < 1e-5);
        assert!(intersect_cell(&mesh, 7, &ray, 0.0, 1.0, 1e-3).is_none());
    }
}
