//! Uniform-bin spatial locator over mesh cells.
//!
//! Cells are binned by bounding box into a regular grid. A segment query
//! returns the ids of every cell in a bin the segment touches, sorted and
//! deduplicated, so that evaluating the candidates in order visits cells
//! exactly as a brute-force scan would and yields the identical winner.

use glam::{IVec3, UVec3, Vec3};
use sightline_core::Segment;

use crate::cell::Cell;

const MAX_DIVISIONS: u32 = 32;
const TARGET_CELLS_PER_BIN: f32 = 8.0;

/// A uniform-bin spatial index over cell bounding boxes.
#[derive(Debug, Clone)]
pub struct CellLocator {
    divisions: UVec3,
    origin: Vec3,
    bin_size: Vec3,
    bins: Vec<Vec<u32>>,
}

impl CellLocator {
    /// Builds a locator from mesh geometry. Returns `None` when there is
    /// nothing to index.
    #[must_use]
    pub fn build(points: &[Vec3], cells: &[Cell]) -> Option<Self> {
        if points.is_empty() || cells.is_empty() {
            return None;
        }

        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));

        // Pad so cells on the outer faces land inside the grid, and so flat
        // axes keep a non-zero bin size.
        let pad = (max - min).length() * 1e-4 + 1e-6;
        let origin = min - Vec3::splat(pad);
        let width = (max - min) + Vec3::splat(2.0 * pad);

        let per_axis = (cells.len() as f32 / TARGET_CELLS_PER_BIN)
            .cbrt()
            .ceil()
            .max(1.0) as u32;
        let divisions = UVec3::splat(per_axis.min(MAX_DIVISIONS));
        let bin_size = width / divisions.as_vec3();

        let num_bins = (divisions.x * divisions.y * divisions.z) as usize;
        let mut bins: Vec<Vec<u32>> = vec![Vec::new(); num_bins];

        let mut locator = Self {
            divisions,
            origin,
            bin_size,
            bins: Vec::new(),
        };

        for (id, cell) in cells.iter().enumerate() {
            let mut corners = cell.points.iter().map(|&p| points[p as usize]);
            let Some(first) = corners.next() else {
                continue;
            };
            let (cmin, cmax) =
                corners.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
            let lo = locator.bin_coords(cmin);
            let hi = locator.bin_coords(cmax);
            for k in lo.z..=hi.z {
                for j in lo.y..=hi.y {
                    for i in lo.x..=hi.x {
                        let index = locator.flatten(i, j, k);
                        bins[index].push(id as u32);
                    }
                }
            }
        }

        locator.bins = bins;
        log::debug!(
            "cell locator built: {} cells over {}x{}x{} bins",
            cells.len(),
            divisions.x,
            divisions.y,
            divisions.z
        );
        Some(locator)
    }

    /// Returns the grid divisions per axis.
    #[must_use]
    pub fn divisions(&self) -> UVec3 {
        self.divisions
    }

    /// Collects the cell ids of every bin the segment touches, inflated by
    /// `tolerance`, sorted ascending without duplicates.
    #[must_use]
    pub fn candidates_along_segment(&self, segment: &Segment, tolerance: f32) -> Vec<u32> {
        let pad = Vec3::splat(tolerance.max(0.0));
        let qmin = segment.p1.min(segment.p2) - pad;
        let qmax = segment.p1.max(segment.p2) + pad;

        let lo = self.bin_coords(qmin);
        let hi = self.bin_coords(qmax);

        let mut candidates = Vec::new();
        for k in lo.z..=hi.z {
            for j in lo.y..=hi.y {
                for i in lo.x..=hi.x {
                    let bmin = self.origin
                        + self.bin_size * Vec3::new(i as f32, j as f32, k as f32)
                        - pad;
                    let bmax = bmin + self.bin_size + pad * 2.0;
                    if segment_intersects_box(segment, bmin, bmax) {
                        candidates.extend_from_slice(&self.bins[self.flatten(i, j, k)]);
                    }
                }
            }
        }

        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    fn flatten(&self, i: u32, j: u32, k: u32) -> usize {
        (i + j * self.divisions.x + k * self.divisions.x * self.divisions.y) as usize
    }

    fn bin_coords(&self, p: Vec3) -> UVec3 {
        let rel = (p - self.origin) / self.bin_size;
        let max = self.divisions.as_ivec3() - IVec3::ONE;
        rel.floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, max)
            .as_uvec3()
    }
}

/// 3-axis slab test of a segment against an axis-aligned box.
fn segment_intersects_box(segment: &Segment, min: Vec3, max: Vec3) -> bool {
    let delta = segment.delta();
    let mut t1 = 0.0f32;
    let mut t2 = 1.0f32;
    for axis in 0..3 {
        let d = delta[axis];
        let o = segment.p1[axis];
        if d.abs() < 1e-12 {
            if o < min[axis] || o > max[axis] {
                return false;
            }
        } else {
            let ta = (min[axis] - o) / d;
            let tb = (max[axis] - o) / d;
            let (enter, exit) = if ta < tb { (ta, tb) } else { (tb, ta) };
            t1 = t1.max(enter);
            t2 = t2.min(exit);
            if t1 > t2 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;

    /// A z=0 grid of unit quads, `n` by `n`, one Quad cell each.
    fn quad_grid(n: u32) -> (Vec<Vec3>, Vec<Cell>) {
        let mut points = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                points.push(Vec3::new(i as f32, j as f32, 0.0));
            }
        }
        let stride = n + 1;
        let mut cells = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let p = j * stride + i;
                cells.push(Cell::new(
                    CellKind::Quad,
                    vec![p, p + 1, p + stride + 1, p + stride],
                ));
            }
        }
        (points, cells)
    }

    #[test]
    fn test_build_empty_is_none() {
        assert!(CellLocator::build(&[], &[]).is_none());
    }

    #[test]
    fn test_candidates_contain_pierced_cell() {
        let (points, cells) = quad_grid(8);
        let locator = CellLocator::build(&points, &cells).unwrap();

        // Straight down through the middle of cell (3, 4): id 4 * 8 + 3.
        let segment = Segment::new(Vec3::new(3.5, 4.5, 1.0), Vec3::new(3.5, 4.5, -1.0));
        let candidates = locator.candidates_along_segment(&segment, 0.0);
        assert!(candidates.contains(&35));
        // Far-away cells stay out.
        assert!(!candidates.contains(&0));
        assert!(!candidates.contains(&63));
    }

    #[test]
    fn test_candidates_sorted_and_unique() {
        let (points, cells) = quad_grid(6);
        let locator = CellLocator::build(&points, &cells).unwrap();

        let segment = Segment::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(7.0, 7.0, 0.0));
        let candidates = locator.candidates_along_segment(&segment, 0.5);
        assert!(!candidates.is_empty());
        for pair in candidates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_miss_returns_empty() {
        let (points, cells) = quad_grid(4);
        let locator = CellLocator::build(&points, &cells).unwrap();

        let segment = Segment::new(Vec3::new(50.0, 50.0, 1.0), Vec3::new(50.0, 50.0, -1.0));
        assert!(locator
            .candidates_along_segment(&segment, 0.1)
            .is_empty());
    }

    #[test]
    fn test_flat_mesh_does_not_divide_by_zero() {
        // All points share z = 0; the padded build keeps bins usable.
        let (points, cells) = quad_grid(2);
        let locator = CellLocator::build(&points, &cells).unwrap();
        let segment = Segment::new(Vec3::new(1.0, 1.0, 5.0), Vec3::new(1.0, 1.0, -5.0));
        assert!(!locator.candidates_along_segment(&segment, 0.0).is_empty());
    }

    #[test]
    fn test_tolerance_inflates_query() {
        let (points, cells) = quad_grid(4);
        let locator = CellLocator::build(&points, &cells).unwrap();

        // Just outside the grid; a generous tolerance pulls in edge cells.
        let segment = Segment::new(Vec3::new(4.4, 2.0, 1.0), Vec3::new(4.4, 2.0, -1.0));
        let tight = locator.candidates_along_segment(&segment, 0.0);
        let wide = locator.candidates_along_segment(&segment, 1.0);
        assert!(wide.len() >= tight.len());
        assert!(wide.contains(&11));
    }
}
