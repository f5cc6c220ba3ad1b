//! Hardware-assisted selection: the oracle boundary and an id-buffer
//! implementation over a CPU readback.
//!
//! Resolving "which element is visible under this pixel" is the renderer's
//! job; the engine only consumes the answer through [`SelectionOracle`]
//! and refines it into a full pick result. [`IdBufferOracle`] implements
//! the trait over an RGBA readback whose RGB channels carry 24-bit global
//! element ids, for tests and software pipelines.

use glam::Vec2;
use sightline_core::{FieldAssociation, Result, SightlineError};

/// An element selection resolved by the rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleSelection {
    /// Candidate index in the query's input order.
    pub candidate: usize,
    /// Point or cell index within that candidate, per the association the
    /// oracle was queried with.
    pub element: u32,
}

/// The GPU-selection boundary: given a display pixel, a snap radius in
/// pixels, and a field association, report the front-most visible
/// candidate's nearest element, or `None` over background.
pub trait SelectionOracle {
    /// Resolves the selection under `pixel`, searching a square
    /// neighborhood of `radius` pixels around it.
    fn resolve(
        &self,
        pixel: Vec2,
        radius: u32,
        association: FieldAssociation,
    ) -> Option<OracleSelection>;
}

/// Encodes a global id as an RGB triple, high byte first.
#[must_use]
pub fn index_to_color(index: u32) -> [u8; 3] {
    [
        ((index >> 16) & 0xFF) as u8,
        ((index >> 8) & 0xFF) as u8,
        (index & 0xFF) as u8,
    ]
}

/// Decodes an RGB triple back into a global id.
#[must_use]
pub fn color_to_index(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// A [`SelectionOracle`] over a CPU-resident id buffer.
///
/// Each candidate is allocated a contiguous global id range; id 0 is the
/// background. The buffer holds RGBA8 texels whose RGB channels encode the
/// global id of the front-most element rendered at that pixel. Neighborhood
/// search returns the non-background texel nearest the query pixel, with
/// row-major order breaking distance ties deterministically.
pub struct IdBufferOracle {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Per-candidate id ranges: (candidate, first global id, count).
    ranges: Vec<(usize, u32, u32)>,
    next_id: u32,
}

impl IdBufferOracle {
    /// Creates an all-background buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            ranges: Vec::new(),
            next_id: 1,
        }
    }

    /// Wraps an existing RGBA8 readback.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(SightlineError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            ranges: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocates a contiguous global id range for `count` elements of a
    /// candidate and returns its first global id.
    pub fn allocate(&mut self, candidate: usize, count: u32) -> u32 {
        let start = self.next_id;
        self.ranges.push((candidate, start, count));
        self.next_id += count;
        start
    }

    /// Writes one element's global id at a pixel. Out-of-bounds writes are
    /// ignored.
    pub fn write_id(&mut self, x: u32, y: u32, global_id: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let [r, g, b] = index_to_color(global_id);
        let offset = ((y * self.width + x) as usize) * 4;
        self.pixels[offset] = r;
        self.pixels[offset + 1] = g;
        self.pixels[offset + 2] = b;
        self.pixels[offset + 3] = 0xFF;
    }

    fn id_at(&self, x: u32, y: u32) -> u32 {
        let texels: &[[u8; 4]] = bytemuck::cast_slice(&self.pixels);
        let [r, g, b, _] = texels[(y * self.width + x) as usize];
        color_to_index(r, g, b)
    }

    fn lookup(&self, global_id: u32) -> Option<OracleSelection> {
        for &(candidate, start, count) in &self.ranges {
            if global_id >= start && global_id < start + count {
                return Some(OracleSelection {
                    candidate,
                    element: global_id - start,
                });
            }
        }
        None
    }
}

impl SelectionOracle for IdBufferOracle {
    fn resolve(
        &self,
        pixel: Vec2,
        radius: u32,
        _association: FieldAssociation,
    ) -> Option<OracleSelection> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let cx = pixel.x.round() as i64;
        let cy = pixel.y.round() as i64;
        let radius = i64::from(radius);

        let mut best: Option<(i64, u32)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
                    continue;
                }
                let id = self.id_at(x as u32, y as u32);
                if id == 0 {
                    continue;
                }
                let dist2 = dx * dx + dy * dy;
                if best.map_or(true, |(best_dist2, _)| dist2 < best_dist2) {
                    best = Some((dist2, id));
                }
            }
        }

        let (_, id) = best?;
        let selection = self.lookup(id);
        if selection.is_none() {
            log::warn!("id buffer carries unregistered global id {id}");
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roundtrip() {
        for id in [0_u32, 1, 255, 256, 65536, 0x00AB_CDEF, 0x00FF_FFFF] {
            let [r, g, b] = index_to_color(id);
            assert_eq!(color_to_index(r, g, b), id);
        }
    }

    #[test]
    fn test_exact_pixel_resolution() {
        let mut oracle = IdBufferOracle::new(16, 16);
        let start = oracle.allocate(2, 10);
        oracle.write_id(5, 7, start + 3);

        let hit = oracle
            .resolve(Vec2::new(5.0, 7.0), 0, FieldAssociation::Cells)
            .unwrap();
        assert_eq!(hit.candidate, 2);
        assert_eq!(hit.element, 3);
    }

    #[test]
    fn test_background_is_none() {
        let oracle = IdBufferOracle::new(8, 8);
        assert!(oracle
            .resolve(Vec2::new(4.0, 4.0), 2, FieldAssociation::Points)
            .is_none());
    }

    #[test]
    fn test_neighborhood_snaps_to_nearest() {
        let mut oracle = IdBufferOracle::new(16, 16);
        let a = oracle.allocate(0, 4);
        let b = oracle.allocate(1, 4);
        oracle.write_id(3, 8, a); // distance 2 from the query
        oracle.write_id(6, 8, b + 1); // distance 1

        let hit = oracle
            .resolve(Vec2::new(5.0, 8.0), 2, FieldAssociation::Points)
            .unwrap();
        assert_eq!(hit.candidate, 1);
        assert_eq!(hit.element, 1);

        // Radius 0 sees neither.
        assert!(oracle
            .resolve(Vec2::new(5.0, 8.0), 0, FieldAssociation::Points)
            .is_none());
    }

    #[test]
    fn test_out_of_range_queries() {
        let mut oracle = IdBufferOracle::new(4, 4);
        let start = oracle.allocate(0, 1);
        oracle.write_id(0, 0, start);
        // Query beyond the buffer still searches the clamped neighborhood.
        assert!(oracle
            .resolve(Vec2::new(-1.0, 0.0), 1, FieldAssociation::Cells)
            .is_some());
        assert!(oracle
            .resolve(Vec2::new(100.0, 100.0), 1, FieldAssociation::Cells)
            .is_none());
    }

    #[test]
    fn test_from_rgba_validates_size() {
        assert!(matches!(
            IdBufferOracle::from_rgba(4, 4, vec![0; 10]),
            Err(SightlineError::SizeMismatch { .. })
        ));
        assert!(IdBufferOracle::from_rgba(4, 4, vec![0; 64]).is_ok());
    }
}
