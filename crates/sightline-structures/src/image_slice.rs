//! Oriented image slices.
//!
//! An image slice is a 2D image positioned in 3D by the same
//! origin/spacing/extent mapping a volume uses, displayed on a plane.
//! Picking happens against the display plane bounded by a crop box in
//! continuous index space; texel footprints extend half an index beyond
//! the point extent.

use glam::{IVec3, Vec3};
use sightline_core::{ClipPlane, Result, SightlineError};

/// A 2D image positioned in 3D, displayed on a plane.
#[derive(Debug, Clone)]
pub struct ImageSlice {
    origin: Vec3,
    spacing: Vec3,
    extent: [i32; 6],
    plane: ClipPlane,
    crop: Option<[f32; 6]>,
}

impl ImageSlice {
    /// Creates a slice with an explicit display plane in local coordinates.
    pub fn new(origin: Vec3, spacing: Vec3, extent: [i32; 6], plane: ClipPlane) -> Result<Self> {
        if extent[0] > extent[1] || extent[2] > extent[3] || extent[4] > extent[5] {
            return Err(SightlineError::InvalidExtent(extent));
        }
        Ok(Self {
            origin,
            spacing,
            extent,
            plane,
            crop: None,
        })
    }

    /// Creates a slice displayed on the plane through the extent's center
    /// perpendicular to `axis` (0 = x, 1 = y, 2 = z).
    pub fn axis_aligned(
        origin: Vec3,
        spacing: Vec3,
        extent: [i32; 6],
        axis: usize,
    ) -> Result<Self> {
        let axis = axis.min(2);
        let center_index = Vec3::new(
            (extent[0] + extent[1]) as f32 / 2.0,
            (extent[2] + extent[3]) as f32 / 2.0,
            (extent[4] + extent[5]) as f32 / 2.0,
        );
        let center = origin + spacing * center_index;
        let mut normal = Vec3::ZERO;
        normal[axis] = 1.0;
        Self::new(
            origin,
            spacing,
            extent,
            ClipPlane::from_origin_normal(center, normal),
        )
    }

    /// Returns the grid origin in local coordinates.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns the per-axis spacing (possibly negative).
    #[must_use]
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    /// Returns the inclusive point extent.
    #[must_use]
    pub fn extent(&self) -> [i32; 6] {
        self.extent
    }

    /// Returns the display plane.
    #[must_use]
    pub fn plane(&self) -> ClipPlane {
        self.plane
    }

    /// Replaces the display plane.
    pub fn set_plane(&mut self, plane: ClipPlane) {
        self.plane = plane;
    }

    /// Sets a crop box in continuous index space. Each bound snaps to the
    /// nearest half-index so crop faces fall on texel boundaries.
    pub fn set_crop(&mut self, crop: [f32; 6]) {
        let mut snapped = [0.0; 6];
        for (slot, value) in snapped.iter_mut().zip(crop) {
            *slot = (value - 0.5).round() + 0.5;
        }
        self.crop = Some(snapped);
    }

    /// Clears the crop box.
    pub fn clear_crop(&mut self) {
        self.crop = None;
    }

    /// Returns the stored crop box, when set.
    #[must_use]
    pub fn crop(&self) -> Option<[f32; 6]> {
        self.crop
    }

    /// The effective pick region in continuous index space: the crop box
    /// when set, else the extent inflated by the half-texel footprint.
    #[must_use]
    pub fn crop_box(&self) -> [f32; 6] {
        self.crop.unwrap_or([
            self.extent[0] as f32 - 0.5,
            self.extent[1] as f32 + 0.5,
            self.extent[2] as f32 - 0.5,
            self.extent[3] as f32 + 0.5,
            self.extent[4] as f32 - 0.5,
            self.extent[5] as f32 + 0.5,
        ])
    }

    /// Maps a continuous index position to local coordinates.
    #[must_use]
    pub fn index_to_local(&self, x: Vec3) -> Vec3 {
        self.origin + self.spacing * x
    }

    /// Maps a local position to continuous index coordinates. Zero-spacing
    /// axes collapse to index 0.
    #[must_use]
    pub fn local_to_index(&self, p: Vec3) -> Vec3 {
        let mut x = Vec3::ZERO;
        for axis in 0..3 {
            if self.spacing[axis].abs() > 1e-12 {
                x[axis] = (p[axis] - self.origin[axis]) / self.spacing[axis];
            }
        }
        x
    }

    /// The texel nearest to continuous index position `x`, clamped into the
    /// extent, with the fractional position inside its footprint.
    #[must_use]
    pub fn nearest_texel(&self, x: Vec3) -> (IVec3, Vec3) {
        let mut ijk = IVec3::ZERO;
        let mut frac = Vec3::ZERO;
        for axis in 0..3 {
            let i = (x[axis].round() as i32)
                .clamp(self.extent[axis * 2], self.extent[axis * 2 + 1]);
            ijk[axis] = i;
            frac[axis] = (x[axis] - i as f32 + 0.5).clamp(0.0, 1.0);
        }
        (ijk, frac)
    }

    /// Local-coordinate bounding box of the pick region.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let region = self.crop_box();
        let a = self.index_to_local(Vec3::new(region[0], region[2], region[4]));
        let b = self.index_to_local(Vec3::new(region[1], region[3], region[5]));
        (a.min(b), a.max(b))
    }
}
