//! Structured scalar volumes.
//!
//! A volume is a regular grid of scalar samples addressed by an inclusive
//! point extent, an origin, and per-axis spacing. Spacing may be negative
//! along any axis; all sampling happens in continuous index space, where a
//! coordinate of `i` sits exactly on grid point `i`.

use glam::{IVec3, UVec3, Vec3};
use sightline_core::{Result, SightlineError};

use crate::transfer::PiecewiseFunction;

/// The scalar type a component's samples were converted from.
///
/// Samples are stored as `f32`; the kind supplies the natural range used to
/// normalize opacity when no transfer function is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Unsigned 8-bit samples, natural range [0, 255].
    U8,
    /// Unsigned 16-bit samples, natural range [0, 65535].
    U16,
    /// Signed 16-bit samples, natural range [-32768, 32767].
    I16,
    /// Floating-point samples, natural range [0, 1].
    F32,
}

impl ScalarKind {
    /// The range dividing raw samples into [0, 1] opacity.
    #[must_use]
    pub fn natural_range(self) -> (f32, f32) {
        match self {
            ScalarKind::U8 => (0.0, 255.0),
            ScalarKind::U16 => (0.0, 65535.0),
            ScalarKind::I16 => (-32768.0, 32767.0),
            ScalarKind::F32 => (0.0, 1.0),
        }
    }
}

/// One scalar component of a volume, with its opacity mappings.
#[derive(Debug, Clone)]
pub struct VolumeComponent {
    data: Vec<f32>,
    kind: ScalarKind,
    scalar_opacity: Option<PiecewiseFunction>,
    gradient_opacity: Option<PiecewiseFunction>,
}

impl VolumeComponent {
    /// Wraps sample data of the given kind.
    #[must_use]
    pub fn new(data: Vec<f32>, kind: ScalarKind) -> Self {
        Self {
            data,
            kind,
            scalar_opacity: None,
            gradient_opacity: None,
        }
    }

    /// Returns the raw samples.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the scalar kind.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Attaches a scalar-to-opacity transfer function.
    pub fn set_scalar_opacity(&mut self, function: PiecewiseFunction) -> &mut Self {
        self.scalar_opacity = Some(function);
        self
    }

    /// Attaches a gradient-magnitude-to-opacity transfer function.
    pub fn set_gradient_opacity(&mut self, function: PiecewiseFunction) -> &mut Self {
        self.gradient_opacity = Some(function);
        self
    }

    /// Returns the scalar opacity function, when attached.
    #[must_use]
    pub fn scalar_opacity(&self) -> Option<&PiecewiseFunction> {
        self.scalar_opacity.as_ref()
    }

    /// Returns the gradient opacity function, when attached.
    #[must_use]
    pub fn gradient_opacity(&self) -> Option<&PiecewiseFunction> {
        self.gradient_opacity.as_ref()
    }

    /// Maps a scalar sample to opacity: through the transfer function when
    /// attached, else normalized by the kind's natural range.
    #[must_use]
    pub fn opacity_of(&self, scalar: f32) -> f32 {
        match &self.scalar_opacity {
            Some(function) => function.evaluate(scalar),
            None => {
                let (lo, hi) = self.kind.natural_range();
                ((scalar - lo) / (hi - lo)).clamp(0.0, 1.0)
            }
        }
    }

    /// Maps a gradient magnitude to a multiplicative opacity factor, 1.0
    /// when no gradient function is attached.
    #[must_use]
    pub fn gradient_factor(&self, gradient_magnitude: f32) -> f32 {
        match &self.gradient_opacity {
            Some(function) => function.evaluate(gradient_magnitude),
            None => 1.0,
        }
    }
}

/// A structured scalar volume with one or more components.
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    origin: Vec3,
    spacing: Vec3,
    extent: [i32; 6],
    components: Vec<VolumeComponent>,
}

impl ScalarVolume {
    /// Creates a volume, validating the extent and component sizes.
    pub fn new(
        origin: Vec3,
        spacing: Vec3,
        extent: [i32; 6],
        components: Vec<VolumeComponent>,
    ) -> Result<Self> {
        if extent[0] > extent[1] || extent[2] > extent[3] || extent[4] > extent[5] {
            return Err(SightlineError::InvalidExtent(extent));
        }
        if components.is_empty() {
            return Err(SightlineError::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let volume = Self {
            origin,
            spacing,
            extent,
            components,
        };
        let expected = volume.num_points();
        for component in &volume.components {
            if component.data.len() != expected {
                return Err(SightlineError::SizeMismatch {
                    expected,
                    actual: component.data.len(),
                });
            }
        }
        Ok(volume)
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

    /// Returns the number of grid points per axis.
    #[must_use]
    pub fn dims(&self) -> UVec3 {
        UVec3::new(
            (self.extent[1] - self.extent[0] + 1) as u32,
            (self.extent[3] - self.extent[2] + 1) as u32,
            (self.extent[5] - self.extent[4] + 1) as u32,
        )
    }

    /// Returns the total number of grid points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        let dims = self.dims();
        dims.x as usize * dims.y as usize * dims.z as usize
    }

    /// Returns the number of components.
    #[must_use]
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Returns a component by index.
    #[must_use]
    pub fn component(&self, c: usize) -> Option<&VolumeComponent> {
        self.components.get(c)
    }

    /// Returns a mutable component by index.
    pub fn component_mut(&mut self, c: usize) -> Option<&mut VolumeComponent> {
        self.components.get_mut(c)
    }

    /// Clamps grid indices into the extent.
    #[must_use]
    pub fn clamp_index(&self, ijk: IVec3) -> IVec3 {
        IVec3::new(
            ijk.x.clamp(self.extent[0], self.extent[1]),
            ijk.y.clamp(self.extent[2], self.extent[3]),
            ijk.z.clamp(self.extent[4], self.extent[5]),
        )
    }

    fn flat(&self, ijk: IVec3) -> usize {
        let dims = self.dims();
        let i = (ijk.x - self.extent[0]) as usize;
        let j = (ijk.y - self.extent[2]) as usize;
        let k = (ijk.z - self.extent[4]) as usize;
        i + j * dims.x as usize + k * dims.x as usize * dims.y as usize
    }

    /// Returns the sample of component `c` at grid point `ijk`, clamping
    /// indices into the extent. Unknown components sample as 0.
    #[must_use]
    pub fn scalar_at(&self, c: usize, ijk: IVec3) -> f32 {
        let index = self.flat(self.clamp_index(ijk));
        self.components.get(c).map_or(0.0, |comp| comp.data[index])
    }

    /// The voxel containing continuous index position `x`: lowest-corner
    /// grid indices plus the fractional position inside the voxel.
    ///
    /// Positions on the outer faces resolve into the adjacent interior
    /// voxel so the fraction stays within [0, 1].
    #[must_use]
    pub fn voxel_of(&self, x: Vec3) -> (IVec3, Vec3) {
        let mut ijk = IVec3::ZERO;
        let mut frac = Vec3::ZERO;
        for axis in 0..3 {
            let lo = self.extent[axis * 2];
            let hi = self.extent[axis * 2 + 1];
            let v = x[axis].clamp(lo as f32, hi as f32);
            let mut i = v.floor() as i32;
            if i >= hi && hi > lo {
                i = hi - 1;
            }
            i = i.max(lo);
            ijk[axis] = i;
            frac[axis] = (v - i as f32).clamp(0.0, 1.0);
        }
        (ijk, frac)
    }

    /// Trilinearly samples component `c` at continuous index position `x`,
    /// clamped at the outer faces.
    #[must_use]
    pub fn interpolate(&self, c: usize, x: Vec3) -> f32 {
        let (base, frac) = self.voxel_of(x);
        let mut value = 0.0;
        for corner in 0..8 {
            let offset = IVec3::new(corner & 1, (corner >> 1) & 1, (corner >> 2) & 1);
            let weight = corner_weight(frac, offset);
            if weight > 0.0 {
                value += weight * self.scalar_at(c, base + offset);
            }
        }
        value
    }

    /// Central-difference gradient of component `c` at a grid point, in
    /// local length units (index differences divided by spacing). Clamped
    /// one-sided differences apply on the outer faces.
    #[must_use]
    pub fn gradient_at(&self, c: usize, ijk: IVec3) -> Vec3 {
        let ijk = self.clamp_index(ijk);
        let mut gradient = Vec3::ZERO;
        for axis in 0..3 {
            let mut lo = ijk;
            let mut hi = ijk;
            lo[axis] -= 1;
            hi[axis] += 1;
            let lo = self.clamp_index(lo);
            let hi = self.clamp_index(hi);
            let span = (hi[axis] - lo[axis]) as f32 * self.spacing[axis];
            if span.abs() > 1e-12 {
                gradient[axis] = (self.scalar_at(c, hi) - self.scalar_at(c, lo)) / span;
            }
        }
        gradient
    }

    /// Trilinearly interpolated gradient at continuous index position `x`.
    #[must_use]
    pub fn interpolated_gradient(&self, c: usize, x: Vec3) -> Vec3 {
        let (base, frac) = self.voxel_of(x);
        let mut gradient = Vec3::ZERO;
        for corner in 0..8 {
            let offset = IVec3::new(corner & 1, (corner >> 1) & 1, (corner >> 2) & 1);
            let weight = corner_weight(frac, offset);
            if weight > 0.0 {
                gradient += weight * self.gradient_at(c, base + offset);
            }
        }
        gradient
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

    /// Local-coordinate bounding box of the extent (negative spacing folds
    /// into min/max order).
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let a = self.index_to_local(Vec3::new(
            self.extent[0] as f32,
            self.extent[2] as f32,
            self.extent[4] as f32,
        ));
        let b = self.index_to_local(Vec3::new(
            self.extent[1] as f32,
            self.extent[3] as f32,
            self.extent[5] as f32,
        ));
        (a.min(b), a.max(b))
    }
}

fn corner_weight(frac: Vec3, offset: IVec3) -> f32 {
    let mut weight = 1.0;
    for axis in 0..3 {
        weight *= if offset[axis] == 1 {
            frac[axis]
        } else {
            1.0 - frac[axis]
        };
    }
    weight
}
