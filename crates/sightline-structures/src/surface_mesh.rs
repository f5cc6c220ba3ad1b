//! Surface mesh structure.

use glam::{Vec2, Vec3};
use sightline_core::{Result, SightlineError};

use crate::cell::{Cell, CellKind};
use crate::locator::CellLocator;

/// An explicit mesh of cells over shared points.
///
/// Cells may mix kinds freely, including volumetric tetrahedra and
/// hexahedra next to 2D faces. Optional per-point normals and texture
/// coordinates feed hit interpolation; a texture extent additionally maps
/// interpolated texture coordinates to pixel positions.
pub struct SurfaceMesh {
    points: Vec<Vec3>,
    cells: Vec<Cell>,
    point_normals: Option<Vec<Vec3>>,
    texcoords: Option<Vec<Vec2>>,
    texture_extent: Option<[i32; 4]>,
    bounds: Option<(Vec3, Vec3)>,
    locator: Option<CellLocator>,
}

impl SurfaceMesh {
    /// Creates a mesh from points and cells, validating connectivity.
    pub fn new(points: Vec<Vec3>, cells: Vec<Cell>) -> Result<Self> {
        for (index, cell) in cells.iter().enumerate() {
            let expected = match cell.kind.exact_points() {
                Some(exact) => (cell.points.len() != exact).then_some(exact),
                None => (cell.points.len() < cell.kind.min_points())
                    .then_some(cell.kind.min_points()),
            };
            if let Some(expected) = expected {
                return Err(SightlineError::MalformedCell {
                    cell: index,
                    expected,
                    actual: cell.points.len(),
                });
            }
            for &point in &cell.points {
                if point as usize >= points.len() {
                    return Err(SightlineError::InvalidCell { cell: index, point });
                }
            }
        }

        let bounds = bounds_of(&points);
        Ok(Self {
            points,
            cells,
            point_normals: None,
            texcoords: None,
            texture_extent: None,
            bounds,
            locator: None,
        })
    }

    /// Creates a mesh holding only triangles (convenience method).
    pub fn from_triangles(points: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let cells = triangles
            .into_iter()
            .map(|t| Cell::new(CellKind::Triangle, t.to_vec()))
            .collect();
        Self::new(points, cells)
    }

    /// Returns the number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Returns the cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns cell `i`, or `None` past the end.
    #[must_use]
    pub fn cell(&self, i: usize) -> Option<&Cell> {
        self.cells.get(i)
    }

    /// Returns the position of a point by id.
    #[must_use]
    pub fn point(&self, id: u32) -> Vec3 {
        self.points[id as usize]
    }

    /// Attaches per-point normals.
    pub fn set_point_normals(&mut self, normals: Vec<Vec3>) -> Result<()> {
        if normals.len() != self.points.len() {
            return Err(SightlineError::SizeMismatch {
                expected: self.points.len(),
                actual: normals.len(),
            });
        }
        self.point_normals = Some(normals);
        Ok(())
    }

    /// Returns the per-point normals, when attached.
    #[must_use]
    pub fn point_normals(&self) -> Option<&[Vec3]> {
        self.point_normals.as_deref()
    }

    /// Attaches per-point texture coordinates.
    pub fn set_texcoords(&mut self, texcoords: Vec<Vec2>) -> Result<()> {
        if texcoords.len() != self.points.len() {
            return Err(SightlineError::SizeMismatch {
                expected: self.points.len(),
                actual: texcoords.len(),
            });
        }
        self.texcoords = Some(texcoords);
        Ok(())
    }

    /// Returns the per-point texture coordinates, when attached.
    #[must_use]
    pub fn texcoords(&self) -> Option<&[Vec2]> {
        self.texcoords.as_deref()
    }

    /// Binds the pixel extent `[xmin, xmax, ymin, ymax]` of the texture the
    /// texture coordinates address.
    pub fn set_texture_extent(&mut self, extent: [i32; 4]) -> Result<()> {
        if extent[0] > extent[1] || extent[2] > extent[3] {
            return Err(SightlineError::InvalidExtent([
                extent[0], extent[1], extent[2], extent[3], 0, 0,
            ]));
        }
        self.texture_extent = Some(extent);
        Ok(())
    }

    /// Returns the bound texture extent, when set.
    #[must_use]
    pub fn texture_extent(&self) -> Option<[i32; 4]> {
        self.texture_extent
    }

    /// Returns the mesh bounding box, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    /// Returns the bounding box of one cell, or `None` for an empty cell.
    #[must_use]
    pub fn cell_bounds(&self, i: usize) -> Option<(Vec3, Vec3)> {
        let cell = self.cells.get(i)?;
        let mut points = cell.points.iter().map(|&p| self.point(p));
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some((min, max))
    }

    /// Builds (or rebuilds) the uniform-bin cell locator from the current
    /// geometry. Callers are responsible for rebuilding after edits.
    pub fn build_locator(&mut self) {
        self.locator = CellLocator::build(&self.points, &self.cells);
    }

    /// Drops the locator; queries fall back to brute force.
    pub fn clear_locator(&mut self) {
        self.locator = None;
    }

    /// Returns the locator, when built.
    #[must_use]
    pub fn locator(&self) -> Option<&CellLocator> {
        self.locator.as_ref()
    }
}

fn bounds_of(points: &[Vec3]) -> Option<(Vec3, Vec3)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}
