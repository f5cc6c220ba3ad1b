//! Pick candidates: named, transformed, clipped renderable geometry.

use glam::{Mat4, Vec3};
use sightline_core::{ClipPlane, ModelTransform};

use crate::image_slice::ImageSlice;
use crate::surface_mesh::SurfaceMesh;
use crate::volume::ScalarVolume;

/// The geometry representation a candidate renders.
pub enum RenderableGeometry {
    /// An explicit mesh of cells.
    SurfaceMesh(SurfaceMesh),
    /// A structured scalar volume.
    Volume(ScalarVolume),
    /// A 2D image displayed on a plane.
    ImageSlice(ImageSlice),
    /// A representation with no intersector; never produces a hit.
    Unrecognized,
}

impl RenderableGeometry {
    /// Local-coordinate bounding box, `None` when undefined.
    #[must_use]
    pub fn local_bounds(&self) -> Option<(Vec3, Vec3)> {
        match self {
            RenderableGeometry::SurfaceMesh(mesh) => mesh.bounds(),
            RenderableGeometry::Volume(volume) => Some(volume.bounds()),
            RenderableGeometry::ImageSlice(slice) => Some(slice.bounds()),
            RenderableGeometry::Unrecognized => None,
        }
    }
}

/// One pickable object in a scene.
///
/// Candidates carry their model transform, local clipping planes, and a
/// hierarchy path (outermost group first) that queries report back.
pub struct PickCandidate {
    name: String,
    path: Vec<String>,
    transform: ModelTransform,
    clip_planes: Vec<ClipPlane>,
    pickable: bool,
    geometry: RenderableGeometry,
}

impl PickCandidate {
    /// Creates a pickable candidate with an identity transform and no
    /// clipping planes.
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: RenderableGeometry) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
            transform: ModelTransform::identity(),
            clip_planes: Vec::new(),
            pickable: true,
            geometry,
        }
    }

    /// Returns the candidate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hierarchy path (outermost first).
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Sets the hierarchy path.
    pub fn set_path(&mut self, path: Vec<String>) -> &mut Self {
        self.path = path;
        self
    }

    /// Returns the model transform.
    #[must_use]
    pub fn transform(&self) -> &ModelTransform {
        &self.transform
    }

    /// Sets the model matrix.
    pub fn set_transform(&mut self, matrix: Mat4) -> &mut Self {
        self.transform = ModelTransform::new(matrix);
        self
    }

    /// Returns the clipping planes, in local coordinates.
    #[must_use]
    pub fn clip_planes(&self) -> &[ClipPlane] {
        &self.clip_planes
    }

    /// Appends a clipping plane in local coordinates.
    pub fn add_clip_plane(&mut self, plane: ClipPlane) -> &mut Self {
        self.clip_planes.push(plane);
        self
    }

    /// Removes all clipping planes.
    pub fn clear_clip_planes(&mut self) -> &mut Self {
        self.clip_planes.clear();
        self
    }

    /// Returns whether queries consider this candidate.
    #[must_use]
    pub fn is_pickable(&self) -> bool {
        self.pickable
    }

    /// Sets whether queries consider this candidate.
    pub fn set_pickable(&mut self, pickable: bool) -> &mut Self {
        self.pickable = pickable;
        self
    }

    /// Returns the geometry.
    #[must_use]
    pub fn geometry(&self) -> &RenderableGeometry {
        &self.geometry
    }

    /// Returns the geometry mutably.
    pub fn geometry_mut(&mut self) -> &mut RenderableGeometry {
        &mut self.geometry
    }

    /// World-coordinate bounding box: the local box's corners pushed
    /// through the model transform. `None` when the geometry has none.
    #[must_use]
    pub fn world_bounds(&self) -> Option<(Vec3, Vec3)> {
        let (min, max) = self.geometry.local_bounds()?;
        let mut world_min = Vec3::splat(f32::INFINITY);
        let mut world_max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let world = self.transform.point_to_world(corner);
            world_min = world_min.min(world);
            world_max = world_max.max(world);
        }
        Some((world_min, world_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> RenderableGeometry {
        let mesh = SurfaceMesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 2]],
        )
        .unwrap();
        RenderableGeometry::SurfaceMesh(mesh)
    }

    #[test]
    fn test_defaults() {
        let candidate = PickCandidate::new("tri", unit_triangle());
        assert_eq!(candidate.name(), "tri");
        assert!(candidate.is_pickable());
        assert!(candidate.clip_planes().is_empty());
        assert!(candidate.path().is_empty());
    }

    #[test]
    fn test_world_bounds_under_transform() {
        let mut candidate = PickCandidate::new("tri", unit_triangle());
        candidate.set_transform(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let (min, max) = candidate.world_bounds().unwrap();
        assert!((min - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((max - Vec3::new(6.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_world_bounds_rotation_stays_conservative() {
        let mut candidate = PickCandidate::new("tri", unit_triangle());
        candidate.set_transform(Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4));
        let (min, max) = candidate.world_bounds().unwrap();
        // The rotated corners all stay inside the reported box.
        let sqrt2_half = std::f32::consts::SQRT_2 / 2.0;
        assert!(min.x <= -sqrt2_half + 1e-5);
        assert!(max.y >= sqrt2_half - 1e-5);
    }

    #[test]
    fn test_unrecognized_has_no_bounds() {
        let candidate = PickCandidate::new("blob", RenderableGeometry::Unrecognized);
        assert!(candidate.world_bounds().is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let mut candidate = PickCandidate::new("tri", unit_triangle());
        candidate
            .set_path(vec!["scene".into(), "group".into()])
            .set_pickable(false)
            .add_clip_plane(ClipPlane::from_origin_normal(Vec3::ZERO, Vec3::Y));
        assert_eq!(candidate.path().len(), 2);
        assert!(!candidate.is_pickable());
        assert_eq!(candidate.clip_planes().len(), 1);
    }
}
