//! Camera and display-space mapping.
//!
//! Display positions are in pixels with the origin at the top-left corner
//! and y increasing downward. Depth follows the wgpu convention: 0.0 at the
//! near plane, 1.0 at the far plane.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::{Result, SightlineError};
use crate::ray::Segment;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// A 3D camera for phrasing pick queries in display space.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Orthographic scale (used when `projection_mode` is Orthographic).
    pub ortho_scale: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_scale: 1.0,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_scale;
                let half_width = half_height * self.aspect_ratio;
                // Symmetric depth range around the camera so geometry on
                // either side of the focus point stays unprojectable.
                let dist = (self.position - self.target).length();
                let ortho_depth = (dist + self.far).max(self.ortho_scale * 100.0);
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    -ortho_depth,
                    ortho_depth,
                )
            }
        }
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Unit vector from the look target toward the camera position, or zero
    /// when they coincide.
    #[must_use]
    pub fn view_plane_normal(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    /// Resets the camera to look at the given bounding box.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length();
        let extents = max - min;

        self.target = center;
        self.position = center + Vec3::new(0.0, 0.0, size * 1.5);
        self.near = size * 0.001;
        self.far = size * 100.0;

        let half_height = extents.y.max(extents.x / self.aspect_ratio) * 0.6;
        self.ortho_scale = half_height.max(0.1);
    }

    /// Sets the projection mode.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    /// Sets the orthographic scale.
    pub fn set_ortho_scale(&mut self, scale: f32) {
        self.ortho_scale = scale.max(0.01);
    }

    /// Sets the field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(0.1, std::f32::consts::PI - 0.1);
    }

    /// Sets the near clipping plane.
    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(0.001);
    }

    /// Sets the far clipping plane.
    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 0.1);
    }

    /// Returns FOV in degrees.
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Sets FOV from degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.set_fov(degrees.to_radians());
    }

    /// Projects a world point into display space.
    ///
    /// Returns pixel x, pixel y, and depth in [0, 1].
    pub fn world_to_display(&self, world: Vec3, viewport: (u32, u32)) -> Result<Vec3> {
        let (width, height) = check_viewport(viewport)?;
        let clip = self.view_projection_matrix() * world.extend(1.0);
        if clip.w.abs() < 1e-6 {
            return Err(SightlineError::DegenerateView);
        }
        let ndc = clip.truncate() / clip.w;
        Ok(Vec3::new(
            (ndc.x + 1.0) * width / 2.0,
            (1.0 - ndc.y) * height / 2.0,
            ndc.z,
        ))
    }

    /// Unprojects a display position (pixel x, pixel y, depth in [0, 1])
    /// into world space.
    pub fn display_to_world(&self, display: Vec3, viewport: (u32, u32)) -> Result<Vec3> {
        let (width, height) = check_viewport(viewport)?;
        let ndc_x = (display.x / (width / 2.0)) - 1.0;
        let ndc_y = 1.0 - (display.y / (height / 2.0));

        let inv_view_proj = self.view_projection_matrix().inverse();
        if !inv_view_proj.is_finite() {
            return Err(SightlineError::DegenerateView);
        }

        let p = inv_view_proj * Vec4::new(ndc_x, ndc_y, display.z, 1.0);
        if p.w.abs() < 1e-6 {
            return Err(SightlineError::DegenerateView);
        }
        Ok(p.truncate() / p.w)
    }

    /// Builds the near-to-far pick segment under a display position.
    pub fn display_segment(&self, pos: Vec2, viewport: (u32, u32)) -> Result<Segment> {
        let near = self.display_to_world(pos.extend(0.0), viewport)?;
        let far = self.display_to_world(pos.extend(1.0), viewport)?;
        let segment = Segment::new(near, far);
        if segment.is_degenerate() {
            return Err(SightlineError::DegenerateView);
        }
        Ok(segment)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

fn check_viewport(viewport: (u32, u32)) -> Result<(f32, f32)> {
    if viewport.0 == 0 || viewport.1 == 0 {
        return Err(SightlineError::ZeroViewport {
            width: viewport.0,
            height: viewport.1,
        });
    }
    Ok((viewport.0 as f32, viewport.1 as f32))
}
