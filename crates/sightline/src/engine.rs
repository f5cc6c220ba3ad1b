//! The pick engine: per-candidate dispatch and result accumulation.
//!
//! Every query runs the same shape: pull the world segment into each
//! candidate's local frame, narrow the parameter range through the
//! candidate's clipping planes, hand the remainder to the intersector
//! matching its geometry, and push the winning hit back into world
//! coordinates. Candidates never observe each other; the accumulator
//! alone decides the winner by smallest `t`.

use glam::{Vec2, Vec3};
use sightline_core::{
    Camera, CandidateHit, FieldAssociation, PickOptions, PickResult, PickedElement,
    PickedPosition, Result, Segment, SightlineError,
};
use sightline_structures::{PickCandidate, RenderableGeometry, SurfaceMesh};

use crate::clip::{clip_with_planes, ClippedRange};
use crate::frustum::{self, AreaPickResult};
use crate::hardware::SelectionOracle;
use crate::{slice, surface, volume};

/// A hit resolved in a candidate's local frame, before the transform back
/// to world coordinates.
struct LocalHit {
    t: f32,
    position: Vec3,
    normal: Vec3,
    element: PickedElement,
    clip_plane: Option<usize>,
}

/// Stateless pick dispatcher configured by [`PickOptions`].
///
/// The engine borrows the candidate list per query, so scenes can be
/// rebuilt, filtered, or reordered freely between calls. Option changes
/// take effect on the next query.
#[derive(Debug, Clone, Default)]
pub struct PickEngine {
    options: PickOptions,
}

impl PickEngine {
    /// Creates an engine with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given options.
    #[must_use]
    pub fn with_options(options: PickOptions) -> Self {
        Self { options }
    }

    /// Returns the query options.
    #[must_use]
    pub fn options(&self) -> &PickOptions {
        &self.options
    }

    /// Returns the query options mutably.
    pub fn options_mut(&mut self) -> &mut PickOptions {
        &mut self.options
    }

    /// Picks along an explicit world-space segment.
    ///
    /// Every hit parameter in the result is relative to `segment.p1` and
    /// `segment.p2`. An empty candidate list is a miss, not an error.
    #[must_use]
    pub fn pick_segment(&self, candidates: &[PickCandidate], segment: &Segment) -> PickResult {
        let mut result = PickResult::miss();
        if candidates.is_empty() {
            log::warn!("pick query over an empty candidate list");
            return result;
        }
        if segment.is_degenerate() {
            log::warn!("pick segment is degenerate, returning a miss");
            return result;
        }

        for (index, candidate) in candidates.iter().enumerate() {
            self.offer_candidate(index, candidate, segment, &mut result);
        }
        result
    }

    /// Picks under a display pixel through the camera.
    pub fn pick_display(
        &self,
        candidates: &[PickCandidate],
        camera: &Camera,
        pixel: Vec2,
        viewport: (u32, u32),
    ) -> Result<PickResult> {
        if candidates.is_empty() {
            return Err(SightlineError::EmptyScene);
        }
        let segment = camera.display_segment(pixel, viewport)?;
        Ok(self.pick_segment(candidates, &segment))
    }

    /// Picks every candidate whose bounds fall inside a display rectangle.
    pub fn pick_area(
        &self,
        candidates: &[PickCandidate],
        camera: &Camera,
        rect_min: Vec2,
        rect_max: Vec2,
        viewport: (u32, u32),
    ) -> Result<AreaPickResult> {
        if candidates.is_empty() {
            return Err(SightlineError::EmptyScene);
        }
        frustum::pick_area(candidates, camera, rect_min, rect_max, viewport)
    }

    /// Refines a hardware selection under a display pixel into a full
    /// result.
    ///
    /// The oracle names the visible candidate and element; the engine
    /// re-intersects only that geometry to recover positions, normals, and
    /// parametric data. A background selection is a miss.
    pub fn pick_hardware(
        &self,
        candidates: &[PickCandidate],
        camera: &Camera,
        oracle: &dyn SelectionOracle,
        pixel: Vec2,
        viewport: (u32, u32),
        association: FieldAssociation,
    ) -> Result<PickResult> {
        if candidates.is_empty() {
            return Err(SightlineError::EmptyScene);
        }
        let segment = camera.display_segment(pixel, viewport)?;

        let mut result = PickResult::miss();
        let Some(selection) =
            oracle.resolve(pixel, self.options.hardware_snap_radius, association)
        else {
            return Ok(result);
        };
        let Some(candidate) = candidates.get(selection.candidate) else {
            log::warn!(
                "hardware selection names candidate {} beyond the scene",
                selection.candidate
            );
            return Ok(result);
        };
        if !candidate.transform().is_invertible() {
            log::warn!(
                "skipping candidate '{}': model matrix is singular",
                candidate.name()
            );
            return Ok(result);
        }

        match (association, candidate.geometry()) {
            (FieldAssociation::Points, RenderableGeometry::SurfaceMesh(mesh)) => {
                self.refine_point_selection(
                    selection.candidate,
                    candidate,
                    mesh,
                    selection.element,
                    &segment,
                    camera,
                    &mut result,
                );
            }
            (FieldAssociation::Cells, RenderableGeometry::SurfaceMesh(mesh)) => {
                self.refine_cell_selection(
                    selection.candidate,
                    candidate,
                    mesh,
                    selection.element as usize,
                    &segment,
                    camera,
                    &mut result,
                );
            }
            // Volumes and slices have no per-element refinement path; the
            // ordinary intersector recovers the full hit.
            _ => {
                self.offer_candidate(selection.candidate, candidate, &segment, &mut result);
            }
        }
        Ok(result)
    }

    /// Runs one candidate against the segment and offers any hit to the
    /// accumulator.
    fn offer_candidate(
        &self,
        index: usize,
        candidate: &PickCandidate,
        segment: &Segment,
        result: &mut PickResult,
    ) {
        if !candidate.is_pickable() {
            return;
        }
        let transform = candidate.transform();
        if !transform.is_invertible() {
            log::warn!(
                "skipping candidate '{}': model matrix is singular",
                candidate.name()
            );
            return;
        }

        let local = transform.segment_to_local(segment);
        let Some(range) = clip_with_planes(&local, candidate.clip_planes()) else {
            return;
        };

        if self.options.pick_clipping_planes {
            if let Some(plane) = range.front_plane {
                let hit = clip_plane_hit(candidate, &local, &range, plane);
                self.offer_local(index, candidate, hit, result);
                return;
            }
        }

        let tolerance = self.local_tolerance(candidate);
        let local_hit = match candidate.geometry() {
            RenderableGeometry::SurfaceMesh(mesh) => {
                surface::intersect_mesh(mesh, &local, range.t1, range.t2, tolerance)
                    .map(|hit| self.surface_local_hit(mesh, &local, &range, hit, tolerance))
            }
            RenderableGeometry::Volume(grid) => volume::intersect_volume(
                grid,
                &local,
                range.t1,
                range.t2,
                self.options.volume_opacity_threshold,
                self.options.use_gradient_opacity,
            )
            .map(|hit| volume_local_hit(&local, &range, hit)),
            RenderableGeometry::ImageSlice(image) => {
                slice::intersect_slice(image, &local, range.t1, range.t2, tolerance).map(|hit| {
                    let position = local.point_at(hit.t);
                    // Re-orient the display plane toward the ray origin.
                    let mut normal = image.plane().normal();
                    if normal.dot(local.p1 - position) < 0.0 {
                        normal = -normal;
                    }
                    LocalHit {
                        t: hit.t,
                        position,
                        normal,
                        element: PickedElement::SliceTexel {
                            ijk: hit.ijk,
                            pcoords: hit.pcoords,
                        },
                        clip_plane: None,
                    }
                })
            }
            RenderableGeometry::Unrecognized => None,
        };

        if let Some(hit) = local_hit {
            self.offer_local(index, candidate, hit, result);
        }
    }

    /// Builds the full surface payload (weights, normal, texture data) for
    /// a mesh hit.
    fn surface_local_hit(
        &self,
        mesh: &SurfaceMesh,
        local: &Segment,
        range: &ClippedRange,
        hit: surface::SurfaceHit,
        tolerance: f32,
    ) -> LocalHit {
        let normal = surface::local_normal(mesh, &hit, local);
        let (texcoord, texture_xy) = surface::texture_coords(mesh, &hit);

        let length = local.length();
        let t_tol = if length > 1e-12 {
            tolerance / length
        } else {
            tolerance
        };
        let clip_plane = range
            .front_plane
            .filter(|_| hit.t <= range.t1 + t_tol.max(1e-6));

        LocalHit {
            t: hit.t,
            position: local.point_at(hit.t),
            normal,
            element: PickedElement::Cell {
                cell: hit.cell,
                sub: hit.sub,
                pcoords: hit.pcoords,
                weights: hit.weights,
                point: hit.point,
                texcoord,
                texture_xy,
            },
            clip_plane,
        }
    }

    /// Snap path: the selection names a mesh point and the result reports
    /// that point's stored data instead of a ray intersection.
    #[allow(clippy::too_many_arguments)]
    fn refine_point_selection(
        &self,
        index: usize,
        candidate: &PickCandidate,
        mesh: &SurfaceMesh,
        element: u32,
        segment: &Segment,
        camera: &Camera,
        result: &mut PickResult,
    ) {
        if element as usize >= mesh.num_points() {
            log::warn!(
                "hardware selection names point {element} beyond candidate '{}'",
                candidate.name()
            );
            return;
        }

        let transform = candidate.transform();
        let stored = mesh.point(element);
        let world_stored = transform.point_to_world(stored);
        let t = segment.closest_t(world_stored);

        let (position, world_position) = if self.options.snap_to_point {
            (stored, world_stored)
        } else {
            let on_ray = segment.point_at(t);
            (transform.point_to_local(on_ray), on_ray)
        };

        let local_normal = mesh
            .point_normals()
            .map_or(Vec3::ZERO, |normals| normals[element as usize]);
        let world_normal = if local_normal == Vec3::ZERO {
            camera.view_plane_normal()
        } else {
            transform.normal_to_world(local_normal)
        };

        result.record_position(PickedPosition {
            candidate: index,
            t,
            world_position,
        });
        result.offer(CandidateHit {
            t,
            candidate: index,
            name: candidate.name().to_owned(),
            path: candidate.path().to_vec(),
            world_position,
            local_position: position,
            world_normal,
            local_normal,
            element: PickedElement::Point { point: element },
            clip_plane: None,
        });
    }

    /// Cell path: re-intersect only the selected cell, inside the
    /// candidate's clipped range.
    #[allow(clippy::too_many_arguments)]
    fn refine_cell_selection(
        &self,
        index: usize,
        candidate: &PickCandidate,
        mesh: &SurfaceMesh,
        element: usize,
        segment: &Segment,
        camera: &Camera,
        result: &mut PickResult,
    ) {
        let transform = candidate.transform();
        let local = transform.segment_to_local(segment);
        let Some(range) = clip_with_planes(&local, candidate.clip_planes()) else {
            return;
        };

        let tolerance = self.local_tolerance(candidate);
        let Some(hit) = surface::intersect_cell(mesh, element, &local, range.t1, range.t2, tolerance)
        else {
            log::warn!(
                "hardware selection of cell {element} on '{}' did not re-intersect",
                candidate.name()
            );
            return;
        };

        let local_hit = self.surface_local_hit(mesh, &local, &range, hit, tolerance);
        let t = local_hit.t;
        let world_position = transform.point_to_world(local_hit.position);
        let mut world_normal = transform.normal_to_world(local_hit.normal);
        let mut local_normal = local_hit.normal;
        // The selection came off a rendered front face; keep the normal
        // facing the camera.
        if world_normal.dot(camera.view_plane_normal()) < 0.0 {
            world_normal = -world_normal;
            local_normal = -local_normal;
        }

        result.record_position(PickedPosition {
            candidate: index,
            t,
            world_position,
        });
        result.offer(CandidateHit {
            t,
            candidate: index,
            name: candidate.name().to_owned(),
            path: candidate.path().to_vec(),
            world_position,
            local_position: local_hit.position,
            world_normal,
            local_normal,
            element: local_hit.element,
            clip_plane: local_hit.clip_plane,
        });
    }

    /// Pushes a local hit into world coordinates and offers it.
    fn offer_local(
        &self,
        index: usize,
        candidate: &PickCandidate,
        hit: LocalHit,
        result: &mut PickResult,
    ) {
        let transform = candidate.transform();
        let world_position = transform.point_to_world(hit.position);
        let world_normal = transform.normal_to_world(hit.normal);

        result.record_position(PickedPosition {
            candidate: index,
            t: hit.t,
            world_position,
        });
        result.offer(CandidateHit {
            t: hit.t,
            candidate: index,
            name: candidate.name().to_owned(),
            path: candidate.path().to_vec(),
            world_position,
            local_position: hit.position,
            world_normal,
            local_normal: hit.normal,
            element: hit.element,
            clip_plane: hit.clip_plane,
        });
    }

    /// World tolerance converted into the candidate's local length units.
    fn local_tolerance(&self, candidate: &PickCandidate) -> f32 {
        let scale = candidate.transform().uniform_scale();
        if scale > 1e-12 {
            self.options.tolerance / scale
        } else {
            self.options.tolerance
        }
    }
}

/// A hit on the front clipping plane itself, oriented back toward the ray
/// origin.
fn clip_plane_hit(
    candidate: &PickCandidate,
    local: &Segment,
    range: &ClippedRange,
    plane: usize,
) -> LocalHit {
    let position = local.point_at(range.t1);
    let mut normal = candidate.clip_planes()[plane].normal();
    if normal.dot(local.p1 - position) < 0.0 {
        normal = -normal;
    }
    LocalHit {
        t: range.t1,
        position,
        normal,
        element: PickedElement::ClipPlane { plane },
        clip_plane: Some(plane),
    }
}

/// Volume hit payload, with the front clipping plane attributed when the
/// march started on it.
fn volume_local_hit(local: &Segment, range: &ClippedRange, hit: volume::VolumeHit) -> LocalHit {
    let clip_plane = range.front_plane.filter(|_| hit.t <= range.t1 + 1e-6);
    LocalHit {
        t: hit.t,
        position: local.point_at(hit.t),
        normal: hit.normal,
        element: PickedElement::Voxel {
            ijk: hit.ijk,
            pcoords: hit.pcoords,
            component: hit.component,
        },
        clip_plane,
    }
}
