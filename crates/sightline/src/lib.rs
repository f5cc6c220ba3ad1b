//! A CPU picking and ray-intersection engine for heterogeneous 3D scenes.
//!
//! Sightline answers "what is under this pixel" for scenes mixing surface
//! meshes, structured scalar volumes, and cropped image slices. Queries can
//! be phrased as explicit world segments, display pixels through a
//! [`Camera`], display rectangles (area picking), or hardware id-buffer
//! selections refined back into full geometric hits.
//!
//! # Quick start
//!
//! ```
//! use sightline::{
//!     PickCandidate, PickEngine, RenderableGeometry, Segment, SurfaceMesh, Vec3,
//! };
//!
//! let mesh = SurfaceMesh::from_triangles(
//!     vec![
//!         Vec3::new(-1.0, -1.0, 0.0),
//!         Vec3::new(1.0, -1.0, 0.0),
//!         Vec3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap();
//! let candidates = vec![PickCandidate::new(
//!     "triangle",
//!     RenderableGeometry::SurfaceMesh(mesh),
//! )];
//!
//! let engine = PickEngine::new();
//! let ray = Segment::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -5.0));
//! let result = engine.pick_segment(&candidates, &ray);
//! assert!(result.is_hit());
//! assert_eq!(result.candidate_name, "triangle");
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid marching converts between integer extents and float coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod clip;
pub mod engine;
pub mod frustum;
pub mod hardware;
pub mod slice;
pub mod surface;
pub mod volume;

pub use clip::{clip_with_extent, clip_with_planes, ClippedRange, ExtentRange};
pub use engine::PickEngine;
pub use frustum::{pick_area, AreaPickResult, Frustum};
pub use hardware::{IdBufferOracle, OracleSelection, SelectionOracle};
pub use slice::{intersect_slice, SliceHit};
pub use surface::{intersect_cell, intersect_mesh, SurfaceHit};
pub use volume::{intersect_volume, VolumeHit, MIN_STEP_FRACTION};

pub use sightline_core::{
    Camera, CandidateHit, ClipPlane, FieldAssociation, ModelTransform, PickOptions, PickResult,
    PickedElement, PickedPosition, ProjectionMode, Result, Segment, SightlineError,
};
pub use sightline_structures::{
    Cell, CellKind, CellLocator, ImageSlice, PickCandidate, PiecewiseFunction,
    RenderableGeometry, ScalarKind, ScalarVolume, SubPrim, SurfaceMesh, VolumeComponent,
};

// Re-export glam types for convenience
pub use glam::{IVec3, Mat4, UVec3, Vec2, Vec3, Vec4};
