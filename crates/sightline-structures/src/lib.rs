//! Pickable structure data for sightline.
//!
//! This crate provides the geometry representations pick queries run
//! against:
//! - [`SurfaceMesh`] with mixed [`Cell`] kinds and an optional
//!   [`CellLocator`] acceleration index
//! - [`ScalarVolume`] structured grids with [`PiecewiseFunction`] opacity
//! - [`ImageSlice`] planes with crop regions
//! - [`PickCandidate`] wrapping geometry with a name, transform, and
//!   clipping planes

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid indexing converts between integer extents and float coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod candidate;
pub mod cell;
pub mod image_slice;
pub mod locator;
pub mod surface_mesh;
pub mod transfer;
pub mod volume;

pub use candidate::{PickCandidate, RenderableGeometry};
pub use cell::{Cell, CellKind, SubPrim, HEX_FACE_STENCIL, TET_FACE_STENCIL};
pub use image_slice::ImageSlice;
pub use locator::CellLocator;
pub use surface_mesh::SurfaceMesh;
pub use transfer::PiecewiseFunction;
pub use volume::{ScalarKind, ScalarVolume, VolumeComponent};
