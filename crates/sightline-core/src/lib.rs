//! Core abstractions for sightline.
//!
//! This crate provides the foundational types used throughout sightline:
//! - [`Segment`] pick segments and [`ClipPlane`] half-space boundaries
//! - [`ModelTransform`] mapping between world and candidate-local frames
//! - [`Camera`] with display-space projection and unprojection
//! - [`PickOptions`] query configuration and [`PickResult`] accumulation

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel/world conversions cast between integer and float coordinates
#![allow(clippy::cast_precision_loss)]

pub mod camera;
pub mod error;
pub mod options;
pub mod pick;
pub mod plane;
pub mod ray;
pub mod transform;

pub use camera::{Camera, ProjectionMode};
pub use error::{Result, SightlineError};
pub use options::PickOptions;
pub use pick::{CandidateHit, FieldAssociation, PickedElement, PickedPosition, PickResult};
pub use plane::ClipPlane;
pub use ray::Segment;
pub use transform::ModelTransform;

// Re-export glam types for convenience
pub use glam::{IVec3, Mat4, UVec3, Vec2, Vec3, Vec4};
