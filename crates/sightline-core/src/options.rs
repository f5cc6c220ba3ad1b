//! Configuration options for pick queries.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable parameters shared by all pick queries.
///
/// Options live on the engine and may be changed between queries; a running
/// query never observes a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickOptions {
    /// Intersection tolerance in world units. Widens cell admission and
    /// boundary clamping; never shrinks exact hits.
    pub tolerance: f32,

    /// Accumulated-opacity threshold that terminates a volume ray march.
    pub volume_opacity_threshold: f32,

    /// Whether gradient-magnitude opacity modulates volume samples.
    pub use_gradient_opacity: bool,

    /// Whether the frontmost clipping plane is reported as the hit instead
    /// of the clipped geometry behind it.
    pub pick_clipping_planes: bool,

    /// Whether hardware point picks snap to the element's stored position
    /// instead of intersecting the ray with geometry.
    pub snap_to_point: bool,

    /// Neighborhood radius, in pixels, searched around the query pixel by
    /// hardware selection.
    pub hardware_snap_radius: u32,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            volume_opacity_threshold: 0.05,
            use_gradient_opacity: false,
            pick_clipping_planes: false,
            snap_to_point: false,
            hardware_snap_radius: 0,
        }
    }
}

impl PickOptions {
    /// Serializes the options to a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
