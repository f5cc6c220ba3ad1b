//! Opacity-threshold ray marching through structured scalar volumes.
//!
//! The march runs in continuous index space: one unit per grid step, so
//! voxel-boundary crossings land on integer coordinates. Each sample is
//! trilinearly interpolated, mapped through the component's opacity
//! function, and optionally modulated by gradient-magnitude opacity; the
//! march stops at the first sample whose opacity reaches the threshold and
//! back-interpolates the refined crossing parameter.

use glam::{IVec3, Vec3};
use sightline_core::Segment;
use sightline_structures::ScalarVolume;

use crate::clip::clip_with_extent;

/// Minimum march step as a fraction of the in-domain parameter span.
///
/// Boundary crossings computed at (or numerically just past) an integer
/// coordinate can otherwise produce a zero advance; the floor turns that
/// into guaranteed forward progress, bounding the sample count by the
/// voxel count along the ray plus `1 / MIN_STEP_FRACTION`.
pub const MIN_STEP_FRACTION: f32 = 1e-5;

/// A resolved hit inside a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeHit {
    /// Hit parameter relative to the original segment endpoints.
    pub t: f32,
    /// Indices of the grid sample nearest the hit.
    pub ijk: IVec3,
    /// Fractional position within that sample's half-index footprint.
    pub pcoords: Vec3,
    /// Component whose opacity crossed the threshold first.
    pub component: usize,
    /// Local-space normal: the outward grid-face normal when the hit sits
    /// on the extent entry, else the negated scalar gradient, else the
    /// direction back toward the ray origin.
    pub normal: Vec3,
}

/// Marches the local-space segment through the volume and returns the first
/// opacity-threshold crossing within `[t1, t2]`.
///
/// With several components, each is sampled every step and the smallest
/// crossing parameter wins; equal parameters keep the lowest component.
#[must_use]
pub fn intersect_volume(
    volume: &ScalarVolume,
    segment: &Segment,
    t1: f32,
    t2: f32,
    threshold: f32,
    use_gradient_opacity: bool,
) -> Option<VolumeHit> {
    let extent = volume.extent();
    let bounds = [
        extent[0] as f32,
        extent[1] as f32,
        extent[2] as f32,
        extent[3] as f32,
        extent[4] as f32,
        extent[5] as f32,
    ];

    let x1 = volume.local_to_index(segment.p1);
    let x2 = volume.local_to_index(segment.p2);
    let index_segment = Segment::new(x1, x2);

    let clip = clip_with_extent(&index_segment, &bounds)?;
    let start = clip.t1.max(t1);
    let end = clip.t2.min(t2);
    if start > end {
        return None;
    }
    // The extent face only supplies the hit normal when it, not the caller's
    // domain, bounds the march entry.
    let entry_face = (clip.t1 >= t1).then_some(clip.entry_plane).flatten();

    let components = volume.num_components();
    let delta = x2 - x1;
    let min_step = ((end - start) * MIN_STEP_FRACTION).max(1e-9);

    let sample_all = |t: f32, opacities: &mut Vec<f32>| {
        opacities.clear();
        let x = index_segment.point_at(t);
        for c in 0..components {
            let component = volume.component(c).expect("component index in range");
            let scalar = volume.interpolate(c, x);
            let mut opacity = component.opacity_of(scalar);
            if use_gradient_opacity {
                let magnitude = volume.interpolated_gradient(c, x).length();
                opacity *= component.gradient_factor(magnitude);
            }
            opacities.push(opacity);
        }
    };

    let mut previous = Vec::with_capacity(components);
    let mut current = Vec::with_capacity(components);
    sample_all(start, &mut previous);

    // Already opaque at entry: the entry itself is the hit.
    if let Some(c) = previous.iter().position(|&o| o >= threshold) {
        return Some(finish_hit(
            volume,
            segment,
            &index_segment,
            start,
            start,
            c,
            start,
            entry_face,
        ));
    }

    // Crossings per axis cannot exceed the index-space span, and the step
    // floor bounds the remainder; iterate within that budget.
    let span = end - start;
    let crossing_bound = (delta.x.abs() + delta.y.abs() + delta.z.abs()) * span;
    let max_steps = crossing_bound.ceil() as usize + (1.0 / MIN_STEP_FRACTION) as usize + 8;

    let mut t = start;
    for _ in 0..max_steps {
        if t >= end {
            break;
        }
        let t_next = next_crossing(&index_segment, delta, t, min_step, end);
        sample_all(t_next, &mut current);

        // Smallest back-interpolated crossing wins; ties keep the lowest
        // component index because strict improvement is required.
        let mut winner: Option<(f32, usize)> = None;
        for (c, (&before, &after)) in previous.iter().zip(current.iter()).enumerate() {
            if before < threshold && after >= threshold {
                let fraction = (threshold - before) / (after - before);
                let t_hit = t + (t_next - t) * fraction;
                if winner.map_or(true, |(best, _)| t_hit < best) {
                    winner = Some((t_hit, c));
                }
            }
        }
        if let Some((t_hit, component)) = winner {
            return Some(finish_hit(
                volume,
                segment,
                &index_segment,
                t_hit,
                t_next,
                component,
                start,
                entry_face,
            ));
        }

        std::mem::swap(&mut previous, &mut current);
        t = t_next;
    }

    None
}

/// Advances to the next voxel-boundary crossing along the soonest
/// non-degenerate axis, floored to `min_step` and capped at `end`.
fn next_crossing(index_segment: &Segment, delta: Vec3, t: f32, min_step: f32, end: f32) -> f32 {
    let x = index_segment.point_at(t);
    let mut nearest = f32::INFINITY;
    for axis in 0..3 {
        let d = delta[axis];
        if d.abs() < 1e-12 {
            continue;
        }
        let boundary = if d > 0.0 {
            x[axis].floor() + 1.0
        } else {
            x[axis].ceil() - 1.0
        };
        let t_axis = (boundary - index_segment.p1[axis]) / d;
        if t_axis > t && t_axis < nearest {
            nearest = t_axis;
        }
    }
    nearest.max(t + min_step).min(end)
}

fn finish_hit(
    volume: &ScalarVolume,
    segment: &Segment,
    index_segment: &Segment,
    t: f32,
    t_sample: f32,
    component: usize,
    entry_t: f32,
    entry_face: Option<usize>,
) -> VolumeHit {
    // The reported sample is the one whose opacity crossed the threshold
    // (the far end of the crossing interval); pcoords place the refined
    // hit inside that sample's half-index footprint.
    let x = index_segment.point_at(t);
    let x_sample = index_segment.point_at(t_sample);
    let extent = volume.extent();
    let mut ijk = IVec3::ZERO;
    let mut pcoords = Vec3::ZERO;
    for axis in 0..3 {
        let i = (x_sample[axis].round() as i32).clamp(extent[axis * 2], extent[axis * 2 + 1]);
        ijk[axis] = i;
        pcoords[axis] = (x[axis] - i as f32 + 0.5).clamp(0.0, 1.0);
    }

    let normal = hit_normal(volume, segment, index_segment, t, component, entry_t, entry_face);

    VolumeHit {
        t,
        ijk,
        pcoords,
        component,
        normal,
    }
}

fn hit_normal(
    volume: &ScalarVolume,
    segment: &Segment,
    index_segment: &Segment,
    t: f32,
    component: usize,
    entry_t: f32,
    entry_face: Option<usize>,
) -> Vec3 {
    // Entry exactly on an extent face: the outward face normal, with the
    // sign folded through the spacing so it stays outward in local space.
    if t <= entry_t + 1e-7 {
        if let Some(face) = entry_face {
            let axis = face / 2;
            let travel = (index_segment.p2[axis] - index_segment.p1[axis])
                * volume.spacing()[axis];
            if travel.abs() > 1e-12 {
                let mut normal = Vec3::ZERO;
                normal[axis] = -travel.signum();
                return normal;
            }
        }
    }

    let gradient = volume.interpolated_gradient(component, index_segment.point_at(t));
    if gradient.length_squared() > 1e-12 {
        return -gradient.normalize();
    }

    (segment.p1 - segment.p2).normalize_or_zero()
}
