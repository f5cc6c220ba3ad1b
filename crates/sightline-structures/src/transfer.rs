//! Piecewise-linear transfer functions.

use serde::{Deserialize, Serialize};

/// A piecewise-linear map from scalar values to opacity.
///
/// Control points are kept sorted by scalar value. Evaluation clamps to the
/// first and last control points outside their range; an empty function
/// evaluates to 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PiecewiseFunction {
    points: Vec<(f32, f32)>,
}

impl PiecewiseFunction {
    /// Creates an empty function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a function from control points, sorting them by scalar.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut function = Self::new();
        for (x, y) in points {
            function.add_point(x, y);
        }
        function
    }

    /// Adds a control point, replacing an existing one at the same scalar.
    pub fn add_point(&mut self, x: f32, y: f32) {
        let index = self.points.partition_point(|p| p.0 < x);
        if let Some(existing) = self.points.get_mut(index) {
            if (existing.0 - x).abs() < f32::EPSILON {
                existing.1 = y;
                return;
            }
        }
        self.points.insert(index, (x, y));
    }

    /// Returns the number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the function has no control points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the control points, sorted by scalar.
    #[must_use]
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Evaluates the function at `x`.
    #[must_use]
    pub fn evaluate(&self, x: f32) -> f32 {
        let Some(&(first_x, first_y)) = self.points.first() else {
            return 0.0;
        };
        if x <= first_x {
            return first_y;
        }
        let &(last_x, last_y) = self.points.last().unwrap_or(&(first_x, first_y));
        if x >= last_x {
            return last_y;
        }

        let index = self.points.partition_point(|p| p.0 < x);
        let (x0, y0) = self.points[index - 1];
        let (x1, y1) = self.points[index];
        let dx = x1 - x0;
        if dx < f32::EPSILON {
            return y1;
        }
        let t = (x - x0) / dx;
        y0 + (y1 - y0) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_evaluates_to_zero() {
        let f = PiecewiseFunction::new();
        assert_eq!(f.evaluate(0.5), 0.0);
        assert!(f.is_empty());
    }

    #[test]
    fn test_interpolation_and_clamping() {
        let f = PiecewiseFunction::from_points([(0.0, 0.0), (1.0, 1.0)]);
        assert!((f.evaluate(0.25) - 0.25).abs() < 1e-6);
        assert!((f.evaluate(-5.0) - 0.0).abs() < 1e-6);
        assert!((f.evaluate(5.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_points_kept_sorted() {
        let f = PiecewiseFunction::from_points([(2.0, 0.5), (0.0, 0.0), (1.0, 1.0)]);
        let xs: Vec<f32> = f.points().iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        // Interior lerp between (1, 1) and (2, 0.5).
        assert!((f.evaluate(1.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_add_point_replaces_duplicate() {
        let mut f = PiecewiseFunction::from_points([(0.0, 0.0), (1.0, 1.0)]);
        f.add_point(1.0, 0.25);
        assert_eq!(f.len(), 2);
        assert!((f.evaluate(1.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_single_point_is_constant() {
        let f = PiecewiseFunction::from_points([(10.0, 0.7)]);
        assert!((f.evaluate(-100.0) - 0.7).abs() < 1e-6);
        assert!((f.evaluate(10.0) - 0.7).abs() < 1e-6);
        assert!((f.evaluate(100.0) - 0.7).abs() < 1e-6);
    }
}
