//! Evenly spaced sample points.

use serde::{Deserialize, Serialize};

use crate::InvalidGridError;

pub const DEFAULT_START: f64 = -10.0;
pub const DEFAULT_STOP: f64 = 10.0;
pub const DEFAULT_STEP: f64 = 0.5;

/// Upper bound on the number of points a grid may hold.
const MAX_POINTS: f64 = 4_294_967_295.0;

/// Points `start, start + step, start + 2 step, …` in the half-open interval `[start, stop)`.
///
/// The grid holds `ceil((stop - start) / step)` points. The `i`-th point is computed as
/// `start + i * step` rather than by accumulation, so rounding errors do not build up.
///
/// # Example
///
/// ```
/// use owlstat_sampler::grid::SampleGrid;
///
/// let grid = SampleGrid::new(0.0, 1.0, 0.25)?;
/// assert_eq!(grid.to_vec(), [0.0, 0.25, 0.5, 0.75]);
/// # Ok::<(), owlstat_sampler::InvalidGridError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridBounds", into = "GridBounds")]
pub struct SampleGrid {
    start: f64,
    stop: f64,
    step: f64,
    len: usize,
}

/// Unvalidated grid parameters, as read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridBounds {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            stop: DEFAULT_STOP,
            step: DEFAULT_STEP,
        }
    }
}

impl TryFrom<GridBounds> for SampleGrid {
    type Error = InvalidGridError;

    fn try_from(bounds: GridBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.stop, bounds.step)
    }
}

impl From<SampleGrid> for GridBounds {
    fn from(grid: SampleGrid) -> Self {
        Self {
            start: grid.start,
            stop: grid.stop,
            step: grid.step,
        }
    }
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            stop: DEFAULT_STOP,
            step: DEFAULT_STEP,
            len: 40,
        }
    }
}

impl SampleGrid {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self, InvalidGridError> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(InvalidGridError::NonFinite);
        }
        if step <= 0.0 {
            return Err(InvalidGridError::NonPositiveStep { step });
        }
        if stop <= start {
            return Err(InvalidGridError::EmptyInterval { start, stop });
        }
        let count = ((stop - start) / step).ceil();
        if count > MAX_POINTS {
            return Err(InvalidGridError::TooManyPoints { count });
        }
        Ok(Self {
            start,
            stop,
            step,
            len: count as usize,
        })
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of points. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the `i`-th point, or `None` past the end of the grid.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        (i < self.len).then(|| self.start + i as f64 * self.step)
    }

    /// Iterates over the points in increasing order.
    #[expect(clippy::cast_precision_loss)]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.start + i as f64 * self.step)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let grid = SampleGrid::default();
        assert_eq!(grid, SampleGrid::new(-10.0, 10.0, 0.5).unwrap());
        assert_eq!(grid.len(), 40);
        assert_eq!(grid.get(0), Some(-10.0));
        assert_eq!(grid.get(39), Some(9.5));
        assert_eq!(grid.get(40), None);
    }

    #[test]
    fn test_single_point_grid() {
        let grid = SampleGrid::new(0.0, 1.0, 1.0).unwrap();
        assert_eq!(grid.to_vec(), [0.0]);
    }

    #[test]
    fn test_partial_last_step_is_included() {
        // ceil(1.0 / 0.3) = 4: 0.0, 0.3, 0.6, 0.9
        let grid = SampleGrid::new(0.0, 1.0, 0.3).unwrap();
        assert_eq!(grid.len(), 4);
        let last = grid.get(3).unwrap();
        assert!((last - 0.9).abs() < 1e-12);
        assert!(last < grid.stop());
    }

    #[test]
    fn test_points_are_strictly_increasing_and_step_spaced() {
        let grid = SampleGrid::new(-3.0, 7.0, 0.1).unwrap();
        let xs = grid.to_vec();
        assert_eq!(xs.len(), grid.len());
        for pair in xs.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - 0.1).abs() < 1e-9);
        }
        assert!(*xs.last().unwrap() < 7.0);
    }

    #[test]
    fn test_invalid_grids() {
        assert_eq!(
            SampleGrid::new(0.0, 1.0, 0.0),
            Err(InvalidGridError::NonPositiveStep { step: 0.0 })
        );
        assert_eq!(
            SampleGrid::new(0.0, 1.0, -0.5),
            Err(InvalidGridError::NonPositiveStep { step: -0.5 })
        );
        assert_eq!(
            SampleGrid::new(1.0, 1.0, 0.5),
            Err(InvalidGridError::EmptyInterval {
                start: 1.0,
                stop: 1.0
            })
        );
        assert_eq!(
            SampleGrid::new(2.0, 1.0, 0.5),
            Err(InvalidGridError::EmptyInterval {
                start: 2.0,
                stop: 1.0
            })
        );
        assert_eq!(
            SampleGrid::new(0.0, f64::INFINITY, 1.0),
            Err(InvalidGridError::NonFinite)
        );
        assert_eq!(
            SampleGrid::new(f64::NAN, 1.0, 1.0),
            Err(InvalidGridError::NonFinite)
        );
        assert!(matches!(
            SampleGrid::new(0.0, 1.0, 1e-300),
            Err(InvalidGridError::TooManyPoints { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let grid: SampleGrid =
            serde_json::from_str(r#"{"start": 0.0, "stop": 2.0, "step": 0.5}"#).unwrap();
        assert_eq!(grid.len(), 4);

        let grid: SampleGrid = serde_json::from_str("{}").unwrap();
        assert_eq!(grid, SampleGrid::default());

        assert!(serde_json::from_str::<SampleGrid>(r#"{"step": 0.0}"#).is_err());
    }
}
