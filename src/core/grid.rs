//! Control grid construction.
//!
//! The resampler targets a fixed, evenly spaced set of relative timestamps
//! where the most recent sample maps to zero. The grid is computed once at
//! construction and shared read-only afterwards.

/// An immutable, evenly spaced sequence of relative timestamps.
///
/// The last point is `0.0` (the newest sample) and every earlier point is
/// negative, so the grid is directly comparable with window timestamps once
/// they have been aligned to the newest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGrid {
    points: Vec<f64>,
}

impl ControlGrid {
    /// Build a grid of `len` evenly spaced values, inclusive of both endpoints.
    ///
    /// `points[i] = min + i * (max - min) / (len - 1)`
    ///
    /// # Panics
    ///
    /// Panics if `len < 2`.
    pub fn linspace(min: f64, max: f64, len: usize) -> Self {
        assert!(len >= 2, "control grid needs at least 2 points, got {len}");

        let points = (0..len)
            .map(|i| min + i as f64 * (max - min) / (len - 1) as f64)
            .collect();

        Self { points }
    }

    /// The canonical grid for a sliding window: one point per sample period,
    /// ending at the newest sample.
    ///
    /// `min = -(window_size - 1) / sample_rate_hz`, `max = 0.0`.
    ///
    /// # Panics
    ///
    /// Panics if `window_size < 2` or `sample_rate_hz` is not positive.
    pub fn for_window(window_size: usize, sample_rate_hz: f64) -> Self {
        assert!(
            sample_rate_hz > 0.0,
            "sample rate must be positive, got {sample_rate_hz}"
        );

        let min = -((window_size - 1) as f64) / sample_rate_hz;
        Self::linspace(min, 0.0, window_size)
    }

    /// Grid for a stream whose sample spacing can run up to `jitter` (a
    /// fraction of the nominal period) short of nominal.
    ///
    /// The span is shrunk by the same margin, so a full window of jittered
    /// samples always covers the grid and satisfies the resampler's span
    /// precondition.
    ///
    /// # Panics
    ///
    /// Panics if `window_size < 2`, `sample_rate_hz` is not positive, or
    /// `jitter` is outside `[0, 1)`.
    pub fn for_jittered_window(window_size: usize, sample_rate_hz: f64, jitter: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&jitter),
            "jitter must be in [0, 1), got {jitter}"
        );

        Self::for_window(window_size, sample_rate_hz / (1.0 - jitter))
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; construction requires at least two points.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The grid points, oldest (most negative) first.
    pub fn points(&self) -> &[f64] {
        &self.points
    }
}
