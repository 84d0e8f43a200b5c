//! Piecewise-linear resampling of irregular samples onto the control grid.
//!
//! Window timestamps are first aligned so the newest sample maps to zero,
//! making them directly comparable with the grid's non-positive relative
//! values. Each channel is then interpolated independently with a single
//! monotone cursor walk over the aligned timestamps.

use crate::core::grid::ControlGrid;
use crate::core::window::SlidingWindow;
use serde::{Deserialize, Serialize};

/// Absolute tolerance for floating boundary comparisons.
const FLOAT_EQ_EPS: f64 = 1e-5;

/// Order of the flattened tensor handed to the inference engine.
///
/// Model exports differ on input order, so the layout is explicit
/// configuration rather than something inferred from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// `[signal][time]`: each channel's resampled window is contiguous.
    #[default]
    ChannelMajor,
    /// `[time][signal]`: each time step's channel values are contiguous.
    TimeMajor,
}

impl TensorLayout {
    /// Parse a layout name as used on the command line and in config files.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "channel-major" => Some(TensorLayout::ChannelMajor),
            "time-major" => Some(TensorLayout::TimeMajor),
            _ => None,
        }
    }
}

fn is_float_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_EQ_EPS
}

fn is_strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

fn lerp(a: f32, b: f32, t_a: f64, t_b: f64, t: f64) -> f32 {
    a + (b - a) * ((t - t_a) / (t_b - t_a)) as f32
}

/// Interpolate one channel's samples at the control timestamps.
///
/// Both timestamp sequences must be strictly increasing and the control
/// timestamps must lie within the observed span (within tolerance); a
/// violation is a broken caller invariant and panics.
fn interp_channel(samples: &[f32], ts: &[f64], ts_control: &[f64]) -> Vec<f32> {
    assert_eq!(samples.len(), ts.len(), "one timestamp per sample required");
    assert!(
        is_strictly_increasing(ts),
        "sample timestamps must be strictly increasing"
    );
    assert!(
        is_strictly_increasing(ts_control),
        "control timestamps must be strictly increasing"
    );
    assert!(
        ts_control[0] >= ts[0] || is_float_eq(ts_control[0], ts[0]),
        "control grid starts before the observed span: {} < {}",
        ts_control[0],
        ts[0]
    );
    assert!(
        ts_control[ts_control.len() - 1] <= ts[ts.len() - 1]
            || is_float_eq(ts_control[ts_control.len() - 1], ts[ts.len() - 1]),
        "control grid ends after the observed span: {} > {}",
        ts_control[ts_control.len() - 1],
        ts[ts.len() - 1]
    );

    let is_between = |x: f64, lo: f64, hi: f64| {
        (x >= lo && x <= hi) || is_float_eq(x, lo) || is_float_eq(x, hi)
    };

    let mut idx = 0;
    let mut out = Vec::with_capacity(ts_control.len());

    for &t in ts_control {
        while !is_between(t, ts[idx], ts[idx + 1]) {
            idx += 1;
            assert!(
                idx + 1 < ts.len(),
                "control timestamp {t} not bracketed by any sample pair"
            );
        }

        out.push(lerp(samples[idx], samples[idx + 1], ts[idx], ts[idx + 1], t));
    }

    out
}

/// Resample every channel of a full window at the control grid timestamps.
///
/// Returns one `Vec` of `grid.len()` interpolated values per channel.
///
/// # Panics
///
/// Panics if the window is not filled to exactly `grid.len()` samples, or if
/// the interpolation preconditions above are violated.
pub fn resample(window: &SlidingWindow, grid: &ControlGrid) -> Vec<Vec<f32>> {
    assert_eq!(
        window.len(),
        grid.len(),
        "window must be full before resampling"
    );

    // Align the newest sample timestamp with zero.
    let newest = window
        .latest_timestamp()
        .expect("grid has at least 2 points, so the window is non-empty");
    let aligned: Vec<f64> = window.timestamps().map(|t| t - newest).collect();

    (0..window.num_signals())
        .map(|ch| {
            let values: Vec<f32> = window.channel(ch).collect();
            interp_channel(&values, &aligned, grid.points())
        })
        .collect()
}

/// Flatten per-channel rows into a single engine input buffer.
///
/// `ChannelMajor` concatenates the rows as-is; `TimeMajor` transposes so
/// each time step's channel values are adjacent.
pub fn flatten(rows: &[Vec<f32>], layout: TensorLayout) -> Vec<f32> {
    match layout {
        TensorLayout::ChannelMajor => rows.iter().flatten().copied().collect(),
        TensorLayout::TimeMajor => {
            let window_len = rows.first().map(Vec::len).unwrap_or(0);
            (0..window_len)
                .flat_map(|t| rows.iter().map(move |row| row[t]))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from(values: &[&[f32]], ts: &[f64]) -> SlidingWindow {
        let mut window = SlidingWindow::new(ts.len(), values.len());
        for (i, &t) in ts.iter().enumerate() {
            let sample: Vec<f32> = values.iter().map(|ch| ch[i]).collect();
            window.push(&sample, t);
        }
        window
    }

    #[test]
    fn test_identity_at_control_points() {
        // Grid points coincide with the (aligned) sample timestamps, so the
        // output must reproduce the raw samples exactly.
        let window = window_from(&[&[0.0, 1.0, 2.0, 3.0]], &[0.0, 1.0, 2.0, 3.0]);
        let grid = ControlGrid::linspace(-3.0, 0.0, 4);

        let rows = resample(&window, &grid);
        assert_eq!(rows, vec![vec![0.0, 1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_midpoint_interpolation() {
        // Aligned control grid [-1.5, -1.0, -0.5, 0.0] maps onto raw
        // timestamps [1.5, 2.0, 2.5, 3.0].
        let window = window_from(&[&[0.0, 2.0, 4.0, 10.0]], &[0.0, 1.0, 2.0, 3.0]);
        let grid = ControlGrid::linspace(-1.5, 0.0, 4);

        let rows = resample(&window, &grid);
        assert_eq!(rows, vec![vec![3.0, 4.0, 7.0, 10.0]]);
    }

    #[test]
    fn test_channels_resampled_independently() {
        let window = window_from(
            &[&[0.0, 1.0, 2.0, 3.0], &[3.0, 2.0, 1.0, 0.0]],
            &[0.0, 1.0, 2.0, 3.0],
        );
        let grid = ControlGrid::linspace(-1.5, 0.0, 4);

        let rows = resample(&window, &grid);
        assert_eq!(rows[0], vec![1.5, 2.0, 2.5, 3.0]);
        assert_eq!(rows[1], vec![1.5, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_values_bounded_by_bracketing_samples() {
        let values: Vec<f32> = vec![0.5, -1.0, 3.0, 2.0, 8.0, -2.0];
        let ts: Vec<f64> = vec![0.0, 0.9, 2.1, 3.0, 4.2, 5.0];
        let window = window_from(&[&values], &ts);
        let grid = ControlGrid::linspace(-5.0, 0.0, 6);

        let rows = resample(&window, &grid);
        for (i, &out) in rows[0].iter().enumerate() {
            let t = grid.points()[i] + 5.0;
            let seg = ts.windows(2).position(|p| t >= p[0] && t <= p[1] + 1e-9);
            let seg = seg.expect("grid point inside the span");
            let (lo, hi) = (
                values[seg].min(values[seg + 1]),
                values[seg].max(values[seg + 1]),
            );
            assert!(out >= lo - 1e-5 && out <= hi + 1e-5, "value {out} escapes [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_irregular_timestamps_still_hit_exact_points() {
        // Jittered sampling; the grid point at -1.0 exactly matches the
        // aligned timestamp of the second-to-last sample.
        let window = window_from(&[&[5.0, 7.0, 1.0]], &[0.0, 2.0, 3.0]);
        let grid = ControlGrid::linspace(-2.0, 0.0, 3);

        let rows = resample(&window, &grid);
        assert!((rows[0][1] - 7.0).abs() < 1e-6);
        assert!((rows[0][2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_tolerance() {
        // Control endpoint sits 1e-6 outside the observed span; the absolute
        // tolerance must accept it.
        let window = window_from(&[&[1.0, 2.0]], &[0.0, 1.0]);
        let grid = ControlGrid::linspace(-1.000001, 0.0, 2);

        let rows = resample(&window, &grid);
        assert!((rows[0][0] - 1.0).abs() < 1e-4);
    }

    #[test]
    #[should_panic(expected = "observed span")]
    fn test_grid_outside_span_panics() {
        let window = window_from(&[&[1.0, 2.0]], &[0.0, 0.5]);
        let grid = ControlGrid::linspace(-1.0, 0.0, 2);
        resample(&window, &grid);
    }

    #[test]
    #[should_panic(expected = "window must be full")]
    fn test_partial_window_panics() {
        let mut window = SlidingWindow::new(4, 1);
        window.push(&[1.0], 0.0);
        let grid = ControlGrid::linspace(-3.0, 0.0, 4);
        resample(&window, &grid);
    }

    #[test]
    fn test_flatten_channel_major() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(
            flatten(&rows, TensorLayout::ChannelMajor),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_flatten_time_major_transposes() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        assert_eq!(
            flatten(&rows, TensorLayout::TimeMajor),
            vec![1.0, 3.0, 2.0, 4.0]
        );
    }

    #[test]
    fn test_layout_from_name() {
        assert_eq!(
            TensorLayout::from_name("channel-major"),
            Some(TensorLayout::ChannelMajor)
        );
        assert_eq!(
            TensorLayout::from_name("TIME_MAJOR"),
            Some(TensorLayout::TimeMajor)
        );
        assert_eq!(TensorLayout::from_name("interleaved"), None);
    }
}
