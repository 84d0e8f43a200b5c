//! Inference scheduling over the sliding window.
//!
//! The scheduler owns the window, the control grid, and the trigger state.
//! It is single-threaded and synchronous: `push_sample` is the only mutating
//! entry point and blocks for the duration of any inference call it makes.

use crate::core::grid::ControlGrid;
use crate::core::resample::{flatten, resample, TensorLayout};
use crate::core::window::SlidingWindow;
use crate::engine::{EngineError, InferenceEngine};

/// Decides, on every pushed sample, whether to resample the window and run
/// inference.
///
/// While the window is filling, every push returns `Ok(None)`. Once full,
/// a push triggers inference when at least `inference_interval` seconds of
/// stream time have elapsed since the previous trigger; the first fill
/// triggers unconditionally.
pub struct InferenceScheduler<E> {
    engine: E,
    window: SlidingWindow,
    grid: ControlGrid,
    layout: TensorLayout,
    inference_interval: f64,
    prev_inference_ts: Option<f64>,
}

impl<E: InferenceEngine> InferenceScheduler<E> {
    /// Create a scheduler around an engine.
    ///
    /// The window capacity equals the grid length; `inference_interval` is
    /// in seconds of stream time.
    ///
    /// # Panics
    ///
    /// Panics if `num_signals` is zero or `inference_interval` is not
    /// positive.
    pub fn new(
        engine: E,
        grid: ControlGrid,
        num_signals: usize,
        inference_interval: f64,
        layout: TensorLayout,
    ) -> Self {
        assert!(
            inference_interval > 0.0,
            "inference interval must be positive, got {inference_interval}"
        );

        let window = SlidingWindow::new(grid.len(), num_signals);

        Self {
            engine,
            window,
            grid,
            layout,
            inference_interval,
            prev_inference_ts: None,
        }
    }

    /// Push one sample and possibly run inference.
    ///
    /// Returns `Ok(None)` when no trigger fired, or `Ok(Some(outputs))` with
    /// the engine's output buffers forwarded untouched. An engine failure is
    /// surfaced as `Err`; the window and the trigger timestamp stay updated
    /// regardless, so the next window continues normally and a failed
    /// trigger is not re-attempted before the next interval elapses.
    ///
    /// # Panics
    ///
    /// Panics on caller contract violations: wrong sample arity or a
    /// non-increasing timestamp.
    pub fn push_sample(
        &mut self,
        sample: &[f32],
        timestamp: f64,
    ) -> Result<Option<Vec<Vec<f32>>>, EngineError> {
        self.window.push(sample, timestamp);

        if !self.window.is_full() || !self.should_trigger(timestamp) {
            return Ok(None);
        }

        self.prev_inference_ts = Some(timestamp);

        let rows = resample(&self.window, &self.grid);
        let input = flatten(&rows, self.layout);

        tracing::debug!(timestamp, len = input.len(), "window triggered inference");

        self.engine.infer(&input).map(Some)
    }

    fn should_trigger(&self, latest: f64) -> bool {
        match self.prev_inference_ts {
            Some(prev) => latest - prev >= self.inference_interval,
            None => true,
        }
    }

    /// The window owned by this scheduler.
    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Timestamp of the last successful trigger, if any.
    pub fn last_inference_ts(&self) -> Option<f64> {
        self.prev_inference_ts
    }

    /// The tensor layout handed to the engine.
    pub fn layout(&self) -> TensorLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine that records every input buffer and echoes it back.
    struct RecordingEngine {
        inputs: Vec<Vec<f32>>,
        fail: bool,
    }

    impl RecordingEngine {
        fn new() -> Self {
            Self {
                inputs: Vec::new(),
                fail: false,
            }
        }
    }

    impl InferenceEngine for RecordingEngine {
        fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
            self.inputs.push(input.to_vec());
            if self.fail {
                Err(EngineError::Execution("injected failure".to_string()))
            } else {
                Ok(vec![input.to_vec()])
            }
        }
    }

    fn scheduler_1ch(
        engine: &mut RecordingEngine,
        window_size: usize,
        rate: f64,
        interval: f64,
    ) -> InferenceScheduler<&mut RecordingEngine> {
        InferenceScheduler::new(
            engine,
            ControlGrid::for_window(window_size, rate),
            1,
            interval,
            TensorLayout::ChannelMajor,
        )
    }

    #[test]
    fn test_no_result_until_full() {
        let mut engine = RecordingEngine::new();
        {
            let mut scheduler = scheduler_1ch(&mut engine, 4, 1.0, 0.1);

            for i in 0..3 {
                let out = scheduler.push_sample(&[i as f32], i as f64).unwrap();
                assert!(out.is_none());
            }
        }

        assert_eq!(engine.inputs.len(), 0);
    }

    #[test]
    fn test_triggers_on_first_fill() {
        let mut engine = RecordingEngine::new();
        let mut scheduler = scheduler_1ch(&mut engine, 4, 1.0, 1000.0);

        for i in 0..3 {
            assert!(scheduler.push_sample(&[i as f32], i as f64).unwrap().is_none());
        }

        // Fires on the fill even though no interval has elapsed yet.
        let out = scheduler.push_sample(&[3.0], 3.0).unwrap();
        assert!(out.is_some());
        assert_eq!(scheduler.last_inference_ts(), Some(3.0));
    }

    #[test]
    fn test_exact_grid_match_passes_raw_values() {
        let mut engine = RecordingEngine::new();
        {
            let mut scheduler = scheduler_1ch(&mut engine, 4, 1.0, 0.1);
            for i in 0..4 {
                scheduler.push_sample(&[i as f32], i as f64).unwrap();
            }
        }

        assert_eq!(engine.inputs, vec![vec![0.0, 1.0, 2.0, 3.0]]);
    }

    #[test]
    fn test_trigger_cadence_respects_interval() {
        let mut engine = RecordingEngine::new();
        {
            // 10 Hz sampling, one inference per 0.45 s of stream time (the
            // interval sits between sample times so float rounding cannot
            // move a trigger).
            let mut scheduler = scheduler_1ch(&mut engine, 4, 10.0, 0.45);

            for i in 0..40 {
                scheduler.push_sample(&[0.0], i as f64 * 0.1).unwrap();
            }
        }

        // Fill at t=0.3, then t=0.8, 1.3, 1.8, ... up to 3.8.
        assert_eq!(engine.inputs.len(), 8);
    }

    #[test]
    fn test_engine_failure_surfaces_and_state_advances() {
        let mut engine = RecordingEngine::new();
        engine.fail = true;
        {
            let mut scheduler = scheduler_1ch(&mut engine, 2, 1.0, 0.5);

            scheduler.push_sample(&[0.0], 0.0).unwrap();
            let err = scheduler.push_sample(&[1.0], 1.0);
            assert!(err.is_err());

            // Trigger timestamp advanced despite the failure, so the next
            // push inside the interval stays quiet.
            assert_eq!(scheduler.last_inference_ts(), Some(1.0));
            assert!(scheduler.push_sample(&[2.0], 1.25).unwrap().is_none());
        }

        assert_eq!(engine.inputs.len(), 1);
    }

    #[test]
    fn test_time_major_layout_interleaves_channels() {
        let mut engine = RecordingEngine::new();
        {
            let mut scheduler = InferenceScheduler::new(
                &mut engine,
                ControlGrid::for_window(2, 1.0),
                2,
                0.1,
                TensorLayout::TimeMajor,
            );

            scheduler.push_sample(&[1.0, 10.0], 0.0).unwrap();
            scheduler.push_sample(&[2.0, 20.0], 1.0).unwrap();
        }

        assert_eq!(engine.inputs, vec![vec![1.0, 10.0, 2.0, 20.0]]);
    }

    #[test]
    #[should_panic(expected = "inference interval")]
    fn test_zero_interval_panics() {
        let mut engine = RecordingEngine::new();
        scheduler_1ch(&mut engine, 4, 1.0, 0.0);
    }
}
