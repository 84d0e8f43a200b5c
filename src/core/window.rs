//! Fixed-capacity sliding window over a multi-channel sample stream.
//!
//! All channels share one timestamp sequence. Pushing into a full window
//! evicts the oldest observation from every channel first, so the buffer
//! never grows past its capacity.

use std::collections::VecDeque;

/// The most recent `capacity` observations of a multi-channel stream.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    timestamps: VecDeque<f64>,
    channels: Vec<VecDeque<f32>>,
}

impl SlidingWindow {
    /// Create an empty window holding up to `capacity` samples of
    /// `num_signals` channels each.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or `num_signals` is zero.
    pub fn new(capacity: usize, num_signals: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        assert!(num_signals > 0, "need at least one channel");

        Self {
            capacity,
            timestamps: VecDeque::with_capacity(capacity),
            channels: vec![VecDeque::with_capacity(capacity); num_signals],
        }
    }

    /// Append one sample, evicting the oldest observation first when full.
    ///
    /// # Panics
    ///
    /// Panics if `sample` does not supply exactly one value per channel, or
    /// if `timestamp` is not strictly greater than the previous timestamp.
    pub fn push(&mut self, sample: &[f32], timestamp: f64) {
        assert_eq!(
            sample.len(),
            self.channels.len(),
            "sample arity {} does not match channel count {}",
            sample.len(),
            self.channels.len()
        );

        if let Some(&last) = self.timestamps.back() {
            assert!(
                timestamp > last,
                "timestamps must be strictly increasing: got {timestamp} after {last}"
            );
        }

        if self.timestamps.len() == self.capacity {
            self.timestamps.pop_front();
            for channel in &mut self.channels {
                channel.pop_front();
            }
        }

        self.timestamps.push_back(timestamp);
        for (channel, &value) in self.channels.iter_mut().zip(sample) {
            channel.push_back(value);
        }
    }

    /// Current number of samples, shared across all channels.
    pub fn len(&self) -> usize {
        debug_assert!(self
            .channels
            .iter()
            .all(|c| c.len() == self.timestamps.len()));

        self.timestamps.len()
    }

    /// Whether no samples have been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Whether the window has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Maximum number of samples the window holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of channels per sample.
    pub fn num_signals(&self) -> usize {
        self.channels.len()
    }

    /// Timestamp of the newest sample, if any.
    pub fn latest_timestamp(&self) -> Option<f64> {
        self.timestamps.back().copied()
    }

    /// Timestamps in push order, oldest first.
    pub fn timestamps(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.timestamps.iter().copied()
    }

    /// One channel's values in push order, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn channel(&self, index: usize) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.channels[index].iter().copied()
    }
}
