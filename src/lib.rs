//! winfer - windowed resampling and inference triggering for live
//! multi-channel signal streams.
//!
//! This library buffers an irregularly-timed sample stream, resamples it
//! onto a uniform control grid with piecewise-linear interpolation, and
//! decides when enough new data has arrived to justify an inference call.
//! The inference engine itself is an opaque capability behind the
//! [`engine::InferenceEngine`] trait; an ONNX Runtime binding ships behind
//! the `onnx` feature.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           winfer                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌─────────────┐   ┌───────────┐              │
//! │  │  Stream  │──▶│   Sliding   │──▶│ Resampler │              │
//! │  │  source  │   │   window    │   │  (grid)   │              │
//! │  └──────────┘   └─────────────┘   └───────────┘              │
//! │                        │                 │                   │
//! │                        ▼                 ▼                   │
//! │                 ┌─────────────┐   ┌───────────┐              │
//! │                 │  Scheduler  │──▶│  Engine   │              │
//! │                 │  (trigger)  │   │  (ONNX)   │              │
//! │                 └─────────────┘   └───────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use winfer::{ControlGrid, InferenceScheduler, TensorLayout};
//! use winfer::engine::{EngineError, InferenceEngine};
//!
//! struct Echo;
//!
//! impl InferenceEngine for Echo {
//!     fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
//!         Ok(vec![input.to_vec()])
//!     }
//! }
//!
//! // 4-sample window at a nominal 1 Hz, triggering at most every 2 seconds.
//! let grid = ControlGrid::for_window(4, 1.0);
//! let mut scheduler =
//!     InferenceScheduler::new(Echo, grid, 1, 2.0, TensorLayout::ChannelMajor);
//!
//! for i in 0..4 {
//!     let out = scheduler.push_sample(&[i as f32], i as f64).unwrap();
//!     // Nothing fires until the window first fills.
//!     assert_eq!(out.is_some(), i == 3);
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod stats;
pub mod stream;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{flatten, resample, ControlGrid, InferenceScheduler, SlidingWindow, TensorLayout};
pub use engine::{EngineError, InferenceEngine};
pub use stats::{RunStats, SharedRunStats, StatsSnapshot};
pub use stream::{StreamSample, SyntheticConfig, SyntheticSource};

// ONNX re-exports (when enabled)
#[cfg(feature = "onnx")]
pub use engine::OnnxEngine;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
