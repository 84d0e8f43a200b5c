//! Windowed resampling and inference triggering.
//!
//! This module contains:
//! - Control grid construction (the fixed resampling targets)
//! - The fixed-capacity multi-channel sliding window
//! - Piecewise-linear resampling onto the grid
//! - The scheduler deciding when a window is worth an inference call

pub mod grid;
pub mod resample;
pub mod scheduler;
pub mod window;

// Re-export commonly used types
pub use grid::ControlGrid;
pub use resample::{flatten, resample, TensorLayout};
pub use scheduler::InferenceScheduler;
pub use window::SlidingWindow;
