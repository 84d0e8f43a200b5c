//! ONNX Runtime binding via the `ort` crate.
//!
//! A thin call-through: session creation, tensor marshaling, and forwarding
//! of whatever output buffers the model produces. No output validation
//! happens here.

use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;

use crate::core::resample::TensorLayout;
use crate::engine::{EngineError, InferenceEngine};

/// Inference engine backed by an ONNX Runtime session.
///
/// The flattened input buffer is reshaped to `[1, num_signals, window_size]`
/// for channel-major layouts and `[1, window_size, num_signals]` for
/// time-major ones, matching the order produced by
/// [`flatten`](crate::core::resample::flatten).
pub struct OnnxEngine {
    session: Session,
    window_size: usize,
    num_signals: usize,
    layout: TensorLayout,
}

impl OnnxEngine {
    /// Load a model from a file on disk.
    pub fn from_file(
        path: impl AsRef<Path>,
        window_size: usize,
        num_signals: usize,
        layout: TensorLayout,
    ) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EngineError::Load(format!(
                "model not found: {}",
                path.display()
            )));
        }

        tracing::info!(model = %path.display(), "loading ONNX model");

        let session = session_builder()?
            .commit_from_file(path)
            .map_err(|e| EngineError::Load(format!("failed to load model: {e}")))?;

        Ok(Self {
            session,
            window_size,
            num_signals,
            layout,
        })
    }

    /// Load a model from an in-memory byte buffer.
    pub fn from_bytes(
        bytes: &[u8],
        window_size: usize,
        num_signals: usize,
        layout: TensorLayout,
    ) -> Result<Self, EngineError> {
        tracing::info!(len = bytes.len(), "loading ONNX model from memory");

        let session = session_builder()?
            .commit_from_memory(bytes)
            .map_err(|e| EngineError::Load(format!("failed to load model: {e}")))?;

        Ok(Self {
            session,
            window_size,
            num_signals,
            layout,
        })
    }

    fn input_shape(&self) -> (usize, usize, usize) {
        match self.layout {
            TensorLayout::ChannelMajor => (1, self.num_signals, self.window_size),
            TensorLayout::TimeMajor => (1, self.window_size, self.num_signals),
        }
    }
}

fn session_builder() -> Result<ort::session::builder::SessionBuilder, EngineError> {
    Session::builder()
        .map_err(|e| EngineError::Load(format!("failed to create session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| EngineError::Load(format!("failed to set optimization level: {e}")))
}

impl InferenceEngine for OnnxEngine {
    fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
        let expected = self.window_size * self.num_signals;
        if input.len() != expected {
            return Err(EngineError::InvalidInput(format!(
                "expected {expected} values, got {}",
                input.len()
            )));
        }

        let array = Array3::<f32>::from_shape_vec(self.input_shape(), input.to_vec())
            .map_err(|e| EngineError::InvalidInput(format!("tensor shape error: {e}")))?;

        let tensor = Value::from_array(array)
            .map_err(|e| EngineError::InvalidInput(format!("tensor error: {e}")))?;

        // Output names have to be collected before `run` borrows the session.
        let output_names: Vec<String> = self
            .session
            .outputs
            .iter()
            .map(|o| o.name.clone())
            .collect();

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| EngineError::Execution(format!("inference failed: {e}")))?;

        output_names
            .iter()
            .map(|name| {
                let value = outputs.get(name).ok_or_else(|| {
                    EngineError::Execution(format!("output {name} missing from results"))
                })?;
                let (_, data) = value
                    .try_extract_tensor::<f32>()
                    .map_err(|e| EngineError::Execution(format!("extract error: {e}")))?;
                Ok(data.to_vec())
            })
            .collect()
    }
}
