//! Inference engine capability.
//!
//! The scheduler only depends on the [`InferenceEngine`] trait; the shipped
//! ONNX Runtime binding lives in [`onnx`] behind the `onnx` feature. Keeping
//! the boundary here means scheduler tests never touch a real runtime.

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxEngine;

/// Errors surfaced by an inference engine.
#[derive(Debug)]
pub enum EngineError {
    /// The model could not be loaded or the session could not be built.
    Load(String),
    /// The input buffer could not be marshaled into the expected shape.
    InvalidInput(String),
    /// The engine failed while executing the model.
    Execution(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Load(e) => write!(f, "model load error: {e}"),
            EngineError::InvalidInput(e) => write!(f, "invalid input: {e}"),
            EngineError::Execution(e) => write!(f, "execution error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Opaque capability consuming one flattened input buffer and returning the
/// model's output buffers untouched.
///
/// The scheduler supplies exactly `window_size * num_signals` values in the
/// configured [`TensorLayout`](crate::core::resample::TensorLayout) order.
pub trait InferenceEngine {
    fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for &mut E {
    fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
        (**self).infer(input)
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn infer(&mut self, input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
        (**self).infer(input)
    }
}

// Lets builds without any backend still name a scheduler type.
impl InferenceEngine for std::convert::Infallible {
    fn infer(&mut self, _input: &[f32]) -> Result<Vec<Vec<f32>>, EngineError> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Execution("shape mismatch".to_string());
        assert_eq!(err.to_string(), "execution error: shape mismatch");

        let err = EngineError::Load("missing file".to_string());
        assert!(err.to_string().contains("model load error"));
    }
}
