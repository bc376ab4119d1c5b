//! ONNX Runtime engine implementation.
//!
//! Wraps an `ort` session behind the [`InferenceEngine`] trait: loads a graph
//! from a local file, feeds a single batched float32 input, and extracts every
//! declared output as float32 or int64 into [`TensorView`]s keyed by name.

use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};

use super::{EngineOutputs, InferenceEngine};
use crate::core::{PredictError, PredictResult, TensorView};

/// An [`InferenceEngine`] backed by an ONNX Runtime session.
///
/// The session is an exclusively-owned handle; [`InferenceEngine::close`]
/// releases it exactly once and later runs fail with an engine error.
pub struct OrtEngine {
    session: Option<Session>,
    input_name: String,
    output_names: Vec<String>,
    model_path: PathBuf,
}

impl std::fmt::Debug for OrtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEngine")
            .field("model_path", &self.model_path)
            .field("input_name", &self.input_name)
            .field("output_names", &self.output_names)
            .field("closed", &self.session.is_none())
            .finish()
    }
}

impl OrtEngine {
    /// Loads a model graph from a local file.
    ///
    /// The input name defaults to the session's first declared input when not
    /// given. Output names are discovered from the session.
    pub fn load(model_path: impl AsRef<Path>, input_name: Option<&str>) -> PredictResult<Self> {
        let path = model_path.as_ref();
        let session = Session::builder()?
            .with_log_level(LogLevel::Error)?
            .commit_from_file(path)
            .map_err(|e| {
                PredictError::load_with_source(
                    format!("failed to create ONNX session for {}", path.display()),
                    e,
                )
            })?;

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => session
                .inputs
                .first()
                .map(|i| i.name.clone())
                .ok_or_else(|| {
                    PredictError::load(format!("model {} declares no inputs", path.display()))
                })?,
        };
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(PredictError::load(format!(
                "model {} declares no outputs",
                path.display()
            )));
        }

        tracing::debug!(
            model = %path.display(),
            input = %input_name,
            outputs = ?output_names,
            "ONNX session created"
        );

        Ok(Self {
            session: Some(session),
            input_name,
            output_names,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the model path this engine was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceEngine for OrtEngine {
    fn run(&mut self, inputs: &[TensorView]) -> PredictResult<EngineOutputs> {
        let session = self.session.as_mut().ok_or_else(|| {
            PredictError::engine(
                "run",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "session already closed"),
            )
        })?;
        let [input] = inputs else {
            return Err(PredictError::invalid_input(format!(
                "expected exactly one input tensor, got {}",
                inputs.len()
            )));
        };

        let view = input.as_array_view()?;
        let input_tensor = TensorRef::from_array_view(view)
            .map_err(|e| PredictError::engine("tensor conversion", e))?;
        let session_outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| PredictError::engine("forward pass", e))?;

        let mut outputs = EngineOutputs::new();
        for name in &self.output_names {
            let value = &session_outputs[name.as_str()];
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                TensorView::from_f32(data.to_vec(), dims_from_i64(shape.iter().copied())?)?
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                TensorView::from_i64(data.to_vec(), dims_from_i64(shape.iter().copied())?)?
            } else {
                return Err(PredictError::decode(format!(
                    "output '{}' is neither float32 nor int64",
                    name
                )));
            };
            outputs.insert(name.clone(), tensor);
        }

        Ok(outputs)
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!(model = %self.model_path.display(), "ONNX session released");
        }
    }
}

fn dims_from_i64(shape: impl IntoIterator<Item = i64>) -> PredictResult<Vec<usize>> {
    shape
        .into_iter()
        .map(|d| {
            usize::try_from(d).map_err(|_| {
                PredictError::decode(format!("output shape has non-concrete dimension {}", d))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_conversion_rejects_dynamic_dimensions() {
        assert_eq!(dims_from_i64([2, 3, 4]).unwrap(), vec![2, 3, 4]);
        assert!(dims_from_i64([2, -1]).is_err());
    }
}
