//! Modality-specific output decoders.
//!
//! Each submodule interprets the engine's named output tensors for one
//! modality and assembles them into a [`PredictionResult`]. Decoding is a
//! pure function of the retained outputs: re-running a decoder over the same
//! outputs yields the same result.
//!
//! Output roles are resolved against the model's I/O spec by name; a missing
//! role or a tensor whose element count contradicts its peers is a decode
//! error, never a silent default.

pub mod assemble;
pub mod classification;
pub mod detection;
pub mod enhancement;
pub mod instance_segmentation;
pub mod semantic_segmentation;

use crate::config::{ModelIOSpec, OutputRole};
use crate::core::{PredictError, PredictResult, TensorView};
use crate::inference::EngineOutputs;

/// Resolves an output role to its tensor in the engine's result set.
fn role_tensor<'a>(
    outputs: &'a EngineOutputs,
    io: &ModelIOSpec,
    role: OutputRole,
) -> PredictResult<&'a TensorView> {
    let name = io.output_name_for(role)?;
    named_tensor(outputs, name)
}

/// Looks up an output tensor by declared name.
fn named_tensor<'a>(outputs: &'a EngineOutputs, name: &str) -> PredictResult<&'a TensorView> {
    outputs.get(name).ok_or_else(|| {
        PredictError::decode(format!("engine returned no output named '{}'", name))
    })
}

/// Converts a classes tensor to float32 values.
///
/// int64 class indices convert element-wise; the f32 target is lossless up to
/// 2^24, a known narrowing boundary inherited from the wire format. float32
/// tensors pass through unchanged.
fn classes_as_f32(tensor: &TensorView) -> Vec<f32> {
    match tensor.as_f32() {
        Some(data) => data.to_vec(),
        None => tensor
            .as_i64()
            .map(|data| data.iter().map(|&c| c as f32).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelInput, ModelOutput};

    fn io_spec() -> ModelIOSpec {
        ModelIOSpec {
            inputs: vec![ModelInput {
                input_type: "image".into(),
            }],
            outputs: vec![ModelOutput::new("scores", [OutputRole::Probabilities])],
        }
    }

    #[test]
    fn role_tensor_reports_missing_engine_output() {
        let outputs = EngineOutputs::new();
        let err = role_tensor(&outputs, &io_spec(), OutputRole::Probabilities).unwrap_err();
        assert!(err.to_string().contains("'scores'"));
    }

    #[test]
    fn role_tensor_reports_untagged_role() {
        let outputs = EngineOutputs::new();
        let err = role_tensor(&outputs, &io_spec(), OutputRole::Boxes).unwrap_err();
        assert!(err.to_string().contains("boxes_layer"));
    }

    #[test]
    fn classes_conversion_is_exact_for_small_indices() {
        let ints = TensorView::from_i64(vec![0, 2, 91, 16_777_216], vec![4]).unwrap();
        assert_eq!(classes_as_f32(&ints), vec![0.0, 2.0, 91.0, 16_777_216.0]);

        let floats = TensorView::from_f32(vec![1.0, 5.0], vec![2]).unwrap();
        assert_eq!(classes_as_f32(&floats), vec![1.0, 5.0]);
    }
}
