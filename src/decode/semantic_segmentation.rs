//! Semantic segmentation decoding.
//!
//! A single integer-mask output is reinterpreted as flat int32 pixel labels
//! with a declared width and height. There is no per-instance structure; each
//! batch element yields exactly one semantic-segment feature.

use crate::config::{ModelIOSpec, OutputRole};
use crate::core::{PredictError, PredictResult, TensorView};
use crate::features::{Feature, PredictionResult};
use crate::inference::EngineOutputs;

use super::named_tensor;

/// Decodes a semantic segmentation output into per-batch pixel-label maps.
///
/// The mask output is resolved via the masks role when tagged; a model
/// declaring a single untagged output uses that one.
pub fn decode(outputs: &EngineOutputs, io: &ModelIOSpec) -> PredictResult<PredictionResult> {
    let name = match io.output_index(OutputRole::Masks) {
        Ok(index) => io.output_name(index)?,
        Err(_) if io.outputs.len() == 1 => io.output_name(0)?,
        Err(e) => return Err(e),
    };
    let tensor = named_tensor(outputs, name)?;

    let (batch, height, width) = match tensor.shape() {
        [batch, height, width] => (*batch, *height, *width),
        [height, width] => (1, *height, *width),
        shape => {
            return Err(PredictError::decode(format!(
                "segmentation output '{}' has unsupported shape {:?}",
                name, shape
            )));
        }
    };

    tracing::debug!(output = name, batch, height, width, "decoding semantic segmentation");

    let plane = height * width;
    let labels = int_mask(tensor);
    (0..batch)
        .map(|b| {
            let int_mask = labels[b * plane..(b + 1) * plane].to_vec();
            Ok(vec![Feature::SemanticSegment {
                int_mask,
                width,
                height,
            }])
        })
        .collect()
}

/// Reinterprets the mask tensor's elements as int32 pixel labels.
fn int_mask(tensor: &TensorView) -> Vec<i32> {
    match tensor.as_i64() {
        Some(data) => data.iter().map(|&v| v as i32).collect(),
        None => tensor
            .as_f32()
            .map(|data| data.iter().map(|&v| v as i32).collect())
            .unwrap_or_default(),
    }
}
