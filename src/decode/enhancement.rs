//! Image enhancement decoding.
//!
//! Enhancement models (super-resolution, denoising) emit a dense float image
//! per batch element. Channel-first output is re-laid-out to interleaved HWC;
//! channel-last output passes through unchanged.

use crate::config::ModelIOSpec;
use crate::core::tensor::chw_to_hwc;
use crate::core::{PredictError, PredictResult};
use crate::features::{Feature, PredictionResult};
use crate::inference::EngineOutputs;

use super::named_tensor;

/// Decodes an enhancement output into one raw float image per batch element.
///
/// Enhancement models declare exactly one output; no role tagging applies.
pub fn decode(outputs: &EngineOutputs, io: &ModelIOSpec) -> PredictResult<PredictionResult> {
    if io.outputs.len() != 1 {
        return Err(PredictError::decode(format!(
            "enhancement models declare exactly one output, found {}",
            io.outputs.len()
        )));
    }
    let name = io.output_name(0)?;
    let tensor = named_tensor(outputs, name)?;
    let data = tensor.expect_f32("enhancement output")?;

    // Channel placement disambiguates NCHW from NHWC; enhancement output is
    // always 3-channel RGB.
    let (batch, height, width, channel_first) = match tensor.shape() {
        [batch, 3, height, width] => (*batch, *height, *width, true),
        [batch, height, width, 3] => (*batch, *height, *width, false),
        [height, width, 3] => (1, *height, *width, false),
        shape => {
            return Err(PredictError::decode(format!(
                "enhancement output '{}' has unsupported shape {:?}",
                name, shape
            )));
        }
    };

    tracing::debug!(output = name, batch, height, width, "decoding enhancement output");

    let image_len = 3 * height * width;
    (0..batch)
        .map(|b| {
            let image = &data[b * image_len..(b + 1) * image_len];
            let float_list = if channel_first {
                chw_to_hwc(image, 3, height, width)
            } else {
                image.to_vec()
            };
            Ok(vec![Feature::RawImage {
                float_list,
                width,
                height,
            }])
        })
        .collect()
}
