//! Instance segmentation decoding.
//!
//! Consumes boxes `[numBoxes, 4]`, probabilities `[numBoxes]`, classes
//! `[numBoxes]` (int64 or float32), and a masks tensor
//! `[numBoxes, 1, maskH, maskW]`, and assembles instance-segment features.
//! The flat mask buffer is unflattened row-major:
//! `mask[b][h][w] = raw[b*maskH*maskW + h*maskW + w]`.
//!
//! The result carries a single-element outer batch: the supported model
//! family (Mask R-CNN style) only accepts unbatched input, a model-family
//! limitation rather than an engine constraint.

use crate::config::{Labels, ModelIOSpec, OutputRole};
use crate::core::{PredictError, PredictResult};
use crate::features::PredictionResult;
use crate::inference::EngineOutputs;

use super::{assemble, classes_as_f32, role_tensor};

/// Decodes instance segmentation outputs into a single-batch feature list.
pub fn decode(
    outputs: &EngineOutputs,
    io: &ModelIOSpec,
    labels: &Labels,
) -> PredictResult<PredictionResult> {
    let boxes_tensor = role_tensor(outputs, io, OutputRole::Boxes)?;
    let boxes = boxes_tensor.expect_f32("instance boxes")?;
    let num_boxes = match boxes_tensor.shape() {
        [num_boxes, 4] => *num_boxes,
        _ => boxes.len() / 4,
    };

    let probabilities = role_tensor(outputs, io, OutputRole::Probabilities)?
        .expect_f32("instance probabilities")?;
    if probabilities.len() != num_boxes {
        return Err(PredictError::decode_count_mismatch(
            io.output_name_for(OutputRole::Probabilities)?,
            num_boxes,
            probabilities.len(),
        ));
    }

    let classes = classes_as_f32(role_tensor(outputs, io, OutputRole::Classes)?);
    if classes.len() != num_boxes {
        return Err(PredictError::decode_count_mismatch(
            io.output_name_for(OutputRole::Classes)?,
            num_boxes,
            classes.len(),
        ));
    }

    let masks_tensor = role_tensor(outputs, io, OutputRole::Masks)?;
    let (mask_height, mask_width) = match masks_tensor.shape() {
        [boxes_dim, 1, height, width] if *boxes_dim == num_boxes => (*height, *width),
        shape => {
            return Err(PredictError::decode(format!(
                "masks output '{}' has shape {:?}, expected [{}, 1, H, W]",
                io.output_name_for(OutputRole::Masks)?,
                shape,
                num_boxes
            )));
        }
    };
    let raw_masks = masks_tensor.expect_f32("instance masks")?;
    let masks = unflatten_masks(raw_masks, num_boxes, mask_height, mask_width);

    tracing::debug!(num_boxes, mask_height, mask_width, "decoding instance segments");

    let features =
        assemble::instance_segment_features(probabilities, &classes, boxes, masks, labels)?;
    Ok(vec![features])
}

/// Unflattens a raw mask buffer into `[box][row][col]` nested grids.
fn unflatten_masks(
    raw: &[f32],
    num_boxes: usize,
    height: usize,
    width: usize,
) -> Vec<Vec<Vec<f32>>> {
    let plane = height * width;
    (0..num_boxes)
        .map(|b| {
            (0..height)
                .map(|h| raw[b * plane + h * width..b * plane + (h + 1) * width].to_vec())
                .collect()
        })
        .collect()
}
