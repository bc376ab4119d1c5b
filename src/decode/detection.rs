//! Object detection decoding.
//!
//! Consumes a boxes tensor (4 floats per detection, xmin, ymin, xmax, ymax)
//! plus either a single combined class/score tensor or separate probabilities
//! and classes tensors, and zips them into bounding-box features. Detection
//! count is inferred from the boxes buffer (`len / 4`).
//!
//! Two model-family conventions are supported:
//!
//! - **Combined layout** (e.g. MobileNet-SSD): the probabilities and classes
//!   roles resolve to the same output, laid out as `numLabels` contiguous
//!   scores per detection. The decoder selects each detection's maximum score
//!   and its class index in one linear scan.
//! - **Separate layout** (e.g. OnnxVision SSD): per-detection probabilities
//!   and class indices arrive as distinct tensors; int64 classes convert to
//!   float32 element-wise.

use crate::config::{Labels, ModelIOSpec, OutputRole};
use crate::core::{PredictError, PredictResult};
use crate::features::PredictionResult;
use crate::inference::EngineOutputs;

use super::{assemble, classes_as_f32, role_tensor};

/// Decodes detection outputs into a single-batch bounding-box feature list.
pub fn decode(
    outputs: &EngineOutputs,
    io: &ModelIOSpec,
    labels: &Labels,
) -> PredictResult<PredictionResult> {
    let boxes_index = io.output_index(OutputRole::Boxes)?;
    let probabilities_index = io.output_index(OutputRole::Probabilities)?;
    let classes_index = io.output_index(OutputRole::Classes)?;

    let boxes = role_tensor(outputs, io, OutputRole::Boxes)?.expect_f32("detection boxes")?;
    let num_detections = boxes.len() / 4;
    let raw_probabilities = role_tensor(outputs, io, OutputRole::Probabilities)?;

    let (probabilities, classes) = if probabilities_index == classes_index {
        let scores = raw_probabilities.expect_f32("combined detection scores")?;
        combined_argmax(scores, num_detections, labels.len())?
    } else {
        let probabilities = raw_probabilities
            .expect_f32("detection probabilities")?
            .to_vec();
        if probabilities.len() != num_detections {
            return Err(PredictError::decode_count_mismatch(
                io.output_name(probabilities_index)?,
                num_detections,
                probabilities.len(),
            ));
        }
        let classes = classes_as_f32(role_tensor(outputs, io, OutputRole::Classes)?);
        if classes.len() != num_detections {
            return Err(PredictError::decode_count_mismatch(
                io.output_name(classes_index)?,
                num_detections,
                classes.len(),
            ));
        }
        (probabilities, classes)
    };

    tracing::debug!(
        num_detections,
        combined = probabilities_index == classes_index,
        boxes_output = io.output_name(boxes_index)?,
        "decoding detections"
    );

    let features = assemble::bounding_box_features(&probabilities, &classes, boxes, labels)?;
    Ok(vec![features])
}

/// Selects (max score, class index) per detection from a combined
/// score-per-class-per-detection buffer.
///
/// The scan uses strict `>`, so the first maximal index wins ties: the
/// selected class is always the smallest index achieving the maximum.
fn combined_argmax(
    scores: &[f32],
    num_detections: usize,
    num_labels: usize,
) -> PredictResult<(Vec<f32>, Vec<f32>)> {
    if num_labels == 0 {
        return Err(PredictError::decode(
            "combined layout requires a non-empty label table",
        ));
    }
    if scores.len() != num_detections * num_labels {
        return Err(PredictError::decode(format!(
            "combined score tensor has {} elements, expected {} detections x {} labels",
            scores.len(),
            num_detections,
            num_labels
        )));
    }

    let mut probabilities = Vec::with_capacity(num_detections);
    let mut classes = Vec::with_capacity(num_detections);
    for detection in 0..num_detections {
        let row = &scores[detection * num_labels..(detection + 1) * num_labels];
        let mut max_score = row[0];
        let mut max_index = 0usize;
        for (i, &score) in row.iter().enumerate().skip(1) {
            if score > max_score {
                max_score = score;
                max_index = i;
            }
        }
        probabilities.push(max_score);
        classes.push(max_index as f32);
    }
    Ok((probabilities, classes))
}
