//! Image classification decoding.
//!
//! Consumes one probabilities tensor of shape `[n, numClasses]` and wraps
//! each batch row with the label table into a ranked classification feature
//! sequence. Scores are passed through raw; no softmax is applied or assumed.

use crate::config::{Labels, ModelIOSpec, OutputRole};
use crate::core::{PredictError, PredictResult};
use crate::features::PredictionResult;
use crate::inference::EngineOutputs;

use super::{assemble, named_tensor};

/// Decodes classification outputs into per-batch-row feature sequences.
///
/// The probabilities output is resolved by role; when the role is untagged
/// the first declared output is used. This index-0 fallback is the one
/// sanctioned default in the crate.
pub fn decode(
    outputs: &EngineOutputs,
    io: &ModelIOSpec,
    labels: &Labels,
) -> PredictResult<PredictionResult> {
    let index = io.output_index(OutputRole::Probabilities).unwrap_or(0);
    let name = io.output_name(index)?;
    let tensor = named_tensor(outputs, name)?;
    let scores = tensor.expect_f32("classification probabilities")?;

    let (batch, num_classes) = match tensor.shape() {
        [batch, num_classes] => (*batch, *num_classes),
        [num_classes] => (1, *num_classes),
        shape => {
            return Err(PredictError::decode(format!(
                "probabilities output '{}' has unsupported shape {:?}",
                name, shape
            )));
        }
    };

    tracing::debug!(output = name, batch, num_classes, "decoding classification");

    scores
        .chunks_exact(num_classes)
        .take(batch)
        .map(|row| assemble::classification_features(row, labels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelInput, ModelOutput};
    use crate::core::TensorView;

    fn labels() -> Labels {
        Labels::from_lines(vec!["bg".into(), "cat".into(), "dog".into()])
    }

    fn io_spec(roles: Vec<OutputRole>) -> ModelIOSpec {
        ModelIOSpec {
            inputs: vec![ModelInput {
                input_type: "image".into(),
            }],
            outputs: vec![ModelOutput::new("probs", roles)],
        }
    }

    fn outputs_with(scores: Vec<f32>, shape: Vec<usize>) -> EngineOutputs {
        let mut outputs = EngineOutputs::new();
        outputs.insert(
            "probs".into(),
            TensorView::from_f32(scores, shape).unwrap(),
        );
        outputs
    }

    #[test]
    fn decodes_each_batch_row_independently() {
        let outputs = outputs_with(vec![0.1, 0.7, 0.2, 0.6, 0.3, 0.1], vec![2, 3]);
        let result = decode(
            &outputs,
            &io_spec(vec![OutputRole::Probabilities]),
            &labels(),
        )
        .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0][0].label(), Some("cat"));
        assert_eq!(result[0][0].probability(), Some(0.7));
        assert_eq!(result[1][0].label(), Some("bg"));
    }

    #[test]
    fn untagged_probabilities_fall_back_to_first_output() {
        let outputs = outputs_with(vec![0.2, 0.5, 0.3], vec![1, 3]);
        let result = decode(&outputs, &io_spec(vec![]), &labels()).unwrap();
        assert_eq!(result[0][0].label(), Some("cat"));
    }

    #[test]
    fn rank_one_tensor_is_treated_as_a_single_row() {
        let outputs = outputs_with(vec![0.2, 0.5, 0.3], vec![3]);
        let result = decode(&outputs, &io_spec(vec![]), &labels()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 3);
    }

    #[test]
    fn missing_engine_output_is_a_decode_error() {
        let result = decode(
            &EngineOutputs::new(),
            &io_spec(vec![OutputRole::Probabilities]),
            &labels(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn scores_pass_through_without_normalization() {
        // Raw logits, clearly not a probability distribution.
        let outputs = outputs_with(vec![-4.0, 11.5, 3.0], vec![1, 3]);
        let result = decode(&outputs, &io_spec(vec![]), &labels()).unwrap();
        assert_eq!(result[0][0].probability(), Some(11.5));
        assert_eq!(result[0][2].probability(), Some(-4.0));
    }
}
