//! Feature assembly.
//!
//! Zips decoded per-instance arrays (scores, class indices, box geometry,
//! masks) into ordered feature sequences, resolving class indices against the
//! label table. Instance order is the zip order, so detector emission order
//! is preserved exactly.

use itertools::izip;

use crate::config::Labels;
use crate::core::{PredictError, PredictResult};
use crate::features::Feature;

/// Builds classification features for one batch row, ranked by probability
/// descending.
///
/// Scores are raw and unnormalized; a stable sort keeps equal scores in
/// class-index order.
pub fn classification_features(scores: &[f32], labels: &Labels) -> PredictResult<Vec<Feature>> {
    if scores.len() > labels.len() {
        return Err(PredictError::decode(format!(
            "{} class scores but only {} labels",
            scores.len(),
            labels.len()
        )));
    }

    let mut features: Vec<Feature> = scores
        .iter()
        .enumerate()
        .map(|(index, &probability)| Feature::Classification {
            index: index as i32,
            label: labels.get(index).unwrap_or_default().to_string(),
            probability,
        })
        .collect();
    features.sort_by(|a, b| {
        b.probability()
            .partial_cmp(&a.probability())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(features)
}

/// Zips boxes, probabilities, and classes into bounding-box features by
/// detection index.
///
/// `boxes` holds 4 floats per detection in xmin, ymin, xmax, ymax order.
pub fn bounding_box_features(
    probabilities: &[f32],
    classes: &[f32],
    boxes: &[f32],
    labels: &Labels,
) -> PredictResult<Vec<Feature>> {
    izip!(probabilities, classes, boxes.chunks_exact(4))
        .map(|(&probability, &class, coords)| {
            let index = class as i32;
            let label = labels.get_checked(index as usize)?.to_string();
            Ok(Feature::BoundingBox {
                xmin: coords[0],
                ymin: coords[1],
                xmax: coords[2],
                ymax: coords[3],
                index,
                label,
                probability,
            })
        })
        .collect()
}

/// Zips boxes, probabilities, classes, and unflattened masks into instance
/// segment features by detection index.
pub fn instance_segment_features(
    probabilities: &[f32],
    classes: &[f32],
    boxes: &[f32],
    masks: Vec<Vec<Vec<f32>>>,
    labels: &Labels,
) -> PredictResult<Vec<Feature>> {
    izip!(probabilities, classes, boxes.chunks_exact(4), masks)
        .map(|(&probability, &class, coords, mask)| {
            let index = class as i32;
            let label = labels.get_checked(index as usize)?.to_string();
            let mask_height = mask.len();
            let mask_width = mask.first().map(|row| row.len()).unwrap_or(0);
            Ok(Feature::InstanceSegment {
                xmin: coords[0],
                ymin: coords[1],
                xmax: coords[2],
                ymax: coords[3],
                index,
                label,
                probability,
                mask,
                mask_height,
                mask_width,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        Labels::from_lines(
            ["bg", "cat", "dog", "bird", "fish", "cow"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    #[test]
    fn classification_features_rank_by_score_descending() {
        let features = classification_features(&[0.1, 0.7, 0.2], &labels()).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].label(), Some("cat"));
        assert_eq!(features[0].probability(), Some(0.7));
        assert_eq!(features[1].label(), Some("dog"));
        assert_eq!(features[2].label(), Some("bg"));
    }

    #[test]
    fn classification_equal_scores_keep_index_order() {
        let features = classification_features(&[0.5, 0.5, 0.1], &labels()).unwrap();
        assert_eq!(features[0].label(), Some("bg"));
        assert_eq!(features[1].label(), Some("cat"));
    }

    #[test]
    fn classification_rejects_more_scores_than_labels() {
        let scores = vec![0.0; 7];
        assert!(classification_features(&scores, &labels()).is_err());
    }

    #[test]
    fn bounding_boxes_zip_by_detection_index() {
        let boxes = [0.0, 0.0, 1.0, 1.0, 0.2, 0.2, 0.8, 0.8];
        let features =
            bounding_box_features(&[0.9, 0.95], &[2.0, 5.0], &boxes, &labels()).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(
            features[0],
            Feature::BoundingBox {
                xmin: 0.0,
                ymin: 0.0,
                xmax: 1.0,
                ymax: 1.0,
                index: 2,
                label: "dog".into(),
                probability: 0.9,
            }
        );
        assert_eq!(
            features[1],
            Feature::BoundingBox {
                xmin: 0.2,
                ymin: 0.2,
                xmax: 0.8,
                ymax: 0.8,
                index: 5,
                label: "cow".into(),
                probability: 0.95,
            }
        );
    }

    #[test]
    fn bounding_boxes_reject_out_of_range_class() {
        let err = bounding_box_features(&[0.9], &[9.0], &[0.0, 0.0, 1.0, 1.0], &labels())
            .unwrap_err();
        assert!(err.to_string().contains("class index 9"));
    }

    #[test]
    fn instance_segments_carry_mask_dimensions() {
        let masks = vec![vec![vec![0.5, 0.6], vec![0.7, 0.8]]];
        let features = instance_segment_features(
            &[0.9],
            &[1.0],
            &[0.1, 0.2, 0.3, 0.4],
            masks,
            &labels(),
        )
        .unwrap();
        match &features[0] {
            Feature::InstanceSegment {
                label,
                mask,
                mask_height,
                mask_width,
                ..
            } => {
                assert_eq!(label, "cat");
                assert_eq!((*mask_height, *mask_width), (2, 2));
                assert_eq!(mask[1][0], 0.7);
            }
            other => panic!("unexpected feature: {other:?}"),
        }
    }
}
