//! Core types for tensor handling, batching, and error reporting.
//!
//! This module contains the leaf building blocks the rest of the crate is
//! assembled from: the immutable [`TensorView`] wrapper over raw numeric
//! buffers, the [`InputPacker`] that concatenates per-sample tensors into a
//! batched input, the [`Modality`] tag identifying what a model predicts, and
//! the crate-wide [`PredictError`] type.

pub mod batch;
pub mod errors;
pub mod tensor;

pub use batch::InputPacker;
pub use errors::{PredictError, PredictResult};
pub use tensor::{DType, TensorView};

use serde::{Deserialize, Serialize};

/// The semantic task a model performs.
///
/// One predictor variant exists per modality; the modality selects the output
/// decoder at construction time, replacing the duck-typed common-base dispatch
/// of framework registries with a closed set of variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Raw pass-through: named output tensors are surfaced undecoded.
    General,
    /// Per-image class probabilities.
    ImageClassification,
    /// Per-detection bounding boxes, classes, and scores.
    ImageObjectDetection,
    /// Detection plus per-instance membership masks.
    ImageInstanceSegmentation,
    /// Per-pixel integer class labels.
    ImageSemanticSegmentation,
    /// Per-pixel RGB float output (e.g. super-resolution).
    ImageEnhancement,
}

impl Modality {
    /// Returns true if this modality consumes decoded image tensors.
    ///
    /// Every modality except [`Modality::General`] declares an "image" input
    /// in its manifest and is validated as such at load time.
    pub fn is_image(&self) -> bool {
        !matches!(self, Modality::General)
    }

    /// Returns true if decoding this modality requires a label table.
    pub fn requires_labels(&self) -> bool {
        matches!(
            self,
            Modality::ImageClassification
                | Modality::ImageObjectDetection
                | Modality::ImageInstanceSegmentation
        )
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Modality::General => "general",
            Modality::ImageClassification => "image_classification",
            Modality::ImageObjectDetection => "image_object_detection",
            Modality::ImageInstanceSegmentation => "image_instance_segmentation",
            Modality::ImageSemanticSegmentation => "image_semantic_segmentation",
            Modality::ImageEnhancement => "image_enhancement",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_label_requirements() {
        assert!(Modality::ImageClassification.requires_labels());
        assert!(Modality::ImageObjectDetection.requires_labels());
        assert!(Modality::ImageInstanceSegmentation.requires_labels());
        assert!(!Modality::ImageSemanticSegmentation.requires_labels());
        assert!(!Modality::ImageEnhancement.requires_labels());
        assert!(!Modality::General.requires_labels());
    }

    #[test]
    fn modality_serde_round_trip() {
        let json = serde_json::to_string(&Modality::ImageObjectDetection).unwrap();
        assert_eq!(json, "\"image_object_detection\"");
        let back: Modality = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Modality::ImageObjectDetection);
    }
}
