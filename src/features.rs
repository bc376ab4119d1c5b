//! Typed prediction records.
//!
//! A [`Feature`] is one decoded prediction; a [`PredictionResult`] is the
//! nested sequence the decoders assemble: outer index is batch position,
//! inner index is per-image prediction rank (probability-descending for
//! classification, detector emission order for boxes and instances).

use serde::{Deserialize, Serialize};

/// One decoded prediction, tagged by modality.
///
/// A feature is owned exclusively by the prediction result that produced it;
/// results are replaced wholesale on the next predict call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    /// A classified label with its raw, unnormalized score.
    Classification {
        /// Class index into the label table.
        index: i32,
        /// Label text at that index.
        label: String,
        /// Raw score; no softmax is guaranteed.
        probability: f32,
    },
    /// A detected object with box geometry.
    ///
    /// Coordinates are normalized 0..1 or pixel-valued per the model family's
    /// convention; the decoder passes them through unchanged.
    BoundingBox {
        /// Left edge.
        xmin: f32,
        /// Right edge.
        xmax: f32,
        /// Top edge.
        ymin: f32,
        /// Bottom edge.
        ymax: f32,
        /// Class index into the label table.
        index: i32,
        /// Label text at that index.
        label: String,
        /// Detection confidence.
        probability: f32,
    },
    /// A detected instance with box geometry and a membership mask.
    InstanceSegment {
        /// Left edge.
        xmin: f32,
        /// Right edge.
        xmax: f32,
        /// Top edge.
        ymin: f32,
        /// Bottom edge.
        ymax: f32,
        /// Class index into the label table.
        index: i32,
        /// Label text at that index.
        label: String,
        /// Detection confidence.
        probability: f32,
        /// Per-pixel membership scores, indexed `[row][col]`.
        mask: Vec<Vec<f32>>,
        /// Mask height in pixels.
        mask_height: usize,
        /// Mask width in pixels.
        mask_width: usize,
    },
    /// A dense per-pixel class-label map.
    SemanticSegment {
        /// Flat class labels, one int32 per pixel, row-major.
        int_mask: Vec<i32>,
        /// Map width in pixels.
        width: usize,
        /// Map height in pixels.
        height: usize,
    },
    /// A dense float image, interleaved RGB.
    ///
    /// Channel values are raw floats; clipping and casting to 8-bit color is
    /// the consumer's responsibility.
    RawImage {
        /// Interleaved RGB float values, row-major.
        float_list: Vec<f32>,
        /// Image width in pixels.
        width: usize,
        /// Image height in pixels.
        height: usize,
    },
}

impl Feature {
    /// Returns the confidence score for variants that carry one.
    pub fn probability(&self) -> Option<f32> {
        match self {
            Feature::Classification { probability, .. }
            | Feature::BoundingBox { probability, .. }
            | Feature::InstanceSegment { probability, .. } => Some(*probability),
            Feature::SemanticSegment { .. } | Feature::RawImage { .. } => None,
        }
    }

    /// Returns the label for variants that carry one.
    pub fn label(&self) -> Option<&str> {
        match self {
            Feature::Classification { label, .. }
            | Feature::BoundingBox { label, .. }
            | Feature::InstanceSegment { label, .. } => Some(label),
            Feature::SemanticSegment { .. } | Feature::RawImage { .. } => None,
        }
    }
}

/// Ordered predictions: one feature sequence per batch element.
pub type PredictionResult = Vec<Vec<Feature>>;
