//! Preprocessing contracts.
//!
//! A [`PreprocessSpec`] tells callers how to prepare sample tensors before
//! prediction: spatial size, channel count, channel ordering, and the
//! per-channel mean/scale to normalize with. The crate itself never decodes
//! or resizes images; it only publishes the contract the model metadata
//! declares.

use serde::{Deserialize, Serialize};

use crate::core::{PredictError, PredictResult};

/// Color channel order the model expects.
///
/// Most image libraries produce RGB; OpenCV-lineage models typically expect
/// BGR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorOrder {
    /// Red, green, blue.
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    /// Blue, green, red.
    #[serde(rename = "BGR")]
    Bgr,
}

/// Declared input layout for an image model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessSpec {
    /// Channel count; fixed at 3 for the image modalities.
    pub channels: usize,
    /// Expected input height in pixels.
    pub height: usize,
    /// Expected input width in pixels.
    pub width: usize,
    /// Channel ordering of the normalized buffer.
    pub color_order: ColorOrder,
    /// Per-channel mean subtracted during normalization.
    pub mean: [f32; 3],
    /// Per-channel scale divided during normalization.
    pub scale: [f32; 3],
}

impl PreprocessSpec {
    /// Validates the spec's internal consistency.
    ///
    /// The mean/scale arrays are fixed at 3 entries, so the channel count
    /// must be 3 and the spatial dimensions non-zero.
    pub fn validate(&self) -> PredictResult<()> {
        if self.channels != self.mean.len() {
            return Err(PredictError::load(format!(
                "preprocess channels {} does not match mean/scale length {}",
                self.channels,
                self.mean.len()
            )));
        }
        if self.height == 0 || self.width == 0 {
            return Err(PredictError::load(format!(
                "preprocess spatial size {}x{} is empty",
                self.height, self.width
            )));
        }
        Ok(())
    }

    /// Returns the per-sample tensor shape `[C, H, W]` this spec implies.
    pub fn sample_shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }
}
