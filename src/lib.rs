//! # ort-predict
//!
//! A Rust library that turns raw ONNX Runtime inference outputs into
//! structured, modality-specific prediction records: classification labels,
//! bounding boxes, instance masks, semantic-segmentation maps, and enhanced
//! images.
//!
//! ## Features
//!
//! - Predictor lifecycle management (load, predict, read, reset, close)
//! - Per-modality output decoders for classification, object detection,
//!   instance segmentation, semantic segmentation, and image enhancement
//! - Input batching with strict shape and dtype validation
//! - Handles NCHW vs NHWC layouts and float32 vs int64 class encodings
//! - Explicit predictor registry for host-server integration
//! - ONNX Runtime integration behind a narrow engine trait
//!
//! ## Modules
//!
//! * [`core`] - Tensor views, input batching, and error handling
//! * [`config`] - Model manifests, I/O specs, preprocessing specs, labels
//! * [`inference`] - The inference-engine boundary and its ORT implementation
//! * [`decode`] - Modality-specific output decoders and feature assembly
//! * [`features`] - Typed prediction records
//! * [`predictor`] - The predictor state machine
//! * [`registry`] - Name-to-constructor predictor registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ort_predict::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest: ModelManifest = serde_json::from_str(r#"
//! {
//!   "name": "MLPerf_SSD_ResNet34",
//!   "version": "1.0",
//!   "modality": "image_object_detection",
//!   "graph_path": "models/ssd_resnet34.onnx",
//!   "labels_path": "models/coco_labels.txt",
//!   "io": {
//!     "inputs": [{ "input_type": "image" }],
//!     "outputs": [
//!       { "name": "bboxes", "roles": ["boxes_layer"] },
//!       { "name": "scores", "roles": ["probabilities_layer"] },
//!       { "name": "labels", "roles": ["classes_layer"] }
//!     ]
//!   },
//!   "preprocess": {
//!     "channels": 3, "height": 1200, "width": 1200,
//!     "color_order": "RGB",
//!     "mean": [123.675, 116.28, 103.53],
//!     "scale": [58.395, 57.12, 57.375]
//!   }
//! }
//! "#)?;
//!
//! let mut predictor = Predictor::load_onnx(manifest)?;
//! let sample = TensorView::from_f32(vec![0.0; 3 * 1200 * 1200], vec![3, 1200, 1200])?;
//! predictor.predict(PredictInput::Samples(vec![sample]))?;
//! let result = predictor.read_predicted_features()?;
//! for feature in &result[0] {
//!     println!("{:?}", feature);
//! }
//! predictor.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod decode;
pub mod features;
pub mod inference;
pub mod predictor;
pub mod registry;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use ort_predict::prelude::*;
/// ```
///
/// Included items cover the common lifecycle: manifests, predictors, inputs,
/// tensors, features, and the error/result types. For the engine boundary and
/// decoder internals, import from the respective modules directly.
pub mod prelude {
    pub use crate::config::{Labels, ModelIOSpec, ModelManifest, OutputRole, PreprocessSpec};
    pub use crate::core::{InputPacker, Modality, PredictError, PredictResult, TensorView};
    pub use crate::features::{Feature, PredictionResult};
    pub use crate::predictor::{PredictInput, Predictor, RawOutputs};
    pub use crate::registry::PredictorRegistry;
}
