//! Model manifests and I/O specifications.
//!
//! A [`ModelManifest`] is parsed once from JSON at predictor construction and
//! is immutable thereafter. It declares the model's single input, its named
//! outputs with their semantic roles, the preprocessing contract callers must
//! honor, and the locations of the graph and label resources (materialized on
//! local storage by the artifact fetch service before load begins).

pub mod labels;
pub mod preprocess;

pub use labels::Labels;
pub use preprocess::{ColorOrder, PreprocessSpec};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::{Modality, PredictError, PredictResult};

/// Semantic role played by a declared model output during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputRole {
    /// Per-class or per-detection confidence scores.
    #[serde(rename = "probabilities_layer")]
    Probabilities,
    /// Detection box coordinates, 4 floats per detection.
    #[serde(rename = "boxes_layer")]
    Boxes,
    /// Detection class indices.
    #[serde(rename = "classes_layer")]
    Classes,
    /// Per-instance or per-pixel masks.
    #[serde(rename = "masks_layer")]
    Masks,
}

impl std::fmt::Display for OutputRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputRole::Probabilities => "probabilities_layer",
            OutputRole::Boxes => "boxes_layer",
            OutputRole::Classes => "classes_layer",
            OutputRole::Masks => "masks_layer",
        };
        write!(f, "{}", name)
    }
}

/// One declared model input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInput {
    /// Input type tag; image modalities require `"image"`.
    pub input_type: String,
}

/// One declared, named model output with its role tags.
///
/// Most outputs play a single role. Combined-layout detection models tag one
/// output with both the probabilities and classes roles, which is how the
/// decoder recognizes that convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOutput {
    /// The engine-visible output tensor name.
    pub name: String,
    /// The semantic roles this output plays during decoding.
    #[serde(default)]
    pub roles: Vec<OutputRole>,
}

impl ModelOutput {
    /// Creates an output declaration with the given role tags.
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = OutputRole>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }
}

/// Declared inputs and outputs of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelIOSpec {
    /// Declared inputs; exactly one is supported.
    pub inputs: Vec<ModelInput>,
    /// Declared outputs in engine order.
    pub outputs: Vec<ModelOutput>,
}

impl ModelIOSpec {
    /// Resolves the index of the output tagged with `role`.
    ///
    /// Role lookup fails explicitly rather than defaulting; the only
    /// sanctioned fallback is the classification decoder's own index-0
    /// default for an untagged probabilities layer.
    pub fn output_index(&self, role: OutputRole) -> PredictResult<usize> {
        self.outputs
            .iter()
            .position(|o| o.roles.contains(&role))
            .ok_or_else(|| {
                PredictError::decode(format!("no output tagged with role '{}'", role))
            })
    }

    /// Returns the declared name of the output at `index`.
    pub fn output_name(&self, index: usize) -> PredictResult<&str> {
        self.outputs
            .get(index)
            .map(|o| o.name.as_str())
            .ok_or_else(|| {
                PredictError::decode(format!(
                    "output index {} out of range ({} declared outputs)",
                    index,
                    self.outputs.len()
                ))
            })
    }

    /// Resolves a role straight to its declared output name.
    pub fn output_name_for(&self, role: OutputRole) -> PredictResult<&str> {
        self.output_name(self.output_index(role)?)
    }
}

/// Immutable description of a model: identity, modality, artifact locations,
/// I/O declarations, and preprocessing contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Model name, e.g. `"MLPerf_SSD_ResNet34"`.
    pub name: String,
    /// Model version string.
    pub version: String,
    /// The semantic task this model performs.
    pub modality: Modality,
    /// Local path of the model graph (already fetched).
    pub graph_path: PathBuf,
    /// Local path of the line-delimited label resource, when the modality
    /// uses one.
    #[serde(default)]
    pub labels_path: Option<PathBuf>,
    /// Declared inputs and outputs.
    pub io: ModelIOSpec,
    /// Expected input layout and normalization, for image modalities.
    #[serde(default)]
    pub preprocess: Option<PreprocessSpec>,
}

impl ModelManifest {
    /// Parses a manifest from its JSON representation.
    pub fn from_json(json: &str) -> PredictResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PredictError::load_with_source("manifest parse failed", e))
    }

    /// Validates the manifest against the modality's input contract.
    ///
    /// Fails if the input arity is not exactly one, or (for image
    /// modalities) if the declared input type is not `"image"`.
    pub fn validate(&self) -> PredictResult<()> {
        if self.io.inputs.len() != 1 {
            return Err(PredictError::load(format!(
                "number of inputs not supported: {}",
                self.io.inputs.len()
            )));
        }
        if self.modality.is_image() {
            let input_type = self.io.inputs[0].input_type.to_lowercase();
            if input_type != "image" {
                return Err(PredictError::load(format!(
                    "input type '{}' not supported for {}",
                    input_type, self.modality
                )));
            }
        }
        if let Some(spec) = &self.preprocess {
            spec.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection_manifest() -> ModelManifest {
        ModelManifest::from_json(
            r#"{
                "name": "MLPerf_SSD_ResNet34",
                "version": "1.0",
                "modality": "image_object_detection",
                "graph_path": "model.onnx",
                "labels_path": "labels.txt",
                "io": {
                    "inputs": [{ "input_type": "image" }],
                    "outputs": [
                        { "name": "bboxes", "roles": ["boxes_layer"] },
                        { "name": "scores", "roles": ["probabilities_layer"] },
                        { "name": "labels", "roles": ["classes_layer"] }
                    ]
                },
                "preprocess": {
                    "channels": 3, "height": 1200, "width": 1200,
                    "color_order": "RGB",
                    "mean": [0.485, 0.456, 0.406],
                    "scale": [0.229, 0.224, 0.225]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_and_validates_detection_manifest() {
        let manifest = detection_manifest();
        manifest.validate().unwrap();
        assert_eq!(manifest.modality, Modality::ImageObjectDetection);
        assert_eq!(manifest.io.output_index(OutputRole::Boxes).unwrap(), 0);
        assert_eq!(
            manifest.io.output_name_for(OutputRole::Probabilities).unwrap(),
            "scores"
        );
    }

    #[test]
    fn role_lookup_fails_explicitly_when_untagged() {
        let manifest = detection_manifest();
        let err = manifest.io.output_index(OutputRole::Masks).unwrap_err();
        assert!(err.to_string().contains("masks_layer"));
    }

    #[test]
    fn combined_layout_tags_one_output_with_two_roles() {
        let io = ModelIOSpec {
            inputs: vec![ModelInput {
                input_type: "image".to_string(),
            }],
            outputs: vec![
                ModelOutput::new("bboxes", [OutputRole::Boxes]),
                ModelOutput::new("scores", [OutputRole::Probabilities, OutputRole::Classes]),
            ],
        };
        assert_eq!(io.output_index(OutputRole::Probabilities).unwrap(), 1);
        assert_eq!(io.output_index(OutputRole::Classes).unwrap(), 1);
    }

    #[test]
    fn rejects_multiple_inputs() {
        let mut manifest = detection_manifest();
        manifest.io.inputs.push(ModelInput {
            input_type: "image".to_string(),
        });
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn rejects_non_image_input_for_image_modality() {
        let mut manifest = detection_manifest();
        manifest.io.inputs[0].input_type = "text".to_string();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn input_type_check_is_case_insensitive() {
        let mut manifest = detection_manifest();
        manifest.io.inputs[0].input_type = "Image".to_string();
        manifest.validate().unwrap();
    }

    #[test]
    fn general_modality_permits_non_image_input() {
        let mut manifest = detection_manifest();
        manifest.modality = Modality::General;
        manifest.io.inputs[0].input_type = "tensor".to_string();
        manifest.validate().unwrap();
    }
}
