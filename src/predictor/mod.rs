//! Predictor lifecycle: load, predict, read, reset, close.
//!
//! A [`Predictor`] owns one inference engine and the artifacts needed to turn
//! its raw outputs into typed features. The lifecycle is a small state
//! machine: load produces a ready predictor, predict retains the engine's
//! named outputs, read decodes the retained outputs (repeatable, pure),
//! reset discards them, and close releases the engine. Dropping a predictor
//! closes it.

use crate::config::{Labels, ModelManifest};
use crate::core::{InputPacker, Modality, PredictError, PredictResult, TensorView};
use crate::decode;
use crate::features::PredictionResult;
use crate::inference::{EngineOutputs, InferenceEngine, OrtEngine};

/// Input accepted by [`Predictor::predict`].
///
/// The supported containers form a closed set checked at the construction
/// site. Raw byte buffers are a declared container but no modality consumes
/// them; passing one always fails with an invalid-input error.
#[derive(Debug, Clone)]
pub enum PredictInput {
    /// Per-sample tensors of identical shape, packed into one batch
    /// internally.
    Samples(Vec<TensorView>),
    /// An already-batched tensor whose leading dimension is the batch size.
    Batch(TensorView),
    /// An undecoded byte buffer. Rejected by every modality.
    Raw(Vec<u8>),
}

/// Undecoded engine outputs, surfaced for the general modality.
#[derive(Debug, Clone)]
pub struct RawOutputs {
    /// Named output tensors exactly as the engine returned them.
    pub outputs: EngineOutputs,
    /// The label table, when the manifest declared one.
    pub labels: Option<Labels>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Loaded,
    Predicted,
    Closed,
}

/// A loaded model ready to run forward passes and decode their outputs.
#[derive(Debug)]
pub struct Predictor {
    manifest: ModelManifest,
    labels: Option<Labels>,
    engine: Box<dyn InferenceEngine>,
    outputs: Option<EngineOutputs>,
    state: State,
}

impl Predictor {
    /// Loads a predictor over an already-constructed engine.
    ///
    /// Validates the manifest, then loads the label table when the modality
    /// requires one (or when a path is declared anyway). The engine is closed
    /// before returning any load error.
    pub fn load(manifest: ModelManifest, mut engine: Box<dyn InferenceEngine>) -> PredictResult<Self> {
        if let Err(e) = manifest.validate() {
            engine.close();
            return Err(e);
        }

        let labels = match &manifest.labels_path {
            Some(path) => match Labels::load(path) {
                Ok(labels) => {
                    if labels.is_empty() && manifest.modality.requires_labels() {
                        engine.close();
                        return Err(PredictError::load(format!(
                            "{} requires a non-empty label table, {} has no entries",
                            manifest.modality,
                            path.display()
                        )));
                    }
                    Some(labels)
                }
                Err(e) => {
                    engine.close();
                    return Err(e);
                }
            },
            None if manifest.modality.requires_labels() => {
                engine.close();
                return Err(PredictError::load(format!(
                    "{} requires a label table but the manifest declares none",
                    manifest.modality
                )));
            }
            None => None,
        };

        tracing::info!(
            model = %manifest.name,
            version = %manifest.version,
            modality = %manifest.modality,
            "predictor loaded"
        );

        Ok(Self {
            manifest,
            labels,
            engine,
            outputs: None,
            state: State::Loaded,
        })
    }

    /// Loads a predictor backed by an ONNX Runtime session over the
    /// manifest's graph file.
    pub fn load_onnx(manifest: ModelManifest) -> PredictResult<Self> {
        let engine = OrtEngine::load(&manifest.graph_path, None)?;
        Self::load(manifest, Box::new(engine))
    }

    /// The semantic task this predictor performs.
    pub fn modality(&self) -> Modality {
        self.manifest.modality
    }

    /// The manifest this predictor was loaded from.
    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    /// Returns true once [`Predictor::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Runs one forward pass and retains the engine's outputs for reading.
    ///
    /// A failed pass leaves no retained outputs; the previous prediction is
    /// discarded either way.
    pub fn predict(&mut self, input: PredictInput) -> PredictResult<()> {
        if self.state == State::Closed {
            return Err(PredictError::invalid_input("predictor is closed"));
        }
        self.outputs = None;
        let batch = self.pack_input(input)?;

        tracing::debug!(
            model = %self.manifest.name,
            shape = ?batch.shape(),
            "running forward pass"
        );

        let outputs = self.engine.run(&[batch])?;
        self.outputs = Some(outputs);
        self.state = State::Predicted;
        Ok(())
    }

    /// Decodes the retained outputs into typed features.
    ///
    /// Pure over the retained outputs: calling this twice without an
    /// intervening predict yields identical results. The general modality has
    /// no feature decoding; use [`Predictor::read_raw_outputs`] for it.
    pub fn read_predicted_features(&self) -> PredictResult<PredictionResult> {
        let outputs = self.retained_outputs()?;
        let io = &self.manifest.io;
        match self.manifest.modality {
            Modality::General => Err(PredictError::decode(
                "general modality has no feature decoding; use read_raw_outputs",
            )),
            Modality::ImageClassification => {
                decode::classification::decode(outputs, io, self.labels()?)
            }
            Modality::ImageObjectDetection => decode::detection::decode(outputs, io, self.labels()?),
            Modality::ImageInstanceSegmentation => {
                decode::instance_segmentation::decode(outputs, io, self.labels()?)
            }
            Modality::ImageSemanticSegmentation => decode::semantic_segmentation::decode(outputs, io),
            Modality::ImageEnhancement => decode::enhancement::decode(outputs, io),
        }
    }

    /// Surfaces the retained outputs undecoded, with the label table when one
    /// was loaded. Available for every modality.
    pub fn read_raw_outputs(&self) -> PredictResult<RawOutputs> {
        Ok(RawOutputs {
            outputs: self.retained_outputs()?.clone(),
            labels: self.labels.clone(),
        })
    }

    /// Discards the retained prediction, returning to the loaded state.
    ///
    /// Has no effect on a closed predictor.
    pub fn reset(&mut self) {
        self.outputs = None;
        if self.state == State::Predicted {
            self.state = State::Loaded;
        }
    }

    /// Releases the engine. Idempotent; later predicts fail, later reads
    /// have nothing retained to read.
    pub fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        self.engine.close();
        self.outputs = None;
        self.state = State::Closed;
        tracing::debug!(model = %self.manifest.name, "predictor closed");
    }

    fn retained_outputs(&self) -> PredictResult<&EngineOutputs> {
        self.outputs.as_ref().ok_or_else(|| {
            PredictError::invalid_input("no prediction to read; call predict first")
        })
    }

    fn labels(&self) -> PredictResult<&Labels> {
        self.labels.as_ref().ok_or_else(|| {
            PredictError::decode(format!(
                "{} decoding requires a label table",
                self.manifest.modality
            ))
        })
    }

    fn pack_input(&self, input: PredictInput) -> PredictResult<TensorView> {
        match input {
            PredictInput::Samples(samples) => {
                if let Some(spec) = &self.manifest.preprocess {
                    let expected = spec.sample_shape();
                    for sample in &samples {
                        if sample.shape() != expected.as_slice() {
                            return Err(PredictError::shape_mismatch(&expected, sample.shape()));
                        }
                    }
                }
                InputPacker::pack(&samples)
            }
            PredictInput::Batch(batch) => {
                batch.expect_f32("batched input")?;
                if let Some(spec) = &self.manifest.preprocess {
                    let expected = spec.sample_shape();
                    if batch.shape().len() != expected.len() + 1
                        || &batch.shape()[1..] != expected.as_slice()
                    {
                        return Err(PredictError::shape_mismatch(&expected, batch.shape()));
                    }
                }
                Ok(batch)
            }
            PredictInput::Raw(_) => Err(PredictError::invalid_input(format!(
                "raw byte buffers are not supported for {}",
                self.manifest.modality
            ))),
        }
    }
}

impl Drop for Predictor {
    fn drop(&mut self) {
        self.close();
    }
}

/// Writes a line-delimited label file; shared by the predictor and registry
/// test suites.
#[cfg(test)]
pub(crate) fn write_label_file(labels: &[&str]) -> std::io::Result<tempfile::NamedTempFile> {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new()?;
    for label in labels {
        writeln!(file, "{label}")?;
    }
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
pub(crate) fn classification_manifest(labels_path: &std::path::Path) -> ModelManifest {
    use crate::config::{ModelIOSpec, ModelInput, ModelOutput, OutputRole};

    ModelManifest {
        name: "Test_Classifier".into(),
        version: "1.0".into(),
        modality: Modality::ImageClassification,
        graph_path: "model.onnx".into(),
        labels_path: Some(labels_path.to_path_buf()),
        io: ModelIOSpec {
            inputs: vec![ModelInput {
                input_type: "image".into(),
            }],
            outputs: vec![ModelOutput::new("scores", [OutputRole::Probabilities])],
        },
        preprocess: None,
    }
}
