//! Explicit framework-name to predictor-constructor mapping.
//!
//! No ambient global registration: the host constructs a
//! [`PredictorRegistry`] at startup, each backend registers a constructor
//! under its framework name, and the registry's lifetime is scoped to the
//! host's. Lookup is by exact name.

use std::collections::HashMap;

use crate::config::ModelManifest;
use crate::core::{PredictError, PredictResult};
use crate::predictor::Predictor;

/// A registered predictor constructor.
pub type Constructor = Box<dyn Fn(ModelManifest) -> PredictResult<Predictor> + Send + Sync>;

/// Maps framework names to predictor constructors.
pub struct PredictorRegistry {
    constructors: HashMap<String, Constructor>,
}

impl std::fmt::Debug for PredictorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorRegistry")
            .field("frameworks", &self.names())
            .finish()
    }
}

impl Default for PredictorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in backends registered.
    ///
    /// Currently that is the ONNX Runtime backend under `"onnxruntime"`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("onnxruntime", Predictor::load_onnx);
        registry
    }

    /// Registers a constructor under a framework name.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register<F>(&mut self, framework: impl Into<String>, constructor: F)
    where
        F: Fn(ModelManifest) -> PredictResult<Predictor> + Send + Sync + 'static,
    {
        let framework = framework.into();
        tracing::debug!(framework = %framework, "predictor constructor registered");
        self.constructors.insert(framework, Box::new(constructor));
    }

    /// Returns true if a constructor is registered under `framework`.
    pub fn contains(&self, framework: &str) -> bool {
        self.constructors.contains_key(framework)
    }

    /// Returns the registered framework names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Loads a predictor for `manifest` via the constructor registered under
    /// `framework`.
    pub fn load(&self, framework: &str, manifest: ModelManifest) -> PredictResult<Predictor> {
        let constructor = self.constructors.get(framework).ok_or_else(|| {
            PredictError::load(format!(
                "no predictor registered for framework '{}' (registered: {:?})",
                framework,
                self.names()
            ))
        })?;
        constructor(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TensorView;
    use crate::inference::ReplayEngine;
    use crate::predictor::{classification_manifest, write_label_file, PredictInput};

    fn replay_registry() -> PredictorRegistry {
        let mut registry = PredictorRegistry::new();
        registry.register("replay", |manifest| {
            let engine = ReplayEngine::from_pairs([(
                "scores",
                TensorView::from_f32(vec![0.7, 0.3], vec![1, 2]).unwrap(),
            )]);
            Predictor::load(manifest, Box::new(engine))
        });
        registry
    }

    #[test]
    fn builtin_registers_onnxruntime() {
        let registry = PredictorRegistry::builtin();
        assert!(registry.contains("onnxruntime"));
        assert_eq!(registry.names(), vec!["onnxruntime"]);
    }

    #[test]
    fn unknown_framework_is_a_load_error() {
        let labels = write_label_file(&["cat", "dog"]).unwrap();
        let registry = PredictorRegistry::new();
        let err = registry
            .load("tensorflow", classification_manifest(labels.path()))
            .unwrap_err();
        assert!(err.to_string().contains("tensorflow"));
    }

    #[test]
    fn registered_constructor_drives_a_full_lifecycle() {
        let labels = write_label_file(&["cat", "dog"]).unwrap();
        let registry = replay_registry();
        let mut predictor = registry
            .load("replay", classification_manifest(labels.path()))
            .unwrap();

        let input = PredictInput::Samples(vec![
            TensorView::from_f32(vec![0.0; 12], vec![3, 2, 2]).unwrap(),
        ]);
        predictor.predict(input).unwrap();
        let result = predictor.read_predicted_features().unwrap();
        assert_eq!(result[0][0].label(), Some("cat"));
    }

    #[test]
    fn re_registration_replaces_the_constructor() {
        let mut registry = replay_registry();
        registry.register("replay", |_manifest| {
            Err(PredictError::load("constructor replaced"))
        });
        let labels = write_label_file(&["cat"]).unwrap();
        let err = registry
            .load("replay", classification_manifest(labels.path()))
            .unwrap_err();
        assert!(err.to_string().contains("replaced"));
    }
}
