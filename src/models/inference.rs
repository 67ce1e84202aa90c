//! Classifier inference for fraud scoring

use crate::config::ArtifactsConfig;
use crate::features::FeatureVectorBuilder;
use crate::models::loader::{ClassifierLoader, LoadedClassifier};
use crate::scaler::AmountTimeScaler;
use crate::types::request::ScoreRequest;
use crate::types::verdict::{Label, Verdict};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::{debug, info};

/// Raw classifier output for one feature vector.
#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    /// Predicted class (0 = legitimate, 1 = fraud)
    pub class: i64,
    /// Class-1 probability
    pub probability: f64,
}

/// Decision contract of the pre-trained classifier.
///
/// The engine only depends on this capability, so tests can substitute a
/// double without any serialized model on disk.
pub trait Classifier: Send + Sync {
    /// Classify a full-width feature vector.
    fn predict(&self, features: &[f32]) -> Result<Prediction>;
}

/// ONNX Runtime implementation of the classifier contract.
pub struct OnnxClassifier {
    /// Loaded model (wrapped in RwLock: Session::run needs exclusive access)
    model: RwLock<LoadedClassifier>,
}

impl OnnxClassifier {
    /// Load the classifier artifact from file.
    pub fn load(path: &str, onnx_threads: usize) -> Result<Self> {
        let loader = ClassifierLoader::with_threads(onnx_threads)?;
        let model = loader.load(path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Extract the predicted class from the label output tensor.
    ///
    /// Falls back to thresholding the probability at 0.5 when the export has
    /// no label output.
    fn extract_label(
        outputs: &ort::session::SessionOutputs,
        label_output: Option<&str>,
        probability: f64,
    ) -> i64 {
        if let Some(name) = label_output {
            if let Some(output) = outputs.get(name) {
                if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
                    if let Some(&class) = data.first() {
                        return class;
                    }
                }
            }
        }
        i64::from(probability >= 0.5)
    }

    /// Extract the class-1 probability from the model output.
    ///
    /// Handles both `[1, 2]` float tensors and the `seq(map(int64, float))`
    /// shape emitted by sklearn-style exports. An output that matches neither
    /// shape is an error; no default probability is invented.
    fn extract_probability(
        outputs: &ort::session::SessionOutputs,
        proba_output: &str,
    ) -> Result<f64> {
        if let Some(output) = outputs.get(proba_output) {
            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let prob = Self::class1_prob_from_tensor(&shape, data);
                debug!(prob = prob, "Extracted probability from tensor");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&output.dtype()) {
                if let Ok(prob) = Self::extract_from_sequence_map(output) {
                    return Ok(prob);
                }
            }
        }

        // Fallback: scan all outputs except the label tensor
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }

            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let prob = Self::class1_prob_from_tensor(&shape, data);
                debug!(output = %name, prob = prob, "Extracted probability from tensor (fallback)");
                return Ok(prob);
            }

            if DynSequenceValueType::can_downcast(&output.dtype()) {
                if let Ok(prob) = Self::extract_from_sequence_map(&output) {
                    return Ok(prob);
                }
            }
        }

        anyhow::bail!("classifier output contains no probability in a supported shape")
    }

    /// Extract the class-1 probability from seq(map(int64, float)) output.
    fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        if maps.is_empty() {
            return Err(anyhow::anyhow!("Empty sequence"));
        }

        // Batch size is always 1, so the first map is the only one
        let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

        for (class_id, prob) in &kv_pairs {
            if *class_id == 1 {
                return Ok(*prob as f64);
            }
        }
        for (class_id, prob) in &kv_pairs {
            if *class_id == 0 {
                return Ok(1.0 - *prob as f64);
            }
        }

        Err(anyhow::anyhow!("No probability found in map"))
    }

    /// Class-1 probability from tensor data.
    fn class1_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
        let dims: Vec<i64> = shape.iter().copied().collect();

        if dims.len() == 2 {
            let num_classes = dims[1] as usize;
            if num_classes >= 2 {
                // [batch, num_classes]: class 1 is the fraud probability
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        } else if dims.len() == 1 {
            let num_classes = dims[0] as usize;
            if num_classes >= 2 {
                return data[1] as f64;
            } else if num_classes == 1 {
                return data[0] as f64;
            }
        }

        data.last().map(|&v| v as f64).unwrap_or(0.5)
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<Prediction> {
        use ort::value::Tensor;

        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let input_name = model.input_name.clone();
        let label_output = model.label_output.clone();
        let proba_output = model.proba_output.clone();

        let outputs = model.session.run(ort::inputs![&input_name => input_tensor])?;

        let probability = Self::extract_probability(&outputs, &proba_output)?;
        let class = Self::extract_label(&outputs, label_output.as_deref(), probability);

        Ok(Prediction { class, probability })
    }
}

/// Scoring engine composing the vector builder and the classifier.
///
/// Construction fails when either artifact is missing; a constructed engine
/// is immutable and every `score` call is a synchronous single-shot function
/// of its inputs.
pub struct ScoringEngine {
    builder: FeatureVectorBuilder,
    classifier: Box<dyn Classifier>,
}

impl ScoringEngine {
    /// Load scaler and classifier artifacts and assemble the engine.
    pub fn load(artifacts: &ArtifactsConfig) -> Result<Self> {
        let scaler = AmountTimeScaler::load(&artifacts.scaler_path)
            .context("scaler artifact unavailable, scoring disabled")?;
        let classifier = OnnxClassifier::load(&artifacts.classifier_path, artifacts.onnx_threads)
            .context("classifier artifact unavailable, scoring disabled")?;

        info!("Scoring engine initialized");

        Ok(Self {
            builder: FeatureVectorBuilder::new(scaler),
            classifier: Box::new(classifier),
        })
    }

    /// Assemble an engine from already-loaded parts.
    pub fn from_parts(scaler: AmountTimeScaler, classifier: Box<dyn Classifier>) -> Self {
        Self {
            builder: FeatureVectorBuilder::new(scaler),
            classifier,
        }
    }

    /// Score a single request: build the feature vector, classify, wrap the
    /// outcome in a verdict.
    pub fn score(&self, request: &ScoreRequest) -> Result<Verdict> {
        let features = self.builder.build(request)?;
        let prediction = self.classifier.predict(&features)?;
        let label = Label::from_class(prediction.class);

        debug!(
            request_id = %request.request_id,
            class = prediction.class,
            probability = prediction.probability,
            "Request scored"
        );

        Ok(Verdict::new(&request.request_id, label, prediction.probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactsConfig;
    use crate::features::FEATURE_WIDTH;
    use crate::types::verdict::Label;
    use std::sync::Mutex;

    /// Test double returning a fixed prediction and recording its input.
    struct StubClassifier {
        class: i64,
        probability: f64,
        seen: Mutex<Vec<Vec<f32>>>,
    }

    impl StubClassifier {
        fn new(class: i64, probability: f64) -> Self {
            Self {
                class,
                probability,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn predict(&self, features: &[f32]) -> Result<Prediction> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(Prediction {
                class: self.class,
                probability: self.probability,
            })
        }
    }

    fn identity_scaler() -> AmountTimeScaler {
        AmountTimeScaler::new([0.0, 0.0], [1.0, 1.0])
    }

    #[test]
    fn test_score_end_to_end_safe_verdict() {
        let engine = ScoringEngine::from_parts(
            identity_scaler(),
            Box::new(StubClassifier::new(0, 0.07)),
        );

        let request = ScoreRequest::new("req_1", 150.0, 50_000.0)
            .with_component("V17", 0.0)
            .with_component("V14", -1.2)
            .with_component("V12", 0.0)
            .with_component("V4", 0.0)
            .with_component("V11", 0.0);

        let verdict = engine.score(&request).unwrap();

        assert_eq!(verdict.label, Label::Safe);
        assert_eq!(verdict.probability, 0.07);
        assert_eq!(verdict.probability_percent(), "7.0%");
        assert_eq!(verdict.request_id, "req_1");
    }

    impl Classifier for std::sync::Arc<StubClassifier> {
        fn predict(&self, features: &[f32]) -> Result<Prediction> {
            (**self).predict(features)
        }
    }

    #[test]
    fn test_score_feeds_full_width_vector_to_classifier() {
        let stub = std::sync::Arc::new(StubClassifier::new(1, 0.93));
        let engine = ScoringEngine::from_parts(identity_scaler(), Box::new(stub.clone()));

        let request = ScoreRequest::new("req_2", 150.0, 50_000.0).with_component("V14", -1.2);
        let verdict = engine.score(&request).unwrap();
        assert_eq!(verdict.label, Label::Fraud);

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), FEATURE_WIDTH);
        assert_eq!(seen[0][0], 150.0);
        assert_eq!(seen[0][1], 50_000.0);
        assert_eq!(seen[0][15], -1.2f32);
    }

    #[test]
    fn test_load_with_missing_artifacts_fails() {
        let artifacts = ArtifactsConfig {
            scaler_path: "no/such/scaler.json".to_string(),
            classifier_path: "no/such/model.onnx".to_string(),
            onnx_threads: 1,
        };

        assert!(ScoringEngine::load(&artifacts).is_err());
    }

    #[test]
    fn test_builder_error_propagates_before_inference() {
        let stub = Box::new(StubClassifier::new(0, 0.0));
        let engine = ScoringEngine::from_parts(identity_scaler(), stub);

        let request = ScoreRequest::new("req_3", 1.0, 1.0).with_component("bogus", 1.0);
        assert!(engine.score(&request).is_err());
    }
}
