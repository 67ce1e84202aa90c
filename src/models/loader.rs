//! ONNX classifier loader

use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Loaded ONNX classifier with resolved tensor names.
pub struct LoadedClassifier {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the feature vector
    pub input_name: String,
    /// Output name for the predicted class label, if the export carries one
    pub label_output: Option<String>,
    /// Output name for class probabilities
    pub proba_output: String,
}

/// Loader for the serialized classifier artifact
pub struct ClassifierLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ClassifierLoader {
    /// Create a new loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the classifier from file.
    ///
    /// An absent artifact is a startup-time configuration error; callers must
    /// disable the scoring path instead of continuing without a model.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedClassifier> {
        let path = path.as_ref();

        if !path.exists() {
            bail!("classifier artifact not found at {}", path.display());
        }

        info!(path = %path.display(), threads = self.onnx_threads, "Loading classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // sklearn-style exports carry a label output alongside probabilities
        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label"))
            .map(|o| o.name.clone());

        let proba_output = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            label = label_output.as_deref().unwrap_or("<derived>"),
            probabilities = %proba_output,
            "Classifier loaded successfully"
        );

        Ok(LoadedClassifier {
            session,
            input_name,
            label_output,
            proba_output,
        })
    }
}

impl Default for ClassifierLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}
