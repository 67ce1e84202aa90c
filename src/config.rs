//! Configuration management for the scoring service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming score requests
    pub request_subject: String,
    /// Subject for outgoing verdicts
    pub verdict_subject: String,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Path to the serialized scaler parameters
    pub scaler_path: String,
    /// Path to the serialized classifier
    pub classifier_path: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Historical dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Path to the historical transactions CSV
    pub path: String,
    /// Row cap for the in-memory sample
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Seed for the sampling RNG
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
}

fn default_max_rows() -> usize {
    crate::dataset::MAX_SAMPLE_ROWS
}

fn default_sample_seed() -> u64 {
    crate::dataset::DEFAULT_SAMPLE_SEED
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "score.requests".to_string(),
                verdict_subject: "score.verdicts".to_string(),
            },
            artifacts: ArtifactsConfig {
                scaler_path: "artifacts/scaler.json".to_string(),
                classifier_path: "artifacts/fraud_classifier.onnx".to_string(),
                onnx_threads: 1,
            },
            dataset: DatasetConfig {
                path: "data/creditcard.csv".to_string(),
                max_rows: crate::dataset::MAX_SAMPLE_ROWS,
                sample_seed: crate::dataset::DEFAULT_SAMPLE_SEED,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.dataset.max_rows, 10_000);
        assert_eq!(config.dataset.sample_seed, 42);
        assert_eq!(config.artifacts.onnx_threads, 1);
    }

    #[test]
    fn test_load_from_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[nats]
url = "nats://broker:4222"
request_subject = "score.requests"
verdict_subject = "score.verdicts"

[artifacts]
scaler_path = "artifacts/scaler.json"
classifier_path = "artifacts/fraud_classifier.onnx"

[dataset]
path = "data/creditcard.csv"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.nats.url, "nats://broker:4222");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.dataset.max_rows, 10_000);
        assert_eq!(config.dataset.sample_seed, 42);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AppConfig::load_from_path("no/such/config.toml").is_err());
    }
}
