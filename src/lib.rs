//! SecureShield Fraud Scoring Library
//!
//! Scores card transactions against a pre-trained classifier and a pre-fit
//! amount/time scaler, both loaded once at startup as opaque artifacts.

pub mod bus;
pub mod config;
pub mod dataset;
pub mod features;
pub mod metrics;
pub mod models;
pub mod scaler;
pub mod simulate;
pub mod types;

pub use bus::ScoringBus;
pub use config::AppConfig;
pub use dataset::HistoricalDataset;
pub use features::FeatureVectorBuilder;
pub use models::inference::ScoringEngine;
pub use scaler::AmountTimeScaler;
pub use types::{ScoreRequest, ScoreResponse, Verdict};
