//! Classifier loading and inference components

pub mod inference;
pub mod loader;

pub use inference::{Classifier, Prediction, ScoringEngine};
pub use loader::ClassifierLoader;
