//! Type definitions for the scoring engine

pub mod request;
pub mod verdict;

pub use request::ScoreRequest;
pub use verdict::{Label, ScoreResponse, Verdict};

