//! Scoring verdict data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Safe,
    Fraud,
}

impl Label {
    /// Map the classifier's integer class to a label (class 1 is fraud).
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            Label::Fraud
        } else {
            Label::Safe
        }
    }

    /// Integer class as emitted by the classifier.
    pub fn class(&self) -> i64 {
        match self {
            Label::Safe => 0,
            Label::Fraud => 1,
        }
    }

    /// Banner color for the display surface.
    pub fn banner_color(&self) -> &'static str {
        match self {
            Label::Safe => "#27ae60",
            Label::Fraud => "#c0392b",
        }
    }
}

/// Verdict returned for one scored transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Unique verdict identifier.
    pub verdict_id: String,

    /// Associated request ID.
    pub request_id: String,

    /// Binary classification result.
    pub label: Label,

    /// Class-1 (fraud) probability in [0, 1].
    pub probability: f64,

    /// Banner color backing the risk display.
    pub banner_color: String,

    /// Verdict generation timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    /// Build a verdict for a request from the classifier's output.
    pub fn new(request_id: impl Into<String>, label: Label, probability: f64) -> Self {
        Self {
            verdict_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            label,
            probability,
            banner_color: label.banner_color().to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Probability rendered for display, e.g. `0.07` becomes `"7.0%"`.
    pub fn probability_percent(&self) -> String {
        format!("{:.1}%", self.probability * 100.0)
    }
}

/// Reply published for every score request.
///
/// A request received while the model artifacts failed to load is answered
/// with an explicit rejection; no default verdict is ever fabricated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScoreResponse {
    Scored(Verdict),
    Rejected { request_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(Label::from_class(0), Label::Safe);
        assert_eq!(Label::from_class(1), Label::Fraud);
        assert_eq!(Label::Safe.class(), 0);
        assert_eq!(Label::Fraud.class(), 1);
    }

    #[test]
    fn test_probability_display() {
        let verdict = Verdict::new("req_1", Label::Safe, 0.07);
        assert_eq!(verdict.probability_percent(), "7.0%");

        let verdict = Verdict::new("req_2", Label::Fraud, 0.914);
        assert_eq!(verdict.probability_percent(), "91.4%");
    }

    #[test]
    fn test_banner_colors() {
        assert_eq!(Label::Safe.banner_color(), "#27ae60");
        assert_eq!(Label::Fraud.banner_color(), "#c0392b");
    }

    #[test]
    fn test_response_serialization() {
        let verdict = Verdict::new("req_123", Label::Fraud, 0.78);
        let response = ScoreResponse::Scored(verdict);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""status":"scored""#));

        let deserialized: ScoreResponse = serde_json::from_str(&json).unwrap();
        match deserialized {
            ScoreResponse::Scored(v) => {
                assert_eq!(v.request_id, "req_123");
                assert_eq!(v.label, Label::Fraud);
            }
            ScoreResponse::Rejected { .. } => panic!("expected scored response"),
        }
    }

    #[test]
    fn test_rejection_serialization() {
        let response = ScoreResponse::Rejected {
            request_id: "req_9".to_string(),
            reason: "model artifacts not loaded".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        let deserialized: ScoreResponse = serde_json::from_str(&json).unwrap();
        match deserialized {
            ScoreResponse::Rejected { request_id, reason } => {
                assert_eq!(request_id, "req_9");
                assert!(reason.contains("not loaded"));
            }
            ScoreResponse::Scored(_) => panic!("expected rejection"),
        }
    }
}
