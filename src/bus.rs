//! NATS transport for score requests and verdicts

use crate::types::verdict::ScoreResponse;
use anyhow::Result;
use async_nats::{Client, Subscriber};
use tracing::{debug, info};

/// Request/verdict transport over a single NATS client.
#[derive(Clone)]
pub struct ScoringBus {
    client: Client,
    request_subject: String,
    verdict_subject: String,
}

impl ScoringBus {
    /// Create a bus over an established client
    pub fn new(client: Client, request_subject: &str, verdict_subject: &str) -> Self {
        Self {
            client,
            request_subject: request_subject.to_string(),
            verdict_subject: verdict_subject.to_string(),
        }
    }

    /// Subscribe to the score request subject
    pub async fn subscribe_requests(&self) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(self.request_subject.clone()).await?;
        info!(subject = %self.request_subject, "Subscribed to score requests");
        Ok(subscriber)
    }

    /// Publish a response for one scored or rejected request
    pub async fn publish_response(&self, response: &ScoreResponse) -> Result<()> {
        let payload = serde_json::to_vec(response)?;

        self.client
            .publish(self.verdict_subject.clone(), payload.into())
            .await?;

        match response {
            ScoreResponse::Scored(verdict) => debug!(
                verdict_id = %verdict.verdict_id,
                request_id = %verdict.request_id,
                probability = verdict.probability,
                "Published verdict"
            ),
            ScoreResponse::Rejected { request_id, .. } => debug!(
                request_id = %request_id,
                "Published rejection"
            ),
        }

        Ok(())
    }

    /// Get the request subject name
    pub fn request_subject(&self) -> &str {
        &self.request_subject
    }

    /// Get the verdict subject name
    pub fn verdict_subject(&self) -> &str {
        &self.verdict_subject
    }
}
