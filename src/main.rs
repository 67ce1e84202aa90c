//! SecureShield Scoring Service - Main Entry Point
//!
//! Consumes score requests from NATS, runs the pre-trained classifier over
//! assembled feature vectors, and publishes verdicts. Requests are handled
//! strictly one at a time; scoring itself is a synchronous single-shot call.

use anyhow::Result;
use futures::StreamExt;
use secureshield::{
    config::AppConfig,
    dataset::HistoricalDataset,
    metrics::{MetricsReporter, SessionMetrics},
    models::inference::ScoringEngine,
    types::verdict::ScoreResponse,
    ScoreRequest, ScoringBus,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("secureshield=info".parse()?),
        )
        .init();

    info!("Starting SecureShield Scoring Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Initialize metrics
    let metrics = Arc::new(SessionMetrics::new());

    // Historical dataset statistics are optional: a missing file only
    // disables the dashboard KPI row.
    match HistoricalDataset::load(
        &config.dataset.path,
        config.dataset.max_rows,
        config.dataset.sample_seed,
    ) {
        Ok(dataset) => {
            let stats = dataset.stats();
            info!(
                rows = stats.total_rows,
                frauds = stats.fraud_count,
                fraud_rate_pct = format!("{:.3}", stats.fraud_rate_pct),
                avg_fraud_amount = ?stats.avg_fraud_amount,
                "Historical statistics ready"
            );
        }
        Err(e) => {
            warn!(error = %e, "Historical dataset unavailable, statistics disabled");
        }
    }

    // Missing artifacts disable the scoring path entirely: the service keeps
    // running and answers every request with an explicit rejection.
    let engine = match ScoringEngine::load(&config.artifacts) {
        Ok(engine) => Some(engine),
        Err(e) => {
            error!(
                error = %e,
                scaler = %config.artifacts.scaler_path,
                classifier = %config.artifacts.classifier_path,
                "Model artifacts not loaded, scoring disabled"
            );
            None
        }
    };

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let bus = ScoringBus::new(
        client,
        &config.nats.request_subject,
        &config.nats.verdict_subject,
    );
    info!("Listening on subject: {}", bus.request_subject());
    info!("Publishing verdicts to: {}", bus.verdict_subject());

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process requests sequentially: one build-and-infer call per message,
    // no overlap, no shared mutable state beyond the loaded artifacts.
    let mut subscription = bus.subscribe_requests().await?;

    while let Some(message) = subscription.next().await {
        let started = Instant::now();

        let request = match serde_json::from_slice::<ScoreRequest>(&message.payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to deserialize score request");
                continue;
            }
        };

        let response = match engine.as_ref() {
            Some(engine) => match engine.score(&request) {
                Ok(verdict) => {
                    metrics.record_verdict(started.elapsed(), &verdict);
                    info!(
                        request_id = %request.request_id,
                        label = ?verdict.label,
                        probability = %verdict.probability_percent(),
                        scoring_time_us = started.elapsed().as_micros(),
                        "Request scored"
                    );
                    ScoreResponse::Scored(verdict)
                }
                Err(e) => {
                    error!(request_id = %request.request_id, error = %e, "Scoring failed");
                    ScoreResponse::Rejected {
                        request_id: request.request_id.clone(),
                        reason: format!("scoring failed: {}", e),
                    }
                }
            },
            None => {
                metrics.record_rejection();
                error!(
                    request_id = %request.request_id,
                    "Score requested while artifacts are unloaded"
                );
                ScoreResponse::Rejected {
                    request_id: request.request_id.clone(),
                    reason: "model artifacts not loaded".to_string(),
                }
            }
        };

        if let Err(e) = bus.publish_response(&response).await {
            error!(request_id = %request.request_id, error = %e, "Failed to publish response");
        }
    }

    info!("Scoring service shutting down...");
    metrics.print_summary();

    Ok(())
}
