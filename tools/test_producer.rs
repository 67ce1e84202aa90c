//! Test Score Request Producer
//!
//! Generates and publishes score requests to NATS for exercising the
//! scoring service end to end.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use secureshield::simulate::SampleDataGenerator;
use secureshield::types::request::ScoreRequest;
use std::time::Duration;
use tracing::{info, warn};

/// Generates legitimate and suspicious score requests
struct RequestGenerator {
    samples: SampleDataGenerator,
    rng: StdRng,
    counter: u64,
}

impl RequestGenerator {
    fn new(seed: u64) -> Self {
        Self {
            samples: SampleDataGenerator::new(seed),
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            counter: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("req_{:012}", self.counter)
    }

    /// A request shaped like ordinary traffic: moderate amount, key
    /// components near zero.
    fn generate_legitimate(&mut self) -> ScoreRequest {
        let row = self.samples.generate_one();

        ScoreRequest::new(self.next_id(), row.amount, row.time_seconds)
            .with_component("V4", row.components[3])
            .with_component("V11", row.components[10])
            .with_component("V12", row.components[11])
            .with_component("V14", row.components[13])
            .with_component("V17", self.rng.gen_range(-1.0..1.0))
    }

    /// A request shaped like known fraud: larger amount, deeply negative
    /// key components.
    fn generate_suspicious(&mut self) -> ScoreRequest {
        let row = self.samples.generate_one();

        ScoreRequest::new(
            self.next_id(),
            self.rng.gen_range(500.0..5_000.0),
            row.time_seconds,
        )
        .with_component("V4", self.rng.gen_range(2.0..8.0))
        .with_component("V11", self.rng.gen_range(2.0..10.0))
        .with_component("V12", self.rng.gen_range(-18.0..-6.0))
        .with_component("V14", self.rng.gen_range(-19.0..-7.0))
        .with_component("V17", self.rng.gen_range(-25.0..-9.0))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Score Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("score.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, fraud_rate, delay_ms).await;
        }
    };

    // Generate and publish requests
    let mut generator = RequestGenerator::new(42);
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} requests...", count);

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        let payload = serde_json::to_vec(&request)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} requests ({} legitimate, {} suspicious)",
                i + 1,
                count,
                legitimate_count,
                suspicious_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} requests ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new(42);
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
