//! Simulated transactions and heuristic scoring for the design dashboard.
//!
//! The design dashboard runs entirely without model artifacts: it renders a
//! generated transaction stream and scores form input with a fixed heuristic
//! instead of the trained classifier.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, Normal, Uniform};

/// Span of the time column in the historical dataset, in seconds.
pub const TIME_SPAN_SECONDS: f64 = 172_792.0;

/// Mean of the simulated amount distribution.
pub const MEAN_AMOUNT: f64 = 100.0;

/// Number of anonymized components carried by simulated transactions.
pub const SIMULATED_COMPONENTS: usize = 14;

/// Decision threshold for the heuristic risk score.
pub const HEURISTIC_RISK_THRESHOLD: f64 = 0.5;

/// One generated transaction row.
#[derive(Debug, Clone)]
pub struct SimulatedTransaction {
    /// Seconds since the start of the observation window
    pub time_seconds: f64,
    /// Transaction amount
    pub amount: f64,
    /// V1..V14 component values
    pub components: Vec<f64>,
}

/// Seeded generator for simulated transaction rows.
///
/// Time is uniform over the dataset's span, amounts are exponential with
/// mean 100, components are standard normal. The same seed reproduces the
/// same stream.
pub struct SampleDataGenerator {
    rng: StdRng,
    time_dist: Uniform<f64>,
    amount_dist: Exp<f64>,
    component_dist: Normal<f64>,
}

impl SampleDataGenerator {
    /// Create a generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            time_dist: Uniform::new(0.0, TIME_SPAN_SECONDS),
            amount_dist: Exp::new(1.0 / MEAN_AMOUNT).expect("valid exponential rate"),
            component_dist: Normal::new(0.0, 1.0).expect("valid normal parameters"),
        }
    }

    /// Generate one transaction row.
    pub fn generate_one(&mut self) -> SimulatedTransaction {
        let components = (0..SIMULATED_COMPONENTS)
            .map(|_| self.component_dist.sample(&mut self.rng))
            .collect();

        SimulatedTransaction {
            time_seconds: self.time_dist.sample(&mut self.rng),
            amount: self.amount_dist.sample(&mut self.rng),
            components,
        }
    }

    /// Generate a batch of transaction rows.
    pub fn generate(&mut self, count: usize) -> Vec<SimulatedTransaction> {
        (0..count).map(|_| self.generate_one()).collect()
    }
}

/// Heuristic risk score used by the design dashboard.
///
/// `min(amount / 1000 + |v14| / 10, 0.99)`; scores above
/// [`HEURISTIC_RISK_THRESHOLD`] are treated as high risk.
pub fn heuristic_risk(amount: f64, v14: f64) -> f64 {
    (amount / 1000.0 + v14.abs() / 10.0).min(0.99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_risk_formula() {
        assert!((heuristic_risk(150.0, -1.2) - 0.27).abs() < 1e-9);
        assert_eq!(heuristic_risk(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_heuristic_risk_is_capped() {
        assert_eq!(heuristic_risk(5_000.0, -30.0), 0.99);
    }

    #[test]
    fn test_heuristic_threshold_split() {
        assert!(heuristic_risk(100.0, -1.0) < HEURISTIC_RISK_THRESHOLD);
        assert!(heuristic_risk(700.0, -2.0) > HEURISTIC_RISK_THRESHOLD);
    }

    #[test]
    fn test_generator_row_shape() {
        let mut generator = SampleDataGenerator::new(42);
        let rows = generator.generate(1_000);

        assert_eq!(rows.len(), 1_000);
        for row in &rows {
            assert!(row.time_seconds >= 0.0 && row.time_seconds < TIME_SPAN_SECONDS);
            assert!(row.amount >= 0.0);
            assert_eq!(row.components.len(), SIMULATED_COMPONENTS);
        }
    }

    #[test]
    fn test_generator_is_seed_deterministic() {
        let mut first = SampleDataGenerator::new(7);
        let mut second = SampleDataGenerator::new(7);

        let a = first.generate_one();
        let b = second.generate_one();
        assert_eq!(a.time_seconds, b.time_seconds);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.components, b.components);
    }
}
