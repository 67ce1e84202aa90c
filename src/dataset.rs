//! Historical transaction dataset statistics.
//!
//! The dashboard's KPI row is computed from an optional CSV of labeled
//! historical transactions. Large files are capped to a deterministic
//! 10,000-row sample so the stats stay cheap to hold in memory.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Maximum number of rows retained from the historical dataset.
pub const MAX_SAMPLE_ROWS: usize = 10_000;

/// Default seed for the sampling RNG.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// One labeled historical transaction. Columns other than `Class` and
/// `Amount` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRecord {
    /// Fraud label (0 = legitimate, 1 = fraud)
    #[serde(rename = "Class")]
    pub class: u8,
    /// Transaction amount
    #[serde(rename = "Amount")]
    pub amount: f64,
}

/// Summary statistics over the cached sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    /// Rows in the cached sample
    pub total_rows: usize,
    /// Fraudulent rows in the sample
    pub fraud_count: usize,
    /// Fraud rate as a percentage of the sample
    pub fraud_rate_pct: f64,
    /// Mean amount over fraudulent rows, if any exist
    pub avg_fraud_amount: Option<f64>,
}

/// In-memory sample of the historical dataset.
pub struct HistoricalDataset {
    records: Vec<DatasetRecord>,
}

impl HistoricalDataset {
    /// Load the dataset from CSV, sampling down to `max_rows` when larger.
    ///
    /// A missing file is an error the caller downgrades to a warning: the
    /// dashboard runs without statistics, nothing else is affected.
    pub fn load<P: AsRef<Path>>(path: P, max_rows: usize, seed: u64) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);

        let records: Vec<DatasetRecord> = reader
            .deserialize()
            .collect::<Result<Vec<DatasetRecord>, csv::Error>>()
            .with_context(|| format!("failed to parse dataset {}", path.display()))?;

        let total = records.len();
        let records = sample_cap(records, max_rows, seed);

        info!(
            path = %path.display(),
            rows = total,
            sampled = records.len(),
            "Historical dataset loaded"
        );

        Ok(Self { records })
    }

    /// Build a dataset from rows already in memory.
    pub fn from_records(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    /// Number of rows in the cached sample.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cached sample is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute the dashboard summary statistics.
    pub fn stats(&self) -> DatasetStats {
        let total_rows = self.records.len();
        let fraud_count = self.records.iter().filter(|r| r.class == 1).count();

        let fraud_rate_pct = if total_rows > 0 {
            fraud_count as f64 / total_rows as f64 * 100.0
        } else {
            0.0
        };

        let avg_fraud_amount = if fraud_count > 0 {
            let sum: f64 = self
                .records
                .iter()
                .filter(|r| r.class == 1)
                .map(|r| r.amount)
                .sum();
            Some(sum / fraud_count as f64)
        } else {
            None
        };

        DatasetStats {
            total_rows,
            fraud_count,
            fraud_rate_pct,
            avg_fraud_amount,
        }
    }
}

/// Cap a row set to at most `max_rows` via seeded sampling without
/// replacement. A set already within the cap is returned unchanged.
pub fn sample_cap<T>(rows: Vec<T>, max_rows: usize, seed: u64) -> Vec<T> {
    if rows.len() <= max_rows {
        return rows;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    indices.shuffle(&mut rng);
    indices.truncate(max_rows);
    indices.sort_unstable();

    let mut keep = vec![false; rows.len()];
    for index in indices {
        keep[index] = true;
    }

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(class: u8, amount: f64) -> DatasetRecord {
        DatasetRecord { class, amount }
    }

    #[test]
    fn test_sample_cap_reduces_large_set() {
        let rows: Vec<u32> = (0..15_000).collect();
        let sampled = sample_cap(rows, MAX_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED);
        assert_eq!(sampled.len(), 10_000);
    }

    #[test]
    fn test_sample_cap_leaves_small_set_unchanged() {
        let rows: Vec<u32> = (0..5_000).collect();
        let sampled = sample_cap(rows.clone(), MAX_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED);
        assert_eq!(sampled, rows);
    }

    #[test]
    fn test_sample_cap_is_deterministic() {
        let rows: Vec<u32> = (0..12_000).collect();
        let first = sample_cap(rows.clone(), 100, 42);
        let second = sample_cap(rows, 100, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_stats_over_mixed_sample() {
        let dataset = HistoricalDataset::from_records(vec![
            record(0, 10.0),
            record(0, 20.0),
            record(1, 100.0),
            record(1, 300.0),
        ]);

        let stats = dataset.stats();
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.fraud_count, 2);
        assert_eq!(stats.fraud_rate_pct, 50.0);
        assert_eq!(stats.avg_fraud_amount, Some(200.0));
    }

    #[test]
    fn test_stats_without_fraud_rows() {
        let dataset = HistoricalDataset::from_records(vec![record(0, 10.0), record(0, 20.0)]);

        let stats = dataset.stats();
        assert_eq!(stats.fraud_count, 0);
        assert_eq!(stats.fraud_rate_pct, 0.0);
        assert_eq!(stats.avg_fraud_amount, None);
    }

    #[test]
    fn test_load_ignores_extra_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Time,V1,V2,Amount,Class").unwrap();
        writeln!(file, "0.0,-1.36,0.07,149.62,0").unwrap();
        writeln!(file, "406.0,-2.31,1.95,0.0,1").unwrap();

        let dataset =
            HistoricalDataset::load(file.path(), MAX_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED).unwrap();
        assert_eq!(dataset.len(), 2);

        let stats = dataset.stats();
        assert_eq!(stats.fraud_count, 1);
        assert_eq!(stats.avg_fraud_amount, Some(0.0));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = HistoricalDataset::load("no/such/data.csv", MAX_SAMPLE_ROWS, 42);
        assert!(result.is_err());
    }
}
