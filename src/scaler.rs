//! Pre-fit robust scaler for the raw amount/time pair.
//!
//! The scaler is fit offline by the training pipeline and exported as a JSON
//! parameter file. It is loaded once at startup and applied unchanged to
//! every request; this process never refits it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Column order the scaler parameters were fit against.
const EXPECTED_COLUMNS: [&str; 2] = ["Amount", "Time"];

/// Centering/scaling parameters for the amount and time columns.
///
/// Applies `scaled = (raw - center) / scale` per column. The artifact records
/// its own column order so the fit-time contract is validated rather than
/// assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountTimeScaler {
    /// Column names in parameter order.
    columns: [String; 2],
    /// Per-column center (median for a robust fit).
    center: [f64; 2],
    /// Per-column scale (interquartile range for a robust fit).
    scale: [f64; 2],
}

impl AmountTimeScaler {
    /// Build a scaler directly from parameters, in `[Amount, Time]` order.
    pub fn new(center: [f64; 2], scale: [f64; 2]) -> Self {
        Self {
            columns: [
                EXPECTED_COLUMNS[0].to_string(),
                EXPECTED_COLUMNS[1].to_string(),
            ],
            center,
            scale,
        }
    }

    /// Load scaler parameters from a JSON artifact file.
    ///
    /// An absent file or malformed parameters is a startup-time configuration
    /// error; the caller must disable the scoring path rather than continue.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scaler artifact {}", path.display()))?;
        let scaler: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scaler artifact {}", path.display()))?;
        scaler.validate()?;

        info!(
            path = %path.display(),
            amount_center = scaler.center[0],
            time_center = scaler.center[1],
            "Scaler parameters loaded"
        );

        Ok(scaler)
    }

    fn validate(&self) -> Result<()> {
        if self.columns[0] != EXPECTED_COLUMNS[0] || self.columns[1] != EXPECTED_COLUMNS[1] {
            bail!(
                "scaler artifact column order {:?} does not match expected {:?}",
                self.columns,
                EXPECTED_COLUMNS
            );
        }
        for (column, &scale) in self.columns.iter().zip(self.scale.iter()) {
            if !scale.is_finite() || scale == 0.0 {
                bail!("scaler artifact has invalid scale {} for column {}", scale, column);
            }
        }
        Ok(())
    }

    /// Scale a raw (amount, time) pair.
    pub fn transform(&self, amount: f64, time_seconds: f64) -> (f64, f64) {
        (
            (amount - self.center[0]) / self.scale[0],
            (time_seconds - self.center[1]) / self.scale[1],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_transform_centers_and_scales() {
        let scaler = AmountTimeScaler::new([22.0, 84_692.0], [77.0, 85_063.0]);

        let (scaled_amount, scaled_time) = scaler.transform(99.0, 84_692.0);
        assert!((scaled_amount - 1.0).abs() < 1e-9);
        assert_eq!(scaled_time, 0.0);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let scaler = AmountTimeScaler::new([10.0, 20.0], [2.0, 4.0]);
        assert_eq!(scaler.transform(150.0, 50_000.0), scaler.transform(150.0, 50_000.0));
    }

    #[test]
    fn test_load_roundtrip() {
        let scaler = AmountTimeScaler::new([22.0, 84_692.0], [77.16, 85_063.0]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&scaler).unwrap().as_bytes())
            .unwrap();

        let loaded = AmountTimeScaler::load(file.path()).unwrap();
        assert_eq!(loaded.transform(150.0, 50_000.0), scaler.transform(150.0, 50_000.0));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AmountTimeScaler::load("no/such/scaler.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_zero_scale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"columns": ["Amount", "Time"], "center": [0.0, 0.0], "scale": [0.0, 1.0]}"#,
        )
        .unwrap();

        assert!(AmountTimeScaler::load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_wrong_column_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"columns": ["Time", "Amount"], "center": [0.0, 0.0], "scale": [1.0, 1.0]}"#,
        )
        .unwrap();

        assert!(AmountTimeScaler::load(file.path()).is_err());
    }
}
