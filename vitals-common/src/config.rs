//! Configuration loading for the vitals core
//!
//! All tunables ship with compiled defaults matching the deployed
//! behavior; a TOML file may override any subset. Resolution priority:
//! 1. Explicit path passed by the embedder (highest priority)
//! 2. `VITALS_CONFIG` environment variable
//! 3. Compiled defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "VITALS_CONFIG";

/// Clinical threshold set for anomaly flagging
///
/// These are placeholder screening thresholds, not diagnostic criteria.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Heart rate above this is anomalous (bpm). Default: 120
    pub heart_rate_high: f64,
    /// Heart rate below this is anomalous (bpm). Default: 40
    pub heart_rate_low: f64,
    /// Blood oxygen below this is anomalous (%). Default: 92
    pub spo2_low: f64,
    /// Temperature above this is anomalous (°C). Default: 38
    pub temp_high: f64,
    /// Temperature below this is anomalous (°C). Default: 35
    pub temp_low: f64,
    /// Systolic pressure above this is anomalous (mmHg). Default: 160
    pub systolic_high: f64,
    /// Diastolic pressure above this is anomalous (mmHg). Default: 100
    pub diastolic_high: f64,
    /// Max absolute ECG sample amplitude before the waveform is flagged.
    /// Signal-quality heuristic, not a diagnostic algorithm. Default: 1.0
    pub ecg_amplitude_max: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            heart_rate_high: 120.0,
            heart_rate_low: 40.0,
            spo2_low: 92.0,
            temp_high: 38.0,
            temp_low: 35.0,
            systolic_high: 160.0,
            diastolic_high: 100.0,
            ecg_amplitude_max: 1.0,
        }
    }
}

/// Ingestion pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Buffer length that triggers an immediate drain. Default: 50
    pub high_water_mark: usize,
    /// Max records removed from the buffer per batch. Default: 100
    pub batch_size: usize,
    /// Scheduled drain cadence in milliseconds. Default: 5000
    pub drain_interval_ms: u64,
    /// Anomaly thresholds applied to every drained record
    pub thresholds: AnomalyThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            high_water_mark: 50,
            batch_size: 100,
            drain_interval_ms: 5000,
            thresholds: AnomalyThresholds::default(),
        }
    }
}

/// Fusion engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Model id whose response is preferred as the fusion base
    pub medical_model: String,
    /// Fallback base model id when no medical response is present
    pub general_model: String,
    /// Seed weights for models that omit per-response confidence
    pub default_weights: HashMap<String, f64>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        let mut default_weights = HashMap::new();
        default_weights.insert("medical".to_string(), 0.9);
        default_weights.insert("general".to_string(), 0.7);
        Self {
            medical_model: "medical".to_string(),
            general_model: "general".to_string(),
            default_weights,
        }
    }
}

/// Top-level configuration for both engines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub pipeline: PipelineConfig,
    pub fusion: FusionConfig,
}

impl CoreConfig {
    /// Load configuration following the resolution priority order
    ///
    /// An explicit path that does not exist or does not parse is an error;
    /// when neither an explicit path nor the environment variable names a
    /// file, compiled defaults are returned.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&PathBuf::from(path));
        }

        Ok(Self::default())
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_deployed_constants() {
        let config = CoreConfig::default();
        assert_eq!(config.pipeline.high_water_mark, 50);
        assert_eq!(config.pipeline.batch_size, 100);
        assert_eq!(config.pipeline.drain_interval_ms, 5000);
        assert_eq!(config.pipeline.thresholds.heart_rate_high, 120.0);
        assert_eq!(config.pipeline.thresholds.spo2_low, 92.0);
        assert_eq!(config.fusion.medical_model, "medical");
        assert_eq!(config.fusion.default_weights.get("medical"), Some(&0.9));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[pipeline]\nhigh_water_mark = 10\n\n[pipeline.thresholds]\nspo2_low = 90.0\n"
        )
        .unwrap();

        let config = CoreConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pipeline.high_water_mark, 10);
        assert_eq!(config.pipeline.thresholds.spo2_low, 90.0);
        // Unnamed fields keep their defaults
        assert_eq!(config.pipeline.batch_size, 100);
        assert_eq!(config.pipeline.thresholds.heart_rate_high, 120.0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = CoreConfig::load(Some(Path::new("/nonexistent/vitals.toml")));
        assert!(result.is_err());
    }
}
