//! Core data types shared between the ingestion pipeline and fusion engine
//!
//! These are plain data carriers: the pipeline and engine consume them as
//! values and never reach out to HTTP, sockets, or storage. Construction
//! and validation happen at the endpoint boundary, outside this workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blood pressure reading in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// One vital-sign reading for one user
///
/// `user_id` and `timestamp` are always present; every physiological field
/// is independently optional, so a record may carry a single metric.
/// Records are treated as immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Opaque user identifier (assigned by the ingestion endpoint)
    pub user_id: String,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Heart rate in beats per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,

    /// Blood oxygen saturation in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_oxygen: Option<f64>,

    /// Body temperature in degrees Celsius
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Blood pressure reading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,

    /// ECG waveform: ordered signed amplitude samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecg: Option<Vec<f64>>,

    /// Free-text symptom list reported by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
}

impl TelemetryRecord {
    /// Create a record with only the required fields
    pub fn new(user_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            timestamp,
            heart_rate: None,
            blood_oxygen: None,
            temperature: None,
            blood_pressure: None,
            ecg: None,
            symptoms: None,
        }
    }

    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn with_blood_oxygen(mut self, percent: f64) -> Self {
        self.blood_oxygen = Some(percent);
        self
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    pub fn with_blood_pressure(mut self, systolic: f64, diastolic: f64) -> Self {
        self.blood_pressure = Some(BloodPressure { systolic, diastolic });
        self
    }

    pub fn with_ecg(mut self, samples: Vec<f64>) -> Self {
        self.ecg = Some(samples);
        self
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = Some(symptoms);
        self
    }
}

/// One labeled model output handed to the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Identifier of the source model (e.g. "medical", "general")
    pub model_id: String,

    /// Free-text answer produced by the model
    pub response: String,

    /// Optional confidence in [0,1]; when absent the engine falls back to
    /// the registered per-model weight, then to 0.5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ModelResponse {
    pub fn new(model_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            response: response.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
