//! Fixed-rule anomaly evaluation for telemetry records
//!
//! Screening heuristics only: a matched rule flags the record for observer
//! notification, it does not constitute a diagnosis. Rules are evaluated in
//! a fixed order and the first match flags the whole record.

use serde::{Deserialize, Serialize};
use vitals_common::config::AnomalyThresholds;
use vitals_common::TelemetryRecord;

/// Which rule flagged a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    HeartRate,
    BloodOxygen,
    Temperature,
    BloodPressure,
    EcgAmplitude,
}

/// Evaluate one record against the threshold set
///
/// Returns the first matching rule, or `None` when every present metric is
/// in range. A record carrying no physiological fields is never anomalous.
pub fn evaluate_record(
    record: &TelemetryRecord,
    thresholds: &AnomalyThresholds,
) -> Option<AnomalyKind> {
    if let Some(hr) = record.heart_rate {
        if hr > thresholds.heart_rate_high || hr < thresholds.heart_rate_low {
            return Some(AnomalyKind::HeartRate);
        }
    }

    if let Some(spo2) = record.blood_oxygen {
        if spo2 < thresholds.spo2_low {
            return Some(AnomalyKind::BloodOxygen);
        }
    }

    if let Some(temp) = record.temperature {
        if temp > thresholds.temp_high || temp < thresholds.temp_low {
            return Some(AnomalyKind::Temperature);
        }
    }

    if let Some(bp) = record.blood_pressure {
        if bp.systolic > thresholds.systolic_high || bp.diastolic > thresholds.diastolic_high {
            return Some(AnomalyKind::BloodPressure);
        }
    }

    if let Some(ecg) = &record.ecg {
        if !ecg.is_empty() {
            let max_amplitude = ecg.iter().fold(0.0_f64, |max, s| max.max(s.abs()));
            if max_amplitude > thresholds.ecg_amplitude_max {
                return Some(AnomalyKind::EcgAmplitude);
            }
        }
    }

    None
}
