//! Weighted fusion of multiple model responses
//!
//! Blends N labeled model outputs into one answer: the highest-priority
//! response forms the base, and the top-scoring key points it does not
//! already contain are appended under an "Additional information" label.
//! Fusion always returns a usable string, never an error, so the
//! conversational surface stays responsive.

use crate::fusion::key_points::extract_key_points;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use vitals_common::config::FusionConfig;
use vitals_common::ModelResponse;

/// Fixed output for an empty response set
pub const NO_INFORMATION: &str =
    "I do not have enough information to provide an answer at this time.";

/// Confidence used when a response has no explicit confidence and its
/// model has no registered weight
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// At most this many scored points are considered for the output
const MAX_TOP_POINTS: usize = 5;

/// Scored key point aggregated across responses
struct ScoredPoint {
    text: String,
    score: f64,
}

/// Fuses labeled model responses using weighted key-point scoring
///
/// The weights map is the engine's only long-lived state; each call to
/// [`fuse_responses`](Self::fuse_responses) reads it and writes nothing
/// shared, so concurrent fusions interleave safely.
#[derive(Clone)]
pub struct FusionEngine {
    config: Arc<FusionConfig>,

    /// Per-model weight in [0,1], consulted when a response omits its
    /// confidence. Grows without bound; there is no removal API.
    weights: Arc<RwLock<HashMap<String, f64>>>,
}

impl FusionEngine {
    /// Create an engine seeded with the configured default weights
    pub fn new(config: FusionConfig) -> Self {
        let seeded: HashMap<String, f64> = config
            .default_weights
            .iter()
            .map(|(model, weight)| (model.clone(), weight.clamp(0.0, 1.0)))
            .collect();
        Self {
            config: Arc::new(config),
            weights: Arc::new(RwLock::new(seeded)),
        }
    }

    /// Set the weight used for `model_id` when a response omits its
    /// confidence; values are clamped to [0,1]
    pub async fn set_model_weight(&self, model_id: impl Into<String>, weight: f64) {
        let clamped = weight.clamp(0.0, 1.0);
        let model_id = model_id.into();
        debug!("Setting weight for model '{}' to {}", model_id, clamped);
        self.weights.write().await.insert(model_id, clamped);
    }

    /// Current registered weight for `model_id`, if any
    pub async fn model_weight(&self, model_id: &str) -> Option<f64> {
        self.weights.read().await.get(model_id).copied()
    }

    /// Blend the given responses into one answer
    ///
    /// Zero responses yields the fixed [`NO_INFORMATION`] sentinel and one
    /// response is returned unchanged. With two or more, key points are
    /// extracted per response, scored by the summed confidence of every
    /// response producing them, and the top points missing from the base
    /// response are appended in descending score order.
    pub async fn fuse_responses(&self, responses: &[ModelResponse]) -> String {
        match responses {
            [] => return NO_INFORMATION.to_string(),
            [only] => return only.response.clone(),
            _ => {}
        }

        let weights = self.weights.read().await;

        // Sum each exact point's score across the responses producing it
        let mut scores: HashMap<String, f64> = HashMap::new();
        for response in responses {
            let confidence = response
                .confidence
                .or_else(|| weights.get(&response.model_id).copied())
                .unwrap_or(FALLBACK_CONFIDENCE);
            for point in extract_key_points(&response.response) {
                *scores.entry(point).or_insert(0.0) += confidence;
            }
        }
        drop(weights);

        let mut points: Vec<ScoredPoint> = scores
            .into_iter()
            .map(|(text, score)| ScoredPoint { text, score })
            .collect();
        // Descending score; ties broken by text so identical inputs always
        // produce identical output
        points.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        points.truncate(MAX_TOP_POINTS);

        let base = self.base_response(responses);
        trace!(
            "Fusing {} responses, base model '{}', {} candidate points",
            responses.len(),
            base.model_id,
            points.len()
        );

        let mut output = base.response.clone();
        let additions: Vec<&ScoredPoint> = points
            .iter()
            .filter(|p| !base.response.contains(&p.text))
            .collect();
        if !additions.is_empty() {
            output.push_str("\n\nAdditional information:");
            for point in additions {
                output.push_str("\n- ");
                output.push_str(&point.text);
            }
        }
        output
    }

    /// Base response priority: designated medical model, else designated
    /// general model, else the first response in input order
    fn base_response<'a>(&self, responses: &'a [ModelResponse]) -> &'a ModelResponse {
        responses
            .iter()
            .find(|r| r.model_id == self.config.medical_model)
            .or_else(|| {
                responses
                    .iter()
                    .find(|r| r.model_id == self.config.general_model)
            })
            .unwrap_or(&responses[0])
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_returns_sentinel() {
        let engine = FusionEngine::default();
        assert_eq!(engine.fuse_responses(&[]).await, NO_INFORMATION);
    }

    #[tokio::test]
    async fn single_response_is_identity() {
        let engine = FusionEngine::default();
        let responses = vec![ModelResponse::new("m1", "X")];
        assert_eq!(engine.fuse_responses(&responses).await, "X");
    }

    #[tokio::test]
    async fn medical_model_forms_the_base() {
        let engine = FusionEngine::default();
        let responses = vec![
            ModelResponse::new("some-other-model", "Unrecognized model text here."),
            ModelResponse::new("medical", "Medical model answer goes here."),
        ];
        let fused = engine.fuse_responses(&responses).await;
        assert!(fused.starts_with("Medical model answer goes here."));
    }

    #[tokio::test]
    async fn general_model_is_second_priority() {
        let engine = FusionEngine::default();
        let responses = vec![
            ModelResponse::new("some-other-model", "Unrecognized model text here."),
            ModelResponse::new("general", "General model answer goes here."),
        ];
        let fused = engine.fuse_responses(&responses).await;
        assert!(fused.starts_with("General model answer goes here."));
    }

    #[tokio::test]
    async fn falls_back_to_first_response_in_input_order() {
        let engine = FusionEngine::default();
        let responses = vec![
            ModelResponse::new("m1", "First response text goes here."),
            ModelResponse::new("m2", "Second response text goes here."),
        ];
        let fused = engine.fuse_responses(&responses).await;
        assert!(fused.starts_with("First response text goes here."));
    }

    #[tokio::test]
    async fn unique_points_are_appended_as_additional_information() {
        let engine = FusionEngine::default();
        let responses = vec![
            ModelResponse::new("medical", "Stay hydrated throughout the day."),
            ModelResponse::new("general", "Getting enough sleep also helps recovery."),
        ];
        let fused = engine.fuse_responses(&responses).await;
        assert!(fused.starts_with("Stay hydrated throughout the day."));
        assert!(fused.contains("Additional information:"));
        assert!(fused.contains("- Getting enough sleep also helps recovery"));
    }

    #[tokio::test]
    async fn points_already_in_base_are_not_repeated() {
        let engine = FusionEngine::default();
        let shared = "Stay hydrated throughout the day";
        let responses = vec![
            ModelResponse::new("medical", format!("{}.", shared)),
            ModelResponse::new("general", format!("{}.", shared)),
        ];
        let fused = engine.fuse_responses(&responses).await;
        assert_eq!(fused, format!("{}.", shared));
    }

    #[tokio::test]
    async fn weight_is_clamped_to_unit_interval() {
        let engine = FusionEngine::default();
        engine.set_model_weight("m1", 1.5).await;
        assert_eq!(engine.model_weight("m1").await, Some(1.0));
        engine.set_model_weight("m1", -0.2).await;
        assert_eq!(engine.model_weight("m1").await, Some(0.0));
    }

    #[tokio::test]
    async fn default_weights_are_seeded() {
        let engine = FusionEngine::default();
        assert_eq!(engine.model_weight("medical").await, Some(0.9));
        assert_eq!(engine.model_weight("general").await, Some(0.7));
        assert_eq!(engine.model_weight("unknown").await, None);
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_output() {
        let engine = FusionEngine::default();
        let responses = vec![
            ModelResponse::new("medical", "Drink water regularly. Rest as much as you can."),
            ModelResponse::new("general", "Light exercise can help. Avoid heavy meals at night."),
            ModelResponse::new("m3", "Avoid heavy meals at night. Keep a consistent schedule."),
        ];
        let first = engine.fuse_responses(&responses).await;
        let second = engine.fuse_responses(&responses).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn higher_weighted_points_rank_first() {
        let engine = FusionEngine::default();
        engine.set_model_weight("strong", 1.0).await;
        engine.set_model_weight("weak", 0.1).await;
        let responses = vec![
            ModelResponse::new("medical", "Base answer from the medical model."),
            ModelResponse::new("weak", "Weak model adds this point here."),
            ModelResponse::new("strong", "Strong model adds this point here."),
        ];
        let fused = engine.fuse_responses(&responses).await;
        let strong_pos = fused.find("Strong model adds this point here").unwrap();
        let weak_pos = fused.find("Weak model adds this point here").unwrap();
        assert!(strong_pos < weak_pos);
    }
}
