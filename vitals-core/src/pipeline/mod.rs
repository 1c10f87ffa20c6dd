//! Telemetry ingestion pipeline

mod anomaly;
mod engine;
mod observer;

pub use anomaly::{evaluate_record, AnomalyKind};
pub use engine::IngestPipeline;
pub use observer::{observer_fn, AnomalyObserver};
