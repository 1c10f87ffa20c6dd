//! # Vitals Core
//!
//! In-process engines behind the vitals monitoring service:
//! - `pipeline`: buffers streamed telemetry, drains it in bounded batches,
//!   flags anomalous records, and notifies registered observers
//! - `fusion`: blends multiple model responses into a single answer using
//!   weighted key-point scoring
//!
//! Both engines are self-contained and transport-agnostic: endpoints hand
//! them plain data values and receive plain data (or a fused string) back.

pub mod fusion;
pub mod pipeline;

pub use fusion::FusionEngine;
pub use pipeline::IngestPipeline;
