//! # Vitals Common Library
//!
//! Shared code for the vitals monitoring core including:
//! - Telemetry and model-response data types
//! - Event types (VitalsEvent enum) and EventBus
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use error::{Error, Result};
pub use types::{BloodPressure, ModelResponse, TelemetryRecord};
